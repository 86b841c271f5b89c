//! Import resolution for the Python module system.
//!
//! Two regimes:
//!
//! - Relative imports (`from . import x`, `from ..pkg import y`) carry their
//!   depth as leading dots on the raw specifier. These are resolved by
//!   filesystem probing against the importing file's directory, one level up
//!   per dot beyond the first. A probed base is tried as `<base>.py` and as
//!   a package `<base>/__init__.py`; each imported name is additionally
//!   tried as a nested module file, covering `from .pkg import submod`.
//! - Bare absolute imports (`import utils`, `from pkg import submod`) go
//!   through the top-level-name index only. Python permits absolute imports
//!   of workspace modules without installation, so the basename heuristic
//!   applies; its false positives on colliding basenames are accepted and
//!   documented rather than "fixed".

use std::path::{Path, PathBuf};

use super::{ResolveContext, accept};

/// Resolve one Python import to a workspace file.
///
/// `specifier` is the raw module path with relative depth as leading dots
/// (a bare `"."` for `from . import x` shapes); `imported` holds the names
/// bound by a `from` import, or `["*"]` for plain `import` statements.
pub fn resolve(
    from_file: &Path,
    specifier: &str,
    imported: &[String],
    ctx: &ResolveContext,
) -> Option<PathBuf> {
    let dots = specifier.chars().take_while(|&c| c == '.').count();
    if dots > 0 {
        resolve_relative(from_file, dots, &specifier[dots..], imported, ctx)
    } else {
        resolve_bare(specifier, imported, ctx)
    }
}

fn resolve_relative(
    from_file: &Path,
    dots: usize,
    rest: &str,
    imported: &[String],
    ctx: &ResolveContext,
) -> Option<PathBuf> {
    let mut dir = from_file.parent()?.to_path_buf();
    for _ in 1..dots {
        dir = dir.parent()?.to_path_buf();
    }

    let base = if rest.is_empty() {
        dir
    } else {
        let mut base = dir;
        for segment in rest.split('.') {
            base.push(segment);
        }
        base
    };

    // `from . import x` has no module path of its own; only the imported
    // names can denote files.
    if !rest.is_empty() {
        if let Some(hit) = probe_module(&base, ctx) {
            return Some(hit);
        }
    }

    for name in imported {
        if name == "*" {
            continue;
        }
        if let Some(hit) = probe_module(&base.join(name), ctx) {
            return Some(hit);
        }
    }

    None
}

fn resolve_bare(specifier: &str, imported: &[String], ctx: &ResolveContext) -> Option<PathBuf> {
    let last = specifier.rsplit('.').next()?;
    if last.is_empty() {
        return None;
    }

    if let Some(hit) = first_python_module(ctx, last) {
        return Some(hit);
    }

    // `from pkg import submod` where `submod` is itself a module file
    for name in imported {
        if name == "*" {
            continue;
        }
        if let Some(hit) = first_python_module(ctx, name) {
            return Some(hit);
        }
    }

    None
}

/// First indexed file under `name` that is actually a Python module - the
/// index spans every discovered language, but only `.py` files can satisfy
/// a Python import.
fn first_python_module(ctx: &ResolveContext, name: &str) -> Option<PathBuf> {
    ctx.index
        .files(name)
        .iter()
        .find(|p| p.extension().and_then(|e| e.to_str()) == Some("py"))
        .and_then(|p| accept(p.clone(), ctx.root))
}

/// Probe one base path as a module: `<base>.py`, then `<base>/__init__.py`.
fn probe_module(base: &Path, ctx: &ResolveContext) -> Option<PathBuf> {
    accept(super::append_ext(base, "py"), ctx.root)
        .or_else(|| accept(base.join("__init__.py"), ctx.root))
}
