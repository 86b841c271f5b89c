//! Import resolution for the TypeScript/JavaScript module system.
//!
//! Only relative specifiers (`./x`, `../x`) can land on a workspace file.
//! Bare specifiers name npm packages, which are installed outside the
//! workspace by definition and therefore never resolve.

use std::path::{Path, PathBuf};

use super::{ResolveContext, accept, append_ext, normalize};

/// Probe priority when the specifier carries no extension.
pub const EXTENSIONS: [&str; 4] = ["ts", "tsx", "js", "jsx"];

/// Resolve a module specifier against the importing file's directory.
///
/// Probe order: the literal path as a file, the literal plus each supported
/// extension, then the literal as a directory containing `index.<ext>`.
pub fn resolve(from_file: &Path, specifier: &str, ctx: &ResolveContext) -> Option<PathBuf> {
    if !specifier.starts_with("./") && !specifier.starts_with("../") {
        return None;
    }

    let dir = from_file.parent()?;
    let base = normalize(&dir.join(specifier));

    if let Some(hit) = accept(base.clone(), ctx.root) {
        return Some(hit);
    }

    for ext in EXTENSIONS {
        if let Some(hit) = accept(append_ext(&base, ext), ctx.root) {
            return Some(hit);
        }
    }

    if base.is_dir() {
        for ext in EXTENSIONS {
            if let Some(hit) = accept(base.join(format!("index.{ext}")), ctx.root) {
                return Some(hit);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::ModuleIndex;
    use std::fs;
    use tempfile::tempdir;

    fn ctx<'a>(root: &'a Path, index: &'a ModuleIndex) -> ResolveContext<'a> {
        ResolveContext { root, index }
    }

    #[test]
    fn resolves_literal_and_extension_probes() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("a.ts"), "").unwrap();
        fs::write(root.join("b.ts"), "").unwrap();

        let index = ModuleIndex::new();
        let c = ctx(root, &index);
        let from = root.join("a.ts");

        assert_eq!(resolve(&from, "./b.ts", &c), Some(root.join("b.ts")));
        assert_eq!(resolve(&from, "./b", &c), Some(root.join("b.ts")));
    }

    #[test]
    fn extension_priority_is_fixed() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("a.ts"), "").unwrap();
        // both exist: the .ts candidate must win every time
        fs::write(root.join("mod.js"), "").unwrap();
        fs::write(root.join("mod.ts"), "").unwrap();

        let index = ModuleIndex::new();
        let c = ctx(root, &index);
        let from = root.join("a.ts");

        for _ in 0..3 {
            assert_eq!(resolve(&from, "./mod", &c), Some(root.join("mod.ts")));
        }
    }

    #[test]
    fn resolves_directory_index() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("lib")).unwrap();
        fs::write(root.join("lib/index.ts"), "").unwrap();
        fs::write(root.join("a.ts"), "").unwrap();

        let index = ModuleIndex::new();
        let c = ctx(root, &index);
        let from = root.join("a.ts");

        assert_eq!(resolve(&from, "./lib", &c), Some(root.join("lib/index.ts")));
    }

    #[test]
    fn parent_traversal() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("src")).unwrap();
        fs::write(root.join("src/a.ts"), "").unwrap();
        fs::write(root.join("util.ts"), "").unwrap();

        let index = ModuleIndex::new();
        let c = ctx(root, &index);
        let from = root.join("src/a.ts");

        assert_eq!(resolve(&from, "../util", &c), Some(root.join("util.ts")));
    }

    #[test]
    fn bare_specifiers_never_resolve() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("a.ts"), "").unwrap();
        // a file that happens to share the package name must not match
        fs::write(root.join("lodash.ts"), "").unwrap();

        let index = ModuleIndex::build(&[root.join("lodash.ts")]);
        let c = ctx(root, &index);
        let from = root.join("a.ts");

        assert_eq!(resolve(&from, "lodash", &c), None);
        assert_eq!(resolve(&from, "node:fs", &c), None);
    }

    #[test]
    fn escaping_the_workspace_is_discarded() {
        let outer = tempdir().unwrap();
        let root = outer.path().join("ws");
        fs::create_dir(&root).unwrap();
        fs::write(outer.path().join("secret.ts"), "").unwrap();
        fs::write(root.join("a.ts"), "").unwrap();

        let index = ModuleIndex::new();
        let c = ctx(&root, &index);
        let from = root.join("a.ts");

        assert_eq!(resolve(&from, "../secret", &c), None);
    }
}
