//! Path resolution - mapping import specifiers to workspace files
//!
//! One resolver per module system. All of them are pure probing functions:
//! they never fail, they return `None` on ambiguity, and any candidate that
//! escapes the workspace root is discarded. The first existing regular file
//! in probe order wins; extension priority is fixed and documented rather
//! than guaranteed "most correct".

pub mod python;
pub mod typescript;

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Everything a resolver may consult: the workspace root (containment
/// boundary) and the top-level-name index built from the discovered files.
pub struct ResolveContext<'a> {
    pub root: &'a Path,
    pub index: &'a ModuleIndex,
}

/// Heuristic index of extension-stripped basenames to the files carrying
/// them, in discovery order.
///
/// Used only for bare/absolute-style imports in module systems that permit
/// name-based absolute imports without package installation (Python). When
/// several files share a basename the first discovered wins - an accepted
/// imprecision that can produce false edges on basename collisions.
#[derive(Debug, Default)]
pub struct ModuleIndex {
    by_name: HashMap<String, Vec<PathBuf>>,
}

impl ModuleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from the discovered file set, preserving order.
    /// `__init__.py` files are indexed under their parent directory's name
    /// so `import pkg` can find the package initializer.
    pub fn build(files: &[PathBuf]) -> Self {
        let mut by_name: HashMap<String, Vec<PathBuf>> = HashMap::new();
        for file in files {
            let Some(stem) = file.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let key = if stem == "__init__" {
                match file.parent().and_then(|d| d.file_name()).and_then(|n| n.to_str()) {
                    Some(dir) => dir.to_string(),
                    None => continue,
                }
            } else {
                stem.to_string()
            };
            by_name.entry(key).or_default().push(file.clone());
        }
        Self { by_name }
    }

    /// Every file discovered under this basename, in discovery order.
    pub fn files(&self, name: &str) -> &[PathBuf] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First file discovered under this basename, if any.
    pub fn first(&self, name: &str) -> Option<&Path> {
        self.files(name).first().map(PathBuf::as_path)
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Lexically normalize a path: fold `.` away and resolve `..` against the
/// components already seen. Purely textual - the path need not exist, which
/// matters because most probe candidates do not.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(Component::ParentDir);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Append an extension to a path without replacing any existing one, so
/// `./helper.util` probes as `helper.util.ts` and not `helper.ts`.
pub(crate) fn append_ext(path: &Path, ext: &str) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

/// A candidate survives only when it exists as a regular file inside the
/// workspace root.
pub(crate) fn accept(candidate: PathBuf, root: &Path) -> Option<PathBuf> {
    if candidate.starts_with(root) && candidate.is_file() {
        Some(candidate)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_dots() {
        assert_eq!(
            normalize(Path::new("/w/src/./a/../b.ts")),
            PathBuf::from("/w/src/b.ts")
        );
        assert_eq!(
            normalize(Path::new("/w/a/../../etc/passwd")),
            PathBuf::from("/etc/passwd")
        );
    }

    #[test]
    fn append_keeps_existing_dots() {
        assert_eq!(
            append_ext(Path::new("/w/helper.util"), "ts"),
            PathBuf::from("/w/helper.util.ts")
        );
    }

    #[test]
    fn index_prefers_discovery_order() {
        let files = vec![
            PathBuf::from("/w/a/utils.py"),
            PathBuf::from("/w/b/utils.py"),
        ];
        let index = ModuleIndex::build(&files);
        assert_eq!(index.first("utils"), Some(Path::new("/w/a/utils.py")));
    }

    #[test]
    fn index_maps_package_initializers() {
        let files = vec![PathBuf::from("/w/pkg/__init__.py")];
        let index = ModuleIndex::build(&files);
        assert_eq!(index.first("pkg"), Some(Path::new("/w/pkg/__init__.py")));
        assert_eq!(index.first("__init__"), None);
    }
}
