//! Discovery exclusions
//!
//! Bulk directories - dependency installs, version control, build output -
//! are never worth indexing and would dwarf the real sources if they were.
//! The walker already honors `.gitignore`; this set covers the directories
//! that show up even in repos without one, plus user-configured names.

use std::path::{Component, Path};

/// Directory names skipped during discovery regardless of gitignore state.
const BULK_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    ".svn",
    ".hg",
    ".idea",
    ".vscode",
    "dist",
    "out",
    "build",
    "target",
    "coverage",
    "__pycache__",
    ".venv",
    "venv",
    ".tox",
    ".next",
    ".cache",
];

/// Built-in bulk-directory names plus user-configured extras.
#[derive(Debug, Default)]
pub struct ExcludeSet {
    extra: Vec<String>,
}

impl ExcludeSet {
    pub fn new(extra: &[String]) -> Self {
        Self { extra: extra.to_vec() }
    }

    /// True when any path component names an excluded directory.
    pub fn is_excluded(&self, path: &Path) -> bool {
        path.components().any(|c| {
            if let Component::Normal(name) = c {
                let name = name.to_str().unwrap_or("");
                BULK_DIRS.contains(&name) || self.extra.iter().any(|e| e == name)
            } else {
                false
            }
        })
    }
}
