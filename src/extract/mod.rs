//! Language extractor framework
//!
//! Each supported language registers one extractor; the registry dispatches
//! on file extension so the analyzer never sees language-specific logic.
//! Adding a language means registering one more extractor here.

pub mod python;
pub mod typescript;

use std::path::Path;
use std::time::Duration;

use crate::record::ModuleRecord;
use crate::resolve::ResolveContext;
use crate::{Error, Result};

pub use python::PythonExtractor;
pub use typescript::TypeScriptExtractor;

/// Trait for language extractors.
///
/// `extract` turns one source file into a [`ModuleRecord`], resolving import
/// specifiers through the supplied context as it goes. Failures are returned
/// as errors; the analyzer converts them into fail-closed empty records so a
/// single bad file never aborts a batch.
pub trait LanguageExtractor: Send + Sync {
    /// Display name of the language.
    fn name(&self) -> &str;

    /// File extensions this extractor handles.
    fn extensions(&self) -> &[&str];

    /// Check if this extractor can handle a file.
    fn can_handle(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions().contains(&ext))
    }

    /// Parse one file into a module record.
    fn extract(&self, path: &Path, content: &str, ctx: &ResolveContext) -> Result<ModuleRecord>;
}

/// Registry of language extractors, dispatched by extension.
#[derive(Default)]
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn LanguageExtractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, extractor: impl LanguageExtractor + 'static) {
        self.extractors.push(Box::new(extractor));
    }

    /// Find the extractor for a file, if any.
    pub fn find(&self, path: &Path) -> Option<&dyn LanguageExtractor> {
        self.extractors
            .iter()
            .find(|e| e.can_handle(path))
            .map(|e| e.as_ref())
    }

    /// Extract a file with the matching extractor.
    pub fn extract(&self, path: &Path, content: &str, ctx: &ResolveContext) -> Result<ModuleRecord> {
        let extractor = self
            .find(path)
            .ok_or_else(|| Error::Extract(format!("no extractor for {}", path.display())))?;
        extractor.extract(path, content, ctx)
    }
}

/// Registry with all built-in extractors.
pub fn default_registry(python_bin: &str, python_timeout: Duration) -> ExtractorRegistry {
    let mut registry = ExtractorRegistry::new();
    registry.register(TypeScriptExtractor::new());
    registry.register(PythonExtractor::new(python_bin, python_timeout));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct NoopExtractor;

    impl LanguageExtractor for NoopExtractor {
        fn name(&self) -> &str {
            "noop"
        }
        fn extensions(&self) -> &[&str] {
            &["noop"]
        }
        fn extract(&self, path: &Path, _: &str, _: &ResolveContext) -> Result<ModuleRecord> {
            Ok(ModuleRecord::empty(path, crate::record::Language::Js))
        }
    }

    #[test]
    fn registry_dispatches_by_extension() {
        let mut registry = ExtractorRegistry::new();
        registry.register(NoopExtractor);

        assert!(registry.find(Path::new("a.noop")).is_some());
        assert!(registry.find(Path::new("a.other")).is_none());
        assert!(registry.find(&PathBuf::from("noext")).is_none());
    }

    #[test]
    fn default_registry_covers_all_languages() {
        let registry = default_registry("python3", Duration::from_secs(10));
        for file in ["a.ts", "a.tsx", "a.js", "a.jsx", "a.py"] {
            assert!(registry.find(Path::new(file)).is_some(), "no extractor for {file}");
        }
        assert!(registry.find(Path::new("a.rb")).is_none());
    }
}
