//! Content-hash cache for module records
//!
//! The cache is the sole authority on "has this file changed". Entries are
//! keyed by absolute path and guarded by a blake3 hash of the file's bytes;
//! staleness is detected lazily at lookup time by re-hashing the current
//! content, never by watching the filesystem. Entries live for the process
//! lifetime - there is no eviction and no persistence.
//!
//! Records are published behind an `Arc`, so a store is a single atomic
//! swap and concurrent lookups can never observe a partially written entry.
//! Concurrent stores are last-writer-wins, which is sound because validity
//! is governed by the content hash rather than write order.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::record::ModuleRecord;

struct CacheEntry {
    hash: blake3::Hash,
    module: Arc<ModuleRecord>,
}

/// Process-lifetime cache, constructed explicitly and threaded through
/// calls so tests get a fresh one.
#[derive(Default)]
pub struct ModuleCache {
    entries: RwLock<HashMap<PathBuf, CacheEntry>>,
}

impl ModuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached record for `file` only if the file's current
    /// content still hashes to the stored fingerprint. The returned copy is
    /// marked as a cache hit.
    pub fn lookup(&self, file: &Path) -> Option<ModuleRecord> {
        let bytes = fs::read(file).ok()?;
        let hash = blake3::hash(&bytes);

        let entries = self.entries.read().ok()?;
        let entry = entries.get(file)?;
        if entry.hash != hash {
            tracing::debug!(file = %file.display(), "cache entry stale");
            return None;
        }

        let mut record = (*entry.module).clone();
        record.meta.cache_hit = true;
        Some(record)
    }

    /// Publish a record for `file`, fingerprinting the content it was
    /// parsed from. Overwrites any prior entry.
    pub fn store(&self, file: &Path, content: &[u8], module: ModuleRecord) {
        let entry = CacheEntry { hash: blake3::hash(content), module: Arc::new(module) };
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(file.to_path_buf(), entry);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Language;
    use std::fs;
    use tempfile::tempdir;

    fn record_for(file: &Path) -> ModuleRecord {
        ModuleRecord::empty(file, Language::Ts)
    }

    #[test]
    fn lookup_hits_on_unchanged_content() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.ts");
        fs::write(&file, "export const x = 1;\n").unwrap();

        let cache = ModuleCache::new();
        assert!(cache.lookup(&file).is_none());

        cache.store(&file, &fs::read(&file).unwrap(), record_for(&file));
        let hit = cache.lookup(&file).unwrap();
        assert!(hit.meta.cache_hit);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn edit_invalidates_entry() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.ts");
        fs::write(&file, "export const x = 1;\n").unwrap();

        let cache = ModuleCache::new();
        cache.store(&file, &fs::read(&file).unwrap(), record_for(&file));
        assert!(cache.lookup(&file).is_some());

        fs::write(&file, "export const x = 2;\n").unwrap();
        assert!(cache.lookup(&file).is_none());

        // re-store under the new content revalidates
        cache.store(&file, &fs::read(&file).unwrap(), record_for(&file));
        assert!(cache.lookup(&file).is_some());
    }

    #[test]
    fn store_overwrites_prior_entry() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.ts");
        fs::write(&file, "v1").unwrap();

        let cache = ModuleCache::new();
        cache.store(&file, b"v1", record_for(&file));
        cache.store(&file, b"v1", record_for(&file));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn missing_file_is_a_miss() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("gone.ts");

        let cache = ModuleCache::new();
        cache.store(&file, b"x", record_for(&file));
        assert!(cache.lookup(&file).is_none());
    }
}
