//! Analyzer - discovery, cache consultation, and extraction fan-out
//!
//! One `analyze` call is one logical unit of work: discover candidate files
//! under the workspace root, consult the cache for each, dispatch misses to
//! the matching extractor across a bounded worker pool, and fold results
//! into discovery order with aggregate stats. A single file failing to
//! parse, read, or spawn its interpreter is recorded and skipped; the batch
//! always completes.

use crossbeam::channel;
use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use crate::cache::ModuleCache;
use crate::extract::{ExtractorRegistry, default_registry};
use crate::ignore::ExcludeSet;
use crate::record::{Language, LanguageFilter, ModuleRecord};
use crate::resolve::{ModuleIndex, ResolveContext};
use crate::{Error, Result};

/// Bounds on the per-call file limit.
pub const MIN_FILE_LIMIT: usize = 1;
pub const MAX_FILE_LIMIT: usize = 5000;
pub const DEFAULT_MAX_FILES: usize = 200;

const DEFAULT_PYTHON_TIMEOUT_MS: u64 = 10_000;

/// Knobs the host may set before constructing an [`Analyzer`].
#[derive(Debug, Clone)]
pub struct AnalyzerOptions {
    /// Interpreter used by the Python extractor.
    pub python_bin: String,
    /// Hard bound on one interpreter invocation; on expiry the child is
    /// killed and the file becomes a soft failure.
    pub python_timeout: Duration,
    /// Extra directory names excluded from discovery.
    pub exclude: Vec<String>,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            python_bin: "python3".to_string(),
            python_timeout: Duration::from_millis(DEFAULT_PYTHON_TIMEOUT_MS),
            exclude: Vec::new(),
        }
    }
}

/// Aggregate counters for one `analyze` call.
///
/// `total` counts every discovered candidate, before the file limit is
/// applied; `parsed + cached + failed` covers the analyzed subset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeStats {
    pub total: usize,
    pub parsed: usize,
    pub cached: usize,
    pub failed: usize,
    pub time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Progress notifications for a UI listener thread.
#[derive(Debug)]
pub enum ProgressEvent {
    Started { total: usize },
    File { file: PathBuf, cached: bool },
    Finished,
}

enum FileOutcome {
    Parsed(ModuleRecord),
    Cached(ModuleRecord),
    Failed(ModuleRecord),
}

/// The orchestrator. Owns the cache and the extractor registry; stateless
/// between calls apart from the cache, which lives as long as the analyzer.
pub struct Analyzer {
    cache: ModuleCache,
    registry: ExtractorRegistry,
    excludes: ExcludeSet,
    progress: Option<channel::Sender<ProgressEvent>>,
}

impl Analyzer {
    pub fn new(options: &AnalyzerOptions) -> Self {
        Self {
            cache: ModuleCache::new(),
            registry: default_registry(&options.python_bin, options.python_timeout),
            excludes: ExcludeSet::new(&options.exclude),
            progress: None,
        }
    }

    /// Attach a progress channel; events are best-effort.
    pub fn with_progress(mut self, tx: channel::Sender<ProgressEvent>) -> Self {
        self.progress = Some(tx);
        self
    }

    pub fn cache(&self) -> &ModuleCache {
        &self.cache
    }

    /// Analyze a workspace: discover, cache-or-extract, aggregate.
    /// Result order follows discovery order.
    pub fn analyze(
        &self,
        root: &Path,
        filter: LanguageFilter,
        max_files: usize,
    ) -> Result<(Vec<ModuleRecord>, AnalyzeStats)> {
        let started = Instant::now();

        let root = root
            .canonicalize()
            .map_err(|_| Error::InvalidRoot(root.to_path_buf()))?;
        if !root.is_dir() {
            return Err(Error::InvalidRoot(root));
        }

        let mut files = self.discover(&root, filter);
        let total = files.len();
        files.truncate(max_files.clamp(MIN_FILE_LIMIT, MAX_FILE_LIMIT));

        let index = ModuleIndex::build(&files);
        self.emit(ProgressEvent::Started { total: files.len() });

        let outcomes = self.run_pool(&root, &files, &index);

        let mut modules = Vec::with_capacity(outcomes.len());
        let mut stats = AnalyzeStats { total, ..Default::default() };
        for outcome in outcomes {
            let record = match outcome {
                FileOutcome::Parsed(r) => {
                    stats.parsed += 1;
                    r
                }
                FileOutcome::Cached(r) => {
                    stats.cached += 1;
                    r
                }
                FileOutcome::Failed(r) => {
                    stats.failed += 1;
                    r
                }
            };
            modules.push(record);
        }
        stats.time_ms = started.elapsed().as_millis() as u64;

        self.emit(ProgressEvent::Finished);
        tracing::info!(
            root = %root.display(),
            total = stats.total,
            parsed = stats.parsed,
            cached = stats.cached,
            failed = stats.failed,
            time_ms = stats.time_ms,
            "analysis complete"
        );

        Ok((modules, stats))
    }

    /// Extract one file without touching the cache - the symbol view must
    /// reflect the source as it is right now.
    pub fn extract_fresh(&self, file: &Path, root: &Path) -> Result<ModuleRecord> {
        let bytes = std::fs::read(file)?;
        let content = std::str::from_utf8(&bytes)
            .map_err(|e| Error::Extract(format!("{}: {e}", file.display())))?;
        let index = ModuleIndex::new();
        let ctx = ResolveContext { root, index: &index };
        self.registry.extract(file, content, &ctx)
    }

    /// Walk the workspace in deterministic (path-sorted) order, honoring
    /// gitignore and the bulk-directory exclusions.
    fn discover(&self, root: &Path, filter: LanguageFilter) -> Vec<PathBuf> {
        let mut builder = WalkBuilder::new(root);
        builder
            .hidden(true)
            .git_ignore(true)
            .git_global(false)
            .git_exclude(true)
            .sort_by_file_path(|a, b| a.cmp(b));

        builder
            .build()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
            .map(|entry| entry.into_path())
            .filter(|path| !self.excludes.is_excluded(path))
            .filter(|path| filter.matches(path))
            .collect()
    }

    /// Fan the per-file pipeline out over a bounded pool, one worker per
    /// available execution unit. Results funnel back through a channel and
    /// are slotted by discovery index, so accumulation is synchronized and
    /// ordering deterministic.
    fn run_pool(&self, root: &Path, files: &[PathBuf], index: &ModuleIndex) -> Vec<FileOutcome> {
        if files.is_empty() {
            return Vec::new();
        }
        let workers = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(4)
            .min(files.len());

        let mut slots: Vec<Option<FileOutcome>> = Vec::new();
        slots.resize_with(files.len(), || None);

        thread::scope(|scope| {
            let (job_tx, job_rx) = channel::bounded::<(usize, &PathBuf)>(workers * 2);
            let (done_tx, done_rx) = channel::unbounded::<(usize, FileOutcome)>();

            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let done_tx = done_tx.clone();
                scope.spawn(move || {
                    for (i, file) in job_rx.iter() {
                        let outcome = self.process_file(file, root, index);
                        if done_tx.send((i, outcome)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(job_rx);
            drop(done_tx);

            scope.spawn(move || {
                for job in files.iter().enumerate() {
                    if job_tx.send(job).is_err() {
                        break;
                    }
                }
            });

            for (i, outcome) in done_rx.iter() {
                let (file, cached) = match &outcome {
                    FileOutcome::Cached(r) => (r.file.clone(), true),
                    FileOutcome::Parsed(r) | FileOutcome::Failed(r) => (r.file.clone(), false),
                };
                self.emit(ProgressEvent::File { file, cached });
                slots[i] = Some(outcome);
            }
        });

        slots.into_iter().flatten().collect()
    }

    fn process_file(&self, file: &Path, root: &Path, index: &ModuleIndex) -> FileOutcome {
        if let Some(record) = self.cache.lookup(file) {
            tracing::debug!(file = %file.display(), "cache hit");
            return FileOutcome::Cached(record);
        }

        let lang = Language::from_path(file).unwrap_or(Language::Js);
        let bytes = match std::fs::read(file) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(file = %file.display(), error = %e, "unreadable file");
                return FileOutcome::Failed(ModuleRecord::empty(file, lang));
            }
        };
        let content = match std::str::from_utf8(&bytes) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(file = %file.display(), error = %e, "not valid UTF-8");
                return FileOutcome::Failed(ModuleRecord::empty(file, lang));
            }
        };

        let ctx = ResolveContext { root, index };
        match self.registry.extract(file, content, &ctx) {
            Ok(record) => {
                self.cache.store(file, &bytes, record.clone());
                FileOutcome::Parsed(record)
            }
            Err(e) => {
                // failures are never cached, so the next call retries
                tracing::warn!(file = %file.display(), error = %e, "extraction failed");
                FileOutcome::Failed(ModuleRecord::empty(file, lang))
            }
        }
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(tx) = &self.progress {
            tx.send(event).ok();
        }
    }
}
