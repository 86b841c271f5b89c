//! # Impact - source dependency indexing engine
//!
//! Impact scans a workspace spanning several languages, extracts per-file
//! import/export facts through language-aware parsing, resolves import
//! specifiers to concrete workspace files, and assembles dependency graphs:
//!
//! - Language extractors normalize heterogeneous parse results into one
//!   intermediate representation ([`record::ModuleRecord`])
//! - Per-language path resolvers map specifiers to workspace files
//! - A content-hash cache guarantees no stale data is ever served
//! - The analyzer fans extraction out over a bounded worker pool
//! - Graph assemblers produce the project-wide file graph and the per-file
//!   symbol graph
//!
//! The engine exposes exactly two operations ([`api::run_analysis`] and
//! [`api::symbol_graph`]); transports and rendering belong to the host.

pub mod analyzer;
pub mod api;
pub mod cache;
pub mod config;
pub mod extract;
pub mod graph;
pub mod ignore;
pub mod record;
pub mod resolve;
pub mod symbols;
pub mod ui;

// Re-exports for convenient access
pub use analyzer::{AnalyzeStats, Analyzer, AnalyzerOptions, DEFAULT_MAX_FILES};
pub use api::{RunResult, SymbolGraphResult, run_analysis, symbol_graph};
pub use cache::ModuleCache;
pub use graph::FileGraph;
pub use record::{
    ExportFact, ExportKind, ImportFact, Language, LanguageFilter, Location, ModuleRecord,
};

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for engine operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid workspace root: {0}")]
    InvalidRoot(std::path::PathBuf),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Extractor error: {0}")]
    Extract(String),

    #[error("Subprocess error: {0}")]
    Subprocess(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
