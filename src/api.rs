//! The engine's two request/response operations
//!
//! Transport-agnostic: a host wires these to whatever framing it uses and
//! renders the results. Neither operation ever fails - a missing workspace
//! root or an unparseable file degrades to a well-formed, possibly empty,
//! result with the reason in the stats note or the logs.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::analyzer::{AnalyzeStats, Analyzer};
use crate::record::{LanguageFilter, ModuleRecord};
use crate::symbols::{SymbolEdge, SymbolNode, build_symbol_graph};

/// Result of a whole-workspace analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub modules: Vec<ModuleRecord>,
    pub stats: AnalyzeStats,
    pub workspace_root: PathBuf,
}

/// Result of a single-file symbol drill-down.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolGraphResult {
    pub file: PathBuf,
    pub nodes: Vec<SymbolNode>,
    pub edges: Vec<SymbolEdge>,
}

/// Analyze every supported file under `root`, up to `max_files`.
///
/// A bad root comes back as zero modules with a stats note rather than an
/// error - the host has nothing useful to do with a failure here beyond
/// showing the reason.
pub fn run_analysis(
    analyzer: &Analyzer,
    root: &Path,
    filter: LanguageFilter,
    max_files: usize,
) -> RunResult {
    // module records carry canonical paths, so the reported root must too
    let workspace_root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    match analyzer.analyze(root, filter, max_files) {
        Ok((modules, stats)) => RunResult {
            modules,
            stats,
            workspace_root,
        },
        Err(e) => {
            tracing::warn!(root = %root.display(), error = %e, "analysis refused");
            RunResult {
                modules: Vec::new(),
                stats: AnalyzeStats { note: Some(e.to_string()), ..Default::default() },
                workspace_root,
            }
        }
    }
}

/// Build the symbol graph for one file, always from a fresh parse - the
/// drill-down must reflect the source as it stands, so the cache is never
/// consulted.
pub fn symbol_graph(analyzer: &Analyzer, file: &Path, workspace_root: Option<&Path>) -> SymbolGraphResult {
    let fallback;
    let root = match workspace_root.filter(|r| r.is_absolute()) {
        Some(root) => root,
        None => {
            fallback = file.parent().map(Path::to_path_buf).unwrap_or_default();
            fallback.as_path()
        }
    };

    match analyzer.extract_fresh(file, root) {
        Ok(record) => {
            let (nodes, edges) = build_symbol_graph(&record);
            SymbolGraphResult { file: file.to_path_buf(), nodes, edges }
        }
        Err(e) => {
            tracing::warn!(file = %file.display(), error = %e, "symbol graph unavailable");
            SymbolGraphResult { file: file.to_path_buf(), nodes: Vec::new(), edges: Vec::new() }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{AnalyzerOptions, DEFAULT_MAX_FILES};
    use crate::symbols::SymbolEdgeKind;
    use std::fs;
    use tempfile::tempdir;

    fn analyzer() -> Analyzer {
        Analyzer::new(&AnalyzerOptions::default())
    }

    #[test]
    fn bad_root_yields_empty_result_with_note() {
        let result = run_analysis(
            &analyzer(),
            Path::new("/definitely/not/a/workspace"),
            LanguageFilter::Auto,
            DEFAULT_MAX_FILES,
        );
        assert!(result.modules.is_empty());
        assert_eq!(result.stats.parsed, 0);
        assert!(result.stats.note.is_some());
    }

    #[test]
    fn symbol_graph_for_a_class_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("shape.ts");
        fs::write(&file, "export class Shape {\n  area() {}\n}\nexport function make() {}\n").unwrap();

        let result = symbol_graph(&analyzer(), &file, Some(dir.path()));

        let ids: Vec<&str> = result.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["file:shape.ts", "class:Shape", "function:Shape.area", "function:make"]);
        assert!(result.edges.iter().any(|e| {
            e.kind == SymbolEdgeKind::MemberOf && e.source == "class:Shape" && e.target == "function:Shape.area"
        }));
    }

    #[test]
    fn symbol_graph_is_never_cached() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("live.ts");
        fs::write(&file, "export function one() {}\n").unwrap();

        let engine = analyzer();
        let before = symbol_graph(&engine, &file, Some(dir.path()));
        assert_eq!(before.nodes.len(), 2);

        fs::write(&file, "export function one() {}\nexport function two() {}\n").unwrap();
        let after = symbol_graph(&engine, &file, Some(dir.path()));
        assert_eq!(after.nodes.len(), 3);
    }

    #[test]
    fn unsupported_extension_degrades_to_empty() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        fs::write(&file, "not source code").unwrap();

        let result = symbol_graph(&analyzer(), &file, Some(dir.path()));
        assert!(result.nodes.is_empty());
        assert!(result.edges.is_empty());
    }
}
