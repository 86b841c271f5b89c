//! File-level dependency graph (project view)
//!
//! Folds a batch of module records into a deduplicated graph of
//! workspace-relative file ids. Only imports with a resolved target become
//! edges; unresolved specifiers simply do not appear. Self-edges are
//! permitted and directed cycles are valid - this is a dependency map, not
//! a DAG. Rebuilt in full on every call.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::record::ModuleRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileNode {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEdge {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileGraph {
    pub nodes: Vec<FileNode>,
    pub edges: Vec<FileEdge>,
}

impl FileGraph {
    /// Assemble the project view. Node ids are workspace-relative with
    /// forward slashes; the node set is the union of every record's file
    /// and every resolved import target.
    pub fn build(modules: &[ModuleRecord], root: &Path) -> Self {
        let mut graph = FileGraph::default();
        let mut seen_nodes: HashSet<String> = HashSet::new();
        let mut seen_edges: HashSet<(String, String)> = HashSet::new();

        let mut add_node = |graph: &mut FileGraph, id: &str| {
            if seen_nodes.insert(id.to_string()) {
                graph.nodes.push(FileNode { id: id.to_string() });
            }
        };

        for module in modules {
            let source = relative_id(&module.file, root);
            add_node(&mut graph, &source);

            for import in &module.imports {
                let Some(resolved) = &import.resolved else {
                    continue;
                };
                let target = relative_id(resolved, root);
                add_node(&mut graph, &target);

                if seen_edges.insert((source.clone(), target.clone())) {
                    graph.edges.push(FileEdge { source: source.clone(), target });
                }
            }
        }

        graph
    }
}

/// Workspace-relative id with forward slashes, falling back to the full
/// path when the file sits outside the root.
fn relative_id(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.to_string_lossy().replace('\\', "/")
}
