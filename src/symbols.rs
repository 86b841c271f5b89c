//! Per-file symbol graph (drill-down view)
//!
//! One root node for the file, one node per export, `declares` edges from
//! the root to every top-level declaration, and `memberOf` edges from a
//! class to each of its qualified `Owner.member` exports. Node order
//! follows export-extraction order; callers wanting a different order sort
//! on their side.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::record::{ExportKind, Location, ModuleRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    File,
    Function,
    Class,
    Var,
    Default,
    Reexport,
}

impl From<ExportKind> for SymbolKind {
    fn from(kind: ExportKind) -> Self {
        match kind {
            ExportKind::Function => SymbolKind::Function,
            ExportKind::Class => SymbolKind::Class,
            ExportKind::Var => SymbolKind::Var,
            ExportKind::Default => SymbolKind::Default,
            ExportKind::Reexport => SymbolKind::Reexport,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SymbolEdgeKind {
    Declares,
    MemberOf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolNode {
    pub id: String,
    pub name: String,
    pub kind: SymbolKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loc: Option<Location>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolEdge {
    pub source: String,
    pub target: String,
    pub kind: SymbolEdgeKind,
}

/// Assemble the symbol view of one freshly extracted record.
pub fn build_symbol_graph(record: &ModuleRecord) -> (Vec<SymbolNode>, Vec<SymbolEdge>) {
    let file_name = record
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| record.file.to_string_lossy().into_owned());
    let root_id = format!("file:{file_name}");

    let mut nodes = vec![SymbolNode {
        id: root_id.clone(),
        name: file_name,
        kind: SymbolKind::File,
        loc: None,
    }];
    let mut edges = Vec::new();

    let class_names: HashSet<&str> = record
        .exports
        .iter()
        .filter(|e| e.kind == ExportKind::Class)
        .map(|e| e.name.as_str())
        .collect();

    for export in &record.exports {
        let id = format!("{}:{}", export.kind, export.name);
        nodes.push(SymbolNode {
            id: id.clone(),
            name: export.name.clone(),
            kind: export.kind.into(),
            loc: export.loc,
        });

        match export.owner_and_member() {
            // a member hangs off its owning class, not off the file
            Some((owner, _)) if class_names.contains(owner) => {
                edges.push(SymbolEdge {
                    source: format!("{}:{owner}", ExportKind::Class),
                    target: id,
                    kind: SymbolEdgeKind::MemberOf,
                });
            }
            _ if export.kind.is_declaration() => {
                edges.push(SymbolEdge {
                    source: root_id.clone(),
                    target: id,
                    kind: SymbolEdgeKind::Declares,
                });
            }
            _ => {}
        }
    }

    (nodes, edges)
}
