//! Import validation for component documents.
//!
//! Reports every structural problem in a candidate node list. A document is
//! only ever built from a list with zero diagnostics, so a malformed import
//! is rejected whole instead of being partially applied.

use crate::id::NodeId;
use crate::library;
use crate::model::ComponentInstance;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};
use std::fmt;

// ─── Diagnostic types ────────────────────────────────────────────────────

/// A single problem found in an imported node list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDiagnostic {
    /// The node this diagnostic refers to.
    pub node_id: NodeId,
    /// Human-readable message.
    pub message: String,
    /// Short rule identifier (e.g. "duplicate-id", "parent-cycle").
    pub rule: &'static str,
}

impl fmt::Display for ImportDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.rule, self.message)
    }
}

/// Why a document could not be imported.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("malformed JSON document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed MessagePack document: {0}")]
    MessagePack(#[from] rmp_serde::decode::Error),

    #[error("document failed validation ({} problem(s)): {}", .0.len(), summarize(.0))]
    Invalid(Vec<ImportDiagnostic>),
}

impl ImportError {
    /// Diagnostics behind an `Invalid` rejection; empty for decode errors.
    pub fn diagnostics(&self) -> &[ImportDiagnostic] {
        match self {
            ImportError::Invalid(diags) => diags,
            _ => &[],
        }
    }
}

fn summarize(diags: &[ImportDiagnostic]) -> String {
    diags
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ─── Public API ──────────────────────────────────────────────────────────

/// Run every import rule over `nodes` and return all findings.
#[must_use]
pub fn validate_nodes(nodes: &[ComponentInstance]) -> Vec<ImportDiagnostic> {
    let mut diags = Vec::new();
    check_duplicate_ids(nodes, &mut diags);
    check_parents(nodes, &mut diags);
    check_parent_cycles(nodes, &mut diags);
    diags
}

// ─── Rules ───────────────────────────────────────────────────────────────

fn check_duplicate_ids(nodes: &[ComponentInstance], diags: &mut Vec<ImportDiagnostic>) {
    let mut seen = HashSet::new();
    for node in nodes {
        if !seen.insert(node.id) {
            diags.push(ImportDiagnostic {
                node_id: node.id,
                message: format!("id `{}` is used by more than one node", node.id),
                rule: "duplicate-id",
            });
        }
    }
}

/// Every `parentId` must name another existing, container-capable node.
fn check_parents(nodes: &[ComponentInstance], diags: &mut Vec<ImportDiagnostic>) {
    let kinds: HashMap<NodeId, &str> = nodes.iter().map(|n| (n.id, n.kind.as_str())).collect();

    for node in nodes {
        let Some(parent) = node.parent_id else {
            continue;
        };
        if parent == node.id {
            diags.push(ImportDiagnostic {
                node_id: node.id,
                message: format!("`{}` names itself as its parent", node.id),
                rule: "self-parent",
            });
            continue;
        }
        match kinds.get(&parent) {
            None => diags.push(ImportDiagnostic {
                node_id: node.id,
                message: format!("`{}` references missing parent `{}`", node.id, parent),
                rule: "dangling-parent",
            }),
            Some(kind) if !library::allows_children(kind) => diags.push(ImportDiagnostic {
                node_id: node.id,
                message: format!(
                    "`{}` is parented under `{}`, a `{}` which cannot hold children",
                    node.id, parent, kind
                ),
                rule: "non-container-parent",
            }),
            Some(_) => {}
        }
    }
}

/// Report every node sitting on a parent cycle longer than one hop.
fn check_parent_cycles(nodes: &[ComponentInstance], diags: &mut Vec<ImportDiagnostic>) {
    let mut graph: DiGraph<NodeId, ()> = DiGraph::with_capacity(nodes.len(), nodes.len());
    let mut index: HashMap<NodeId, NodeIndex> = HashMap::with_capacity(nodes.len());
    for node in nodes {
        index.entry(node.id).or_insert_with(|| graph.add_node(node.id));
    }
    for node in nodes {
        if let Some(parent) = node.parent_id
            && parent != node.id
            && let (Some(&child_idx), Some(&parent_idx)) = (index.get(&node.id), index.get(&parent))
        {
            graph.update_edge(child_idx, parent_idx, ());
        }
    }

    for component in tarjan_scc(&graph) {
        if component.len() < 2 {
            continue;
        }
        let members: Vec<String> = component.iter().map(|&idx| graph[idx].to_string()).collect();
        for &idx in &component {
            diags.push(ImportDiagnostic {
                node_id: graph[idx],
                message: format!(
                    "`{}` is its own ancestor through [{}]",
                    graph[idx],
                    members.join(", ")
                ),
                rule: "parent-cycle",
            });
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────
