//! Tree mutator: the only code path that changes a live [`Document`].
//!
//! Every operation is checked before it touches the document. On failure
//! the document is left exactly as it was and a [`MutationError`] is
//! returned; nothing here panics past the document boundary.
//!
//! Sibling order is backing order, so reparenting is a remove followed by
//! an insert at a computed slot:
//!
//! - the new parent has children: right after its last child
//! - the new parent is childless: right after the parent itself
//! - no parent (root): at the front of the document
//!
//! The requested index of a [`Mutation::Move`] is carried for callers but
//! not honored; moves always append within the target.

use pb_core::{Document, ImportDiagnostic, NodeId, NodePatch, NodeSpec};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// A document mutation, as issued by editors, the placement resolver or a
/// script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Mutation {
    /// Place a new node (fresh id) at the end of the document.
    Add {
        spec: NodeSpec,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent_id: Option<NodeId>,
    },
    /// Shallow-merge props/style into an existing node.
    Update { id: NodeId, patch: NodePatch },
    /// Remove a node and every descendant.
    Remove { id: NodeId },
    /// Reparent a node, appending it to the target's children.
    Move {
        id: NodeId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent_id: Option<NodeId>,
        #[serde(default)]
        index: usize,
    },
    Clear,
    /// Replace the whole document (import, template apply).
    Load { document: Document },
}

impl Mutation {
    /// Short human label, used for history entries and logs.
    pub fn describe(&self) -> String {
        match self {
            Mutation::Add { spec, .. } => format!("add {}", spec.kind),
            Mutation::Update { id, .. } => format!("update {id}"),
            Mutation::Remove { id } => format!("remove {id}"),
            Mutation::Move { id, .. } => format!("move {id}"),
            Mutation::Clear => "clear canvas".to_string(),
            Mutation::Load { .. } => "load document".to_string(),
        }
    }
}

/// What an accepted mutation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Added(NodeId),
    Updated(NodeId),
    /// `count` includes the node itself.
    Removed { id: NodeId, count: usize },
    Moved(NodeId),
    Cleared { count: usize },
    Loaded { count: usize },
    /// Accepted, but there was nothing to do. Not recorded in history.
    Unchanged,
}

impl Applied {
    /// Whether this outcome gets a history entry.
    pub fn is_recorded(&self) -> bool {
        !matches!(self, Applied::Unchanged)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MutationError {
    #[error("no node with id `{0}`")]
    NotFound(NodeId),

    #[error("`{0}` is missing or cannot contain children")]
    InvalidParent(NodeId),

    #[error("moving `{id}` under `{parent}` would create a cycle")]
    CycleRejected { id: NodeId, parent: NodeId },

    #[error("document rejected: {}", summarize(.0))]
    InvalidDocument(Vec<ImportDiagnostic>),
}

fn summarize(diagnostics: &[ImportDiagnostic]) -> String {
    match diagnostics {
        [] => "no diagnostics".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (+{} more)", rest.len()),
    }
}

/// Apply `mutation` to `doc`.
///
/// On `Err` the document is unchanged.
pub fn apply(doc: &mut Document, mutation: Mutation) -> Result<Applied, MutationError> {
    match mutation {
        Mutation::Add { spec, parent_id } => add(doc, spec, parent_id).map(Applied::Added),
        Mutation::Update { id, patch } => update(doc, id, patch),
        Mutation::Remove { id } => Ok(remove(doc, id)),
        Mutation::Move { id, parent_id, .. } => move_node(doc, id, parent_id),
        Mutation::Clear => {
            let count = doc.len();
            doc.clear();
            Ok(Applied::Cleared { count })
        }
        Mutation::Load { document } => load(doc, document),
    }
}

/// Check a mutation without applying it.
pub fn check(doc: &Document, mutation: &Mutation) -> Result<(), MutationError> {
    match mutation {
        Mutation::Add { parent_id, .. } => check_parent(doc, *parent_id),
        Mutation::Update { id, .. } => {
            if doc.contains(*id) {
                Ok(())
            } else {
                Err(MutationError::NotFound(*id))
            }
        }
        Mutation::Remove { .. } | Mutation::Clear => Ok(()),
        Mutation::Move { id, parent_id, .. } => check_move(doc, *id, *parent_id),
        Mutation::Load { document } => check_document(document),
    }
}

// ─── Operations ──────────────────────────────────────────────────────────

/// Add a node under `parent_id` and return its fresh id.
pub fn add(
    doc: &mut Document,
    spec: NodeSpec,
    parent_id: Option<NodeId>,
) -> Result<NodeId, MutationError> {
    check_parent(doc, parent_id)?;
    let id = doc.fresh_id(&spec.kind);
    doc.push(spec.into_instance(id, parent_id));
    Ok(id)
}

fn update(doc: &mut Document, id: NodeId, patch: NodePatch) -> Result<Applied, MutationError> {
    let node = doc.get_mut(id).ok_or(MutationError::NotFound(id))?;
    node.apply_patch(patch);
    Ok(Applied::Updated(id))
}

fn remove(doc: &mut Document, id: NodeId) -> Applied {
    let doomed: HashSet<NodeId> = doc.subtree(id).into_iter().collect();
    if doomed.is_empty() {
        return Applied::Unchanged;
    }
    doc.retain(|n| !doomed.contains(&n.id));
    Applied::Removed {
        id,
        count: doomed.len(),
    }
}

fn move_node(
    doc: &mut Document,
    id: NodeId,
    parent_id: Option<NodeId>,
) -> Result<Applied, MutationError> {
    check_move(doc, id, parent_id)?;

    let slot = doc.position_of(id).ok_or(MutationError::NotFound(id))?;
    let Some(mut node) = doc.remove_at(slot) else {
        return Err(MutationError::NotFound(id));
    };
    node.parent_id = parent_id;
    let target = insertion_slot(doc, parent_id);
    doc.insert(target, node);
    Ok(Applied::Moved(id))
}

fn load(doc: &mut Document, document: Document) -> Result<Applied, MutationError> {
    check_document(&document)?;
    let count = document.len();
    *doc = document;
    Ok(Applied::Loaded { count })
}

// ─── Checks ──────────────────────────────────────────────────────────────

fn check_parent(doc: &Document, parent_id: Option<NodeId>) -> Result<(), MutationError> {
    match parent_id {
        Some(parent) if !doc.is_container(parent) => Err(MutationError::InvalidParent(parent)),
        _ => Ok(()),
    }
}

fn check_move(doc: &Document, id: NodeId, parent_id: Option<NodeId>) -> Result<(), MutationError> {
    if !doc.contains(id) {
        return Err(MutationError::NotFound(id));
    }
    let Some(parent) = parent_id else {
        return Ok(());
    };
    if parent == id {
        return Err(MutationError::CycleRejected { id, parent });
    }
    check_parent(doc, Some(parent))?;
    if doc.is_ancestor_of(id, parent) {
        return Err(MutationError::CycleRejected { id, parent });
    }
    Ok(())
}

pub(crate) fn check_document(document: &Document) -> Result<(), MutationError> {
    let diagnostics = pb_core::validate_nodes(document.nodes());
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(MutationError::InvalidDocument(diagnostics))
    }
}

/// Slot at which a node detached from `doc` is re-inserted under `parent_id`.
fn insertion_slot(doc: &Document, parent_id: Option<NodeId>) -> usize {
    let Some(parent) = parent_id else {
        return 0;
    };
    match doc.last_child_position(parent) {
        Some(last) => last + 1,
        None => doc.position_of(parent).map_or(doc.len(), |p| p + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb_core::ComponentInstance;
    use pretty_assertions::assert_eq;

    /// (id, parent) pairs in backing order.
    fn shape(doc: &Document) -> Vec<(String, Option<String>)> {
        doc.iter()
            .map(|n| (n.id.to_string(), n.parent_id.map(|p| p.to_string())))
            .collect()
    }

    fn node(id: &str, kind: &str, parent: Option<&str>) -> ComponentInstance {
        NodeSpec::new(kind).into_instance(NodeId::intern(id), parent.map(NodeId::intern))
    }

    /// t_page(container) > [t_hero(card) > [t_title], t_cta], t_side(column), t_note(text)
    fn sample() -> Document {
        Document::from_nodes(vec![
            node("t_page", "container", None),
            node("t_hero", "card", Some("t_page")),
            node("t_title", "heading", Some("t_hero")),
            node("t_cta", "button", Some("t_page")),
            node("t_side", "column", None),
            node("t_note", "text", None),
        ])
        .unwrap()
    }

    fn id(s: &str) -> NodeId {
        NodeId::intern(s)
    }

    fn ids(doc: &Document) -> Vec<&str> {
        doc.iter().map(|n| n.id.as_str()).collect()
    }

    // ─── Add ─────────────────────────────────────────────────────────────

    #[test]
    fn add_appends_with_fresh_id() {
        let mut doc = sample();
        let applied = apply(
            &mut doc,
            Mutation::Add {
                spec: NodeSpec::new("text"),
                parent_id: Some(id("t_side")),
            },
        )
        .unwrap();
        let Applied::Added(new_id) = applied else {
            panic!("expected Added, got {applied:?}");
        };
        assert!(new_id.as_str().starts_with("text_"));
        assert_eq!(doc.nodes().last().unwrap().id, new_id);
        assert_eq!(doc.parent_of(new_id), Some(id("t_side")));
    }

    #[test]
    fn add_under_leaf_or_missing_parent_is_rejected() {
        let mut doc = sample();
        let before = doc.clone();
        for parent in ["t_note", "t_nowhere"] {
            let err = apply(
                &mut doc,
                Mutation::Add {
                    spec: NodeSpec::new("text"),
                    parent_id: Some(id(parent)),
                },
            )
            .unwrap_err();
            assert_eq!(err, MutationError::InvalidParent(id(parent)));
        }
        assert_eq!(doc, before);
    }

    // ─── Update ──────────────────────────────────────────────────────────

    #[test]
    fn update_merges_shallowly() {
        let mut doc = sample();
        let title = id("t_title");
        doc.get_mut(title).unwrap().props.insert("level".into(), "h1".into());

        let mut patch = NodePatch::prop("content", "Welcome");
        patch.style.insert("color".into(), "red".into());
        apply(&mut doc, Mutation::Update { id: title, patch }).unwrap();

        let node = doc.get(title).unwrap();
        assert_eq!(node.props["level"], "h1");
        assert_eq!(node.props["content"], "Welcome");
        assert_eq!(node.style["color"], "red");
    }

    #[test]
    fn update_missing_is_not_found() {
        let mut doc = sample();
        let err = apply(
            &mut doc,
            Mutation::Update {
                id: id("t_ghost"),
                patch: NodePatch::prop("content", "x"),
            },
        )
        .unwrap_err();
        assert_eq!(err, MutationError::NotFound(id("t_ghost")));
    }

    // ─── Remove ──────────────────────────────────────────────────────────

    #[test]
    fn remove_cascades_to_descendants() {
        let mut doc = sample();
        let applied = apply(&mut doc, Mutation::Remove { id: id("t_page") }).unwrap();
        assert_eq!(
            applied,
            Applied::Removed {
                id: id("t_page"),
                count: 4
            }
        );
        assert_eq!(ids(&doc), vec!["t_side", "t_note"]);
    }

    #[test]
    fn remove_missing_is_unchanged() {
        let mut doc = sample();
        let applied = apply(&mut doc, Mutation::Remove { id: id("t_ghost") }).unwrap();
        assert_eq!(applied, Applied::Unchanged);
        assert!(!applied.is_recorded());
        assert_eq!(doc, sample());
    }

    // ─── Move ────────────────────────────────────────────────────────────

    #[test]
    fn move_appends_after_last_child() {
        let mut doc = sample();
        apply(
            &mut doc,
            Mutation::Move {
                id: id("t_note"),
                parent_id: Some(id("t_page")),
                index: 0,
            },
        )
        .unwrap();
        assert_eq!(
            doc.child_ids(id("t_page")),
            vec![id("t_hero"), id("t_cta"), id("t_note")]
        );
        assert_eq!(
            ids(&doc),
            vec!["t_page", "t_hero", "t_title", "t_cta", "t_note", "t_side"]
        );
    }

    #[test]
    fn move_into_childless_parent_lands_right_after_it() {
        let mut doc = sample();
        apply(
            &mut doc,
            Mutation::Move {
                id: id("t_cta"),
                parent_id: Some(id("t_side")),
                index: 3,
            },
        )
        .unwrap();
        assert_eq!(
            shape(&doc)[3..5],
            [
                ("t_side".to_string(), None),
                ("t_cta".to_string(), Some("t_side".to_string())),
            ]
        );
    }

    #[test]
    fn move_to_root_goes_to_front() {
        let mut doc = sample();
        apply(
            &mut doc,
            Mutation::Move {
                id: id("t_title"),
                parent_id: None,
                index: 5,
            },
        )
        .unwrap();
        assert_eq!(doc.nodes()[0].id, id("t_title"));
        assert_eq!(doc.parent_of(id("t_title")), None);
        assert_eq!(doc.child_ids(id("t_hero")), Vec::<NodeId>::new());
    }

    #[test]
    fn move_keeps_subtree_attached() {
        let mut doc = sample();
        apply(
            &mut doc,
            Mutation::Move {
                id: id("t_hero"),
                parent_id: Some(id("t_side")),
                index: 0,
            },
        )
        .unwrap();
        assert_eq!(doc.parent_of(id("t_title")), Some(id("t_hero")));
        assert_eq!(doc.depth(id("t_title")), Some(2));
    }

    #[test]
    fn move_rejects_cycles() {
        let mut doc = sample();
        let before = doc.clone();

        let err = apply(
            &mut doc,
            Mutation::Move {
                id: id("t_page"),
                parent_id: Some(id("t_page")),
                index: 0,
            },
        )
        .unwrap_err();
        assert!(matches!(err, MutationError::CycleRejected { .. }));

        let err = apply(
            &mut doc,
            Mutation::Move {
                id: id("t_page"),
                parent_id: Some(id("t_hero")),
                index: 0,
            },
        )
        .unwrap_err();
        assert_eq!(
            err,
            MutationError::CycleRejected {
                id: id("t_page"),
                parent: id("t_hero")
            }
        );
        assert_eq!(doc, before);
    }

    #[test]
    fn move_checks_run_in_order() {
        let mut doc = sample();
        let err = check_move(&doc, id("t_ghost"), Some(id("t_ghost"))).unwrap_err();
        assert_eq!(err, MutationError::NotFound(id("t_ghost")));

        let err = apply(
            &mut doc,
            Mutation::Move {
                id: id("t_cta"),
                parent_id: Some(id("t_note")),
                index: 0,
            },
        )
        .unwrap_err();
        assert_eq!(err, MutationError::InvalidParent(id("t_note")));
    }

    #[test]
    fn move_to_current_parent_is_accepted() {
        let mut doc = sample();
        let applied = apply(
            &mut doc,
            Mutation::Move {
                id: id("t_cta"),
                parent_id: Some(id("t_page")),
                index: 0,
            },
        )
        .unwrap();
        assert_eq!(applied, Applied::Moved(id("t_cta")));
        assert!(applied.is_recorded());
        assert_eq!(doc.child_ids(id("t_page")), vec![id("t_hero"), id("t_cta")]);
        assert_eq!(doc.len(), 6);
    }

    // ─── Clear / Load ────────────────────────────────────────────────────

    #[test]
    fn clear_empties_document() {
        let mut doc = sample();
        assert_eq!(
            apply(&mut doc, Mutation::Clear).unwrap(),
            Applied::Cleared { count: 6 }
        );
        assert!(doc.is_empty());
    }

    #[test]
    fn load_rejects_invalid_document_wholesale() {
        let mut doc = sample();
        let mut bad = Document::new();
        bad.push(node("t_a", "text", None));
        bad.push(node("t_b", "text", Some("t_a")));

        let err = apply(&mut doc, Mutation::Load { document: bad }).unwrap_err();
        let MutationError::InvalidDocument(diags) = &err else {
            panic!("expected InvalidDocument, got {err:?}");
        };
        assert_eq!(diags[0].rule, "non-container-parent");
        assert!(err.to_string().starts_with("document rejected: [non-container-parent]"));
        assert_eq!(doc, sample());

        let good = Document::from_nodes(vec![node("t_only", "row", None)]).unwrap();
        let applied = apply(&mut doc, Mutation::Load { document: good.clone() }).unwrap();
        assert_eq!(applied, Applied::Loaded { count: 1 });
        assert_eq!(doc, good);
    }

    // ─── Serde ───────────────────────────────────────────────────────────

    #[test]
    fn mutations_read_from_json() {
        let text = r#"[
            {"op": "add", "spec": {"type": "button", "props": {"content": "Go"}}, "parentId": "t_page"},
            {"op": "move", "id": "t_note", "parentId": "t_side"},
            {"op": "update", "id": "t_cta", "patch": {"style": {"color": "blue"}}},
            {"op": "remove", "id": "t_hero"},
            {"op": "clear"}
        ]"#;
        let ops: Vec<Mutation> = serde_json::from_str(text).unwrap();
        assert_eq!(ops.len(), 5);
        assert_eq!(
            ops[1],
            Mutation::Move {
                id: id("t_note"),
                parent_id: Some(id("t_side")),
                index: 0
            }
        );
        assert_eq!(ops[4], Mutation::Clear);
        assert_eq!(ops[0].describe(), "add button");
    }
}
