//! Node store: the live document plus the current selection.
//!
//! Outside this crate the store is read-only. Every document change goes
//! through the tree mutator (see [`crate::tree`]) driven by the
//! [`crate::Editor`], which is also where history is recorded.

use pb_core::{Document, NodeId};

#[derive(Debug, Clone, Default)]
pub struct NodeStore {
    document: Document,
    selected: Option<NodeId>,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session from an already validated document.
    pub fn with_document(document: Document) -> Self {
        Self {
            document,
            selected: None,
        }
    }

    /// Read-only view of the live document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The selected id. It may name a node that no longer exists; consumers
    /// treat that the same as no selection.
    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// The selected node, if it still exists.
    pub fn selected_node(&self) -> Option<&pb_core::ComponentInstance> {
        self.selected.and_then(|id| self.document.get(id))
    }

    /// Set or clear the selection. Not a document mutation: never recorded.
    pub fn select(&mut self, id: Option<NodeId>) {
        self.selected = id;
    }

    pub(crate) fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }
}
