//! Placement resolver: drag-and-drop gesture → tree mutation.
//!
//! | source          | target          | result                  |
//! |-----------------|-----------------|-------------------------|
//! | library item    | root            | `Add(spec, None)`       |
//! | library item    | container `X`   | `Add(spec, Some(X))`    |
//! | existing `A`    | root            | `Move(A, None, 0)`      |
//! | existing `A`    | container `X≠A` | `Move(A, Some(X), 0)`   |
//! | existing `A`    | container `A`   | rejected                |
//!
//! Pure: the resolver never looks at the document. Whether the resulting
//! mutation is legal (container-ness, cycles) is decided by the tree
//! mutator when it is applied.

use crate::tree::Mutation;
use pb_core::{NodeId, NodeSpec};

/// What is being dragged.
#[derive(Debug, Clone, PartialEq)]
pub enum DragSource {
    /// A new instance from the component library.
    Library(NodeSpec),
    /// A node already placed on the canvas.
    Existing(NodeId),
}

impl DragSource {
    /// Drag a fresh instance of a library component.
    pub fn library(kind: &str) -> Option<Self> {
        pb_core::library::instantiate(kind).map(DragSource::Library)
    }
}

/// Where it was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// The canvas background.
    Root,
    /// Inside a container node.
    Container(NodeId),
}

impl DropTarget {
    fn parent_id(self) -> Option<NodeId> {
        match self {
            DropTarget::Root => None,
            DropTarget::Container(id) => Some(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    Apply(Mutation),
    /// The gesture maps to nothing (a node dropped onto itself).
    Rejected,
}

/// Resolve a drop into the mutation it stands for.
pub fn resolve(source: DragSource, target: DropTarget) -> Placement {
    match source {
        DragSource::Library(spec) => Placement::Apply(Mutation::Add {
            spec,
            parent_id: target.parent_id(),
        }),
        DragSource::Existing(id) if target == DropTarget::Container(id) => Placement::Rejected,
        DragSource::Existing(id) => Placement::Apply(Mutation::Move {
            id,
            parent_id: target.parent_id(),
            index: 0,
        }),
    }
}
