//! Core document model for page-builder canvases.
//!
//! A document is a flat, ordered arena of `ComponentInstance` values. The
//! tree is encoded by back-references only: each node names its parent via
//! `parent_id`, and children are found by filtering. Sibling order is the
//! relative order of the nodes in the backing sequence. There are no child
//! lists to keep in sync, so reparenting only ever touches one node.

use crate::id::NodeId;
use crate::library;
use crate::validate::{ImportError, validate_nodes};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Open key → value mapping for per-type component properties.
pub type PropMap = Map<String, Value>;

/// Open key → value mapping of CSS-like style properties (camelCase keys).
pub type StyleMap = Map<String, Value>;

// ─── Geometry overrides ──────────────────────────────────────────────────

/// Absolute-layout position override.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A size along one axis: raw pixels or any CSS length (`"100%"`, `"auto"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    Px(f64),
    Css(String),
}

/// Absolute-layout size override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: Dimension,
    pub height: Dimension,
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// One placed element of the design tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInstance {
    /// Stable id, assigned once at creation.
    pub id: NodeId,

    /// Component type tag (`"container"`, `"text"`, ...). Immutable.
    #[serde(rename = "type")]
    pub kind: String,

    /// Parent container, or `None` for a root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<NodeId>,

    #[serde(default)]
    pub props: PropMap,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub style: StyleMap,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
}

impl ComponentInstance {
    /// Whether this node's type may own children.
    pub fn allows_children(&self) -> bool {
        library::allows_children(&self.kind)
    }

    /// Shallow-merge a patch into this node.
    ///
    /// Each top-level key of `props`/`style` in the patch overwrites the
    /// existing value wholesale; nested arrays and objects are not merged.
    pub fn apply_patch(&mut self, patch: NodePatch) {
        for (key, value) in patch.props {
            self.props.insert(key, value);
        }
        for (key, value) in patch.style {
            self.style.insert(key, value);
        }
        if patch.position.is_some() {
            self.position = patch.position;
        }
        if patch.size.is_some() {
            self.size = patch.size;
        }
    }

    /// String-valued prop lookup.
    pub fn prop_str(&self, key: &str) -> Option<&str> {
        self.props.get(key).and_then(Value::as_str)
    }
}

/// A node that has not been placed yet: everything but the id and parent.
///
/// Produced by the component library and consumed by the Add operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub props: PropMap,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub style: StyleMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
}

impl NodeSpec {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            props: PropMap::new(),
            style: StyleMap::new(),
            position: None,
            size: None,
        }
    }

    /// Builder-style prop setter.
    #[must_use]
    pub fn with_prop(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.props.insert(key.to_string(), value.into());
        self
    }

    /// Builder-style style setter.
    #[must_use]
    pub fn with_style(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.style.insert(key.to_string(), value.into());
        self
    }

    /// Materialize into a placed instance.
    pub fn into_instance(self, id: NodeId, parent_id: Option<NodeId>) -> ComponentInstance {
        ComponentInstance {
            id,
            kind: self.kind,
            parent_id,
            props: self.props,
            style: self.style,
            position: self.position,
            size: self.size,
        }
    }
}

/// Partial update for an existing node (see [`ComponentInstance::apply_patch`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePatch {
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub props: PropMap,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub style: StyleMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
}

impl NodePatch {
    /// Patch a single prop.
    pub fn prop(key: &str, value: impl Into<Value>) -> Self {
        let mut patch = Self::default();
        patch.props.insert(key.to_string(), value.into());
        patch
    }

    /// Patch a single style property.
    pub fn style(key: &str, value: impl Into<Value>) -> Self {
        let mut patch = Self::default();
        patch.style.insert(key.to_string(), value.into());
        patch
    }
}

// ─── Document ────────────────────────────────────────────────────────────

/// The complete node collection of one editing session.
///
/// The raw structural edits (`push`, `insert`, `remove_at`, `retain`,
/// `clear`, `get_mut`) perform no tree checks; invariants (acyclic parent
/// graph, container-only parents) are enforced by the editor's tree mutator
/// and by [`Document::from_nodes`] on import.
#[derive(Clone, Default)]
pub struct Document {
    nodes: Vec<ComponentInstance>,

    /// NodeId → slot in `nodes`. Rebuilt after every structural edit.
    id_index: HashMap<NodeId, usize>,
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from an ordered node list, rejecting it wholesale if
    /// any import rule fails.
    pub fn from_nodes(nodes: Vec<ComponentInstance>) -> Result<Self, ImportError> {
        let diagnostics = validate_nodes(&nodes);
        if !diagnostics.is_empty() {
            log::warn!("rejected document: {} diagnostic(s)", diagnostics.len());
            return Err(ImportError::Invalid(diagnostics));
        }
        let mut doc = Self {
            nodes,
            id_index: HashMap::new(),
        };
        doc.rebuild_index();
        Ok(doc)
    }

    /// Parse and validate a JSON array of component instances.
    pub fn from_json(text: &str) -> Result<Self, ImportError> {
        let nodes: Vec<ComponentInstance> = serde_json::from_str(text)?;
        Self::from_nodes(nodes)
    }

    /// Pretty-printed JSON array, the interchange format of the editor.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Compact MessagePack encoding for session persistence.
    pub fn to_msgpack(&self) -> Result<Vec<u8>, rmp_serde::encode::Error> {
        rmp_serde::to_vec_named(&self.nodes)
    }

    /// Decode and validate a MessagePack payload produced by [`Self::to_msgpack`].
    pub fn from_msgpack(bytes: &[u8]) -> Result<Self, ImportError> {
        let nodes: Vec<ComponentInstance> = rmp_serde::from_slice(bytes)?;
        Self::from_nodes(nodes)
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in backing order.
    pub fn nodes(&self) -> &[ComponentInstance] {
        &self.nodes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ComponentInstance> {
        self.nodes.iter()
    }

    pub fn get(&self, id: NodeId) -> Option<&ComponentInstance> {
        self.id_index.get(&id).map(|&slot| &self.nodes[slot])
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.id_index.contains_key(&id)
    }

    /// Slot of `id` in the backing sequence.
    pub fn position_of(&self, id: NodeId) -> Option<usize> {
        self.id_index.get(&id).copied()
    }

    /// Root nodes in sibling order.
    pub fn roots(&self) -> impl Iterator<Item = &ComponentInstance> {
        self.nodes.iter().filter(|n| n.parent_id.is_none())
    }

    /// Direct children of `parent` in sibling order.
    pub fn children(&self, parent: NodeId) -> impl Iterator<Item = &ComponentInstance> {
        self.nodes
            .iter()
            .filter(move |n| n.parent_id == Some(parent))
    }

    /// Ids of the direct children of `parent`, in sibling order.
    pub fn child_ids(&self, parent: NodeId) -> Vec<NodeId> {
        self.children(parent).map(|n| n.id).collect()
    }

    /// Slot of the last direct child of `parent`, if it has any.
    pub fn last_child_position(&self, parent: NodeId) -> Option<usize> {
        self.nodes
            .iter()
            .rposition(|n| n.parent_id == Some(parent))
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent_id)
    }

    /// Whether `id` exists and its type may own children.
    pub fn is_container(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(ComponentInstance::allows_children)
    }

    /// Check if `ancestor` is a parent/grandparent/etc. of `descendant`.
    /// A node is never its own ancestor.
    pub fn is_ancestor_of(&self, ancestor: NodeId, descendant: NodeId) -> bool {
        if ancestor == descendant {
            return false;
        }
        let mut current = descendant;
        // Bounded walk: a well-formed chain is never longer than the document.
        for _ in 0..self.nodes.len() {
            match self.parent_of(current) {
                Some(parent) if parent == ancestor => return true,
                Some(parent) => current = parent,
                None => return false,
            }
        }
        false
    }

    /// Every node whose parent chain reaches `id` (excluding `id`), in
    /// backing order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut by_parent: HashMap<NodeId, SmallVec<[NodeId; 4]>> = HashMap::new();
        for node in &self.nodes {
            if let Some(parent) = node.parent_id {
                by_parent.entry(parent).or_default().push(node.id);
            }
        }

        let mut found: HashSet<NodeId> = HashSet::new();
        let mut stack: SmallVec<[NodeId; 16]> = SmallVec::new();
        stack.push(id);
        while let Some(current) = stack.pop() {
            if let Some(kids) = by_parent.get(&current) {
                for &kid in kids {
                    if kid != id && found.insert(kid) {
                        stack.push(kid);
                    }
                }
            }
        }

        self.nodes
            .iter()
            .filter(|n| found.contains(&n.id))
            .map(|n| n.id)
            .collect()
    }

    /// `id` followed by its descendants. Empty if `id` does not exist.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        if !self.contains(id) {
            return Vec::new();
        }
        let mut out = vec![id];
        out.extend(self.descendants(id));
        out
    }

    /// Number of ancestors above `id` (roots are depth 0).
    pub fn depth(&self, id: NodeId) -> Option<usize> {
        self.get(id)?;
        let mut depth = 0;
        let mut current = id;
        while let Some(parent) = self.parent_of(current) {
            depth += 1;
            current = parent;
            if depth > self.nodes.len() {
                break;
            }
        }
        Some(depth)
    }

    /// A generated id for `component_type` that no node in this document uses.
    pub fn fresh_id(&self, component_type: &str) -> NodeId {
        loop {
            let id = NodeId::generate(component_type);
            if !self.contains(id) {
                return id;
            }
        }
    }

    // ─── Raw structural edits ────────────────────────────────────────────

    /// Mutable access to one node's fields. Callers must not change `id`.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut ComponentInstance> {
        self.id_index
            .get(&id)
            .copied()
            .map(|slot| &mut self.nodes[slot])
    }

    /// Append a node at the end of the backing sequence.
    pub fn push(&mut self, node: ComponentInstance) {
        self.id_index.insert(node.id, self.nodes.len());
        self.nodes.push(node);
    }

    /// Insert a node at `slot` (clamped to the sequence length).
    pub fn insert(&mut self, slot: usize, node: ComponentInstance) {
        let slot = slot.min(self.nodes.len());
        self.nodes.insert(slot, node);
        self.rebuild_index();
    }

    /// Remove and return the node at `slot`.
    pub fn remove_at(&mut self, slot: usize) -> Option<ComponentInstance> {
        if slot >= self.nodes.len() {
            return None;
        }
        let node = self.nodes.remove(slot);
        self.rebuild_index();
        Some(node)
    }

    /// Keep only the nodes matching `keep`, preserving order.
    pub fn retain(&mut self, keep: impl FnMut(&ComponentInstance) -> bool) {
        self.nodes.retain(keep);
        self.rebuild_index();
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.id_index.clear();
    }

    fn rebuild_index(&mut self) {
        self.id_index.clear();
        for (slot, node) in self.nodes.iter().enumerate() {
            self.id_index.insert(node.id, slot);
        }
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.nodes).finish()
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.nodes)
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let nodes = Vec::<ComponentInstance>::deserialize(deserializer)?;
        Document::from_nodes(nodes).map_err(D::Error::custom)
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a ComponentInstance;
    type IntoIter = std::slice::Iter<'a, ComponentInstance>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}
