//! Editing session facade.
//!
//! The `Editor` owns the node store, the history and the view state, and is
//! the single entry point for changing the document. Every mutation takes
//! the same path:
//!
//! 1. snapshot the live document
//! 2. run the tree mutator
//! 3. on success, record the snapshot and apply selection side effects
//!
//! A rejected mutation leaves the document, the selection and the history
//! untouched.

use crate::history::History;
use crate::placement::{self, DragSource, DropTarget, Placement};
use crate::shortcuts::ShortcutAction;
use crate::store::NodeStore;
use crate::tree::{self, Applied, Mutation, MutationError};
use crate::view::{EditorConfig, ViewSettings};
use pb_core::css::{CssParseError, to_style_map};
use pb_core::{Document, ImportError, NodeId, NodePatch, NodeSpec};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Mutation(#[from] MutationError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Style(#[from] CssParseError),

    #[error("unknown component type `{0}`")]
    UnknownComponent(String),

    #[error("drop rejected")]
    DropRejected,

    #[error("canvas is in preview mode")]
    PreviewMode,
}

#[derive(Debug, Clone, Default)]
pub struct Editor {
    store: NodeStore,
    history: History,
    view: ViewSettings,
    config: EditorConfig,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self::open(Document::new(), config)
    }

    /// Open a session on an existing document. The initial document is the
    /// bottom of the undo stack. Documents assembled through raw edits are
    /// checked with the import rules and rejected when invalid.
    pub fn with_document(
        document: Document,
        config: EditorConfig,
    ) -> Result<Self, MutationError> {
        tree::check_document(&document)
            .inspect_err(|err| log::warn!("session document rejected: {err}"))?;
        Ok(Self::open(document, config))
    }

    fn open(document: Document, config: EditorConfig) -> Self {
        Self {
            store: NodeStore::with_document(document),
            history: History::new(config.history_limit),
            view: ViewSettings::default(),
            config,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    pub fn document(&self) -> &Document {
        self.store.document()
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.store.selected()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn view(&self) -> &ViewSettings {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewSettings {
        &mut self.view
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Run one mutation through the tree mutator and record it.
    pub fn apply(&mut self, mutation: Mutation) -> Result<Applied, MutationError> {
        let description = mutation.describe();
        let before = self.store.document().clone();
        let applied = tree::apply(self.store.document_mut(), mutation)
            .inspect_err(|err| log::warn!("{description} rejected: {err}"))?;
        self.commit(before, &description, applied);
        Ok(applied)
    }

    /// Add a node; returns its fresh id.
    pub fn add(
        &mut self,
        spec: NodeSpec,
        parent_id: Option<NodeId>,
    ) -> Result<NodeId, MutationError> {
        let description = format!("add {}", spec.kind);
        let before = self.store.document().clone();
        let id = tree::add(self.store.document_mut(), spec, parent_id)
            .inspect_err(|err| log::warn!("{description} rejected: {err}"))?;
        self.commit(before, &description, Applied::Added(id));
        Ok(id)
    }

    /// Record an accepted mutation and apply its selection side effects.
    fn commit(&mut self, before: Document, description: &str, applied: Applied) {
        if !applied.is_recorded() {
            log::debug!("{description}: nothing to do");
            return;
        }
        self.history.record(before, description);

        match applied {
            Applied::Removed { id, .. } if self.store.selected() == Some(id) => {
                self.store.select(None);
            }
            Applied::Cleared { .. } => self.store.select(None),
            _ => {}
        }
        log::debug!("{description}: {applied:?}");
    }

    /// Add a library component with its default props.
    pub fn add_from_library(
        &mut self,
        kind: &str,
        parent_id: Option<NodeId>,
    ) -> Result<NodeId, EditorError> {
        let spec = pb_core::library::instantiate(kind)
            .ok_or_else(|| EditorError::UnknownComponent(kind.to_string()))?;
        Ok(self.add(spec, parent_id)?)
    }

    pub fn update(&mut self, id: NodeId, patch: NodePatch) -> Result<(), MutationError> {
        self.apply(Mutation::Update { id, patch }).map(drop)
    }

    /// Merge CSS declaration text (`"font-size: 14px; color: red"`) into a
    /// node's style.
    pub fn apply_inline_style(&mut self, id: NodeId, css: &str) -> Result<(), EditorError> {
        let patch = NodePatch {
            style: to_style_map(css)?,
            ..NodePatch::default()
        };
        Ok(self.update(id, patch)?)
    }

    /// Remove a node and its subtree. A missing id is a no-op.
    pub fn remove(&mut self, id: NodeId) -> Applied {
        // Remove never fails; a missing id comes back as `Unchanged`.
        self.apply(Mutation::Remove { id }).unwrap_or(Applied::Unchanged)
    }

    pub fn move_node(
        &mut self,
        id: NodeId,
        parent_id: Option<NodeId>,
        index: usize,
    ) -> Result<(), MutationError> {
        self.apply(Mutation::Move {
            id,
            parent_id,
            index,
        })
        .map(drop)
    }

    pub fn clear(&mut self) -> Applied {
        self.apply(Mutation::Clear).unwrap_or(Applied::Unchanged)
    }

    /// Replace the document wholesale (template apply, import).
    pub fn load(&mut self, document: Document) -> Result<Applied, MutationError> {
        self.apply(Mutation::Load { document })
    }

    /// Parse, validate and load a JSON document. Nothing changes on failure.
    pub fn import_json(&mut self, text: &str) -> Result<Applied, EditorError> {
        let document = Document::from_json(text)?;
        Ok(self.load(document)?)
    }

    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        self.document().to_json()
    }

    // ─── History ─────────────────────────────────────────────────────────

    /// Undo the last recorded mutation (or batch). Returns its description.
    pub fn undo(&mut self) -> Option<String> {
        self.history.undo(self.store.document_mut())
    }

    /// Redo the last undone mutation (or batch). Returns its description.
    pub fn redo(&mut self) -> Option<String> {
        self.history.redo(self.store.document_mut())
    }

    /// Group the following mutations into one undo step.
    pub fn begin_batch(&mut self) {
        self.history.begin_batch(self.store.document());
    }

    /// Close a batch. Returns whether a history entry was pushed.
    pub fn end_batch(&mut self, description: &str) -> bool {
        self.history.end_batch(description)
    }

    // ─── Interaction ─────────────────────────────────────────────────────

    /// Select a node (or clear with `None`). Ignored in preview mode.
    /// Returns whether the selection was applied.
    pub fn select(&mut self, id: Option<NodeId>) -> bool {
        if self.view.is_preview() {
            return false;
        }
        self.store.select(id);
        true
    }

    /// Apply a drag-and-drop gesture.
    pub fn drop_on(
        &mut self,
        source: DragSource,
        target: DropTarget,
    ) -> Result<Applied, EditorError> {
        if self.view.is_preview() {
            return Err(EditorError::PreviewMode);
        }
        match placement::resolve(source, target) {
            Placement::Apply(mutation) => Ok(self.apply(mutation)?),
            Placement::Rejected => {
                log::debug!("drop onto {target:?} rejected");
                Err(EditorError::DropRejected)
            }
        }
    }

    /// Whether dropping `source` onto `target` would be accepted, for hover
    /// feedback. Never mutates.
    pub fn can_drop(&self, source: &DragSource, target: DropTarget) -> bool {
        if self.view.is_preview() {
            return false;
        }
        match placement::resolve(source.clone(), target) {
            Placement::Apply(mutation) => tree::check(self.document(), &mutation).is_ok(),
            Placement::Rejected => false,
        }
    }

    /// Execute a keyboard shortcut. Returns whether anything happened.
    ///
    /// Editing actions are ignored in preview mode; view actions always run.
    pub fn run_shortcut(&mut self, action: ShortcutAction) -> bool {
        match action {
            ShortcutAction::ZoomIn => {
                self.view.zoom_in(&self.config);
                true
            }
            ShortcutAction::ZoomOut => {
                self.view.zoom_out(&self.config);
                true
            }
            ShortcutAction::ZoomReset => {
                self.view.reset_zoom();
                true
            }
            ShortcutAction::ToggleGrid => {
                self.view.toggle_grid();
                true
            }
            ShortcutAction::TogglePreview => {
                self.view.toggle_preview();
                true
            }
            _ if self.view.is_preview() => false,
            ShortcutAction::Undo => self.undo().is_some(),
            ShortcutAction::Redo => self.redo().is_some(),
            ShortcutAction::Delete => match self.store.selected() {
                Some(id) => self.remove(id).is_recorded(),
                None => false,
            },
            ShortcutAction::ClearCanvas => self.clear().is_recorded(),
            ShortcutAction::Deselect => {
                let had = self.store.selected().is_some();
                self.store.select(None);
                had
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortcuts::ShortcutMap;
    use crate::view::ViewMode;

    fn editor() -> Editor {
        Editor::new(EditorConfig::default())
    }

    #[test]
    fn failed_mutation_leaves_history_untouched() {
        let mut ed = editor();
        let text = ed.add_from_library("text", None).unwrap();
        assert_eq!(ed.history().past_len(), 1);

        let err = ed.add(NodeSpec::new("button"), Some(text)).unwrap_err();
        assert_eq!(err, MutationError::InvalidParent(text));
        assert_eq!(ed.history().past_len(), 1);
        assert_eq!(ed.document().len(), 1);
    }

    #[test]
    fn remove_clears_exact_selection_only() {
        let mut ed = editor();
        let card = ed.add_from_library("card", None).unwrap();
        let inner = ed.add_from_library("text", Some(card)).unwrap();
        let other = ed.add_from_library("text", None).unwrap();

        ed.select(Some(inner));
        ed.remove(card);
        // Descendant removed, but it was not the removed id itself.
        assert_eq!(ed.selected(), Some(inner));
        assert!(ed.store().selected_node().is_none());

        ed.select(Some(other));
        ed.remove(other);
        assert_eq!(ed.selected(), None);
    }

    #[test]
    fn remove_missing_records_nothing() {
        let mut ed = editor();
        ed.add_from_library("text", None).unwrap();
        let applied = ed.remove(NodeId::intern("e_missing"));
        assert_eq!(applied, Applied::Unchanged);
        assert_eq!(ed.history().past_len(), 1);
    }

    #[test]
    fn clear_resets_selection() {
        let mut ed = editor();
        let id = ed.add_from_library("button", None).unwrap();
        ed.select(Some(id));
        assert_eq!(ed.clear(), Applied::Cleared { count: 1 });
        assert_eq!(ed.selected(), None);
        assert!(ed.document().is_empty());
    }

    #[test]
    fn undo_does_not_touch_selection() {
        let mut ed = editor();
        let id = ed.add_from_library("button", None).unwrap();
        ed.select(Some(id));
        ed.undo();
        assert_eq!(ed.selected(), Some(id));
        assert!(ed.document().is_empty());
    }

    #[test]
    fn inline_style_merges_into_style_map() {
        let mut ed = editor();
        let id = ed.add_from_library("text", None).unwrap();
        ed.apply_inline_style(id, "font-size: 14px; color: #333").unwrap();
        let node = ed.document().get(id).unwrap();
        assert_eq!(node.style["fontSize"], "14px");
        assert_eq!(node.style["color"], "#333");

        let err = ed.apply_inline_style(id, "color").unwrap_err();
        assert!(matches!(err, EditorError::Style(_)));
        assert_eq!(ed.history().past_len(), 2);
    }

    #[test]
    fn unknown_library_kind() {
        let mut ed = editor();
        let err = ed.add_from_library("hologram", None).unwrap_err();
        assert_eq!(err.to_string(), "unknown component type `hologram`");
        assert!(!ed.can_undo());
    }

    #[test]
    fn session_rejects_cyclic_document() {
        let (pa, pb) = (NodeId::intern("e_pa"), NodeId::intern("e_pb"));
        let mut doc = Document::new();
        doc.push(NodeSpec::new("card").into_instance(pa, Some(pb)));
        doc.push(NodeSpec::new("card").into_instance(pb, Some(pa)));

        let err = Editor::with_document(doc, EditorConfig::default()).unwrap_err();
        let MutationError::InvalidDocument(diags) = &err else {
            panic!("expected InvalidDocument, got {err:?}");
        };
        assert!(diags.iter().any(|d| d.rule == "parent-cycle"));

        let leaf = NodeId::intern("e_leaf");
        let mut doc = Document::new();
        doc.push(NodeSpec::new("text").into_instance(leaf, None));
        doc.push(NodeSpec::new("text").into_instance(NodeId::intern("e_kid"), Some(leaf)));
        assert!(Editor::with_document(doc, EditorConfig::default()).is_err());
    }

    #[test]
    fn zoom_shortcuts_survive_inverted_bounds() {
        let config = EditorConfig {
            zoom_min: 3.0,
            zoom_max: 2.0,
            ..EditorConfig::default()
        };
        let mut ed = Editor::new(config);
        assert!(ed.run_shortcut(ShortcutAction::ZoomIn));
        assert!(ed.run_shortcut(ShortcutAction::ZoomOut));
        assert_eq!(ed.view().zoom(), 2.0);
    }

    #[test]
    fn import_rejects_without_side_effects() {
        let mut ed = editor();
        ed.add_from_library("row", None).unwrap();
        let before = ed.document().clone();

        let err = ed.import_json(r#"[{"id": "e_x", "type": "text", "parentId": "e_x"}]"#);
        assert!(matches!(err, Err(EditorError::Import(_))));
        assert_eq!(ed.document(), &before);
        assert_eq!(ed.history().past_len(), 1);

        let applied = ed.import_json(r#"[{"id": "e_y", "type": "text"}]"#).unwrap();
        assert_eq!(applied, Applied::Loaded { count: 1 });
        ed.undo();
        assert_eq!(ed.document(), &before);
    }

    #[test]
    fn batch_groups_drag_steps() {
        let mut ed = editor();
        let row = ed.add_from_library("row", None).unwrap();
        let col = ed.add_from_library("column", None).unwrap();
        let btn = ed.add_from_library("button", Some(row)).unwrap();
        let after_setup = ed.document().clone();

        ed.begin_batch();
        ed.move_node(btn, Some(col), 0).unwrap();
        ed.move_node(btn, None, 0).unwrap();
        assert!(ed.end_batch("drag button"));

        assert_eq!(ed.undo().as_deref(), Some("drag button"));
        assert_eq!(ed.document(), &after_setup);
    }

    #[test]
    fn preview_suppresses_interaction() {
        let mut ed = editor();
        let card = ed.add_from_library("card", None).unwrap();
        ed.run_shortcut(ShortcutAction::TogglePreview);
        assert_eq!(ed.view().mode, ViewMode::Preview);

        assert!(!ed.select(Some(card)));
        assert_eq!(ed.selected(), None);
        let source = DragSource::library("text").unwrap();
        assert!(!ed.can_drop(&source, DropTarget::Container(card)));
        assert!(matches!(
            ed.drop_on(source, DropTarget::Container(card)),
            Err(EditorError::PreviewMode)
        ));
        assert!(!ed.run_shortcut(ShortcutAction::Undo));
        assert_eq!(ed.document().len(), 1);
    }

    #[test]
    fn drop_paths() {
        let mut ed = editor();
        let card = ed.add_from_library("card", None).unwrap();
        let source = DragSource::library("text").unwrap();
        assert!(ed.can_drop(&source, DropTarget::Container(card)));

        let Applied::Added(text) = ed.drop_on(source, DropTarget::Container(card)).unwrap() else {
            panic!("expected Added");
        };
        assert_eq!(ed.document().parent_of(text), Some(card));

        assert!(!ed.can_drop(&DragSource::Existing(card), DropTarget::Container(text)));
        assert!(matches!(
            ed.drop_on(DragSource::Existing(card), DropTarget::Container(card)),
            Err(EditorError::DropRejected)
        ));
        assert!(matches!(
            ed.drop_on(DragSource::Existing(card), DropTarget::Container(text)),
            Err(EditorError::Mutation(MutationError::InvalidParent(_)))
        ));
    }

    #[test]
    fn keyboard_delete_removes_selection() {
        let mut ed = editor();
        let id = ed.add_from_library("image", None).unwrap();
        ed.select(Some(id));

        let action = ShortcutMap::resolve("Delete", false, false, false, false).unwrap();
        assert!(ed.run_shortcut(action));
        assert!(ed.document().is_empty());
        assert_eq!(ed.selected(), None);

        assert!(!ed.run_shortcut(ShortcutAction::Delete));
        assert!(ed.run_shortcut(ShortcutAction::Undo));
        assert_eq!(ed.document().len(), 1);
    }

    #[test]
    fn zoom_shortcuts_respect_config() {
        let config = EditorConfig {
            zoom_max: 1.2,
            ..EditorConfig::default()
        };
        let mut ed = Editor::new(config);
        for _ in 0..5 {
            ed.run_shortcut(ShortcutAction::ZoomIn);
        }
        assert_eq!(ed.view().zoom(), 1.2);
        ed.run_shortcut(ShortcutAction::ZoomReset);
        assert_eq!(ed.view().zoom(), 1.0);
    }

    #[test]
    fn history_limit_from_config() {
        let mut ed = Editor::new(EditorConfig {
            history_limit: Some(2),
            ..EditorConfig::default()
        });
        for _ in 0..4 {
            ed.add_from_library("text", None).unwrap();
        }
        assert_eq!(ed.history().past_len(), 2);
        while ed.undo().is_some() {}
        assert_eq!(ed.document().len(), 2);
    }
}
