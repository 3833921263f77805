//! Integration tests: drag-and-drop gestures through the editor.

use pb_core::{Document, NodeId};
use pb_editor::{Applied, DragSource, DropTarget, Editor, EditorConfig, EditorError};
use pretty_assertions::assert_eq;

fn starter() -> Editor {
    let doc = Document::from_json(include_str!("fixtures/starter.json")).unwrap();
    Editor::with_document(doc, EditorConfig::default()).unwrap()
}

fn id(s: &str) -> NodeId {
    NodeId::intern(s)
}

#[test]
fn library_item_dropped_into_container_is_appended() {
    let mut ed = starter();
    let source = DragSource::library("checkbox").unwrap();
    let applied = ed.drop_on(source, DropTarget::Container(id("body"))).unwrap();
    let Applied::Added(new_id) = applied else {
        panic!("expected Added, got {applied:?}");
    };

    assert_eq!(ed.document().child_ids(id("body")), vec![id("intro"), new_id]);
    let node = ed.document().get(new_id).unwrap();
    assert_eq!(node.props["label"], "Checkbox");
}

#[test]
fn existing_node_dropped_into_container_moves_to_end() {
    let mut ed = starter();
    ed.drop_on(DragSource::Existing(id("logo")), DropTarget::Container(id("body")))
        .unwrap();

    assert_eq!(ed.document().child_ids(id("header")), vec![id("signup")]);
    assert_eq!(
        ed.document().child_ids(id("body")),
        vec![id("intro"), id("logo")]
    );
}

#[test]
fn existing_node_dropped_on_canvas_becomes_first_root() {
    let mut ed = starter();
    ed.drop_on(DragSource::Existing(id("intro")), DropTarget::Root)
        .unwrap();
    let roots: Vec<_> = ed.document().roots().map(|n| n.id).collect();
    assert_eq!(roots, vec![id("intro"), id("page"), id("sidebar")]);
}

#[test]
fn dropping_container_into_its_own_subtree_is_rejected() {
    let mut ed = starter();
    let before = ed.document().clone();

    let err = ed
        .drop_on(DragSource::Existing(id("page")), DropTarget::Container(id("header")))
        .unwrap_err();
    assert!(matches!(err, EditorError::Mutation(_)));
    assert!(err.to_string().contains("cycle"));

    let err = ed
        .drop_on(DragSource::Existing(id("page")), DropTarget::Container(id("page")))
        .unwrap_err();
    assert!(matches!(err, EditorError::DropRejected));

    assert_eq!(ed.document(), &before);
    assert!(!ed.can_undo());
}

#[test]
fn drop_is_one_undo_step() {
    let mut ed = starter();
    let before = ed.document().clone();
    ed.drop_on(DragSource::Existing(id("sidebar")), DropTarget::Container(id("page")))
        .unwrap();
    assert_eq!(ed.document().parent_of(id("sidebar")), Some(id("page")));

    assert_eq!(ed.undo().as_deref(), Some("move sidebar"));
    assert_eq!(ed.document(), &before);
}
