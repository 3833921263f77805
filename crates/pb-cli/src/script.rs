//! Edit scripts: a JSON array of steps replayed through an [`Editor`].
//!
//! A step is either a document mutation (`add`, `update`, `remove`, `move`,
//! `clear`, `load`) or one of the session steps below:
//!
//! ```json
//! [
//!   { "op": "addComponent", "type": "button", "parentId": "hero" },
//!   { "op": "style", "id": "hero", "css": "padding: 24px" },
//!   { "op": "move", "id": "cta", "parentId": "footer" },
//!   { "op": "undo" },
//!   { "op": "beginBatch" },
//!   { "op": "remove", "id": "promo" },
//!   { "op": "endBatch", "label": "cleanup" }
//! ]
//! ```

use pb_core::NodeId;
use pb_editor::{Editor, EditorError, Mutation};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Mutation(Mutation),
    Session(SessionStep),
}

/// `op` values handled by [`Mutation`]; everything else is a session step.
const MUTATION_OPS: [&str; 6] = ["add", "update", "remove", "move", "clear", "load"];

impl<'de> Deserialize<'de> for Step {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let is_mutation = value
            .get("op")
            .and_then(Value::as_str)
            .is_some_and(|op| MUTATION_OPS.contains(&op));
        if is_mutation {
            Mutation::deserialize(value).map(Step::Mutation).map_err(D::Error::custom)
        } else {
            SessionStep::deserialize(value).map(Step::Session).map_err(D::Error::custom)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SessionStep {
    Undo,
    Redo,
    BeginBatch,
    EndBatch {
        #[serde(default = "default_batch_label")]
        label: String,
    },
    /// Add a library component with its default props.
    AddComponent {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        parent_id: Option<NodeId>,
    },
    /// Merge CSS declaration text into a node's style.
    Style { id: NodeId, css: String },
}

fn default_batch_label() -> String {
    "batch".to_string()
}

/// Outcome counters for a replayed script.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub applied: usize,
    pub undone: usize,
    pub redone: usize,
}

pub fn parse(text: &str) -> Result<Vec<Step>, serde_json::Error> {
    serde_json::from_str(text)
}

/// Run `steps` in order, stopping at the first failing one.
///
/// Returns the index of the failing step with its error. Undo/redo with
/// nothing to do are not failures.
pub fn run(editor: &mut Editor, steps: Vec<Step>) -> Result<Summary, (usize, EditorError)> {
    let mut summary = Summary::default();
    for (index, step) in steps.into_iter().enumerate() {
        run_step(editor, step, &mut summary).map_err(|err| (index, err))?;
    }
    // Close anything the script left open so its edits stay undoable.
    while editor.history().is_batching() {
        editor.end_batch("batch");
    }
    Ok(summary)
}

fn run_step(editor: &mut Editor, step: Step, summary: &mut Summary) -> Result<(), EditorError> {
    match step {
        Step::Mutation(mutation) => {
            editor.apply(mutation)?;
            summary.applied += 1;
        }
        Step::Session(SessionStep::Undo) => {
            if editor.undo().is_some() {
                summary.undone += 1;
            }
        }
        Step::Session(SessionStep::Redo) => {
            if editor.redo().is_some() {
                summary.redone += 1;
            }
        }
        Step::Session(SessionStep::BeginBatch) => editor.begin_batch(),
        Step::Session(SessionStep::EndBatch { label }) => {
            editor.end_batch(&label);
        }
        Step::Session(SessionStep::AddComponent { kind, parent_id }) => {
            let id = editor.add_from_library(&kind, parent_id)?;
            log::info!("added {kind} as {id}");
            summary.applied += 1;
        }
        Step::Session(SessionStep::Style { id, css }) => {
            editor.apply_inline_style(id, &css)?;
            summary.applied += 1;
        }
    }
    Ok(())
}
