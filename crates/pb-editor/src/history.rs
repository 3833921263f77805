//! Undo/Redo history.
//!
//! Snapshot-based: each entry holds the whole document as it was right
//! before a mutation. The live document is never stored here; undo and redo
//! swap it with the top entry of the opposite stack.
//!
//! Batches group several mutations (a drag gesture, a scripted sequence)
//! into one entry holding the document from before the batch started.

use pb_core::Document;
use std::mem;

/// One history entry.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub document: Document,
    pub description: String,
}

/// Linear undo/redo stacks.
#[derive(Debug, Clone, Default)]
pub struct History {
    /// Older → newer.
    past: Vec<Snapshot>,
    /// Next redo at the end.
    future: Vec<Snapshot>,
    /// Maximum undo depth (`None` = unbounded).
    limit: Option<usize>,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    /// Document captured when the outermost batch opened.
    batch_snapshot: Option<Document>,
    /// Whether any mutation was recorded during the current batch.
    batch_dirty: bool,
}

impl History {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Record the document as it was before an accepted mutation.
    ///
    /// Clears the redo stack. Inside a batch only marks the batch dirty; the
    /// entry is pushed by [`Self::end_batch`].
    pub fn record(&mut self, before: Document, description: &str) {
        if self.batch_depth > 0 {
            self.batch_dirty = true;
            return;
        }
        self.push(Snapshot {
            document: before,
            description: description.to_string(),
        });
    }

    /// Start a batch group. Nested calls only bump the depth.
    pub fn begin_batch(&mut self, live: &Document) {
        if self.batch_depth == 0 {
            self.batch_snapshot = Some(live.clone());
            self.batch_dirty = false;
        }
        self.batch_depth += 1;
    }

    /// End a batch group. When the outermost batch closes and something was
    /// recorded inside it, push a single entry. Returns whether one was pushed.
    pub fn end_batch(&mut self, description: &str) -> bool {
        if self.batch_depth == 0 {
            return false;
        }
        self.batch_depth -= 1;
        if self.batch_depth > 0 {
            return false;
        }
        let snapshot = self.batch_snapshot.take();
        let dirty = mem::take(&mut self.batch_dirty);
        match snapshot {
            Some(document) if dirty => {
                self.push(Snapshot {
                    document,
                    description: description.to_string(),
                });
                true
            }
            _ => false,
        }
    }

    pub fn is_batching(&self) -> bool {
        self.batch_depth > 0
    }

    /// Swap `live` with the most recent past entry. Returns the entry's
    /// description, or `None` if there is nothing to undo.
    ///
    /// Refused while a batch is open.
    pub fn undo(&mut self, live: &mut Document) -> Option<String> {
        if self.is_batching() {
            log::warn!("undo ignored: batch in progress");
            return None;
        }
        let Snapshot {
            document,
            description,
        } = self.past.pop()?;
        let current = mem::replace(live, document);
        self.future.push(Snapshot {
            document: current,
            description: description.clone(),
        });
        log::trace!(
            "undo `{description}` (past {}, future {})",
            self.past.len(),
            self.future.len()
        );
        Some(description)
    }

    /// Swap `live` with the next future entry. Returns the entry's
    /// description, or `None` if there is nothing to redo.
    pub fn redo(&mut self, live: &mut Document) -> Option<String> {
        if self.is_batching() {
            log::warn!("redo ignored: batch in progress");
            return None;
        }
        let Snapshot {
            document,
            description,
        } = self.future.pop()?;
        let current = mem::replace(live, document);
        self.past.push(Snapshot {
            document: current,
            description: description.clone(),
        });
        log::trace!(
            "redo `{description}` (past {}, future {})",
            self.past.len(),
            self.future.len()
        );
        Some(description)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    /// Description of the entry the next undo would restore.
    pub fn undo_label(&self) -> Option<&str> {
        self.past.last().map(|s| s.description.as_str())
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.future.last().map(|s| s.description.as_str())
    }

    /// Drop every entry and any open batch.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
        self.batch_depth = 0;
        self.batch_snapshot = None;
        self.batch_dirty = false;
    }

    fn push(&mut self, snapshot: Snapshot) {
        log::trace!("record `{}` (past {})", snapshot.description, self.past.len() + 1);
        self.past.push(snapshot);
        if let Some(limit) = self.limit {
            while self.past.len() > limit {
                self.past.remove(0);
            }
        }
        // Clear redo stack on new action
        self.future.clear();
    }
}
