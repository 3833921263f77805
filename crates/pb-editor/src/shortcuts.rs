//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s, which the
//! [`crate::Editor`] executes via `run_shortcut`. Keeping the table here
//! lets every front end share one binding set.
//!
//! - ⌘Z / ⌘⇧Z / ⌘Y = undo / redo
//! - Delete = remove the selected node, ⌘Delete = clear the canvas
//! - G / P = grid / preview toggles

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Edit ──
    Undo,
    Redo,
    /// Remove the selected node (and its subtree).
    Delete,
    /// Remove every node.
    ClearCanvas,

    // ── View ──
    ZoomIn,
    ZoomOut,
    ZoomReset,
    ToggleGrid,
    TogglePreview,

    // ── UI ──
    Deselect,
}

/// Resolves key events into shortcut actions.
///
/// Uses platform-aware modifier detection: on macOS `meta` is ⌘,
/// on other platforms `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        if alt {
            return None;
        }

        // ── Modifier combos first (most specific) ──
        if cmd && shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                "0" => Some(ShortcutAction::ZoomReset),
                "Delete" | "Backspace" => Some(ShortcutAction::ClearCanvas),
                _ => None,
            };
        }

        if shift {
            return None;
        }

        // ── Single keys (no modifiers) ──
        match key {
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Deselect),
            "g" | "G" => Some(ShortcutAction::ToggleGrid),
            "p" | "P" => Some(ShortcutAction::TogglePreview),
            _ => None,
        }
    }
}
