pub mod editor;
pub mod history;
pub mod placement;
pub mod shortcuts;
pub mod store;
pub mod tree;
pub mod view;

pub use editor::{Editor, EditorError};
pub use history::History;
pub use placement::{DragSource, DropTarget, Placement};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use store::NodeStore;
pub use tree::{Applied, Mutation, MutationError};
pub use view::{DeviceType, EditorConfig, ViewMode, ViewSettings};
