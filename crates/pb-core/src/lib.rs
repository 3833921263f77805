pub mod css;
pub mod export;
pub mod id;
pub mod library;
pub mod model;
pub mod validate;

pub use export::{ExportConfig, emit_html, emit_jsx};
pub use id::NodeId;
pub use library::{Category, ComponentDefinition};
pub use model::*;
pub use validate::{ImportDiagnostic, ImportError, validate_nodes};
