use pb_core::ImportError;
use pb_editor::{EditorError, MutationError};
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

pub const EXIT_INVALID: i32 = 1;
pub const EXIT_FAILURE: i32 = 2;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Import {
        path: PathBuf,
        #[source]
        source: ImportError,
    },

    #[error("{path}: {count} problem(s) found")]
    Invalid { path: PathBuf, count: usize },

    #[error("{path}: {source}")]
    Rejected {
        path: PathBuf,
        #[source]
        source: MutationError,
    },

    #[error("{path}: bad config: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path}: bad script: {source}")]
    Script {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("script step {index} failed: {source}")]
    Step {
        index: usize,
        #[source]
        source: EditorError,
    },

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("MessagePack encoding failed: {0}")]
    MessagePack(#[from] rmp_serde::encode::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Import { .. } | CliError::Invalid { .. } | CliError::Rejected { .. } => {
                EXIT_INVALID
            }
            _ => EXIT_FAILURE,
        }
    }
}
