//! Tool error types

use pqc_signer::PqcError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    /// Failure inside the signature library
    #[error("Signature library error: {0}")]
    Pqc(#[from] PqcError),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Key file missing, malformed or refusing to be overwritten
    #[error("Key file error: {0}")]
    KeyFile(String),

    #[error("Invalid {encoding} data: {reason}")]
    Encoding {
        encoding: &'static str,
        reason: String,
    },

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ToolError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> ToolError {
        let path = path.into();
        move |source| ToolError::Io { path, source }
    }
}

pub type Result<T> = std::result::Result<T, ToolError>;
