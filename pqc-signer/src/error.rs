//! Error type definitions
use std::path::PathBuf;
use thiserror::Error;

/// Failures while bootstrapping the native library
///
/// Always surfaced wrapped in [`PqcError::InitializationError`].
#[derive(Error, Debug)]
pub enum InitializationError {
    #[error("Native library resource `{0}` is missing")]
    ResourceMissing(String),

    #[error("Failed to read native library resource {path:?}: {source}")]
    ResourceRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to stage native library in {dir:?}: {source}")]
    Staging {
        dir: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to load native library {path:?}: {source}")]
    LibraryLoad {
        path: PathBuf,
        source: libloading::Error,
    },

    #[error("Native library does not export `{symbol}`: {source}")]
    ExportResolution {
        symbol: &'static str,
        source: libloading::Error,
    },
}

#[derive(Error, Debug)]
pub enum PqcError {
    #[error("Cryptography initialization failed: {0}")]
    InitializationError(#[from] InitializationError),

    #[error("Engine initialization failed: {0}")]
    EngineInitializationError(String),

    #[error("Key generation failed: {0}")]
    KeyGenerationError(String),

    #[error("Signing failed: {0}")]
    SigningError(String),

    #[error("Invalid {what} length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Signature engine has been disposed")]
    EngineDisposed,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, PqcError>;
