//! Operator tooling for the Dilithium3 signature library
//!
//! Backs the `pqc-tool` binary: key files, signature encodings and the
//! `info`, `keygen`, `sign` and `verify` commands.

pub mod commands;
pub mod config;
pub mod error;
pub mod keyfile;

pub use config::{Encoding, ToolConfig};
pub use error::{Result, ToolError};
