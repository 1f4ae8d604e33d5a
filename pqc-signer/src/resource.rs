//! Native library resource
//!
//! The Dilithium3 shared library is compiled into this crate by `build.rs`
//! when `PQC_SIGNER_EMBED_LIBRARY` names a file at build time. A configured
//! `library_path` replaces the embedded copy.

use crate::config::SignerConfig;
use crate::error::InitializationError;
use std::borrow::Cow;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Fixed name of the embedded resource
pub const RESOURCE_NAME: &str = "pqc_native";

static EMBEDDED_LIBRARY: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/pqc_native.bin"));

/// Where the native library bytes come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeResource {
    /// Bytes compiled into the crate
    Embedded,
    /// Bytes read from a file at initialization time
    File(PathBuf),
}

impl NativeResource {
    pub fn from_config(config: &SignerConfig) -> Self {
        match &config.library_path {
            Some(path) => NativeResource::File(path.clone()),
            None => NativeResource::Embedded,
        }
    }

    /// Open the resource
    ///
    /// # Errors
    /// - `ResourceMissing` if nothing was embedded, or the file is absent or empty
    /// - `ResourceRead` for any other I/O failure
    pub fn open(&self) -> Result<Cow<'static, [u8]>, InitializationError> {
        match self {
            NativeResource::Embedded => {
                if EMBEDDED_LIBRARY.is_empty() {
                    return Err(InitializationError::ResourceMissing(RESOURCE_NAME.to_string()));
                }
                Ok(Cow::Borrowed(EMBEDDED_LIBRARY))
            }
            NativeResource::File(path) => match fs::read(path) {
                Ok(bytes) if bytes.is_empty() => Err(InitializationError::ResourceMissing(
                    path.display().to_string(),
                )),
                Ok(bytes) => Ok(Cow::Owned(bytes)),
                Err(e) if e.kind() == ErrorKind::NotFound => Err(
                    InitializationError::ResourceMissing(path.display().to_string()),
                ),
                Err(source) => Err(InitializationError::ResourceRead {
                    path: path.clone(),
                    source,
                }),
            },
        }
    }

    /// Human-readable origin, for logs
    pub fn describe(&self) -> String {
        match self {
            NativeResource::Embedded => format!("embedded:{}", RESOURCE_NAME),
            NativeResource::File(path) => path.display().to_string(),
        }
    }
}

/// Whether a native library was embedded at build time
pub fn has_embedded_library() -> bool {
    !EMBEDDED_LIBRARY.is_empty()
}
