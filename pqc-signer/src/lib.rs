//! Post-quantum signature library over a runtime-loaded native Dilithium3 implementation
//!
//! The signature algorithm lives in a native shared library exposing the
//! liboqs signature ABI. This crate stages that library from an embedded
//! resource, loads it once, and manages its lifetime across engines:
//!
//! ```text
//! SignatureEngine ──▶ LibraryManager ──▶ NativeLibrary ──▶ FunctionTable ──▶ OQS_SIG_*
//!  (per instance,      (load once,         (staged file,     (five typed,
//!   instance lock)      refcount)           libloading)       length-checked calls)
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use pqc_signer::{SignatureEngine, Signer};
//!
//! let engine = SignatureEngine::new()?;
//! let keypair = engine.generate_key_pair()?;
//!
//! let message = b"release manifest v1.4.2";
//! let signature = engine.sign(message, keypair.private_key())?;
//!
//! let is_valid = engine.verify(message, signature.as_bytes(), keypair.public_key())?;
//! assert!(is_valid);
//! # Ok::<(), pqc_signer::PqcError>(())
//! ```

pub mod config;
pub mod dilithium;
pub mod engine;
pub mod error;
mod ffi;
mod loader;
pub mod manager;
pub mod resource;
#[cfg(test)]
mod test_support;
pub mod traits;

// Re-export commonly used types
pub use config::SignerConfig;
pub use dilithium::{AlgorithmInfo, Dilithium3, KeyPair, Signature};
pub use engine::{SignatureEngine, Verification};
pub use error::{InitializationError, PqcError, Result};
pub use ffi::EXPORTED_SYMBOLS;
pub use manager::LibraryManager;
pub use resource::NativeResource;
pub use traits::Signer;
