//! Dilithium3 signature engine over the native library
//!
//! Each [`SignatureEngine`] owns one native signature context. Calls on the
//! same engine are serialized by an instance lock since the native context is
//! not known to be reentrant; separate engines run in parallel.
//!
//! # Example
//!
//! ```no_run
//! use pqc_signer::SignatureEngine;
//!
//! let engine = SignatureEngine::new()?;
//! let keypair = engine.generate_key_pair()?;
//!
//! let message = b"hello-world";
//! let signature = engine.sign(message, keypair.private_key())?;
//! assert!(engine.verify(message, signature.as_bytes(), keypair.public_key())?);
//!
//! engine.dispose();
//! # Ok::<(), pqc_signer::PqcError>(())
//! ```

use crate::dilithium::{
    KeyPair, Signature, ALGORITHM_NAME, ALGORITHM_NAME_C, PRIVATE_KEY_LENGTH, PUBLIC_KEY_LENGTH,
    SIGNATURE_LENGTH,
};
use crate::error::{PqcError, Result};
use crate::ffi::OqsSig;
use crate::loader::NativeLibrary;
use crate::manager::{LibraryLease, LibraryManager};
use crate::traits::Signer;
use std::ffi::CStr;
use std::ptr::NonNull;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, warn};
use zeroize::Zeroizing;

/// Outcome of a well-formed verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Valid,
    Invalid,
}

impl Verification {
    pub fn is_valid(self) -> bool {
        self == Verification::Valid
    }
}

/// Native context owned by one engine
///
/// Holds its own reference to the library so the free below is always made
/// against a loaded image. Dropping it frees the context and nothing else.
struct NativeContext {
    handle: NonNull<OqsSig>,
    library: Arc<NativeLibrary>,
}

// SAFETY: the context is only touched through the engine's mutex, and liboqs
// contexts carry no thread affinity.
unsafe impl Send for NativeContext {}

impl Drop for NativeContext {
    fn drop(&mut self) {
        // SAFETY: `handle` came from this library's `OQS_SIG_new` and is freed once.
        unsafe { self.library.table().free_context(self.handle) };
        debug!(algorithm = ALGORITHM_NAME, "Freed native signature context");
    }
}

/// Live engine state. Field order is drop order: context first, then lease.
struct ActiveEngine {
    context: NativeContext,
    _lease: LibraryLease,
}

pub struct SignatureEngine {
    state: Mutex<Option<ActiveEngine>>,
}

impl SignatureEngine {
    /// Create an engine on the process-wide library manager
    ///
    /// # Errors
    /// - `InitializationError` if the native library cannot be loaded
    /// - `EngineInitializationError` if the library refuses a new context
    pub fn new() -> Result<Self> {
        Self::with_manager(LibraryManager::global())
    }

    /// Create an engine on a specific library manager
    pub fn with_manager(manager: Arc<LibraryManager>) -> Result<Self> {
        Self::create(manager, ALGORITHM_NAME_C)
    }

    /// On a null context the lease is dropped here, releasing the library
    fn create(manager: Arc<LibraryManager>, algorithm: &CStr) -> Result<Self> {
        manager.initialize_once()?;
        let (lease, library) = manager.acquire()?;

        let handle = library.table().new_context(algorithm).ok_or_else(|| {
            let algorithm = algorithm.to_string_lossy();
            error!(
                algorithm = %algorithm,
                operation = "create",
                "Native library returned a null signature context"
            );
            PqcError::EngineInitializationError(format!(
                "native library returned no context for {}",
                algorithm
            ))
        })?;

        debug!(
            algorithm = ALGORITHM_NAME,
            live = manager.live_engines(),
            "Created signature engine"
        );

        Ok(Self {
            state: Mutex::new(Some(ActiveEngine {
                context: NativeContext { handle, library },
                _lease: lease,
            })),
        })
    }

    fn lock_state(&self) -> MutexGuard<'_, Option<ActiveEngine>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` on the native context under the instance lock
    fn with_context<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&NativeContext) -> Result<T>,
    ) -> Result<T> {
        let state = self.lock_state();
        let Some(active) = state.as_ref() else {
            warn!(algorithm = ALGORITHM_NAME, operation, "Signature engine used after dispose");
            return Err(PqcError::EngineDisposed);
        };
        f(&active.context)
    }

    /// Generate a new Dilithium3 keypair
    ///
    /// # Errors
    /// - `KeyGenerationError` if the native call fails
    /// - `EngineDisposed` after [`dispose`](Self::dispose)
    pub fn generate_key_pair(&self) -> Result<KeyPair> {
        self.with_context("generate_key_pair", |ctx| {
            let mut public_key = vec![0u8; PUBLIC_KEY_LENGTH];
            let mut private_key = Zeroizing::new(vec![0u8; PRIVATE_KEY_LENGTH]);

            // SAFETY: the context is live while the engine state is held.
            unsafe {
                ctx.library
                    .table()
                    .keypair(ctx.handle, &mut public_key, &mut private_key)
            }
            .inspect_err(|e| {
                error!(
                    algorithm = ALGORITHM_NAME,
                    operation = "generate_key_pair",
                    pk_len = PUBLIC_KEY_LENGTH,
                    sk_len = PRIVATE_KEY_LENGTH,
                    error = %e,
                    "Key generation failed"
                )
            })?;

            debug!(
                algorithm = ALGORITHM_NAME,
                pk_len = public_key.len(),
                sk_len = private_key.len(),
                "Generated keypair"
            );

            Ok(KeyPair::from_native(public_key, private_key))
        })
    }

    /// Sign `message` with a 4,000-byte private key
    ///
    /// # Errors
    /// - `InvalidLength` if `private_key` is not exactly `PRIVATE_KEY_LENGTH` bytes
    /// - `SigningError` if the native call fails
    /// - `EngineDisposed` after [`dispose`](Self::dispose)
    pub fn sign(&self, message: &[u8], private_key: &[u8]) -> Result<Signature> {
        self.with_context("sign", |ctx| {
            let mut signature = vec![0u8; SIGNATURE_LENGTH];

            // SAFETY: the context is live while the engine state is held.
            unsafe {
                ctx.library
                    .table()
                    .sign(ctx.handle, &mut signature, message, private_key)
            }
            .inspect_err(|e| {
                error!(
                    algorithm = ALGORITHM_NAME,
                    operation = "sign",
                    msg_len = message.len(),
                    sk_len = private_key.len(),
                    error = %e,
                    "Signing failed"
                )
            })?;

            debug!(
                algorithm = ALGORITHM_NAME,
                msg_len = message.len(),
                sig_len = signature.len(),
                "Signed message"
            );

            Ok(Signature::from_native(signature))
        })
    }

    /// Verify a detached signature
    ///
    /// Malformed input (wrong signature or public key length) is an error; a
    /// well-formed signature that does not match is [`Verification::Invalid`].
    pub fn verify_detailed(
        &self,
        message: &[u8],
        signature: &[u8],
        public_key: &[u8],
    ) -> Result<Verification> {
        self.with_context("verify", |ctx| {
            // SAFETY: the context is live while the engine state is held.
            let valid = unsafe {
                ctx.library
                    .table()
                    .verify(ctx.handle, message, signature, public_key)
            }
            .inspect_err(|e| {
                warn!(
                    algorithm = ALGORITHM_NAME,
                    operation = "verify",
                    msg_len = message.len(),
                    sig_len = signature.len(),
                    pk_len = public_key.len(),
                    error = %e,
                    "Rejected malformed verification input"
                )
            })?;

            debug!(
                algorithm = ALGORITHM_NAME,
                msg_len = message.len(),
                valid,
                "Verified signature"
            );

            Ok(if valid {
                Verification::Valid
            } else {
                Verification::Invalid
            })
        })
    }

    /// Verify a detached signature, `Ok(false)` for a mismatch
    pub fn verify(&self, message: &[u8], signature: &[u8], public_key: &[u8]) -> Result<bool> {
        self.verify_detailed(message, signature, public_key)
            .map(Verification::is_valid)
    }

    /// Release the native context and this engine's hold on the library
    ///
    /// Idempotent. The last engine to dispose unloads the library and deletes
    /// its staged file.
    pub fn dispose(&self) {
        let active = self.lock_state().take();
        if let Some(active) = active {
            drop(active);
            debug!(algorithm = ALGORITHM_NAME, "Disposed signature engine");
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.lock_state().is_none()
    }
}

impl Drop for SignatureEngine {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for SignatureEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureEngine")
            .field("algorithm", &ALGORITHM_NAME)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

impl Signer for SignatureEngine {
    fn generate_key_pair(&self) -> Result<KeyPair> {
        SignatureEngine::generate_key_pair(self)
    }

    fn sign(&self, message: &[u8], private_key: &[u8]) -> Result<Signature> {
        SignatureEngine::sign(self, message, private_key)
    }

    fn verify(&self, message: &[u8], signature: &[u8], public_key: &[u8]) -> Result<bool> {
        SignatureEngine::verify(self, message, signature, public_key)
    }

    fn algorithm_name(&self) -> &str {
        ALGORITHM_NAME
    }
}
