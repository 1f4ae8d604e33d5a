//! FFI boundary to the native signature library
//!
//! The only module that calls foreign code. It resolves the five liboqs
//! signature exports into a [`FunctionTable`] and wraps each one in a typed
//! method that checks every buffer length before the call. The native side
//! trusts those lengths completely, so an unchecked buffer here is undefined
//! behaviour.
//!
//! Native status codes never leave this module: non-zero results become
//! [`PqcError`] values or `false`.

use crate::dilithium::{check_length, PRIVATE_KEY_LENGTH, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};
use crate::error::{InitializationError, PqcError, Result};
use libloading::Library;
use std::ffi::CStr;
use std::os::raw::{c_char, c_int};
use std::ptr::NonNull;

/// Opaque `OQS_SIG` context
#[repr(C)]
pub(crate) struct OqsSig {
    _private: [u8; 0],
}

type SigNewFn = unsafe extern "C" fn(method_name: *const c_char) -> *mut OqsSig;
type SigFreeFn = unsafe extern "C" fn(sig: *mut OqsSig);
type SigKeypairFn =
    unsafe extern "C" fn(sig: *const OqsSig, public_key: *mut u8, secret_key: *mut u8) -> c_int;
type SigSignFn = unsafe extern "C" fn(
    sig: *const OqsSig,
    signature: *mut u8,
    signature_len: *mut usize,
    message: *const u8,
    message_len: usize,
    secret_key: *const u8,
) -> c_int;
type SigVerifyFn = unsafe extern "C" fn(
    sig: *const OqsSig,
    message: *const u8,
    message_len: usize,
    signature: *const u8,
    signature_len: usize,
    public_key: *const u8,
) -> c_int;

pub(crate) const SYMBOL_NEW: &str = "OQS_SIG_new";
pub(crate) const SYMBOL_FREE: &str = "OQS_SIG_free";
pub(crate) const SYMBOL_KEYPAIR: &str = "OQS_SIG_keypair";
pub(crate) const SYMBOL_SIGN: &str = "OQS_SIG_sign";
pub(crate) const SYMBOL_VERIFY: &str = "OQS_SIG_verify";

/// Exported symbols, in resolution order
pub const EXPORTED_SYMBOLS: [&str; 5] = [
    SYMBOL_NEW,
    SYMBOL_FREE,
    SYMBOL_KEYPAIR,
    SYMBOL_SIGN,
    SYMBOL_VERIFY,
];

const OQS_SUCCESS: c_int = 0;

/// Resolved entry points of a loaded native library
///
/// Plain function pointers copied out of the library; only valid while the
/// owning [`crate::loader::NativeLibrary`] keeps the library loaded.
#[derive(Clone, Copy)]
pub(crate) struct FunctionTable {
    sig_new: SigNewFn,
    sig_free: SigFreeFn,
    sig_keypair: SigKeypairFn,
    sig_sign: SigSignFn,
    sig_verify: SigVerifyFn,
}

fn resolve<T: Copy>(library: &Library, symbol: &'static str) -> std::result::Result<T, InitializationError> {
    // SAFETY: each symbol is looked up with the C signature declared above,
    // matching liboqs' signature API.
    unsafe { library.get::<T>(symbol.as_bytes()) }
        .map(|sym| *sym)
        .map_err(|source| InitializationError::ExportResolution { symbol, source })
}

impl FunctionTable {
    /// Resolve all five exports, failing on the first missing one
    pub(crate) fn resolve(library: &Library) -> std::result::Result<Self, InitializationError> {
        Ok(Self {
            sig_new: resolve(library, SYMBOL_NEW)?,
            sig_free: resolve(library, SYMBOL_FREE)?,
            sig_keypair: resolve(library, SYMBOL_KEYPAIR)?,
            sig_sign: resolve(library, SYMBOL_SIGN)?,
            sig_verify: resolve(library, SYMBOL_VERIFY)?,
        })
    }

    /// `OQS_SIG_new`; `None` when the library refuses the algorithm
    pub(crate) fn new_context(&self, algorithm: &CStr) -> Option<NonNull<OqsSig>> {
        // SAFETY: `algorithm` is a valid null-terminated string.
        NonNull::new(unsafe { (self.sig_new)(algorithm.as_ptr()) })
    }

    /// `OQS_SIG_free`
    ///
    /// # Safety
    /// `ctx` must come from `new_context` on this table and not be freed yet.
    pub(crate) unsafe fn free_context(&self, ctx: NonNull<OqsSig>) {
        (self.sig_free)(ctx.as_ptr())
    }

    /// `OQS_SIG_keypair` into caller buffers of exactly the key lengths
    ///
    /// # Safety
    /// `ctx` must be a live context from this table.
    pub(crate) unsafe fn keypair(
        &self,
        ctx: NonNull<OqsSig>,
        public_key: &mut [u8],
        private_key: &mut [u8],
    ) -> Result<()> {
        check_length("public key", PUBLIC_KEY_LENGTH, public_key.len())?;
        check_length("private key", PRIVATE_KEY_LENGTH, private_key.len())?;

        let status = (self.sig_keypair)(
            ctx.as_ptr(),
            public_key.as_mut_ptr(),
            private_key.as_mut_ptr(),
        );
        if status != OQS_SUCCESS {
            return Err(PqcError::KeyGenerationError(format!(
                "native keypair call returned status {}",
                status
            )));
        }
        Ok(())
    }

    /// `OQS_SIG_sign`; returns the number of signature bytes written, always
    /// `SIGNATURE_LENGTH`
    ///
    /// # Safety
    /// `ctx` must be a live context from this table.
    pub(crate) unsafe fn sign(
        &self,
        ctx: NonNull<OqsSig>,
        signature: &mut [u8],
        message: &[u8],
        private_key: &[u8],
    ) -> Result<usize> {
        check_length("signature buffer", SIGNATURE_LENGTH, signature.len())?;
        check_length("private key", PRIVATE_KEY_LENGTH, private_key.len())?;

        let mut written = 0usize;
        let status = (self.sig_sign)(
            ctx.as_ptr(),
            signature.as_mut_ptr(),
            &mut written,
            message.as_ptr(),
            message.len(),
            private_key.as_ptr(),
        );
        if status != OQS_SUCCESS {
            return Err(PqcError::SigningError(format!(
                "native sign call returned status {}",
                status
            )));
        }
        if written != SIGNATURE_LENGTH {
            return Err(PqcError::SigningError(format!(
                "native sign call reported {} signature bytes, expected {}",
                written, SIGNATURE_LENGTH
            )));
        }
        Ok(written)
    }

    /// `OQS_SIG_verify`; `true` only for a zero status
    ///
    /// # Safety
    /// `ctx` must be a live context from this table.
    pub(crate) unsafe fn verify(
        &self,
        ctx: NonNull<OqsSig>,
        message: &[u8],
        signature: &[u8],
        public_key: &[u8],
    ) -> Result<bool> {
        check_length("signature", SIGNATURE_LENGTH, signature.len())?;
        check_length("public key", PUBLIC_KEY_LENGTH, public_key.len())?;

        let status = (self.sig_verify)(
            ctx.as_ptr(),
            message.as_ptr(),
            message.len(),
            signature.as_ptr(),
            signature.len(),
            public_key.as_ptr(),
        );
        Ok(status == OQS_SUCCESS)
    }
}
