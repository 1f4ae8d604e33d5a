//! Dilithium3 native signature library
//!
//! Builds as a C shared library exposing the liboqs signature ABI
//! (`OQS_SIG_new`, `OQS_SIG_free`, `OQS_SIG_keypair`, `OQS_SIG_sign`,
//! `OQS_SIG_verify`) for the round-3 Dilithium3 parameter set. This is the
//! binary `pqc-signer` embeds and loads at runtime.
//!
//! ## Buffer contract
//! - Public key buffers are exactly 1,952 bytes
//! - Secret key buffers are exactly 4,000 bytes
//! - Signature buffers hold at least 3,293 bytes
//!
//! The library cannot check caller buffer sizes. Only null pointers and
//! malformed key/signature encodings are rejected.
//!
//! ## Status codes
//! - `0` (`OQS_SUCCESS`)
//! - `-1` (`OQS_ERROR`)

#![allow(non_snake_case)]

use pqcrypto_dilithium::dilithium3;
use pqcrypto_traits::sign::{DetachedSignature, PublicKey, SecretKey};
use std::ffi::CStr;
use std::os::raw::{c_char, c_int};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::{ptr, slice};

/// Success status
pub const OQS_SUCCESS: c_int = 0;
/// Failure status
pub const OQS_ERROR: c_int = -1;

/// The only method name this library answers to
pub const METHOD_NAME: &str = "Dilithium3";

static METHOD_NAME_C: &[u8] = b"Dilithium3\0";

/// Signature context handed out by [`OQS_SIG_new`]
///
/// Mirrors the leading fields of liboqs' `OQS_SIG` so callers can read the
/// advertised sizes without calling back into the library.
#[repr(C)]
#[derive(Debug)]
pub struct OqsSig {
    pub method_name: *const c_char,
    pub claimed_nist_level: u8,
    pub length_public_key: usize,
    pub length_secret_key: usize,
    pub length_signature: usize,
}

impl OqsSig {
    fn dilithium3() -> Self {
        Self {
            method_name: METHOD_NAME_C.as_ptr() as *const c_char,
            claimed_nist_level: 3,
            length_public_key: dilithium3::public_key_bytes(),
            length_secret_key: dilithium3::secret_key_bytes(),
            length_signature: dilithium3::signature_bytes(),
        }
    }
}

/// Runs `f`, turning a panic into `OQS_ERROR` so it never unwinds across the C ABI
fn guarded<F: FnOnce() -> c_int>(f: F) -> c_int {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or(OQS_ERROR)
}

/// Borrows `len` bytes from `data`, allowing a null or dangling pointer for empty input
unsafe fn input<'a>(data: *const u8, len: usize) -> Option<&'a [u8]> {
    if len == 0 {
        Some(&[])
    } else if data.is_null() {
        None
    } else {
        Some(slice::from_raw_parts(data, len))
    }
}

/// Allocates a signature context for `method_name`
///
/// # Safety
/// - `method_name` must be null or point to a null-terminated string.
///
/// # Returns
/// - Context pointer, to be released with [`OQS_SIG_free`]
/// - `NULL` for a null or unsupported method name
#[no_mangle]
pub unsafe extern "C" fn OQS_SIG_new(method_name: *const c_char) -> *mut OqsSig {
    if method_name.is_null() {
        return ptr::null_mut();
    }

    let name = CStr::from_ptr(method_name);
    if name.to_bytes() != METHOD_NAME.as_bytes() {
        return ptr::null_mut();
    }

    Box::into_raw(Box::new(OqsSig::dilithium3()))
}

/// Releases a context returned by [`OQS_SIG_new`]
///
/// # Safety
/// - `sig` must be null or a pointer from [`OQS_SIG_new`] not yet freed.
#[no_mangle]
pub unsafe extern "C" fn OQS_SIG_free(sig: *mut OqsSig) {
    if !sig.is_null() {
        drop(Box::from_raw(sig));
    }
}

/// Generates a keypair into caller-provided buffers
///
/// # Safety
/// - `sig` must be a live context.
/// - `public_key` and `secret_key` must be writable for the context's key lengths.
#[no_mangle]
pub unsafe extern "C" fn OQS_SIG_keypair(
    sig: *const OqsSig,
    public_key: *mut u8,
    secret_key: *mut u8,
) -> c_int {
    if sig.is_null() || public_key.is_null() || secret_key.is_null() {
        return OQS_ERROR;
    }
    let ctx = &*sig;

    guarded(|| {
        let (pk, sk) = dilithium3::keypair();
        let (pk, sk) = (pk.as_bytes(), sk.as_bytes());
        if pk.len() != ctx.length_public_key || sk.len() != ctx.length_secret_key {
            return OQS_ERROR;
        }

        ptr::copy_nonoverlapping(pk.as_ptr(), public_key, pk.len());
        ptr::copy_nonoverlapping(sk.as_ptr(), secret_key, sk.len());
        OQS_SUCCESS
    })
}

/// Produces a detached signature of `message`
///
/// # Safety
/// - `signature` must be writable for `length_signature` bytes.
/// - `signature_len` must be a valid pointer.
/// - `message` must be readable for `message_len` bytes.
/// - `secret_key` must be readable for `length_secret_key` bytes.
#[no_mangle]
pub unsafe extern "C" fn OQS_SIG_sign(
    sig: *const OqsSig,
    signature: *mut u8,
    signature_len: *mut usize,
    message: *const u8,
    message_len: usize,
    secret_key: *const u8,
) -> c_int {
    if sig.is_null() || signature.is_null() || signature_len.is_null() || secret_key.is_null() {
        return OQS_ERROR;
    }
    let ctx = &*sig;
    let Some(message) = input(message, message_len) else {
        return OQS_ERROR;
    };
    let secret_key = slice::from_raw_parts(secret_key, ctx.length_secret_key);

    guarded(|| {
        let Ok(sk) = dilithium3::SecretKey::from_bytes(secret_key) else {
            return OQS_ERROR;
        };

        let detached = dilithium3::detached_sign(message, &sk);
        let bytes = detached.as_bytes();
        if bytes.len() > ctx.length_signature {
            return OQS_ERROR;
        }

        ptr::copy_nonoverlapping(bytes.as_ptr(), signature, bytes.len());
        *signature_len = bytes.len();
        OQS_SUCCESS
    })
}

/// Verifies a detached signature
///
/// # Safety
/// - `message` must be readable for `message_len` bytes.
/// - `signature` must be readable for `signature_len` bytes.
/// - `public_key` must be readable for `length_public_key` bytes.
///
/// # Returns
/// - `OQS_SUCCESS` if the signature is valid
/// - `OQS_ERROR` for an invalid signature or malformed input (indistinguishable)
#[no_mangle]
pub unsafe extern "C" fn OQS_SIG_verify(
    sig: *const OqsSig,
    message: *const u8,
    message_len: usize,
    signature: *const u8,
    signature_len: usize,
    public_key: *const u8,
) -> c_int {
    if sig.is_null() || public_key.is_null() {
        return OQS_ERROR;
    }
    let ctx = &*sig;
    let (Some(message), Some(signature)) =
        (input(message, message_len), input(signature, signature_len))
    else {
        return OQS_ERROR;
    };
    let public_key = slice::from_raw_parts(public_key, ctx.length_public_key);

    guarded(|| {
        let (Ok(pk), Ok(sig)) = (
            dilithium3::PublicKey::from_bytes(public_key),
            dilithium3::DetachedSignature::from_bytes(signature),
        ) else {
            return OQS_ERROR;
        };

        match dilithium3::verify_detached_signature(&sig, message, &pk) {
            Ok(()) => OQS_SUCCESS,
            Err(_) => OQS_ERROR,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_context() -> *mut OqsSig {
        let ctx = unsafe { OQS_SIG_new(METHOD_NAME_C.as_ptr() as *const c_char) };
        assert!(!ctx.is_null());
        ctx
    }

    fn keypair(ctx: *mut OqsSig) -> (Vec<u8>, Vec<u8>) {
        let mut pk = vec![0u8; 1952];
        let mut sk = vec![0u8; 4000];
        let status = unsafe { OQS_SIG_keypair(ctx, pk.as_mut_ptr(), sk.as_mut_ptr()) };
        assert_eq!(status, OQS_SUCCESS);
        (pk, sk)
    }

    fn sign(ctx: *mut OqsSig, message: &[u8], sk: &[u8]) -> Vec<u8> {
        let mut signature = vec![0u8; 3293];
        let mut len = 0usize;
        let status = unsafe {
            OQS_SIG_sign(
                ctx,
                signature.as_mut_ptr(),
                &mut len,
                message.as_ptr(),
                message.len(),
                sk.as_ptr(),
            )
        };
        assert_eq!(status, OQS_SUCCESS);
        signature.truncate(len);
        signature
    }

    fn verify(ctx: *mut OqsSig, message: &[u8], signature: &[u8], pk: &[u8]) -> c_int {
        unsafe {
            OQS_SIG_verify(
                ctx,
                message.as_ptr(),
                message.len(),
                signature.as_ptr(),
                signature.len(),
                pk.as_ptr(),
            )
        }
    }

    #[test]
    fn test_context_reports_round3_sizes() {
        let ctx = new_context();
        let sig = unsafe { &*ctx };

        assert_eq!(sig.length_public_key, 1952);
        assert_eq!(sig.length_secret_key, 4000);
        assert_eq!(sig.length_signature, 3293);
        assert_eq!(sig.claimed_nist_level, 3);

        unsafe { OQS_SIG_free(ctx) };
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        let ctx = unsafe { OQS_SIG_new(b"Falcon-512\0".as_ptr() as *const c_char) };
        assert!(ctx.is_null());

        let ctx = unsafe { OQS_SIG_new(ptr::null()) };
        assert!(ctx.is_null());
    }

    #[test]
    fn test_sign_and_verify() {
        let ctx = new_context();
        let (pk, sk) = keypair(ctx);

        let message = b"native round trip";
        let signature = sign(ctx, message, &sk);
        assert_eq!(signature.len(), 3293);

        assert_eq!(verify(ctx, message, &signature, &pk), OQS_SUCCESS);
        assert_eq!(verify(ctx, b"other message", &signature, &pk), OQS_ERROR);

        unsafe { OQS_SIG_free(ctx) };
    }

    #[test]
    fn test_empty_message() {
        let ctx = new_context();
        let (pk, sk) = keypair(ctx);

        let signature = sign(ctx, &[], &sk);
        assert_eq!(verify(ctx, &[], &signature, &pk), OQS_SUCCESS);

        unsafe { OQS_SIG_free(ctx) };
    }

    #[test]
    fn test_null_arguments_fail() {
        let ctx = new_context();
        let mut pk = vec![0u8; 1952];

        let status = unsafe { OQS_SIG_keypair(ctx, pk.as_mut_ptr(), ptr::null_mut()) };
        assert_eq!(status, OQS_ERROR);

        let status = unsafe { OQS_SIG_verify(ctx, ptr::null(), 4, pk.as_ptr(), 10, pk.as_ptr()) };
        assert_eq!(status, OQS_ERROR);

        unsafe { OQS_SIG_free(ctx) };
    }

    #[test]
    fn test_free_null_is_noop() {
        unsafe { OQS_SIG_free(ptr::null_mut()) };
    }
}
