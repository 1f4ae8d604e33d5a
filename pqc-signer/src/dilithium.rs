//! Dilithium3 parameter set and the values produced by the signature engine
//!
//! # About Dilithium3
//!
//! Dilithium is the lattice-based signature scheme selected in the NIST
//! post-quantum standardization process (Module-LWE / Module-SIS). The
//! native library implements the round-3 parameter set:
//!
//! | Item | Size |
//! |------|------|
//! | Public key | 1,952 bytes |
//! | Private key | 4,000 bytes |
//! | Signature | 3,293 bytes |
//!
//! These sizes are the buffer contract with the native library. Every buffer
//! handed across the FFI boundary is checked against them first.

use crate::error::{PqcError, Result};
use serde::Serialize;
use std::ffi::CStr;
use std::fmt;
use zeroize::Zeroizing;

/// Algorithm name passed to `OQS_SIG_new`
pub const ALGORITHM_NAME: &str = "Dilithium3";

/// Public key length in bytes
pub const PUBLIC_KEY_LENGTH: usize = 1952;

/// Private key length in bytes
pub const PRIVATE_KEY_LENGTH: usize = 4000;

/// Signature length in bytes
pub const SIGNATURE_LENGTH: usize = 3293;

/// NIST security level of the parameter set
pub const NIST_LEVEL: u8 = 3;

pub(crate) const ALGORITHM_NAME_C: &CStr = c"Dilithium3";

/// Dilithium3 parameter set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dilithium3;

impl Dilithium3 {
    /// Return algorithm information
    pub fn info() -> AlgorithmInfo {
        AlgorithmInfo {
            name: ALGORITHM_NAME,
            nist_level: NIST_LEVEL,
            public_key_size: PUBLIC_KEY_LENGTH,
            secret_key_size: PRIVATE_KEY_LENGTH,
            signature_size: SIGNATURE_LENGTH,
        }
    }
}

/// Algorithm information structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlgorithmInfo {
    /// Algorithm name
    pub name: &'static str,
    /// NIST security level
    pub nist_level: u8,
    /// Public key size (bytes)
    pub public_key_size: usize,
    /// Secret key size (bytes)
    pub secret_key_size: usize,
    /// Signature size (bytes)
    pub signature_size: usize,
}

pub(crate) fn check_length(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(PqcError::InvalidLength {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Dilithium3 keypair
///
/// The private key is wiped from memory when the keypair is dropped and is
/// never printed by `Debug`. Callers that copy it out own that copy's hygiene.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    public_key: Vec<u8>,
    private_key: Zeroizing<Vec<u8>>,
}

impl KeyPair {
    /// Restore keypair from bytes
    ///
    /// # Errors
    /// - Returns `InvalidLength` if either key has the wrong size
    pub fn from_bytes(public_key: &[u8], private_key: &[u8]) -> Result<Self> {
        check_length("public key", PUBLIC_KEY_LENGTH, public_key.len())?;
        check_length("private key", PRIVATE_KEY_LENGTH, private_key.len())?;

        Ok(Self {
            public_key: public_key.to_vec(),
            private_key: Zeroizing::new(private_key.to_vec()),
        })
    }

    pub(crate) fn from_native(public_key: Vec<u8>, private_key: Zeroizing<Vec<u8>>) -> Self {
        debug_assert_eq!(public_key.len(), PUBLIC_KEY_LENGTH);
        debug_assert_eq!(private_key.len(), PRIVATE_KEY_LENGTH);
        Self {
            public_key,
            private_key,
        }
    }

    /// Public key bytes (1,952 bytes)
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Private key bytes (4,000 bytes)
    ///
    /// # Security Warning
    /// Never log or transmit these bytes.
    pub fn private_key(&self) -> &[u8] {
        &self.private_key
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key_len", &self.public_key.len())
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Detached Dilithium3 signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(Vec<u8>);

impl Signature {
    /// Wrap signature bytes received from elsewhere
    ///
    /// # Errors
    /// - Returns `InvalidLength` unless exactly `SIGNATURE_LENGTH` bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        check_length("signature", SIGNATURE_LENGTH, bytes.len())?;
        Ok(Self(bytes.to_vec()))
    }

    pub(crate) fn from_native(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_info() {
        let info = Dilithium3::info();

        assert_eq!(info.name, "Dilithium3");
        assert_eq!(info.nist_level, 3);
        assert_eq!(info.public_key_size, 1952);
        assert_eq!(info.secret_key_size, 4000);
        assert_eq!(info.signature_size, 3293);
    }

    #[test]
    fn test_algorithm_name_c_matches() {
        assert_eq!(ALGORITHM_NAME_C.to_str().unwrap(), ALGORITHM_NAME);
    }

    #[test]
    fn test_from_bytes() {
        let pk = vec![1u8; PUBLIC_KEY_LENGTH];
        let sk = vec![2u8; PRIVATE_KEY_LENGTH];

        let keypair = KeyPair::from_bytes(&pk, &sk).unwrap();
        assert_eq!(keypair.public_key(), pk.as_slice());
        assert_eq!(keypair.private_key(), sk.as_slice());
    }

    #[test]
    fn test_from_bytes_invalid_length() {
        let result = KeyPair::from_bytes(&[0u8; 100], &[0u8; PRIVATE_KEY_LENGTH]);
        match result {
            Err(PqcError::InvalidLength {
                what,
                expected,
                actual,
            }) => {
                assert_eq!(what, "public key");
                assert_eq!(expected, PUBLIC_KEY_LENGTH);
                assert_eq!(actual, 100);
            }
            other => panic!("Expected InvalidLength, got {:?}", other),
        }

        // FIPS 204 sized private keys are rejected too
        let result = KeyPair::from_bytes(&[0u8; PUBLIC_KEY_LENGTH], &[0u8; 4032]);
        assert!(matches!(
            result,
            Err(PqcError::InvalidLength {
                what: "private key",
                ..
            })
        ));
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let keypair =
            KeyPair::from_bytes(&[7u8; PUBLIC_KEY_LENGTH], &[0xAB; PRIVATE_KEY_LENGTH]).unwrap();
        let rendered = format!("{:?}", keypair);

        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("171"));
    }

    #[test]
    fn test_signature_from_bytes() {
        let sig = Signature::from_bytes(&[0u8; SIGNATURE_LENGTH]).unwrap();
        assert_eq!(sig.len(), SIGNATURE_LENGTH);
        assert!(!sig.is_empty());

        assert!(Signature::from_bytes(&[0u8; 3309]).is_err());
    }
}
