//! Unified interface for post-quantum signatures
use crate::dilithium::{KeyPair, Signature};
use crate::error::Result;

/// Signer trait
///
/// Object safe, so callers can hold an `Arc<dyn Signer>` without knowing
/// which engine backs it.
pub trait Signer: Send + Sync {
    /// Generate keypair
    fn generate_key_pair(&self) -> Result<KeyPair>;

    /// Sign message with a private key
    fn sign(&self, message: &[u8], private_key: &[u8]) -> Result<Signature>;

    /// Verify a detached signature against a public key
    fn verify(&self, message: &[u8], signature: &[u8], public_key: &[u8]) -> Result<bool>;

    /// Algorithm name
    fn algorithm_name(&self) -> &str;
}
