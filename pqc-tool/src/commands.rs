//! Subcommand implementations
//!
//! Each command takes its signer from the caller so the binary decides which
//! library manager backs it.

use crate::config::{Encoding, ToolConfig};
use crate::error::{Result, ToolError};
use crate::keyfile::{self, KeyPaths};
use base64::{engine::general_purpose, Engine as _};
use pqc_signer::{AlgorithmInfo, Dilithium3, LibraryManager, Signer, EXPORTED_SYMBOLS};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Serialize)]
pub struct InfoReport {
    pub algorithm: AlgorithmInfo,
    pub library_source: String,
    pub embedded_library: bool,
    pub exported_symbols: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct KeygenReport {
    pub public_key: PathBuf,
    pub secret_key: PathBuf,
    pub fingerprint: String,
}

/// Describe the algorithm and where the native library would come from
pub fn run_info(config: &ToolConfig) -> Result<String> {
    let manager = LibraryManager::new(config.signer.clone());
    let report = InfoReport {
        algorithm: Dilithium3::info(),
        library_source: manager.resource().describe(),
        embedded_library: pqc_signer::resource::has_embedded_library(),
        exported_symbols: EXPORTED_SYMBOLS.to_vec(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

pub fn run_keygen(signer: &dyn Signer, out_dir: &Path, overwrite: bool) -> Result<KeygenReport> {
    let keypair = signer.generate_key_pair()?;
    let KeyPaths { public, secret } = keyfile::write_keypair(out_dir, &keypair, overwrite)?;
    let fingerprint = keyfile::fingerprint(keypair.public_key());

    info!(fingerprint = %fingerprint, "Generated {} keypair", signer.algorithm_name());

    Ok(KeygenReport {
        public_key: public,
        secret_key: secret,
        fingerprint,
    })
}

/// Sign `input`, returning the encoded signature
///
/// The encoded signature is also written to `output` when given.
pub fn run_sign(
    signer: &dyn Signer,
    secret_key: &Path,
    input: &Path,
    output: Option<&Path>,
    encoding: Encoding,
) -> Result<String> {
    let private_key = keyfile::read_secret_key(secret_key)?;
    let message = fs::read(input).map_err(ToolError::io(input))?;

    let signature = signer.sign(&message, &private_key)?;
    let encoded = encode(signature.as_bytes(), encoding);

    debug!(
        msg_len = message.len(),
        sig_len = signature.len(),
        encoding = encoding.name(),
        "Signed input"
    );

    if let Some(output) = output {
        fs::write(output, format!("{}\n", encoded)).map_err(ToolError::io(output))?;
        info!(path = %output.display(), "Signature written");
    }

    Ok(encoded)
}

/// Verify the encoded signature in `signature_file` over `input`
pub fn run_verify(
    signer: &dyn Signer,
    public_key: &Path,
    input: &Path,
    signature_file: &Path,
    encoding: Encoding,
) -> Result<bool> {
    let public_key = keyfile::read_public_key(public_key)?;
    let message = fs::read(input).map_err(ToolError::io(input))?;
    let encoded = fs::read_to_string(signature_file).map_err(ToolError::io(signature_file))?;
    let signature = decode(&encoded, encoding)?;

    let valid = signer.verify(&message, &signature, &public_key)?;
    debug!(msg_len = message.len(), valid, "Verified input");
    Ok(valid)
}

pub fn encode(bytes: &[u8], encoding: Encoding) -> String {
    match encoding {
        Encoding::Base64 => general_purpose::STANDARD.encode(bytes),
        Encoding::Hex => hex::encode(bytes),
    }
}

/// Decode text produced by [`encode`], ignoring surrounding whitespace
pub fn decode(text: &str, encoding: Encoding) -> Result<Vec<u8>> {
    let text = text.trim();
    let decoded = match encoding {
        Encoding::Base64 => general_purpose::STANDARD
            .decode(text)
            .map_err(|e| e.to_string()),
        Encoding::Hex => hex::decode(text).map_err(|e| e.to_string()),
    };
    decoded.map_err(|reason| ToolError::Encoding {
        encoding: encoding.name(),
        reason,
    })
}
