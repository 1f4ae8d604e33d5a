//! Embeds the native Dilithium3 library named by `PQC_SIGNER_EMBED_LIBRARY`.
//!
//! Without the variable an empty resource is embedded and the signer reports
//! the resource as missing unless a library path is configured at runtime.

use std::{env, fs, path::PathBuf};

const EMBED_VAR: &str = "PQC_SIGNER_EMBED_LIBRARY";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-env-changed={EMBED_VAR}");
    println!("cargo:rerun-if-changed=build.rs");

    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    let target = out_dir.join("pqc_native.bin");

    match env::var_os(EMBED_VAR) {
        Some(source) => {
            let source = PathBuf::from(source);
            println!("cargo:rerun-if-changed={}", source.display());
            fs::copy(&source, &target).map_err(|e| {
                format!("failed to embed native library {}: {e}", source.display())
            })?;
        }
        None => fs::write(&target, b"")?,
    }

    Ok(())
}
