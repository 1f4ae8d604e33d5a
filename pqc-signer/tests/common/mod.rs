//! Shared helpers for integration tests
#![allow(dead_code)]

use pqc_signer::{LibraryManager, SignatureEngine, SignerConfig};
use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::path::PathBuf;
use std::sync::Arc;

/// Locate the native library built from the `pqc-native` crate
///
/// `PQC_SIGNER_LIBRARY_PATH` wins; otherwise the library is looked up next to
/// the test binary (`target/<profile>/deps`) and one level up.
pub fn native_library_path() -> PathBuf {
    if let Some(path) = std::env::var_os("PQC_SIGNER_LIBRARY_PATH") {
        return PathBuf::from(path);
    }

    let name = format!("{}pqc_native{}", DLL_PREFIX, DLL_SUFFIX);
    let exe = std::env::current_exe().expect("test executable path");
    let deps = exe.parent().expect("test executable directory");

    let candidates = [Some(deps), deps.parent()];
    for dir in candidates.into_iter().flatten() {
        let candidate = dir.join(&name);
        if candidate.is_file() {
            return candidate;
        }
    }

    // Hashed artifact names, e.g. libpqc_native-0123abcd.so
    let hashed_prefix = format!("{}pqc_native-", DLL_PREFIX);
    if let Ok(entries) = std::fs::read_dir(deps) {
        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            if file_name.starts_with(&hashed_prefix) && file_name.ends_with(DLL_SUFFIX) {
                return entry.path();
            }
        }
    }

    panic!(
        "native library {} not found near {}; build pqc-native or set PQC_SIGNER_LIBRARY_PATH",
        name,
        exe.display()
    );
}

pub fn signer_config() -> SignerConfig {
    SignerConfig::with_library_path(native_library_path())
}

/// A private manager so tests do not share a reference count
pub fn manager() -> Arc<LibraryManager> {
    Arc::new(LibraryManager::new(signer_config()))
}

pub fn engine() -> SignatureEngine {
    SignatureEngine::with_manager(manager()).expect("engine over the native library")
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
