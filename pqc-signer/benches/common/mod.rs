//! Engine setup for the benchmarks

use pqc_signer::{LibraryManager, SignatureEngine, SignerConfig};
use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::path::PathBuf;
use std::sync::Arc;

/// `PQC_SIGNER_LIBRARY_PATH`, else the `pqc-native` build under `target/<profile>`
fn native_library_path() -> PathBuf {
    if let Some(path) = std::env::var_os("PQC_SIGNER_LIBRARY_PATH") {
        return PathBuf::from(path);
    }

    let exe = std::env::current_exe().expect("bench executable path");
    let deps = exe.parent().expect("bench executable directory");
    let name = format!("{}pqc_native{}", DLL_PREFIX, DLL_SUFFIX);
    let hashed_prefix = format!("{}pqc_native-", DLL_PREFIX);

    for dir in [Some(deps), deps.parent()].into_iter().flatten() {
        if dir.join(&name).is_file() {
            return dir.join(&name);
        }
    }

    let entries = std::fs::read_dir(deps).expect("bench executable directory listing");
    for entry in entries.flatten() {
        let file_name = entry.file_name();
        let file_name = file_name.to_string_lossy();
        if file_name.starts_with(&hashed_prefix) && file_name.ends_with(DLL_SUFFIX) {
            return entry.path();
        }
    }

    panic!("{} not found; set PQC_SIGNER_LIBRARY_PATH", name);
}

pub fn manager() -> Arc<LibraryManager> {
    let config = SignerConfig::with_library_path(native_library_path());
    Arc::new(LibraryManager::new(config))
}

pub fn engine() -> SignatureEngine {
    SignatureEngine::with_manager(manager()).expect("engine over the native library")
}
