//! Signer setup for the command tests

use pqc_signer::{LibraryManager, SignatureEngine, SignerConfig};
use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::path::PathBuf;
use std::sync::Arc;

/// The `pqc-native` library cargo built beside this test binary
///
/// `PQC_SIGNER_LIBRARY_PATH` overrides the lookup.
pub fn native_library_path() -> PathBuf {
    if let Some(path) = std::env::var_os("PQC_SIGNER_LIBRARY_PATH") {
        return PathBuf::from(path);
    }

    let exe = std::env::current_exe().expect("test executable path");
    let deps = exe.parent().expect("test executable directory");
    let exact = format!("{}pqc_native{}", DLL_PREFIX, DLL_SUFFIX);
    let hashed_prefix = format!("{}pqc_native-", DLL_PREFIX);

    if let Some(found) = [Some(deps), deps.parent()]
        .into_iter()
        .flatten()
        .map(|dir| dir.join(&exact))
        .find(|candidate| candidate.is_file())
    {
        return found;
    }

    std::fs::read_dir(deps)
        .expect("test executable directory listing")
        .flatten()
        .map(|entry| entry.path())
        .find(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy())
                .is_some_and(|name| name.starts_with(&hashed_prefix) && name.ends_with(DLL_SUFFIX))
        })
        .unwrap_or_else(|| {
            panic!(
                "{} not found near {}; set PQC_SIGNER_LIBRARY_PATH",
                exact,
                exe.display()
            )
        })
}

/// Engine on a private manager, the way the binary builds one per command
pub fn engine() -> SignatureEngine {
    let config = SignerConfig::with_library_path(native_library_path());
    SignatureEngine::with_manager(Arc::new(LibraryManager::new(config)))
        .expect("engine over the native library")
}
