//! Locates the `pqc-native` shared library built next to the unit test binary

use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::path::PathBuf;

pub(crate) fn native_library_path() -> PathBuf {
    if let Some(path) = std::env::var_os("PQC_SIGNER_LIBRARY_PATH") {
        return PathBuf::from(path);
    }

    let exe = std::env::current_exe().expect("test executable path");
    let deps = exe.parent().expect("test executable directory");
    let exact = format!("{}pqc_native{}", DLL_PREFIX, DLL_SUFFIX);
    let hashed_prefix = format!("{}pqc_native-", DLL_PREFIX);

    for dir in [Some(deps), deps.parent()].into_iter().flatten() {
        let candidate = dir.join(&exact);
        if candidate.is_file() {
            return candidate;
        }
    }

    std::fs::read_dir(deps)
        .into_iter()
        .flatten()
        .flatten()
        .map(|entry| entry.path())
        .find(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy())
                .is_some_and(|name| name.starts_with(&hashed_prefix) && name.ends_with(DLL_SUFFIX))
        })
        .unwrap_or_else(|| panic!("native library {} not found near {}", exact, exe.display()))
}
