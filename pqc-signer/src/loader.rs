//! Native library staging and loading
//!
//! The resource bytes are written to a freshly created temporary file
//! (exclusive create, unique name), the writer is closed, and the file is
//! loaded with `libloading`. Dropping a [`NativeLibrary`] unloads it and then
//! deletes the staged file.

use crate::config::SignerConfig;
use crate::error::InitializationError;
use crate::ffi::FunctionTable;
use crate::resource::NativeResource;
use libloading::Library;
use std::env::consts::DLL_SUFFIX;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::{debug, info, warn};

type LoadResult<T> = std::result::Result<T, InitializationError>;

/// A loaded native library together with its staged file and function table
pub struct NativeLibrary {
    table: FunctionTable,
    library: Option<Library>,
    staged: Option<TempPath>,
    staged_path: PathBuf,
}

/// Write `bytes` to a new temporary file in the configured staging directory
pub(crate) fn stage(bytes: &[u8], config: &SignerConfig) -> LoadResult<TempPath> {
    let dir = config.staging_dir();
    let staging_error = |source| InitializationError::Staging {
        dir: dir.clone(),
        source,
    };

    let mut file = tempfile::Builder::new()
        .prefix(&config.temp_prefix)
        .suffix(DLL_SUFFIX)
        .tempfile_in(&dir)
        .map_err(staging_error)?;

    file.write_all(bytes).map_err(staging_error)?;
    file.as_file().sync_all().map_err(staging_error)?;

    // Closes the writer; the path stays claimed until dropped
    Ok(file.into_temp_path())
}

impl NativeLibrary {
    /// Stage `resource`, load it and resolve the five exports
    pub(crate) fn load(resource: &NativeResource, config: &SignerConfig) -> LoadResult<Self> {
        let bytes = resource.open()?;
        let staged = stage(&bytes, config)?;
        let staged_path = staged.to_path_buf();

        debug!(
            resource = %resource.describe(),
            path = %staged_path.display(),
            size = bytes.len(),
            "Staged native library"
        );

        // SAFETY: the staged file is the signature library; its initializers
        // do not depend on process state we could violate.
        let library = unsafe { Library::new(&staged_path) }.map_err(|source| {
            InitializationError::LibraryLoad {
                path: staged_path.clone(),
                source,
            }
        })?;

        let table = FunctionTable::resolve(&library)?;

        info!(
            resource = %resource.describe(),
            path = %staged_path.display(),
            "Loaded native signature library"
        );

        Ok(Self {
            table,
            library: Some(library),
            staged: Some(staged),
            staged_path,
        })
    }

    pub(crate) fn table(&self) -> &FunctionTable {
        &self.table
    }

    /// Path of the staged copy
    pub fn staged_path(&self) -> &Path {
        &self.staged_path
    }
}

impl Drop for NativeLibrary {
    fn drop(&mut self) {
        if let Some(library) = self.library.take() {
            match library.close() {
                Ok(()) => info!(path = %self.staged_path.display(), "Unloaded native signature library"),
                Err(e) => warn!(
                    path = %self.staged_path.display(),
                    error = %e,
                    "Failed to unload native signature library"
                ),
            }
        }

        // Best effort: a leftover temp file is logged, never raised
        if let Some(staged) = self.staged.take() {
            if let Err(e) = staged.close() {
                warn!(
                    path = %self.staged_path.display(),
                    error = %e,
                    "Failed to delete staged native library"
                );
            }
        }
    }
}
