//! Shared native library lifecycle
//!
//! One [`LibraryManager`] owns at most one loaded [`NativeLibrary`] and
//! counts the engines using it.
//!
//! ```text
//! Uninitialized ──initialize_once()──▶ Initialized ──acquire()──▶ live += 1
//!       ▲                                                          │
//!       └──────────── last release(): unload + delete ◀── live -= 1
//! ```
//!
//! - `initialize_once` is double-checked: a lock-free flag read, then the
//!   mutex and a re-check. The flag is set only after all five exports
//!   resolved, and stays unset on failure so the next call retries.
//! - `acquire` pins the library under the mutex and increments the count.
//! - `release` is a single atomic decrement-and-compare; only the caller that
//!   observes the transition to zero takes the mutex, re-checks the count and
//!   tears the library down.

use crate::config::{load_config_from_env, SignerConfig};
use crate::error::{PqcError, Result};
use crate::loader::NativeLibrary;
use crate::resource::NativeResource;
use lazy_static::lazy_static;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

lazy_static! {
    static ref GLOBAL_MANAGER: Arc<LibraryManager> = Arc::new(LibraryManager::from_env());
}

pub struct LibraryManager {
    config: SignerConfig,
    resource: NativeResource,
    initialized: AtomicBool,
    library: Mutex<Option<Arc<NativeLibrary>>>,
    live: AtomicUsize,
}

/// Counted use of a manager's library; releases on drop
pub(crate) struct LibraryLease {
    manager: Arc<LibraryManager>,
}

impl Drop for LibraryLease {
    fn drop(&mut self) {
        self.manager.release();
    }
}

impl LibraryManager {
    pub fn new(config: SignerConfig) -> Self {
        let resource = NativeResource::from_config(&config);
        Self {
            config,
            resource,
            initialized: AtomicBool::new(false),
            library: Mutex::new(None),
            live: AtomicUsize::new(0),
        }
    }

    /// Process-wide manager, configured from `PQC_SIGNER_*` on first use
    pub fn global() -> Arc<LibraryManager> {
        Arc::clone(&GLOBAL_MANAGER)
    }

    fn from_env() -> Self {
        match load_config_from_env() {
            Ok(config) => Self::new(config),
            Err(e) => {
                warn!(error = %e, "Ignoring invalid signer environment configuration, using defaults");
                Self::new(SignerConfig::default())
            }
        }
    }

    pub fn config(&self) -> &SignerConfig {
        &self.config
    }

    pub fn resource(&self) -> &NativeResource {
        &self.resource
    }

    /// Load the native library unless it is already loaded
    ///
    /// # Errors
    /// - `InitializationError` wrapping the staging, load or resolution failure
    pub fn initialize_once(&self) -> Result<()> {
        if self.initialized.load(Ordering::Acquire) {
            return Ok(());
        }

        let mut slot = self.lock_library();
        self.load_locked(&mut slot).map(|_| ())
    }

    fn load_locked(&self, slot: &mut Option<Arc<NativeLibrary>>) -> Result<Arc<NativeLibrary>> {
        if let Some(library) = slot.as_ref() {
            return Ok(Arc::clone(library));
        }

        debug!(resource = %self.resource.describe(), "Initializing native signature library");

        let library = NativeLibrary::load(&self.resource, &self.config).map_err(|e| {
            error!(
                resource = %self.resource.describe(),
                error = %e,
                "Native signature library initialization failed"
            );
            PqcError::from(e)
        })?;

        let library = Arc::new(library);
        *slot = Some(Arc::clone(&library));
        self.initialized.store(true, Ordering::Release);
        Ok(library)
    }

    /// Pin the loaded library for one engine, loading it if needed
    pub(crate) fn acquire(self: &Arc<Self>) -> Result<(LibraryLease, Arc<NativeLibrary>)> {
        let mut slot = self.lock_library();
        let library = self.load_locked(&mut slot)?;
        let live = self.live.fetch_add(1, Ordering::AcqRel) + 1;
        drop(slot);

        debug!(live, "Acquired native signature library");

        let lease = LibraryLease {
            manager: Arc::clone(self),
        };
        Ok((lease, library))
    }

    fn release(&self) {
        let previous = self.live.fetch_sub(1, Ordering::AcqRel);
        if previous != 1 {
            debug!(live = previous - 1, "Released native signature library");
            return;
        }

        let mut slot = self.lock_library();
        // An acquire may have slipped in between the decrement and the lock
        if self.live.load(Ordering::Acquire) != 0 {
            debug!("Native signature library re-acquired during release, keeping it loaded");
            return;
        }

        if let Some(library) = slot.take() {
            self.initialized.store(false, Ordering::Release);
            info!(
                path = %library.staged_path().display(),
                "Last signature engine released, tearing down native library"
            );
            drop(library);
        }
    }

    /// Number of engines currently holding the library
    pub fn live_engines(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Path of the staged library file while loaded
    pub fn staged_path(&self) -> Option<PathBuf> {
        self.lock_library()
            .as_ref()
            .map(|library| library.staged_path().to_path_buf())
    }

    fn lock_library(&self) -> MutexGuard<'_, Option<Arc<NativeLibrary>>> {
        self.library.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for LibraryManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryManager")
            .field("resource", &self.resource)
            .field("initialized", &self.is_initialized())
            .field("live", &self.live_engines())
            .finish()
    }
}
