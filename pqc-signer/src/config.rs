//! Signer configuration
//!
//! Controls where the native library comes from and where it is staged
//! before loading. Loaded from a file or from `PQC_SIGNER_*` environment
//! variables.

use crate::error::{PqcError, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable prefix (`PQC_SIGNER_LIBRARY_PATH`, `PQC_SIGNER_STAGING_DIR`, ...)
pub const ENV_PREFIX: &str = "PQC_SIGNER";

/// Default file name prefix of the staged native library
pub const DEFAULT_TEMP_PREFIX: &str = "pqc-native-";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SignerConfig {
    /// Load the native library from this file instead of the embedded resource
    pub library_path: Option<PathBuf>,

    /// Directory for the staged copy (OS temp dir when unset)
    pub staging_dir: Option<PathBuf>,

    /// File name prefix of the staged copy
    pub temp_prefix: String,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            library_path: None,
            staging_dir: None,
            temp_prefix: DEFAULT_TEMP_PREFIX.to_string(),
        }
    }
}

impl SignerConfig {
    /// Configuration that loads the native library from `path`
    pub fn with_library_path(path: impl Into<PathBuf>) -> Self {
        Self {
            library_path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Staging directory, falling back to the OS temp dir
    pub fn staging_dir(&self) -> PathBuf {
        self.staging_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Load signer configuration from a file (TOML, JSON, YAML)
pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<SignerConfig> {
    let config = Config::builder()
        .add_source(File::from(config_path.as_ref()))
        .build()
        .map_err(|e| PqcError::ConfigError(format!("Failed to load config file: {}", e)))?;

    let signer_config: SignerConfig = config
        .try_deserialize()
        .map_err(|e| PqcError::ConfigError(format!("Failed to parse config: {}", e)))?;

    validate_config(&signer_config)?;

    Ok(signer_config)
}

/// Load signer configuration from `PQC_SIGNER_*` environment variables
pub fn load_config_from_env() -> Result<SignerConfig> {
    let config = Config::builder()
        .add_source(Environment::with_prefix(ENV_PREFIX))
        .build()
        .map_err(|e| PqcError::ConfigError(format!("Failed to load env vars: {}", e)))?;

    let signer_config: SignerConfig = config
        .try_deserialize()
        .map_err(|e| PqcError::ConfigError(format!("Failed to parse env config: {}", e)))?;

    validate_config(&signer_config)?;

    Ok(signer_config)
}

/// Check the configuration before any staging happens
///
/// A missing library file is not an error here: it surfaces as a missing
/// resource when the library is first initialized, and is retried then.
pub fn validate_config(config: &SignerConfig) -> Result<()> {
    if config.temp_prefix.is_empty() {
        return Err(PqcError::ConfigError(
            "temp_prefix must not be empty".to_string(),
        ));
    }

    if config.temp_prefix.contains(std::path::is_separator) {
        return Err(PqcError::ConfigError(format!(
            "temp_prefix must not contain a path separator: {}",
            config.temp_prefix
        )));
    }

    if let Some(path) = &config.library_path {
        if path.is_dir() {
            return Err(PqcError::ConfigError(format!(
                "library_path points to a directory: {}",
                path.display()
            )));
        }
    }

    if let Some(dir) = &config.staging_dir {
        if !dir.is_dir() {
            return Err(PqcError::ConfigError(format!(
                "staging_dir is not a directory: {}",
                dir.display()
            )));
        }
    }

    Ok(())
}
