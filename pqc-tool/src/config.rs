//! Tool configuration
//!
//! ```toml
//! [signer]
//! library_path = "/opt/pqc/libpqc_native.so"
//! staging_dir = "/var/tmp"
//!
//! [output]
//! encoding = "hex"
//! ```

use crate::error::{Result, ToolError};
use config::{Config, File};
use pqc_signer::config::validate_config as validate_signer_config;
use pqc_signer::SignerConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Text encoding of signatures on disk and on stdout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    Base64,
    Hex,
}

impl Encoding {
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Base64 => "base64",
            Encoding::Hex => "hex",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub encoding: Encoding,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub signer: SignerConfig,
    pub output: OutputConfig,
}

/// `<config_dir>/pqc-tool/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pqc-tool").join("config.toml"))
}

/// Load tool configuration from a file (TOML, JSON, YAML)
pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<ToolConfig> {
    let config = Config::builder()
        .add_source(File::from(config_path.as_ref()))
        .build()
        .map_err(|e| ToolError::Config(format!("Failed to load config file: {}", e)))?;

    let tool_config: ToolConfig = config
        .try_deserialize()
        .map_err(|e| ToolError::Config(format!("Failed to parse config: {}", e)))?;

    validate_config(&tool_config)?;

    Ok(tool_config)
}

pub fn validate_config(config: &ToolConfig) -> Result<()> {
    validate_signer_config(&config.signer).map_err(|e| ToolError::Config(e.to_string()))
}
