//! pqc-tool: Dilithium3 keys and detached signatures from the command line
//!
//! ```text
//! pqc-tool info
//! pqc-tool keygen --out ./keys
//! pqc-tool sign   --key ./keys/dilithium3_secret.key --input report.json --output report.sig
//! pqc-tool verify --key ./keys/dilithium3_public.key --input report.json --signature report.sig
//! ```
//!
//! `verify` exits with 0 for a valid signature and 1 otherwise.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pqc_signer::{LibraryManager, SignatureEngine};
use pqc_tool::commands;
use pqc_tool::config::{self, Encoding, ToolConfig};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Dilithium3 key generation, signing and verification
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path (default: <config_dir>/pqc-tool/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Native library to load instead of the embedded one (overrides config file)
    #[arg(long)]
    library: Option<PathBuf>,

    /// Signature text encoding (overrides config file)
    #[arg(long, value_enum)]
    encoding: Option<Encoding>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print algorithm and native library information as JSON
    Info,

    /// Generate a keypair into a directory
    Keygen {
        /// Output directory
        #[arg(short, long)]
        out: PathBuf,

        /// Replace existing key files
        #[arg(long, default_value_t = false)]
        force: bool,
    },

    /// Sign a file with a secret key
    Sign {
        /// Secret key file
        #[arg(short, long)]
        key: PathBuf,

        /// File to sign
        #[arg(short, long)]
        input: PathBuf,

        /// Write the signature here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify a detached signature
    Verify {
        /// Public key file
        #[arg(short, long)]
        key: PathBuf,

        /// Signed file
        #[arg(short, long)]
        input: PathBuf,

        /// Signature file
        #[arg(short, long)]
        signature: PathBuf,
    },
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    init_logging(&args.log_level, args.log_format)?;
    debug!("pqc-tool v{}", env!("CARGO_PKG_VERSION"));

    let mut config = load_configuration(args.config.as_deref())?;

    // Command line arguments override config file
    if let Some(library) = args.library {
        config.signer.library_path = Some(library);
    }
    if let Some(encoding) = args.encoding {
        config.output.encoding = encoding;
    }
    config::validate_config(&config).context("Invalid configuration")?;

    run(args.command, config)
}

fn run(command: Command, config: ToolConfig) -> Result<ExitCode> {
    let encoding = config.output.encoding;

    match command {
        Command::Info => {
            println!("{}", commands::run_info(&config)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Keygen { out, force } => {
            let engine = create_engine(&config)?;
            let report = commands::run_keygen(&engine, &out, force)
                .with_context(|| format!("Failed to generate keys into {}", out.display()))?;

            println!("public key:  {}", report.public_key.display());
            println!("secret key:  {}", report.secret_key.display());
            println!("fingerprint: {}", report.fingerprint);
            Ok(ExitCode::SUCCESS)
        }
        Command::Sign { key, input, output } => {
            let engine = create_engine(&config)?;
            let encoded =
                commands::run_sign(&engine, &key, &input, output.as_deref(), encoding)
                    .with_context(|| format!("Failed to sign {}", input.display()))?;

            if output.is_none() {
                println!("{}", encoded);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Verify {
            key,
            input,
            signature,
        } => {
            let engine = create_engine(&config)?;
            let valid = commands::run_verify(&engine, &key, &input, &signature, encoding)
                .with_context(|| format!("Failed to verify {}", input.display()))?;

            if valid {
                println!("valid");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("invalid");
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

/// Engine on a private manager, so the staged library is gone when the command returns
fn create_engine(config: &ToolConfig) -> Result<SignatureEngine> {
    let manager = Arc::new(LibraryManager::new(config.signer.clone()));
    info!(resource = %manager.resource().describe(), "Loading native signature library");
    SignatureEngine::with_manager(manager).context("Failed to initialize signature engine")
}

/// Initialize logging system
fn init_logging(log_level: &str, format: LogFormat) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => {
            eprintln!("Unknown log level: {}, using WARN", log_level);
            tracing::Level::WARN
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}

/// Load configuration file
fn load_configuration(explicit: Option<&Path>) -> Result<ToolConfig> {
    if let Some(path) = explicit {
        if !path.exists() {
            bail!("Configuration file does not exist: {}", path.display());
        }
        return config::load_config(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()));
    }

    match config::default_config_path() {
        Some(path) if path.exists() => {
            debug!(path = %path.display(), "Loading configuration");
            config::load_config(&path).context("Failed to load configuration")
        }
        Some(path) => {
            debug!(path = %path.display(), "No configuration file, using defaults");
            Ok(ToolConfig::default())
        }
        None => {
            warn!("No configuration directory on this platform, using defaults");
            Ok(ToolConfig::default())
        }
    }
}
