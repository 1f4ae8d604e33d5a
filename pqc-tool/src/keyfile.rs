//! Dilithium3 key files
//!
//! Raw key bytes, one file per key:
//!
//! ```text
//! {dir}/
//!   ├── dilithium3_public.key  (1952 bytes, 0644)
//!   └── dilithium3_secret.key  (4000 bytes, 0600)
//! ```
//!
//! The secret key is stored unencrypted; file permissions are the only
//! protection.

use crate::error::{Result, ToolError};
use pqc_signer::dilithium::{PRIVATE_KEY_LENGTH, PUBLIC_KEY_LENGTH};
use pqc_signer::KeyPair;
use sha3::{Digest, Sha3_256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use zeroize::Zeroizing;

pub const PUBLIC_KEY_FILE: &str = "dilithium3_public.key";
pub const SECRET_KEY_FILE: &str = "dilithium3_secret.key";

/// Where a keypair was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPaths {
    pub public: PathBuf,
    pub secret: PathBuf,
}

impl KeyPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            public: dir.join(PUBLIC_KEY_FILE),
            secret: dir.join(SECRET_KEY_FILE),
        }
    }
}

/// Write a keypair into `dir`, creating it if needed
///
/// Existing key files are only replaced when `overwrite` is set.
pub fn write_keypair(dir: &Path, keypair: &KeyPair, overwrite: bool) -> Result<KeyPaths> {
    fs::create_dir_all(dir).map_err(ToolError::io(dir))?;

    let paths = KeyPaths::in_dir(dir);
    if !overwrite {
        for path in [&paths.public, &paths.secret] {
            if path.exists() {
                return Err(ToolError::KeyFile(format!(
                    "{} already exists, pass --force to replace it",
                    path.display()
                )));
            }
        }
    }

    fs::write(&paths.public, keypair.public_key()).map_err(ToolError::io(&paths.public))?;
    fs::write(&paths.secret, keypair.private_key()).map_err(ToolError::io(&paths.secret))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        fs::set_permissions(&paths.secret, fs::Permissions::from_mode(0o600))
            .map_err(ToolError::io(&paths.secret))?;
        fs::set_permissions(&paths.public, fs::Permissions::from_mode(0o644))
            .map_err(ToolError::io(&paths.public))?;
    }

    #[cfg(not(unix))]
    {
        warn!("File permissions not set (non-Unix system), protect the secret key manually");
    }

    info!(dir = %dir.display(), "Keypair written");
    Ok(paths)
}

/// Read a public key file, checking its length
pub fn read_public_key(path: &Path) -> Result<Vec<u8>> {
    let bytes = fs::read(path).map_err(ToolError::io(path))?;
    check_key_length(path, "public key", PUBLIC_KEY_LENGTH, bytes.len())?;
    Ok(bytes)
}

/// Read a secret key file, checking its length and warning on loose permissions
pub fn read_secret_key(path: &Path) -> Result<Zeroizing<Vec<u8>>> {
    let bytes = Zeroizing::new(fs::read(path).map_err(ToolError::io(path))?);
    check_key_length(path, "secret key", PRIVATE_KEY_LENGTH, bytes.len())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mode = fs::metadata(path)
            .map_err(ToolError::io(path))?
            .permissions()
            .mode()
            & 0o777;
        if mode & 0o077 != 0 {
            let mode = format!("{:o}", mode);
            warn!(
                path = %path.display(),
                mode = %mode,
                "Secret key file is readable by others, run chmod 600"
            );
        }
    }

    Ok(bytes)
}

fn check_key_length(path: &Path, what: &str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(ToolError::KeyFile(format!(
            "{} is not a Dilithium3 {}: expected {} bytes, got {}",
            path.display(),
            what,
            expected,
            actual
        )));
    }
    Ok(())
}

/// SHA3-256 of the public key, hex encoded
pub fn fingerprint(public_key: &[u8]) -> String {
    hex::encode(Sha3_256::digest(public_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_keypair() -> KeyPair {
        KeyPair::from_bytes(&[0x11; PUBLIC_KEY_LENGTH], &[0x22; PRIVATE_KEY_LENGTH]).unwrap()
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let keypair = sample_keypair();

        let paths = write_keypair(dir.path(), &keypair, false).unwrap();
        assert_eq!(paths, KeyPaths::in_dir(dir.path()));

        assert_eq!(read_public_key(&paths.public).unwrap(), keypair.public_key());
        assert_eq!(
            read_secret_key(&paths.secret).unwrap().as_slice(),
            keypair.private_key()
        );
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("keys").join("release");

        let paths = write_keypair(&nested, &sample_keypair(), false).unwrap();
        assert!(paths.public.is_file());
        assert!(paths.secret.is_file());
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        write_keypair(dir.path(), &sample_keypair(), false).unwrap();

        match write_keypair(dir.path(), &sample_keypair(), false) {
            Err(ToolError::KeyFile(msg)) => assert!(msg.contains("already exists")),
            other => panic!("Expected KeyFile error, got {:?}", other),
        }
        assert!(write_keypair(dir.path(), &sample_keypair(), true).is_ok());
    }

    #[test]
    #[cfg(unix)]
    fn test_key_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let paths = write_keypair(dir.path(), &sample_keypair(), false).unwrap();

        let secret_mode = fs::metadata(&paths.secret).unwrap().permissions().mode() & 0o777;
        let public_mode = fs::metadata(&paths.public).unwrap().permissions().mode() & 0o777;
        assert_eq!(secret_mode, 0o600, "Secret key should have 0o600 permissions");
        assert_eq!(public_mode, 0o644, "Public key should have 0o644 permissions");
    }

    #[test]
    fn test_wrong_length_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.key");
        fs::write(&path, [0u8; 32]).unwrap();

        assert!(matches!(read_public_key(&path), Err(ToolError::KeyFile(_))));
        assert!(matches!(read_secret_key(&path), Err(ToolError::KeyFile(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = read_public_key(Path::new("/no/such/dilithium3_public.key"));
        assert!(matches!(result, Err(ToolError::Io { .. })));
    }

    #[test]
    fn test_fingerprint() {
        let fp = fingerprint(&[0x11; PUBLIC_KEY_LENGTH]);
        assert_eq!(fp.len(), 64);
        assert_eq!(fp, fingerprint(&[0x11; PUBLIC_KEY_LENGTH]));
        assert_ne!(fp, fingerprint(&[0x12; PUBLIC_KEY_LENGTH]));
    }
}
