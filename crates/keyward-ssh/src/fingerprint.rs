// ABOUTME: Discovery of public keys in the SSH directory and their SHA256 fingerprints.
// ABOUTME: Key names are the .pub file names with the suffix stripped.

use crate::error::{KeywardError, Result};
use ssh_key::{HashAlg, PublicKey};
use std::path::{Path, PathBuf};

/// Public key suffix written by ssh-keygen.
pub const PUBLIC_KEY_SUFFIX: &str = ".pub";

/// A public key file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemKey {
    /// Base name shared by the key pair, without `.pub`.
    pub name: String,
    pub path: PathBuf,
}

impl SystemKey {
    /// `SHA256:<base64>` fingerprint, `None` when the file does not parse.
    pub fn fingerprint(&self) -> Option<String> {
        fingerprint_file(&self.path)
    }
}

/// Compute the OpenSSH style SHA256 fingerprint of a public key.
pub fn compute_fingerprint(public_key: &PublicKey) -> String {
    public_key.fingerprint(HashAlg::Sha256).to_string()
}

/// Read and fingerprint a public key file.
pub fn fingerprint_file(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    match PublicKey::from_openssh(content.trim()) {
        Ok(key) => Some(compute_fingerprint(&key)),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "unparseable public key");
            None
        }
    }
}

/// Base name of a public key file, or `None` if it is not a `.pub` file.
pub fn key_name_from_file(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(PUBLIC_KEY_SUFFIX)
        .filter(|name| !name.is_empty())
}

/// List public key files in `ssh_dir`, sorted by name.
///
/// A missing directory yields an empty list.
pub fn scan_public_keys(ssh_dir: &Path) -> Result<Vec<SystemKey>> {
    let entries = match std::fs::read_dir(ssh_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(dir = %ssh_dir.display(), "ssh directory does not exist");
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(KeywardError::ReadFile {
                path: ssh_dir.to_path_buf(),
                source: e,
            })
        }
    };

    let mut keys = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| KeywardError::ReadFile {
            path: ssh_dir.to_path_buf(),
            source: e,
        })?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str().and_then(key_name_from_file) else {
            continue;
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        keys.push(SystemKey {
            name: name.to_string(),
            path,
        });
    }

    keys.sort_by(|a, b| a.name.cmp(&b.name));
    tracing::debug!(dir = %ssh_dir.display(), count = keys.len(), "scanned public keys");
    Ok(keys)
}
