// ABOUTME: Host blocks appended to the SSH client configuration file.
// ABOUTME: Appends create the file but never its directory.

use crate::error::{KeywardError, Result};
use std::fmt;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// One `Host` block pointing at a generated identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEntry {
    pub host: String,
    pub user: String,
    pub identity_file: PathBuf,
}

impl HostEntry {
    pub fn new(host: impl Into<String>, user: impl Into<String>, identity_file: impl Into<PathBuf>) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
            identity_file: identity_file.into(),
        }
    }
}

impl fmt::Display for HostEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Host {}", self.host)?;
        writeln!(f, "    HostName {}", self.host)?;
        writeln!(f, "    User {}", self.user)?;
        writeln!(f, "    IdentityFile {}", self.identity_file.display())
    }
}

/// Append `entry` to the config file at `path`.
///
/// The file is created if absent; a missing parent directory is an error.
pub fn append_host_entry(path: &Path, entry: &HostEntry) -> Result<()> {
    let map_err = |e: std::io::Error| KeywardError::AppendConfig {
        path: path.to_path_buf(),
        source: e,
    };

    let mut file = std::fs::OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)
        .map_err(map_err)?;

    // Keep the new block off the last line of a file without a trailing newline.
    let len = file.metadata().map_err(map_err)?.len();
    if len > 0 {
        let mut last = [0u8; 1];
        file.seek(SeekFrom::Start(len - 1)).map_err(map_err)?;
        file.read_exact(&mut last).map_err(map_err)?;
        if last[0] != b'\n' {
            file.write_all(b"\n").map_err(map_err)?;
        }
    }

    file.write_all(entry.to_string().as_bytes()).map_err(map_err)?;
    tracing::info!(path = %path.display(), host = %entry.host, "appended host entry");
    Ok(())
}

/// Read the whole config file.
pub fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| KeywardError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })
}
