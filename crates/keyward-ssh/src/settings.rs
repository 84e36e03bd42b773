// ABOUTME: Runtime settings for keyward: where the SSH directory lives and which keygen to run.
// ABOUTME: Defaults to ~/.ssh and ssh-keygen, optionally overridden from a TOML file.

use crate::error::{KeywardError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File name of the expiration record store inside the SSH directory.
pub const RECORDS_FILE: &str = "expiration_dates.json";

/// File name of the SSH client configuration inside the SSH directory.
pub const CONFIG_FILE: &str = "config";

/// Default key generation program.
pub const DEFAULT_KEYGEN: &str = "ssh-keygen";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory holding key pairs, the ssh config and the record store.
    pub ssh_dir: PathBuf,

    /// Key generation program, looked up on PATH unless absolute.
    pub keygen_program: String,
}

fn default_keygen() -> String {
    DEFAULT_KEYGEN.to_string()
}

/// Optional overrides read from the settings file. Missing fields keep their defaults.
#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    ssh_dir: Option<String>,
    keygen_program: Option<String>,
}

/// Get XDG-style config directory (~/.config/keyward).
///
/// Uses `XDG_CONFIG_HOME` if set, otherwise falls back to `~/.config`.
pub fn xdg_config_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .map(|p| p.join("keyward"))
}

/// Get the default settings file path (~/.config/keyward/config.toml).
pub fn default_settings_path() -> Option<PathBuf> {
    xdg_config_dir().map(|p| p.join("config.toml"))
}

impl Settings {
    /// Settings rooted at an explicit SSH directory.
    pub fn new(ssh_dir: impl Into<PathBuf>) -> Self {
        Self {
            ssh_dir: ssh_dir.into(),
            keygen_program: default_keygen(),
        }
    }

    /// Settings pointing at `~/.ssh`.
    ///
    /// # Errors
    /// Returns `KeywardError::HomeDirectory` if no home directory is known.
    pub fn from_home() -> Result<Self> {
        let home = dirs::home_dir().ok_or(KeywardError::HomeDirectory)?;
        Ok(Self::new(home.join(".ssh")))
    }

    /// Resolve settings: home defaults, then the settings file if it exists.
    pub fn load_default() -> Result<Self> {
        let settings = Self::from_home()?;
        match default_settings_path() {
            Some(path) if path.exists() => settings.merge_file(&path),
            _ => Ok(settings),
        }
    }

    /// Apply overrides from a TOML settings file on top of `self`.
    ///
    /// `ssh_dir` may start with `~/`, which expands to the home directory.
    pub fn merge_file(mut self, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| KeywardError::ReadSettings {
            path: path.to_path_buf(),
            source: e,
        })?;
        let file: SettingsFile = toml::from_str(&content).map_err(|e| KeywardError::ParseSettings {
            path: path.to_path_buf(),
            source: e,
        })?;

        if let Some(dir) = file.ssh_dir {
            self.ssh_dir = expand_tilde(&dir)?;
        }
        if let Some(program) = file.keygen_program {
            self.keygen_program = program;
        }
        Ok(self)
    }

    pub fn records_path(&self) -> PathBuf {
        self.ssh_dir.join(RECORDS_FILE)
    }

    pub fn config_path(&self) -> PathBuf {
        self.ssh_dir.join(CONFIG_FILE)
    }

    /// Path of a private key inside the SSH directory.
    pub fn key_path(&self, key_name: &str) -> PathBuf {
        self.ssh_dir.join(key_name)
    }
}

fn expand_tilde(raw: &str) -> Result<PathBuf> {
    match raw.strip_prefix("~/") {
        Some(rest) => Ok(dirs::home_dir()
            .ok_or(KeywardError::HomeDirectory)?
            .join(rest)),
        None if raw == "~" => dirs::home_dir().ok_or(KeywardError::HomeDirectory),
        None => Ok(PathBuf::from(raw)),
    }
}
