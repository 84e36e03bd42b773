// ABOUTME: Error types for key management operations using thiserror.
// ABOUTME: Provides typed errors for record I/O, config appends, keygen, and settings.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while managing SSH keys and their records.
#[derive(Error, Debug)]
pub enum KeywardError {
    /// Failed to read a file from disk.
    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file to disk.
    #[error("failed to write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The expiration record file is not valid JSON for the expected schema.
    #[error("failed to parse expiration records from {path}: {source}")]
    ParseRecords {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to serialize the expiration records.
    #[error("failed to serialize expiration records: {0}")]
    SerializeRecords(#[source] serde_json::Error),

    /// Failed to append a host entry to the ssh config.
    #[error("failed to append host entry to {path}: {source}")]
    AppendConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The key generation program could not be started.
    #[error("failed to run {program}: {source}")]
    SpawnKeygen {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read the settings file.
    #[error("failed to read settings from {path}: {source}")]
    ReadSettings {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the settings file.
    #[error("failed to parse settings from {path}: {source}")]
    ParseSettings {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// No home directory could be determined.
    #[error("could not determine home directory")]
    HomeDirectory,

    /// Interactive prompt failed.
    #[error("prompt failed: {0}")]
    Prompt(String),
}

/// Result type alias using KeywardError.
pub type Result<T> = std::result::Result<T, KeywardError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io;

    #[test]
    fn test_read_file_error_display() {
        let err = KeywardError::ReadFile {
            path: PathBuf::from("/path/to/records.json"),
            source: io::Error::new(io::ErrorKind::NotFound, "file not found"),
        };
        let display = format!("{}", err);
        assert!(display.contains("failed to read"));
        assert!(display.contains("/path/to/records.json"));
    }

    #[test]
    fn test_append_config_error_display() {
        let err = KeywardError::AppendConfig {
            path: PathBuf::from("/missing/.ssh/config"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such directory"),
        };
        let display = format!("{}", err);
        assert!(display.contains("failed to append host entry"));
        assert!(display.contains("/missing/.ssh/config"));
    }

    #[test]
    fn test_spawn_keygen_error_display() {
        let err = KeywardError::SpawnKeygen {
            program: "ssh-keygen".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        let display = format!("{}", err);
        assert!(display.contains("failed to run ssh-keygen"));
    }

    #[test]
    fn test_parse_records_error_has_source() {
        let source = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = KeywardError::ParseRecords {
            path: PathBuf::from("/path"),
            source,
        };
        assert!(err.source().is_some());
        assert!(format!("{}", err).contains("failed to parse expiration records"));
    }

    #[test]
    fn test_error_source_write_file() {
        let err = KeywardError::WriteFile {
            path: PathBuf::from("/path"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.source().is_some());
    }

    #[test]
    fn test_error_no_source_home_directory() {
        let err = KeywardError::HomeDirectory;
        assert!(err.source().is_none());
        assert_eq!(format!("{}", err), "could not determine home directory");
    }

    #[test]
    fn test_error_no_source_prompt() {
        let err = KeywardError::Prompt("stdin closed".to_string());
        assert!(err.source().is_none());
        assert!(format!("{:?}", err).contains("Prompt"));
    }
}
