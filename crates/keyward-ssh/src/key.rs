// ABOUTME: Key naming and key pair generation through an external keygen program.
// ABOUTME: The subprocess sits behind the KeyGenerator trait so it can be faked in tests.

use crate::error::{KeywardError, Result};
use chrono::NaiveDate;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;

/// Modulus size used for every rsa key.
pub const RSA_KEY_BITS: u32 = 4096;

/// Key algorithms keyward knows how to request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyType {
    #[default]
    Rsa,
    Ed25519,
}

impl KeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Rsa => "rsa",
            KeyType::Ed25519 => "ed25519",
        }
    }

    /// Bit size passed to the keygen, if the algorithm takes one.
    pub fn bits(&self) -> Option<u32> {
        match self {
            KeyType::Rsa => Some(RSA_KEY_BITS),
            KeyType::Ed25519 => None,
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rsa" => Ok(KeyType::Rsa),
            "ed25519" => Ok(KeyType::Ed25519),
            other => Err(format!(
                "unsupported key type '{other}' (expected rsa or ed25519)"
            )),
        }
    }
}

/// Build the key file base name: `id_<type>_<label>_<YYYY-MM-DD>`.
pub fn key_file_name(key_type: KeyType, label: &str, created: NaiveDate) -> String {
    format!("id_{}_{}_{}", key_type, label, created.format("%Y-%m-%d"))
}

/// A single request to the key generation program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeygenRequest {
    pub key_type: KeyType,
    /// Private key output path. The public half lands at `<path>.pub`.
    pub path: PathBuf,
}

impl KeygenRequest {
    pub fn new(key_type: KeyType, path: impl Into<PathBuf>) -> Self {
        Self {
            key_type,
            path: path.into(),
        }
    }

    /// Arguments handed to an `ssh-keygen` compatible program.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-t".into(), self.key_type.as_str().into()];
        if let Some(bits) = self.key_type.bits() {
            args.push("-b".into());
            args.push(bits.to_string().into());
        }
        args.push("-f".into());
        args.push(self.path.as_os_str().to_owned());
        args
    }

    /// Path of the public key the program is expected to write.
    pub fn public_key_path(&self) -> PathBuf {
        public_key_path(&self.path)
    }
}

/// `<private>.pub`, appended rather than replacing any dotted suffix in the name.
pub fn public_key_path(private_key: &Path) -> PathBuf {
    let mut raw = private_key.as_os_str().to_owned();
    raw.push(".pub");
    PathBuf::from(raw)
}

/// Captured result of running the key generation program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeygenOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Something that can produce a key pair on disk.
pub trait KeyGenerator {
    /// Run the generator. A non-zero exit is reported through `KeygenOutput`,
    /// only a failure to start the program is an error.
    fn generate(&self, request: &KeygenRequest) -> Result<KeygenOutput>;
}

/// Runs an external `ssh-keygen` compatible binary.
#[derive(Debug, Clone)]
pub struct SshKeygen {
    program: String,
}

impl SshKeygen {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Build the command without running it.
    ///
    /// stdin is inherited so the passphrase prompt still reaches the user.
    pub fn command(&self, request: &KeygenRequest) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(request.args())
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

impl Default for SshKeygen {
    fn default() -> Self {
        Self::new(crate::settings::DEFAULT_KEYGEN)
    }
}

impl KeyGenerator for SshKeygen {
    fn generate(&self, request: &KeygenRequest) -> Result<KeygenOutput> {
        tracing::debug!(
            program = %self.program,
            key_type = %request.key_type,
            path = %request.path.display(),
            "running key generator"
        );

        let output = self
            .command(request)
            .output()
            .map_err(|e| KeywardError::SpawnKeygen {
                program: self.program.clone(),
                source: e,
            })?;

        Ok(KeygenOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn test_key_file_name_rsa() {
        let name = key_file_name(KeyType::Rsa, "github", date(2024, 3, 7));
        assert_eq!(name, "id_rsa_github_2024-03-07");
    }

    #[test]
    fn test_key_file_name_ed25519() {
        let name = key_file_name(KeyType::Ed25519, "work", date(2025, 12, 31));
        assert_eq!(name, "id_ed25519_work_2025-12-31");
    }

    #[test]
    fn test_key_type_parse() {
        assert_eq!("rsa".parse::<KeyType>(), Ok(KeyType::Rsa));
        assert_eq!("ED25519".parse::<KeyType>(), Ok(KeyType::Ed25519));
        let err = "dsa".parse::<KeyType>().unwrap_err();
        assert!(err.contains("dsa"));
    }

    #[test]
    fn test_key_type_default_is_rsa() {
        assert_eq!(KeyType::default(), KeyType::Rsa);
    }

    #[test]
    fn test_rsa_args_include_bit_size() {
        let request = KeygenRequest::new(KeyType::Rsa, "/keys/id_rsa_x_2024-01-01");
        let args: Vec<String> = request
            .args()
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec!["-t", "rsa", "-b", "4096", "-f", "/keys/id_rsa_x_2024-01-01"]
        );
    }

    #[test]
    fn test_ed25519_args_omit_bit_size() {
        let request = KeygenRequest::new(KeyType::Ed25519, "/keys/id_ed25519_x_2024-01-01");
        let args: Vec<String> = request
            .args()
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args, vec!["-t", "ed25519", "-f", "/keys/id_ed25519_x_2024-01-01"]);
    }

    #[test]
    fn test_public_key_path_appends_suffix() {
        let request = KeygenRequest::new(KeyType::Rsa, "/keys/id_rsa_my.host_2024-01-01");
        assert_eq!(
            request.public_key_path(),
            PathBuf::from("/keys/id_rsa_my.host_2024-01-01.pub")
        );
    }

    #[test]
    fn test_command_uses_configured_program() {
        let keygen = SshKeygen::new("/opt/bin/ssh-keygen");
        let request = KeygenRequest::new(KeyType::Ed25519, "/keys/k");
        let command = keygen.command(&request);
        assert_eq!(command.get_program(), "/opt/bin/ssh-keygen");
        assert_eq!(command.get_args().count(), 4);
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let keygen = SshKeygen::new("/nonexistent/keyward-test-keygen");
        let request = KeygenRequest::new(KeyType::Ed25519, "/tmp/never-written");
        let err = keygen.generate(&request).unwrap_err();
        assert!(matches!(err, KeywardError::SpawnKeygen { .. }));
    }
}
