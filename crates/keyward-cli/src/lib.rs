// ABOUTME: CLI library components for the keyward binary.
// ABOUTME: Flag definitions, legacy flag rewriting, terminal prompts, and command dispatch.

//! # keyward-cli
//!
//! Command-line front end for managing local SSH keys:
//!
//! ```text
//! keyward -n github -kt ed25519   # generate id_ed25519_github_<date>
//! keyward -l                      # list expiration records
//! keyward -lc                     # print ~/.ssh/config
//! keyward -s                      # reconcile records with .pub files
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use keyward_ssh::settings::default_settings_path;
use keyward_ssh::{
    Decline, GenerateOutcome, KeyGenerator, KeyManager, KeyType, KeywardError, Prompter, Settings,
    SyncReport,
};
use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;

/// Version of the keyward CLI
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const USAGE_HINT: &str = "Provide --list-config, --list-keys, or provide -n (name of key) AND --key-type (type of SSH key) to generate a key.";

#[derive(Parser, Debug)]
#[command(name = "keyward")]
#[command(about = "Generate and manage SSH keys and SSH config.")]
#[command(version)]
pub struct Cli {
    /// Unique name for the SSH key.
    #[arg(short = 'n', long)]
    pub name: Option<String>,

    /// The type of key to generate: rsa or ed25519 (also -kt).
    #[arg(long = "key-type", default_value = "rsa")]
    pub key_type: KeyType,

    /// List keys in the expiration record with their creation and expiration dates.
    #[arg(short = 'l', long = "list-keys")]
    pub list_keys: bool,

    /// Print the contents of the ssh config file (also -lc).
    #[arg(long = "list-config")]
    pub list_config: bool,

    /// Prune and refill the expiration record to match the .pub files on disk.
    #[arg(short = 's', long = "sync-keys")]
    pub sync_keys: bool,

    /// SSH directory (defaults to ~/.ssh)
    #[arg(long, env = "KEYWARD_SSH_DIR")]
    pub ssh_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// What a single invocation does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    ListKeys,
    ListConfig,
    Sync,
    Generate { key_type: KeyType, name: String },
    Usage,
}

impl Cli {
    /// Listing wins over config listing, which wins over sync, which wins over generation.
    pub fn mode(&self) -> Mode {
        if self.list_keys {
            Mode::ListKeys
        } else if self.list_config {
            Mode::ListConfig
        } else if self.sync_keys {
            Mode::Sync
        } else {
            match self.name.as_deref() {
                Some(name) if !name.is_empty() => Mode::Generate {
                    key_type: self.key_type,
                    name: name.to_string(),
                },
                _ => Mode::Usage,
            }
        }
    }
}

/// Rewrite the two-letter short flags `-kt` and `-lc` to their long forms.
///
/// `-kt` also takes an attached value, as in `-kted25519` or `-kt=ed25519`.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| match arg.to_str() {
            Some("-kt") => OsString::from("--key-type"),
            Some("-lc") => OsString::from("--list-config"),
            Some(s) if s.starts_with("-kt") => {
                let value = &s[3..];
                OsString::from(format!(
                    "--key-type={}",
                    value.strip_prefix('=').unwrap_or(value)
                ))
            }
            _ => arg,
        })
        .collect()
}

/// Prompts on the controlling terminal.
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&mut self, message: &str) -> keyward_ssh::Result<bool> {
        dialoguer::Confirm::new()
            .with_prompt(message)
            .default(false)
            .interact()
            .map_err(|e| KeywardError::Prompt(e.to_string()))
    }

    fn input(&mut self, message: &str) -> keyward_ssh::Result<String> {
        dialoguer::Input::<String>::new()
            .with_prompt(message)
            .interact_text()
            .map(|s| s.trim().to_string())
            .map_err(|e| KeywardError::Prompt(e.to_string()))
    }
}

/// Terminal prompts when attached to a tty, otherwise decline every question.
pub fn default_prompter() -> Box<dyn Prompter> {
    if std::io::stdin().is_terminal() {
        Box::new(TerminalPrompter)
    } else {
        tracing::debug!("stdin is not a terminal, skipping interactive prompts");
        Box::new(Decline)
    }
}

/// Settings from home defaults and the settings file, with `ssh_dir` taking precedence.
pub fn resolve_settings(ssh_dir: Option<PathBuf>) -> Result<Settings> {
    let Some(dir) = ssh_dir else {
        return Settings::load_default().context("Failed to load keyward settings");
    };

    let settings = match default_settings_path() {
        Some(path) if path.exists() => Settings::new(&dir)
            .merge_file(&path)
            .context("Failed to load keyward settings")?,
        _ => Settings::new(&dir),
    };
    Ok(Settings {
        ssh_dir: dir,
        ..settings
    })
}

pub fn render_generate(outcome: &GenerateOutcome, records_path: &std::path::Path) -> String {
    if !outcome.succeeded() {
        return outcome.output.stderr.clone();
    }

    let mut out = outcome.output.stdout.clone();
    if let Some(update) = &outcome.config {
        out.push_str(&format!(
            "\nKey created on {}. Key will expire on {}\n",
            update.record.date_of_creation, update.record.expiration
        ));
        if update.created_records_file {
            out.push_str(&format!(
                "\n----------\nExpiration Date file was not found, so it was created with the following path: {}\n",
                records_path.display()
            ));
        }
    }
    out
}

pub fn render_sync(report: &SyncReport) -> String {
    let mut lines = Vec::new();
    if !report.pruned.is_empty() {
        lines.push("Keys have been synchronized. Old keys have been removed.");
    }
    if !report.added.is_empty() {
        lines.push("Keys have been synchronized. System keys added to database.");
    }
    if lines.is_empty() {
        lines.push("Keys are already in sync.");
    }
    lines.join("\n")
}

/// Run one invocation with the given manager.
pub fn dispatch<G: KeyGenerator, P: Prompter>(
    mode: Mode,
    manager: &mut KeyManager<G, P>,
) -> Result<()> {
    match mode {
        Mode::ListKeys => {
            print!("{}", manager.list_keys().context("Failed to list keys")?);
        }
        Mode::ListConfig => {
            print!("{}", manager.list_config().context("Failed to read ssh config")?);
        }
        Mode::Sync => {
            let report = manager.sync().context("Failed to synchronize keys")?;
            println!("{}", render_sync(&report));
        }
        Mode::Generate { key_type, name } => {
            let outcome = manager
                .generate(key_type, &name)
                .context("Failed to generate key")?;
            let rendered = render_generate(&outcome, &manager.settings().records_path());
            if outcome.succeeded() {
                println!("{rendered}");
            } else {
                eprintln!("{rendered}");
            }
        }
        Mode::Usage => println!("{USAGE_HINT}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyward_ssh::{
        ConfigUpdate, HostEntry, KeyRecord, KeygenOutput, KeygenRequest, NaiveDate, RecordStore,
    };
    use std::path::Path;
    use tempfile::TempDir;

    /// Writes an empty key pair where ssh-keygen would.
    struct StubKeygen;

    impl KeyGenerator for StubKeygen {
        fn generate(&self, request: &KeygenRequest) -> keyward_ssh::Result<KeygenOutput> {
            std::fs::write(&request.path, "private").expect("write private");
            std::fs::write(request.public_key_path(), "public").expect("write public");
            Ok(KeygenOutput {
                success: true,
                code: Some(0),
                stdout: "saved".to_string(),
                stderr: String::new(),
            })
        }
    }

    fn stub_manager(dir: &Path) -> KeyManager<StubKeygen, Decline> {
        KeyManager::new(Settings::new(dir), StubKeygen, Decline).with_today(date(2024, 4, 1))
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(normalize_args(args.iter().copied())).expect("should parse")
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn test_normalize_rewrites_two_letter_flags() {
        let args = normalize_args(["keyward", "-kt", "ed25519", "-lc", "-kt=rsa", "-n", "x"]);
        assert_eq!(
            args,
            vec![
                OsString::from("keyward"),
                "--key-type".into(),
                "ed25519".into(),
                "--list-config".into(),
                "--key-type=rsa".into(),
                "-n".into(),
                "x".into(),
            ]
        );
    }

    #[test]
    fn test_normalize_attached_key_type_value() {
        let cli = parse(&["keyward", "-n", "x", "-kted25519"]);
        assert_eq!(cli.key_type, KeyType::Ed25519);
        let cli = parse(&["keyward", "-n", "x", "-kt=ed25519"]);
        assert_eq!(cli.key_type, KeyType::Ed25519);
    }

    #[test]
    fn test_dispatch_generate_then_sync() {
        let dir = TempDir::new().expect("should create temp dir");
        let mut manager = stub_manager(dir.path());

        let mode = parse(&["keyward", "-n", "laptop", "-kt", "ed25519"]).mode();
        dispatch(mode, &mut manager).expect("generate should succeed");
        assert!(dir.path().join("id_ed25519_laptop_2024-04-01.pub").exists());
        assert!(!dir.path().join("config").exists());

        dispatch(Mode::Sync, &mut manager).expect("sync should succeed");
        let store = RecordStore::load(&dir.path().join("expiration_dates.json")).expect("load");
        assert!(store.contains("id_ed25519_laptop_2024-04-01"));

        dispatch(Mode::ListKeys, &mut manager).expect("listing should succeed");
    }

    #[test]
    fn test_dispatch_listing_errors_surface() {
        let dir = TempDir::new().expect("should create temp dir");
        let mut manager = stub_manager(dir.path());

        assert!(dispatch(Mode::ListKeys, &mut manager).is_err());
        let err = dispatch(Mode::ListConfig, &mut manager).unwrap_err();
        assert!(err.to_string().contains("Failed to read ssh config"));
        dispatch(Mode::Usage, &mut manager).expect("usage never fails");
    }

    #[test]
    fn test_generate_mode_with_legacy_key_type_flag() {
        let cli = parse(&["keyward", "-n", "github", "-kt", "ed25519"]);
        assert_eq!(
            cli.mode(),
            Mode::Generate {
                key_type: KeyType::Ed25519,
                name: "github".to_string()
            }
        );
    }

    #[test]
    fn test_key_type_defaults_to_rsa() {
        let cli = parse(&["keyward", "--name", "work"]);
        assert_eq!(cli.key_type, KeyType::Rsa);
    }

    #[test]
    fn test_invalid_key_type_rejected() {
        let result = Cli::try_parse_from(normalize_args(["keyward", "-n", "x", "-kt", "dsa"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_mode_precedence() {
        assert_eq!(parse(&["keyward", "-l", "-lc", "-s"]).mode(), Mode::ListKeys);
        assert_eq!(parse(&["keyward", "-lc", "-s"]).mode(), Mode::ListConfig);
        assert_eq!(parse(&["keyward", "-s", "-n", "x"]).mode(), Mode::Sync);
    }

    #[test]
    fn test_no_flags_prints_usage() {
        assert_eq!(parse(&["keyward"]).mode(), Mode::Usage);
        assert_eq!(parse(&["keyward", "-kt", "rsa"]).mode(), Mode::Usage);
    }

    #[test]
    fn test_resolve_settings_prefers_explicit_dir() {
        let dir = tempfile::TempDir::new().expect("should create temp dir");
        let settings =
            resolve_settings(Some(dir.path().to_path_buf())).expect("should resolve settings");
        assert_eq!(settings.ssh_dir, dir.path());
    }

    #[test]
    fn test_render_sync_messages() {
        assert_eq!(render_sync(&SyncReport::default()), "Keys are already in sync.");
        let report = SyncReport {
            pruned: vec!["a".to_string()],
            added: vec!["b".to_string()],
        };
        assert_eq!(
            render_sync(&report),
            "Keys have been synchronized. Old keys have been removed.\nKeys have been synchronized. System keys added to database."
        );
    }

    #[test]
    fn test_render_generate_failure_shows_stderr() {
        let outcome = GenerateOutcome {
            key_name: "id_rsa_x_2024-01-01".to_string(),
            output: KeygenOutput {
                success: false,
                code: Some(1),
                stdout: String::new(),
                stderr: "boom".to_string(),
            },
            config: None,
        };
        assert_eq!(render_generate(&outcome, Path::new("/r.json")), "boom");
    }

    #[test]
    fn test_render_generate_with_config_update() {
        let outcome = GenerateOutcome {
            key_name: "id_rsa_x_2024-01-01".to_string(),
            output: KeygenOutput {
                success: true,
                code: Some(0),
                stdout: "saved\n".to_string(),
                stderr: String::new(),
            },
            config: Some(ConfigUpdate {
                entry: HostEntry::new("h", "u", "/k"),
                record: KeyRecord::issued(date(2024, 1, 1)),
                created_records_file: true,
            }),
        };
        let rendered = render_generate(&outcome, Path::new("/home/me/.ssh/expiration_dates.json"));
        assert!(rendered.starts_with("saved\n"));
        assert!(rendered.contains("Key created on 2024-01-01. Key will expire on 2025-01-01"));
        assert!(rendered.contains("created with the following path: /home/me/.ssh/expiration_dates.json"));
    }

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
