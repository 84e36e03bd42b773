// ABOUTME: KeyManager ties key generation, config appends, records, and listings together.
// ABOUTME: All paths come from Settings; the keygen and prompts are injected.

use crate::error::Result;
use crate::fingerprint::scan_public_keys;
use crate::host::{append_host_entry, read_config, HostEntry};
use crate::key::{key_file_name, KeyGenerator, KeyType, KeygenOutput, KeygenRequest};
use crate::listing::{format_config, format_records};
use crate::prompt::Prompter;
use crate::records::{KeyRecord, RecordStore};
use crate::settings::Settings;
use crate::sync::{reconcile, SyncReport};
use chrono::{Local, NaiveDate};
use std::collections::BTreeMap;

pub const ADD_TO_CONFIG_PROMPT: &str = "Would you like to add this Key to the SSH config?";
pub const HOSTNAME_PROMPT: &str = "Enter SSH hostname";
pub const USERNAME_PROMPT: &str = "Enter SSH username";

/// Config entry and record written for a freshly generated key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigUpdate {
    pub entry: HostEntry,
    pub record: KeyRecord,
    /// True when this write created the record file.
    pub created_records_file: bool,
}

/// Result of a `generate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOutcome {
    pub key_name: String,
    pub output: KeygenOutput,
    /// Present only when the keygen succeeded and the user accepted the config prompt.
    pub config: Option<ConfigUpdate>,
}

impl GenerateOutcome {
    pub fn succeeded(&self) -> bool {
        self.output.success
    }
}

pub struct KeyManager<G, P> {
    settings: Settings,
    generator: G,
    prompter: P,
    today: Option<NaiveDate>,
}

impl<G: KeyGenerator, P: Prompter> KeyManager<G, P> {
    pub fn new(settings: Settings, generator: G, prompter: P) -> Self {
        Self {
            settings,
            generator,
            prompter,
            today: None,
        }
    }

    /// Pin the date used for names and records instead of the local clock.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Generate `id_<type>_<label>_<date>` in the SSH directory.
    ///
    /// A failing keygen is reported in the outcome and skips the config prompt.
    pub fn generate(&mut self, key_type: KeyType, label: &str) -> Result<GenerateOutcome> {
        let key_name = key_file_name(key_type, label, self.today());
        let request = KeygenRequest::new(key_type, self.settings.key_path(&key_name));

        let output = self.generator.generate(&request)?;
        if !output.success {
            tracing::warn!(key = %key_name, code = ?output.code, "key generation failed");
            return Ok(GenerateOutcome {
                key_name,
                output,
                config: None,
            });
        }

        tracing::info!(key = %key_name, "generated key pair");
        let config = self.add_to_config(&key_name)?;
        Ok(GenerateOutcome {
            key_name,
            output,
            config,
        })
    }

    /// Ask whether to add `key_name` to the ssh config and, if so, append the
    /// host block and record its expiration.
    pub fn add_to_config(&mut self, key_name: &str) -> Result<Option<ConfigUpdate>> {
        if !self.prompter.confirm(ADD_TO_CONFIG_PROMPT)? {
            return Ok(None);
        }
        let host = self.prompter.input(HOSTNAME_PROMPT)?;
        let user = self.prompter.input(USERNAME_PROMPT)?;

        // Records must load before the config is touched.
        let records_path = self.settings.records_path();
        let created_records_file = !records_path.exists();
        let mut store = RecordStore::load(&records_path)?;

        let entry = HostEntry::new(host, user, self.settings.key_path(key_name));
        append_host_entry(&self.settings.config_path(), &entry)?;

        let record = KeyRecord::issued(self.today());
        store.upsert(key_name, record);
        store.save(&records_path)?;
        Ok(Some(ConfigUpdate {
            entry,
            record,
            created_records_file,
        }))
    }

    /// Insert or update one record. Returns true if the record file was new.
    pub fn record_key(&self, key_name: &str, record: KeyRecord) -> Result<bool> {
        let path = self.settings.records_path();
        let created = !path.exists();
        let mut store = RecordStore::load(&path)?;
        store.upsert(key_name, record);
        store.save(&path)?;
        Ok(created)
    }

    pub fn list_keys(&self) -> Result<String> {
        let store = RecordStore::load_existing(&self.settings.records_path())?;
        let fingerprints: BTreeMap<String, String> = scan_public_keys(&self.settings.ssh_dir)?
            .into_iter()
            .filter(|key| store.contains(&key.name))
            .filter_map(|key| key.fingerprint().map(|fp| (key.name, fp)))
            .collect();
        Ok(format_records(&store, &fingerprints, self.today()))
    }

    pub fn list_config(&self) -> Result<String> {
        let contents = read_config(&self.settings.config_path())?;
        Ok(format_config(&contents))
    }

    pub fn sync(&self) -> Result<SyncReport> {
        reconcile(
            &self.settings.ssh_dir,
            &self.settings.records_path(),
            self.today(),
        )
    }
}
