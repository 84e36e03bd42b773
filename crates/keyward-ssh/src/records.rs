// ABOUTME: Expiration record store persisted as expiration_dates.json in the SSH directory.
// ABOUTME: Maps key base names to creation and expiration dates under a top-level "Keys" field.

use crate::error::{KeywardError, Result};
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// How long a key stays valid after creation.
pub const VALIDITY_MONTHS: u32 = 12;

/// Creation and expiration dates of one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    #[serde(rename = "dateOfCreation", deserialize_with = "lenient_date")]
    pub date_of_creation: NaiveDate,

    // Early versions of the file used "expires" when the store was first created.
    #[serde(alias = "expires", deserialize_with = "lenient_date")]
    pub expiration: NaiveDate,
}

/// Parse `YYYY-MM-DD`, reading 29 February of a non-leap year as 28 February.
///
/// Older files computed expiration by bumping the year, which produced such dates.
pub fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    let year = raw.strip_suffix("-02-29")?.parse::<i32>().ok()?;
    NaiveDate::from_ymd_opt(year, 2, 28)
}

fn lenient_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_record_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{raw}'")))
}

impl KeyRecord {
    /// Record for a key created on `created`, expiring one year later.
    ///
    /// 29 February rolls to 28 February of the following year.
    pub fn issued(created: NaiveDate) -> Self {
        let expiration = created
            .checked_add_months(Months::new(VALIDITY_MONTHS))
            .unwrap_or(NaiveDate::MAX);
        Self {
            date_of_creation: created,
            expiration,
        }
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiration < today
    }
}

/// The whole record document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordStore {
    #[serde(rename = "Keys", default)]
    keys: BTreeMap<String, KeyRecord>,
}

impl RecordStore {
    /// Load the store from disk. A missing file is an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no expiration records yet");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(KeywardError::ReadFile {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };

        serde_json::from_str(&content).map_err(|e| KeywardError::ParseRecords {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load the store, failing if the file has never been written.
    pub fn load_existing(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(KeywardError::ReadFile {
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "expiration record file does not exist",
                ),
            });
        }
        Self::load(path)
    }

    /// Write the store as 4-space indented JSON, replacing the file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)
            .map_err(KeywardError::SerializeRecords)?;

        std::fs::write(path, buf).map_err(|e| KeywardError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        tracing::info!(path = %path.display(), keys = self.keys.len(), "saved expiration records");
        Ok(())
    }

    /// Insert or replace the record for `name`. Returns the previous record, if any.
    pub fn upsert(&mut self, name: impl Into<String>, record: KeyRecord) -> Option<KeyRecord> {
        self.keys.insert(name.into(), record)
    }

    pub fn remove(&mut self, name: &str) -> Option<KeyRecord> {
        self.keys.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&KeyRecord> {
        self.keys.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.keys.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Records in key name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &KeyRecord)> {
        self.keys.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.keys.keys()
    }
}
