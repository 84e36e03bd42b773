// ABOUTME: Text rendering for the key and config listings.
// ABOUTME: Key blocks carry dates, an expired marker, and the on-disk fingerprint when known.

use crate::records::RecordStore;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt::Write;

const RECORD_RULE: &str = "----------";
const CONFIG_RULE: &str = "__________";

/// One numbered block per record with creation and expiration dates.
///
/// Records that expired before `today` are marked `(expired)`. `fingerprints`
/// maps key names to the fingerprint of their public key file.
pub fn format_records(
    store: &RecordStore,
    fingerprints: &BTreeMap<String, String>,
    today: NaiveDate,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RECORD_RULE}");
    for (index, (name, record)) in store.iter().enumerate() {
        let marker = if record.is_expired(today) { " (expired)" } else { "" };
        let _ = write!(
            out,
            "\n\n{}: {} Created On: {} | Expires on: {}{}",
            index + 1,
            name,
            record.date_of_creation,
            record.expiration,
            marker,
        );
        if let Some(fingerprint) = fingerprints.get(name) {
            let _ = write!(out, "\n    Fingerprint: {fingerprint}");
        }
        let _ = writeln!(out, "\n\n{RECORD_RULE}");
    }
    out
}

/// Raw config contents framed by rules.
pub fn format_config(contents: &str) -> String {
    format!("{CONFIG_RULE}\n\n{contents}\n{CONFIG_RULE}\n")
}
