// ABOUTME: Reconciles the expiration record store against public keys present on disk.
// ABOUTME: Prune drops records without a .pub file, synchronize adds records for untracked keys.

use crate::error::Result;
use crate::fingerprint::{scan_public_keys, SystemKey};
use crate::records::{KeyRecord, RecordStore};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::path::Path;

/// What a reconcile pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Records removed because their public key is gone.
    pub pruned: Vec<String>,
    /// Records created for public keys that were untracked.
    pub added: Vec<String>,
}

impl SyncReport {
    pub fn is_unchanged(&self) -> bool {
        self.pruned.is_empty() && self.added.is_empty()
    }
}

/// Remove every record whose key has no public key file. Returns removed names.
pub fn prune(store: &mut RecordStore, on_disk: &[SystemKey]) -> Vec<String> {
    let present: BTreeSet<&str> = on_disk.iter().map(|k| k.name.as_str()).collect();
    let stale: Vec<String> = store
        .names()
        .filter(|name| !present.contains(name.as_str()))
        .cloned()
        .collect();

    for name in &stale {
        store.remove(name);
    }
    stale
}

/// Add a record dated `today` for every public key not yet tracked. Returns added names.
pub fn synchronize(store: &mut RecordStore, on_disk: &[SystemKey], today: NaiveDate) -> Vec<String> {
    let mut added = Vec::new();
    for key in on_disk {
        if !store.contains(&key.name) {
            store.upsert(key.name.clone(), KeyRecord::issued(today));
            added.push(key.name.clone());
        }
    }
    added
}

/// Prune then synchronize the record file in `ssh_dir`, writing it once if anything changed.
pub fn reconcile(ssh_dir: &Path, records_path: &Path, today: NaiveDate) -> Result<SyncReport> {
    let on_disk = scan_public_keys(ssh_dir)?;
    let mut store = RecordStore::load(records_path)?;

    let report = SyncReport {
        pruned: prune(&mut store, &on_disk),
        added: synchronize(&mut store, &on_disk, today),
    };

    if report.is_unchanged() {
        tracing::debug!("expiration records already in sync");
    } else {
        tracing::info!(
            pruned = report.pruned.len(),
            added = report.added.len(),
            "reconciled expiration records"
        );
        store.save(records_path)?;
    }
    Ok(report)
}
