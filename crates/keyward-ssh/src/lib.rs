// ABOUTME: Library root for keyward-ssh.
// ABOUTME: Re-exports key generation, expiration records, sync, and ssh config helpers.

//! # keyward-ssh
//!
//! Manages local SSH key pairs:
//!
//! - generates keys named `id_<type>_<label>_<date>` through `ssh-keygen`
//! - records creation and expiration dates in `expiration_dates.json`
//! - appends `Host` blocks to the ssh client config
//! - reconciles the record file against the `.pub` files on disk

pub mod error;
pub mod fingerprint;
pub mod host;
pub mod key;
pub mod listing;
pub mod manager;
pub mod prompt;
pub mod records;
pub mod settings;
pub mod sync;

pub use error::{KeywardError, Result};
pub use fingerprint::{compute_fingerprint, scan_public_keys, SystemKey};
pub use host::{append_host_entry, HostEntry};
pub use key::{key_file_name, KeyGenerator, KeyType, KeygenOutput, KeygenRequest, SshKeygen};
pub use manager::{ConfigUpdate, GenerateOutcome, KeyManager};
pub use prompt::{Decline, Prompter};
pub use records::{KeyRecord, RecordStore};
pub use settings::Settings;
pub use sync::{prune, reconcile, synchronize, SyncReport};

pub use chrono::NaiveDate;
