//! Timestamped backup containers.
//!
//! The install flow moves every managed path that currently exists into a fresh container
//! named `nibras-backup-YYYYMMDD-HHMMSS` below the config root (see [recorder]). The uninstall
//! flow lists those containers newest first and moves a chosen container's entries back into
//! place (see [selector]).
//!
//! A container stores nothing but its entries: one `<name>-old` directory or file per managed
//! path that existed when the backup was taken. Its identity is its name.

pub mod recorder;
pub mod selector;

pub use self::recorder::{create_backup, BackupReport};
pub use self::selector::{delete_backup, list_backups, restore, run_restore, select, RestoreOutcome};

use crate::configs::path::ManagedPath;
use chrono::NaiveDateTime;
use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

pub const CONTAINER_PREFIX: &str = "nibras-backup-";
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// A backup container on disk. Ordered chronologically, ties broken by the disambiguator
/// appended when two backups land in the same second.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackupContainer {
    pub id: String,
    pub path: PathBuf,
    pub created: NaiveDateTime,
    pub sequence: u32,
}

impl BackupContainer {
    /// Build the container name for a timestamp. Sequence 0 and 1 both mean "no suffix".
    pub fn name_for(created: &NaiveDateTime, sequence: u32) -> String {
        let stamp = created.format(TIMESTAMP_FORMAT);

        if sequence > 1 {
            format!("{}{}-{}", CONTAINER_PREFIX, stamp, sequence)
        } else {
            format!("{}{}", CONTAINER_PREFIX, stamp)
        }
    }

    /// Parse a container from its directory; `None` if the name does not follow the pattern.
    pub fn from_path(path: &Path) -> Option<BackupContainer> {
        let id = path.file_name()?.to_str()?;
        let (created, sequence) = parse_name(id)?;

        Some(BackupContainer {
            id: id.to_string(),
            path: path.to_path_buf(),
            created,
            sequence,
        })
    }

    pub fn entry_path(&self, managed: &ManagedPath) -> PathBuf {
        self.path.join(managed.entry_name())
    }

    /// Managed paths with an entry still present in this container.
    pub fn entries<'a>(&self, managed: &'a [ManagedPath]) -> Vec<&'a ManagedPath> {
        managed
            .iter()
            .filter(|m| crate::fsops::exists(&self.entry_path(m)))
            .collect()
    }
}

impl Ord for BackupContainer {
    fn cmp(&self, other: &Self) -> Ordering {
        self.created
            .cmp(&other.created)
            .then(self.sequence.cmp(&other.sequence))
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for BackupContainer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BackupContainer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.created.format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Split `nibras-backup-YYYYMMDD-HHMMSS[-N]` into its timestamp and sequence number.
fn parse_name(name: &str) -> Option<(NaiveDateTime, u32)> {
    let rest = name.strip_prefix(CONTAINER_PREFIX)?;
    let mut parts = rest.split('-');

    let date = parts.next()?;
    let time = parts.next()?;
    if date.len() != 8 || time.len() != 6 {
        return None;
    }
    let created =
        NaiveDateTime::parse_from_str(&format!("{}-{}", date, time), TIMESTAMP_FORMAT).ok()?;

    let sequence = match parts.next() {
        None => 1,
        Some(seq) if !seq.is_empty() && seq.bytes().all(|b| b.is_ascii_digit()) => {
            seq.parse().ok()?
        }
        Some(_) => return None,
    };

    if parts.next().is_some() {
        return None;
    }

    Some((created, sequence))
}
