use super::BackupContainer;
use crate::configs::error::{ConfigError, Result};
use crate::configs::path::{ManagedPath, Preserve, Roots};
use crate::fsops;
use chrono::{Local, NaiveDateTime};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info};

/// What happened to one managed path during a backup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryOutcome {
    Moved,
    Copied,
    /// Nothing lived at the path; no entry was recorded.
    Absent,
}

#[derive(Debug)]
pub struct BackupReport {
    pub container: BackupContainer,
    /// One outcome per managed path, in enumeration order.
    pub outcomes: Vec<(String, EntryOutcome)>,
}

impl BackupReport {
    pub fn preserved(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| *outcome != EntryOutcome::Absent)
            .count()
    }
}

/// Back up every existing managed path into a new container below `root`, timestamped now.
pub fn create_backup(root: &Path, managed: &[ManagedPath], roots: &Roots) -> Result<BackupReport> {
    create_backup_at(root, managed, roots, Local::now().naive_local())
}

/// Back up every existing managed path into a new container below `root` named after
/// `timestamp`.
///
/// Paths are visited in order; each one is either moved (or copied, for paths preserved by
/// copy) into the container as `<name>-old`, or skipped when absent. Each move stands on its
/// own, so an interrupted run leaves a container holding the entries handled so far.
///
/// # Errors
/// A [ConfigError](../../configs/error/enum.ConfigError.html) is returned if the container
/// cannot be created. A present path that cannot be moved yields
/// `ConfigError::PartialBackup`, naming the container that holds the entries preserved so far.
/// An absent path is never an error.
pub fn create_backup_at(
    root: &Path,
    managed: &[ManagedPath],
    roots: &Roots,
    timestamp: NaiveDateTime,
) -> Result<BackupReport> {
    let container = create_container(root, timestamp)?;
    info!(container = %container.id, "created backup container");

    let mut outcomes = Vec::with_capacity(managed.len());

    for path in managed {
        let live = path.live_path(roots);
        let entry = container.entry_path(path);

        let outcome = if !fsops::exists(&live) {
            debug!(name = %path.name, live = %live.display(), "absent, skipping");
            EntryOutcome::Absent
        } else {
            preserve(path, &live, &entry).map_err(|err| ConfigError::PartialBackup {
                container: container.id.clone(),
                name: path.name.clone(),
                source: Box::new(err),
            })?
        };

        debug!(name = %path.name, ?outcome, "backed up");
        outcomes.push((path.name.clone(), outcome));
    }

    Ok(BackupReport {
        container,
        outcomes,
    })
}

fn preserve(path: &ManagedPath, live: &Path, entry: &Path) -> Result<EntryOutcome> {
    match path.preserve {
        Preserve::Move => {
            fsops::move_path(live, entry)?;
            Ok(EntryOutcome::Moved)
        }
        Preserve::Copy => {
            fsops::copy_tree(live, entry)?;
            Ok(EntryOutcome::Copied)
        }
    }
}

/// Create a fresh container directory, appending `-2`, `-3`, ... when the plain name for this
/// second is already taken.
fn create_container(root: &Path, timestamp: NaiveDateTime) -> Result<BackupContainer> {
    fs::create_dir_all(root)?;

    let mut sequence = 1;
    loop {
        let path = root.join(BackupContainer::name_for(&timestamp, sequence));

        match fs::create_dir(&path) {
            Ok(()) => {
                return Ok(BackupContainer {
                    id: BackupContainer::name_for(&timestamp, sequence),
                    path,
                    created: timestamp,
                    sequence,
                })
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => sequence += 1,
            Err(err) => return Err(err.into()),
        }
    }
}
