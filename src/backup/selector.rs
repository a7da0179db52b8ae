use super::BackupContainer;
use crate::configs::error::{ConfigError, Result};
use crate::configs::path::{ManagedPath, Roots};
use crate::fsops;
use crate::prompt::Prompter;
use crate::report;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info};

/// Result of restoring one container.
#[derive(Debug, PartialEq)]
pub struct RestoreReport {
    pub container: String,
    /// Managed paths whose entry was moved back into place.
    pub restored: Vec<String>,
    /// Managed paths with no entry in the container; left untouched.
    pub missing: Vec<String>,
}

#[derive(Debug, PartialEq)]
pub enum RestoreOutcome {
    /// The user chose `0`.
    Skipped,
    Restored { report: RestoreReport, deleted: bool },
}

/// Every backup container directly below `root`, newest first.
///
/// # Errors
/// [ConfigError::NoBackupsFound](../../configs/error/enum.ConfigError.html) when there is no
/// container (including when `root` itself does not exist).
pub fn list_backups(root: &Path) -> Result<Vec<BackupContainer>> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(ConfigError::NoBackupsFound(root.to_path_buf()))
        }
        Err(err) => return Err(err.into()),
    };

    let mut containers = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }

        if let Some(container) = BackupContainer::from_path(&entry.path()) {
            containers.push(container);
        }
    }

    if containers.is_empty() {
        return Err(ConfigError::NoBackupsFound(root.to_path_buf()));
    }

    containers.sort_by(|a, b| b.cmp(a));
    debug!(count = containers.len(), "discovered backups");

    Ok(containers)
}

/// Resolve a 1-based selection. `0` means skip and yields `None`.
///
/// # Errors
/// [ConfigError::InvalidSelection](../../configs/error/enum.ConfigError.html) when `index`
/// is past the end of `containers`.
pub fn select(containers: &[BackupContainer], index: usize) -> Result<Option<&BackupContainer>> {
    match index {
        0 => Ok(None),
        n if n <= containers.len() => Ok(Some(&containers[n - 1])),
        n => Err(ConfigError::InvalidSelection {
            index: n,
            count: containers.len(),
        }),
    }
}

/// Move the container's entries back over their live locations.
///
/// Whatever currently lives at a restored location is destroyed first. Managed paths without
/// an entry are left alone, so restoring a container a second time is a no-op rather than an
/// error.
pub fn restore(
    container: &BackupContainer,
    managed: &[ManagedPath],
    roots: &Roots,
) -> Result<RestoreReport> {
    let mut report = RestoreReport {
        container: container.id.clone(),
        restored: Vec::new(),
        missing: Vec::new(),
    };

    for path in managed {
        let entry = container.entry_path(path);
        if !fsops::exists(&entry) {
            debug!(name = %path.name, "no entry in container");
            report.missing.push(path.name.clone());
            continue;
        }

        let live = path.live_path(roots);
        fsops::remove_path(&live)?;
        fsops::move_path(&entry, &live)?;

        info!(name = %path.name, live = %live.display(), "restored");
        report.restored.push(path.name.clone());
    }

    Ok(report)
}

/// Delete a container and every entry left in it.
pub fn delete_backup(container: &BackupContainer) -> Result<()> {
    info!(container = %container.id, "deleting backup");
    fsops::remove_path(&container.path)
}

/// Print the numbered containers, newest first.
pub fn print_backups(containers: &[BackupContainer], managed: &[ManagedPath]) {
    for (number, container) in containers.iter().enumerate() {
        let names: Vec<&str> = container
            .entries(managed)
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        let contents = if names.is_empty() {
            "empty".to_string()
        } else {
            names.join(", ")
        };

        println!("   {:>2}) {}  [{}]", number + 1, container, contents);
    }
}

/// List the backups, let the user pick one, restore it and offer to delete it afterwards.
///
/// # Errors
/// `NoBackupsFound` and `InvalidSelection` are returned before anything is touched.
pub fn run_restore(
    prompter: &mut dyn Prompter,
    root: &Path,
    managed: &[ManagedPath],
    roots: &Roots,
) -> Result<RestoreOutcome> {
    let containers = list_backups(root)?;

    report::info("Available backups (most recent first):");
    print_backups(&containers, managed);

    let index = prompter.number("Backup to restore (0 to skip):")?;
    let container = match select(&containers, index)? {
        Some(container) => container,
        None => return Ok(RestoreOutcome::Skipped),
    };

    let report = restore(container, managed, roots)?;

    let question = format!("Delete backup {} now that it is restored?", container.id);
    let deleted = if prompter.confirm(&question, false)? {
        delete_backup(container)?;
        true
    } else {
        false
    };

    Ok(RestoreOutcome::Restored { report, deleted })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::recorder::create_backup_at;
    use crate::configs::path::PathKind;
    use crate::prompt::{Answer, Scripted};
    use chrono::{NaiveDate, NaiveDateTime};
    use tempfile::TempDir;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn managed() -> Vec<ManagedPath> {
        vec![
            ManagedPath::new("hypr", PathKind::Config, "hypr", ".config/hypr"),
            ManagedPath::new("quickshell", PathKind::Config, "quickshell", ".config/quickshell"),
        ]
    }

    /// A sandbox with one backup holding `hypr` = "A", and freshly installed content "B"
    /// overlaid at the live location.
    fn backed_up_sandbox() -> (TempDir, Roots, BackupContainer) {
        let temp = TempDir::new().unwrap();
        let roots = Roots::with_home(temp.path());
        fs::create_dir_all(roots.config.join("hypr")).unwrap();
        fs::write(roots.config.join("hypr/hyprland.conf"), "A").unwrap();

        let report = create_backup_at(&roots.config, &managed(), &roots, day(1)).unwrap();

        fs::create_dir_all(roots.config.join("hypr")).unwrap();
        fs::write(roots.config.join("hypr/hyprland.conf"), "B").unwrap();
        fs::write(roots.config.join("hypr/installed.conf"), "B").unwrap();

        (temp, roots, report.container)
    }

    fn snapshot(roots: &Roots) -> Vec<(String, String)> {
        let mut files: Vec<(String, String)> = walkdir::WalkDir::new(&roots.config)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                (
                    e.path().display().to_string(),
                    fs::read_to_string(e.path()).unwrap(),
                )
            })
            .collect();
        files.sort();
        files
    }

    #[test]
    fn newest_backup_is_listed_first() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("nibras-backup-20240101-000000")).unwrap();
        fs::create_dir(temp.path().join("nibras-backup-20240102-000000")).unwrap();

        let ids: Vec<String> = list_backups(temp.path())
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();

        assert_eq!(
            ids,
            vec!["nibras-backup-20240102-000000", "nibras-backup-20240101-000000"]
        );
    }

    #[test]
    fn listing_is_strictly_descending() {
        let temp = TempDir::new().unwrap();
        for name in &[
            "nibras-backup-20231231-235959",
            "nibras-backup-20240315-080000",
            "nibras-backup-20240101-120000",
            "nibras-backup-20240101-120000-2",
        ] {
            fs::create_dir(temp.path().join(name)).unwrap();
        }

        let listed = list_backups(temp.path()).unwrap();

        assert!(listed.windows(2).all(|pair| pair[0] > pair[1]));
        assert_eq!(listed[1].id, "nibras-backup-20240101-120000-2");
    }

    #[test]
    fn foreign_entries_are_ignored() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("hypr")).unwrap();
        fs::create_dir(temp.path().join("nibras-backup-old")).unwrap();
        fs::write(temp.path().join("nibras-backup-20240101-000000"), "not a dir").unwrap();

        match list_backups(temp.path()) {
            Err(ConfigError::NoBackupsFound(root)) => assert_eq!(root, temp.path()),
            other => panic!("expected NoBackupsFound, got {:?}", other),
        }
    }

    #[test]
    fn missing_root_means_no_backups() {
        let temp = TempDir::new().unwrap();

        assert!(matches!(
            list_backups(&temp.path().join("absent")),
            Err(ConfigError::NoBackupsFound(_))
        ));
    }

    #[test]
    fn select_follows_one_based_numbering() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("nibras-backup-20240101-000000")).unwrap();
        fs::create_dir(temp.path().join("nibras-backup-20240102-000000")).unwrap();
        let listed = list_backups(temp.path()).unwrap();

        assert_eq!(select(&listed, 0).unwrap(), None);
        assert_eq!(select(&listed, 2).unwrap().unwrap().id, "nibras-backup-20240101-000000");
        assert!(matches!(
            select(&listed, 3),
            Err(ConfigError::InvalidSelection { index: 3, count: 2 })
        ));
    }

    #[test]
    fn restore_overwrites_live_content() {
        let (_temp, roots, container) = backed_up_sandbox();

        let report = restore(&container, &managed(), &roots).unwrap();

        assert_eq!(report.restored, vec!["hypr".to_string()]);
        assert_eq!(report.missing, vec!["quickshell".to_string()]);
        assert_eq!(
            fs::read_to_string(roots.config.join("hypr/hyprland.conf")).unwrap(),
            "A"
        );
        assert!(!roots.config.join("hypr/installed.conf").exists());
        assert!(!roots.config.join("quickshell").exists());
    }

    #[test]
    fn second_restore_is_a_no_op() {
        let (_temp, roots, container) = backed_up_sandbox();
        restore(&container, &managed(), &roots).unwrap();
        let before = snapshot(&roots);

        let again = restore(&container, &managed(), &roots).unwrap();

        assert!(again.restored.is_empty());
        assert_eq!(again.missing.len(), 2);
        assert_eq!(snapshot(&roots), before);
    }

    #[test]
    fn path_without_entry_keeps_its_live_state() {
        let (_temp, roots, container) = backed_up_sandbox();
        fs::create_dir_all(roots.config.join("quickshell")).unwrap();
        fs::write(roots.config.join("quickshell/shell.qml"), "fresh").unwrap();

        restore(&container, &managed(), &roots).unwrap();

        assert_eq!(
            fs::read_to_string(roots.config.join("quickshell/shell.qml")).unwrap(),
            "fresh"
        );
    }

    #[test]
    fn choosing_zero_skips_without_touching_anything() {
        let (_temp, roots, _container) = backed_up_sandbox();
        let before = snapshot(&roots);
        let mut prompter = Scripted::new(vec![Answer::Number(0)]);

        let outcome = run_restore(&mut prompter, &roots.config, &managed(), &roots).unwrap();

        assert_eq!(outcome, RestoreOutcome::Skipped);
        assert_eq!(snapshot(&roots), before);
        assert!(prompter.exhausted());
    }

    #[test]
    fn out_of_range_choice_is_rejected_without_touching_anything() {
        let (_temp, roots, _container) = backed_up_sandbox();
        let before = snapshot(&roots);
        let mut prompter = Scripted::new(vec![Answer::Number(2)]);

        let result = run_restore(&mut prompter, &roots.config, &managed(), &roots);

        assert!(matches!(
            result,
            Err(ConfigError::InvalidSelection { index: 2, count: 1 })
        ));
        assert_eq!(snapshot(&roots), before);
    }

    #[test]
    fn confirmed_restore_deletes_the_container() {
        let (_temp, roots, container) = backed_up_sandbox();
        let mut prompter = Scripted::new(vec![Answer::Number(1), Answer::Yes]);

        let outcome = run_restore(&mut prompter, &roots.config, &managed(), &roots).unwrap();

        match outcome {
            RestoreOutcome::Restored { report, deleted } => {
                assert!(deleted);
                assert_eq!(report.restored, vec!["hypr".to_string()]);
            }
            other => panic!("expected a restore, got {:?}", other),
        }
        assert!(!container.path.exists());
    }

    #[test]
    fn declined_deletion_keeps_the_container() {
        let (_temp, roots, container) = backed_up_sandbox();
        let mut prompter = Scripted::new(vec![Answer::Number(1), Answer::No]);

        run_restore(&mut prompter, &roots.config, &managed(), &roots).unwrap();

        assert!(container.path.is_dir());
    }
}
