//! The install and uninstall flows.
//!
//! Both take their collaborators (prompter, package manager, archive extractor) through a
//! [Session](struct.Session.html), so they run the same way under test as on a terminal.
use crate::archive::{ExtractOutcome, Extractor};
use crate::backup::{self, BackupReport, RestoreOutcome};
use crate::configs::error::{ConfigError, Result};
use crate::configs::manager::{PackageManager, PackageReport};
use crate::configs::path::Roots;
use crate::configs::ShellConfig;
use crate::fsops;
use crate::prompt::Prompter;
use crate::report;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::info;

/// Everything a flow needs besides the configuration.
pub struct Session<'a> {
    pub roots: &'a Roots,
    pub prompter: &'a mut dyn Prompter,
    pub packages: &'a dyn PackageManager,
    pub extractor: &'a dyn Extractor,
}

#[derive(Debug, Default)]
pub struct InstallSummary {
    pub packages: PackageReport,
    pub backup: Option<BackupReport>,
    pub overlaid: Vec<String>,
    /// Managed paths with nothing to overlay in the checkout.
    pub missing_sources: Vec<String>,
    pub executables: usize,
    pub archives_extracted: Vec<String>,
    pub archives_missing: Vec<String>,
    pub archives_failed: Vec<String>,
}

#[derive(Debug, Default)]
pub struct UninstallSummary {
    pub restore: Option<RestoreOutcome>,
    /// Managed paths deleted by a full removal.
    pub removed: Vec<String>,
    pub packages: Option<PackageReport>,
}

/// Install packages, back up the current configuration, overlay the dotfiles checkout and
/// unpack the themes. Returns `None` when the user declines to start.
pub fn install(cfg: &ShellConfig, session: &mut Session) -> Result<Option<InstallSummary>> {
    if !session
        .prompter
        .confirm("Install NibrasShell? Existing configuration will be backed up.", true)?
    {
        report::info("Installation cancelled.");
        return Ok(None);
    }

    let mut summary = InstallSummary::default();

    report::step("Installing packages");
    summary.packages = session.packages.install(&cfg.packages);
    report_packages(&summary.packages, "installed");

    report::step("Preparing dotfiles");
    let checkout = prepare_checkout(cfg, session)?;
    report::success(&format!("Using dotfiles at {}", checkout.display()));

    report::step("Backing up current configuration");
    let backup = backup::create_backup(&session.roots.config, &cfg.managed, session.roots)?;
    if backup.preserved() == 0 {
        report::info("Nothing to back up.");
    } else {
        report::success(&format!(
            "Backed up {} path(s) to {}",
            backup.preserved(),
            backup.container.path.display()
        ));
    }
    summary.backup = Some(backup);

    report::step("Copying configuration");
    for managed in &cfg.managed {
        let source = managed.source_path(&checkout);
        if !fsops::exists(&source) {
            report::warn(&format!(
                "{} not found in dotfiles, skipping",
                managed.source.display()
            ));
            summary.missing_sources.push(managed.name.clone());
            continue;
        }

        let live = managed.live_path(session.roots);
        fsops::copy_tree(&source, &live)?;
        info!(name = %managed.name, live = %live.display(), "overlaid");
        summary.overlaid.push(managed.name.clone());
    }
    report::success(&format!("Copied {} configuration(s)", summary.overlaid.len()));

    report::step("Setting permissions");
    for location in &cfg.executables {
        let path = location.resolve(session.roots);
        if fsops::exists(&path) {
            summary.executables += fsops::make_executable(&path)?;
        }
    }
    report::success(&format!("Marked {} file(s) executable", summary.executables));

    report::step("Extracting themes");
    for theme in &cfg.archives {
        let archive = checkout.join(&theme.archive);
        let target = theme.target.resolve(session.roots);

        match session.extractor.extract(&archive, &target) {
            Ok(ExtractOutcome::Extracted) => {
                report::success(&format!("Extracted {} to {}", theme.name, target.display()));
                summary.archives_extracted.push(theme.name.clone());
            }
            Ok(ExtractOutcome::Missing) => {
                report::warn(&format!("{} not found, skipping", archive.display()));
                summary.archives_missing.push(theme.name.clone());
            }
            Err(err) => {
                report::warn(&format!("Could not extract {}: {}", theme.name, err));
                summary.archives_failed.push(theme.name.clone());
            }
        }
    }

    Ok(Some(summary))
}

/// Offer to restore a backup; failing that, offer to delete the shell's configuration. Then
/// offer to remove the packages.
pub fn uninstall(cfg: &ShellConfig, session: &mut Session) -> Result<UninstallSummary> {
    let mut summary = UninstallSummary::default();

    if session
        .prompter
        .confirm("Restore a previous configuration backup?", true)?
    {
        report::step("Restoring backup");
        match backup::run_restore(
            session.prompter,
            &session.roots.config,
            &cfg.managed,
            session.roots,
        ) {
            Ok(RestoreOutcome::Skipped) => {
                report::info("Restore skipped.");
                summary.restore = Some(RestoreOutcome::Skipped);
            }
            Ok(restored) => {
                if let RestoreOutcome::Restored { report: done, deleted } = &restored {
                    report::success(&format!(
                        "Restored {} from {}",
                        describe(&done.restored),
                        done.container
                    ));
                    if *deleted {
                        report::success(&format!("Deleted {}", done.container));
                    }
                }
                summary.restore = Some(restored);
            }
            Err(err) if !err.is_fatal() => report::failure(&err),
            Err(err) => return Err(err),
        }
    }

    let restored = matches!(summary.restore, Some(RestoreOutcome::Restored { .. }));
    if !restored
        && session.prompter.confirm(
            "Remove all NibrasShell configuration? This cannot be undone.",
            false,
        )?
    {
        report::step("Removing configuration");
        for managed in &cfg.managed {
            let live = managed.live_path(session.roots);
            if fsops::exists(&live) {
                fsops::remove_path(&live)?;
                summary.removed.push(managed.name.clone());
            }
        }
        report::success(&format!("Removed {}", describe(&summary.removed)));
    }

    if session
        .prompter
        .confirm("Remove NibrasShell packages?", false)?
    {
        report::step("Removing packages");
        let packages = session.packages.remove(&cfg.packages);
        report_packages(&packages, "removed");
        summary.packages = Some(packages);
    }

    Ok(summary)
}

/// Reuse an existing checkout when the user agrees, otherwise clone a fresh one.
fn prepare_checkout(cfg: &ShellConfig, session: &mut Session) -> Result<PathBuf> {
    let checkout = cfg.repository.checkout.resolve(session.roots);

    if checkout.is_dir() {
        let question = format!("Dotfiles already present at {}. Reuse them?", checkout.display());
        if session.prompter.confirm(&question, true)? {
            return Ok(checkout);
        }
        fsops::remove_path(&checkout)?;
    }

    clone_repository(cfg, &checkout)?;

    if !checkout.is_dir() {
        return Err(ConfigError::MissingExpectedDirectory(checkout));
    }

    Ok(checkout)
}

fn clone_repository(cfg: &ShellConfig, checkout: &Path) -> Result<()> {
    if let Some(parent) = checkout.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut command = Command::new("git");
    command.args(&["clone", "--depth", "1"]);
    if let Some(branch) = &cfg.repository.branch {
        command.args(&["--branch", branch.as_str()]);
    }
    command.arg(&cfg.repository.url).arg(checkout);

    info!(url = %cfg.repository.url, "cloning dotfiles");
    let status = command
        .status()
        .map_err(|err| ConfigError::command("git", err))?;

    if !status.success() {
        return Err(ConfigError::command(
            "git",
            format!("could not clone {} ({})", cfg.repository.url, status),
        ));
    }

    Ok(())
}

fn report_packages(packages: &PackageReport, verb: &str) {
    if !packages.succeeded.is_empty() {
        report::success(&format!("{} {}", describe(&packages.succeeded), verb));
    }
    if !packages.skipped.is_empty() {
        report::info(&format!("{} unchanged", describe(&packages.skipped)));
    }
    if !packages.is_clean() {
        report::failure(&ConfigError::PackageInstall(packages.failed.clone()));
    }
}

fn describe(names: &[String]) -> String {
    if names.is_empty() {
        "nothing".to_string()
    } else {
        names.join(", ")
    }
}
