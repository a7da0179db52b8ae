//! Command line tool installing the NibrasShell desktop configuration, keeping timestamped
//! backups of whatever it replaces and restoring them on uninstall.
mod archive;
mod backup;
mod configs;
mod flows;
mod fsops;
mod preflight;
mod prompt;
mod report;

#[macro_use]
extern crate serde_derive;

use archive::TarExtractor;
use clap::{crate_version, App, AppSettings, Arg, ArgMatches, SubCommand};
use configs::error::{ConfigError, Result};
use configs::path::Roots;
use configs::ShellConfig;
use flows::Session;
use prompt::Interactive;
use std::path::Path;

/// Resolve the user's directories and load the configuration named by `--file`, if any.
fn load(matches: &ArgMatches) -> Result<(ShellConfig, Roots)> {
    let roots = Roots::from_system()?;
    let cfg = ShellConfig::load(matches.value_of("config_file").map(Path::new), &roots)?;

    Ok((cfg, roots))
}

fn install(matches: &ArgMatches) -> Result<()> {
    let (cfg, roots) = load(matches)?;

    preflight::ensure_not_root()?;
    preflight::require_tools(&["git", "tar", "sudo", cfg.manager.name.as_str()])?;
    preflight::keep_sudo_alive()?;

    let mut prompter = Interactive;
    let mut session = Session {
        roots: &roots,
        prompter: &mut prompter,
        packages: &cfg.manager,
        extractor: &TarExtractor,
    };

    if let Some(summary) = flows::install(&cfg, &mut session)? {
        report::step("Installation complete");
        if let Some(backup) = &summary.backup {
            report::info(&format!("Previous configuration saved in {}", backup.container.id));
        }
        report::info("Log out and select Hyprland to start NibrasShell.");
    }

    Ok(())
}

fn uninstall(matches: &ArgMatches) -> Result<()> {
    let (cfg, roots) = load(matches)?;

    preflight::ensure_not_root()?;

    let mut prompter = Interactive;
    let mut session = Session {
        roots: &roots,
        prompter: &mut prompter,
        packages: &cfg.manager,
        extractor: &TarExtractor,
    };

    flows::uninstall(&cfg, &mut session)?;
    report::step("Uninstall finished");

    Ok(())
}

fn create_backup(matches: &ArgMatches) -> Result<()> {
    let (cfg, roots) = load(matches)?;

    let backed_up = backup::create_backup(&roots.config, &cfg.managed, &roots)?;
    for (name, outcome) in &backed_up.outcomes {
        report::info(&format!("{}: {:?}", name, outcome));
    }
    report::success(&format!("Backup created at {}", backed_up.container.path.display()));

    Ok(())
}

fn list(matches: &ArgMatches) -> Result<()> {
    let (cfg, roots) = load(matches)?;

    match backup::list_backups(&roots.config) {
        Ok(containers) => {
            backup::selector::print_backups(&containers, &cfg.managed);
            Ok(())
        }
        Err(ConfigError::NoBackupsFound(_)) => {
            println!("No backups found.");
            Ok(())
        }
        Err(err) => Err(err),
    }
}

fn restore(matches: &ArgMatches) -> Result<()> {
    let (cfg, roots) = load(matches)?;

    let index = match matches.value_of("index") {
        Some(index) => index
            .parse::<usize>()
            .map_err(|_| ConfigError::Prompt(format!("'{}' is not a backup number", index)))?,
        None => {
            let mut prompter = Interactive;
            match backup::run_restore(&mut prompter, &roots.config, &cfg.managed, &roots) {
                Ok(backup::RestoreOutcome::Skipped) => report::info("Restore skipped."),
                Ok(backup::RestoreOutcome::Restored { report: done, .. }) => {
                    report::success(&format!(
                        "Restored {} path(s) from {}",
                        done.restored.len(),
                        done.container
                    ))
                }
                Err(err) if !err.is_fatal() => report::failure(&err),
                Err(err) => return Err(err),
            }
            return Ok(());
        }
    };

    let containers = match backup::list_backups(&roots.config) {
        Ok(containers) => containers,
        Err(err @ ConfigError::NoBackupsFound(_)) => {
            report::failure(&err);
            report::info("Restore skipped.");
            return Ok(());
        }
        Err(err) => return Err(err),
    };
    let container = match backup::select(&containers, index)? {
        Some(container) => container,
        None => {
            report::info("Restore skipped.");
            return Ok(());
        }
    };

    let restored = backup::restore(container, &cfg.managed, &roots)?;
    report::success(&format!(
        "Restored {} path(s) from {}",
        restored.restored.len(),
        restored.container
    ));

    if matches.is_present("delete") {
        backup::delete_backup(container)?;
        report::success(&format!("Deleted {}", container.id));
    }

    Ok(())
}

fn print_config(matches: &ArgMatches) -> Result<()> {
    let (cfg, _) = load(matches)?;
    print!("{}", cfg.to_toml()?);

    Ok(())
}

fn main() {
    report::init_logging();

    let matches = App::new("nibras")
        .about("install, back up and restore the NibrasShell desktop configuration.")
        .version(crate_version!())
        .arg(Arg::with_name("config_file")
            .short("f")
            .long("file")
            .value_name("FILE")
            .global(true)
            .help("the configuration file to use (defaults to ~/.config/nibras/nibras.toml, then the built-in layout)"))
        .subcommand(SubCommand::with_name("install")
            .about("install packages, back up the current configuration and deploy NibrasShell"))
        .subcommand(SubCommand::with_name("uninstall")
            .about("restore a backup or remove NibrasShell, optionally removing its packages"))
        .subcommand(SubCommand::with_name("backup")
            .about("move the current configuration into a new timestamped backup"))
        .subcommand(SubCommand::with_name("list")
            .about("list the available backups, most recent first"))
        .subcommand(SubCommand::with_name("restore")
            .about("restore a backup, prompting for which one unless INDEX is given")
            .arg(Arg::with_name("index")
                .value_name("INDEX")
                .help("the backup number as shown by 'list'; 0 skips the restore"))
            .arg(Arg::with_name("delete")
                .long("delete")
                .takes_value(false)
                .requires("index")
                .help("delete the backup once it has been restored")))
        .subcommand(SubCommand::with_name("config")
            .about("print the effective configuration as toml"))
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .get_matches();

    let result = match matches.subcommand() {
        ("install", Some(sub)) => install(sub),
        ("uninstall", Some(sub)) => uninstall(sub),
        ("backup", Some(sub)) => create_backup(sub),
        ("list", Some(sub)) => list(sub),
        ("restore", Some(sub)) => restore(sub),
        ("config", Some(sub)) => print_config(sub),
        _ => Ok(()), // unrecognized SubCommand handled ^^^ by get_matches
    };

    // nicely print any errors to the console
    if let Err(err) = result {
        report::failure(&err);
        std::process::exit(1);
    }
}
