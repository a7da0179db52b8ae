use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Package manager operations the install and uninstall flows rely on.
pub trait PackageManager {
    fn is_installed(&self, package: &str) -> bool;

    /// Install every package, continuing past individual failures.
    fn install(&self, packages: &[String]) -> PackageReport;

    /// Remove every package, continuing past individual failures.
    fn remove(&self, packages: &[String]) -> PackageReport;
}

/// Per-package results of an install or removal pass.
#[derive(Debug, Default, PartialEq)]
pub struct PackageReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
    /// Already installed (install) or not installed (remove).
    pub skipped: Vec<String>,
}

impl PackageReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Describes the package manager commands used to query, install and remove packages. Usually
/// an AUR helper (yay, paru) so both official and AUR packages resolve.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Manager {
    /// The name of the package manager binary (yay, paru, pacman, ...)
    pub name: String,
    #[serde(default = "default_install_args")]
    pub install_args: Vec<String>,
    #[serde(default = "default_remove_args")]
    pub remove_args: Vec<String>,
    #[serde(default = "default_query_args")]
    pub query_args: Vec<String>,
}

fn default_install_args() -> Vec<String> {
    vec!["-S".into(), "--needed".into(), "--noconfirm".into()]
}

fn default_remove_args() -> Vec<String> {
    vec!["-Rns".into(), "--noconfirm".into()]
}

fn default_query_args() -> Vec<String> {
    vec!["-Qi".into()]
}

impl Default for Manager {
    fn default() -> Self {
        Manager {
            name: "yay".into(),
            install_args: default_install_args(),
            remove_args: default_remove_args(),
            query_args: default_query_args(),
        }
    }
}

impl Manager {
    /// Run the manager once for a single package, treating a failure to spawn like any other
    /// failure.
    fn run(&self, args: &[String], package: &str, quiet: bool) -> bool {
        let mut command = Command::new(&self.name);
        command.args(args).arg(package);

        if quiet {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }

        match command.status() {
            Ok(status) => status.success(),
            Err(err) => {
                warn!(manager = %self.name, %package, "could not run package manager: {}", err);
                false
            }
        }
    }
}

impl PackageManager for Manager {
    fn is_installed(&self, package: &str) -> bool {
        self.run(&self.query_args, package, true)
    }

    fn install(&self, packages: &[String]) -> PackageReport {
        let mut report = PackageReport::default();

        for package in packages {
            if self.is_installed(package) {
                debug!(%package, "already installed");
                report.skipped.push(package.clone());
            } else if self.run(&self.install_args, package, false) {
                report.succeeded.push(package.clone());
            } else {
                report.failed.push(package.clone());
            }
        }

        report
    }

    fn remove(&self, packages: &[String]) -> PackageReport {
        let mut report = PackageReport::default();

        for package in packages {
            if !self.is_installed(package) {
                debug!(%package, "not installed");
                report.skipped.push(package.clone());
            } else if self.run(&self.remove_args, package, false) {
                report.succeeded.push(package.clone());
            } else {
                report.failed.push(package.clone());
            }
        }

        report
    }
}
