//! Checks run before the installer touches anything, and the sudo credential refresher.
use crate::configs::error::{ConfigError, Result};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// How often the cached sudo credentials are refreshed while the installer runs.
pub const SUDO_REFRESH: Duration = Duration::from_secs(60);

/// Refuse to run as root; the configuration belongs in the invoking user's home.
#[cfg(unix)]
pub fn ensure_not_root() -> Result<()> {
    if nix::unistd::Uid::effective().is_root() {
        return Err(ConfigError::Precondition(
            "do not run as root, sudo is requested when needed".into(),
        ));
    }

    Ok(())
}

#[cfg(not(unix))]
pub fn ensure_not_root() -> Result<()> {
    Ok(())
}

/// Fail on the first tool that is not on `PATH`.
pub fn require_tools(tools: &[&str]) -> Result<()> {
    for tool in tools {
        match which::which(tool) {
            Ok(path) => debug!(%tool, path = %path.display(), "found tool"),
            Err(_) => {
                return Err(ConfigError::Precondition(format!(
                    "required tool '{}' is not installed",
                    tool
                )))
            }
        }
    }

    Ok(())
}

/// Authenticate with sudo once, then keep the credentials warm from a background thread.
///
/// The thread only refreshes the sudo timestamp; it shares nothing with the caller and stops
/// when a refresh fails or the process that launched the installer goes away.
pub fn keep_sudo_alive() -> Result<()> {
    let status = Command::new("sudo")
        .arg("-v")
        .status()
        .map_err(|err| ConfigError::command("sudo", err))?;

    if !status.success() {
        return Err(ConfigError::Precondition("sudo authentication failed".into()));
    }

    let launcher = parent_id();
    thread::Builder::new()
        .name("sudo-keepalive".into())
        .spawn(move || loop {
            thread::sleep(SUDO_REFRESH);

            if !launched_by(launcher) {
                debug!("launching process is gone, stopping keep-alive");
                break;
            }

            let refreshed = Command::new("sudo")
                .args(&["-n", "-v"])
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .map(|status| status.success())
                .unwrap_or(false);

            if !refreshed {
                warn!("could not refresh sudo credentials, stopping keep-alive");
                break;
            }
            debug!("refreshed sudo credentials");
        })?;

    Ok(())
}

#[cfg(unix)]
fn parent_id() -> Option<i32> {
    Some(nix::unistd::getppid().as_raw())
}

#[cfg(not(unix))]
fn parent_id() -> Option<i32> {
    None
}

/// Whether the process that started us is still our parent. Once it exits we are reparented,
/// so a changed parent id means nobody is waiting on the installer any more.
fn launched_by(launcher: Option<i32>) -> bool {
    launcher.map_or(true, |pid| parent_id() == Some(pid))
}
