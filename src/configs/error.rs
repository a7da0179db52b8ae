use std::io::Error as ioError;
use std::path::PathBuf;
use thiserror::Error;
use toml::de::Error as deError;
use toml::ser::Error as serError;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Every failure the installer, backup recorder and restore selector can surface.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("An error occurred while handling file: {0}")]
    Io(#[from] ioError),

    #[error("An error occurred while parsing file: {0}")]
    Deserialize(#[from] deError),

    #[error("An error occurred while rendering configuration: {0}")]
    Serialize(#[from] serError),

    #[error("Could not determine system directory: {0}")]
    DirNotFound(String),

    /// Running as root, a required tool is missing, or sudo authentication failed.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Packages which could not be installed or removed. Collected, never fatal.
    #[error("{} package(s) failed: {}", .0.len(), .0.join(", "))]
    PackageInstall(Vec<String>),

    #[error("No backups found in {}", .0.display())]
    NoBackupsFound(PathBuf),

    #[error("Invalid selection {index}: expected a number between 0 and {count}")]
    InvalidSelection { index: usize, count: usize },

    /// A managed path could not be preserved; the container keeps whatever was moved before.
    #[error("Backup into {container} stopped at '{name}': {source}")]
    PartialBackup {
        container: String,
        name: String,
        #[source]
        source: Box<ConfigError>,
    },

    /// The configuration file parsed, but describes an unusable layout.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Expected directory is missing: {}", .0.display())]
    MissingExpectedDirectory(PathBuf),

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("'{program}' failed: {detail}")]
    Command { program: String, detail: String },
}

impl ConfigError {
    /// Whether the error must stop the whole flow. Package failures, an empty backup root and
    /// a bad selection only abort the current step.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            ConfigError::PackageInstall(_)
                | ConfigError::NoBackupsFound(_)
                | ConfigError::InvalidSelection { .. }
        )
    }

    pub(crate) fn command<S: Into<String>, D: ToString>(program: S, detail: D) -> ConfigError {
        ConfigError::Command {
            program: program.into(),
            detail: detail.to_string(),
        }
    }
}
