use crate::configs::error::{ConfigError, Result};
use std::path::{Path, PathBuf};

/// Which root a configured path is relative to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PathKind {
    Absolute,
    Home,
    Config,
}

impl Default for PathKind {
    fn default() -> Self {
        PathKind::Config
    }
}

/// The user's home and config directories, resolved once and passed down so every operation
/// can be pointed at a sandbox.
#[derive(Clone, Debug)]
pub struct Roots {
    pub home: PathBuf,
    pub config: PathBuf,
}

impl Roots {
    /// Resolve the roots of the current user.
    ///
    /// # Errors
    /// [ConfigError::DirNotFound](../error/enum.ConfigError.html) if either directory cannot
    /// be determined.
    pub fn from_system() -> Result<Roots> {
        let home = dirs::home_dir().ok_or_else(|| ConfigError::DirNotFound("home".into()))?;
        let config =
            dirs::config_dir().ok_or_else(|| ConfigError::DirNotFound("config".into()))?;

        Ok(Roots { home, config })
    }

    #[cfg(test)]
    pub fn with_home<P: Into<PathBuf>>(home: P) -> Roots {
        let home = home.into();
        let config = home.join(".config");

        Roots { home, config }
    }

    fn base(&self, kind: PathKind) -> &Path {
        match kind {
            PathKind::Absolute => Path::new("/"),
            PathKind::Home => &self.home,
            PathKind::Config => &self.config,
        }
    }
}

/// A path relative to one of the [Roots](struct.Roots.html).
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct LocationSpec {
    #[serde(default)]
    pub kind: PathKind,
    pub path: PathBuf,
}

impl LocationSpec {
    pub fn new<P: Into<PathBuf>>(kind: PathKind, path: P) -> LocationSpec {
        LocationSpec {
            kind,
            path: path.into(),
        }
    }

    pub fn resolve(&self, roots: &Roots) -> PathBuf {
        roots.base(self.kind).join(&self.path)
    }
}

/// How the live contents of a managed path are preserved when a backup is taken.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Preserve {
    /// Move the contents into the container, leaving the live location absent.
    Move,
    /// Copy the contents, leaving the original in use until the overlay replaces it.
    Copy,
}

impl Default for Preserve {
    fn default() -> Self {
        Preserve::Move
    }
}

/// A configuration unit owned by the shell: where it lives, where the dotfiles checkout keeps
/// its replacement, and what it is called inside a backup container.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ManagedPath {
    pub name: String,
    #[serde(default)]
    pub kind: PathKind,
    pub path: PathBuf,
    /// Location inside the dotfiles checkout.
    pub source: PathBuf,
    /// Name inside a backup container, `<name>-old` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
    #[serde(default)]
    pub preserve: Preserve,
}

impl ManagedPath {
    pub fn new<P: Into<PathBuf>, S: Into<PathBuf>>(
        name: &str,
        kind: PathKind,
        path: P,
        source: S,
    ) -> ManagedPath {
        ManagedPath {
            name: name.to_string(),
            kind,
            path: path.into(),
            source: source.into(),
            entry: None,
            preserve: Preserve::Move,
        }
    }

    pub fn preserved_by(mut self, preserve: Preserve) -> ManagedPath {
        self.preserve = preserve;
        self
    }

    pub fn entry_name(&self) -> String {
        match &self.entry {
            Some(entry) => entry.clone(),
            None => format!("{}-old", self.name),
        }
    }

    pub fn live_path(&self, roots: &Roots) -> PathBuf {
        LocationSpec::new(self.kind, &self.path).resolve(roots)
    }

    pub fn source_path(&self, checkout: &Path) -> PathBuf {
        checkout.join(&self.source)
    }
}
