pub mod error;
pub mod manager;
pub mod path;

use self::error::{ConfigError, Result};
use self::manager::Manager;
use self::path::{LocationSpec, ManagedPath, PathKind, Preserve, Roots};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the directory holding the user's configuration file, below the config root.
pub const CONFIG_DIR: &str = "nibras";
pub const CONFIG_FILE: &str = "nibras.toml";

/// The dotfiles repository overlaid onto the managed paths.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Repository {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Where the repository is cloned to.
    pub checkout: LocationSpec,
}

/// A theme or icon archive shipped in the dotfiles repository.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ThemeArchive {
    pub name: String,
    /// Path of the archive inside the checkout.
    pub archive: PathBuf,
    pub target: LocationSpec,
}

/// Declarative description of everything the installer touches. Both the backup recorder and
/// the restore selector walk `managed` in order, so install and uninstall never disagree on
/// which paths belong to the shell.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ShellConfig {
    #[serde(default)]
    pub packages: Vec<String>,

    pub repository: Repository,

    #[serde(default)]
    pub manager: Manager,

    #[serde(default)]
    pub managed: Vec<ManagedPath>,

    #[serde(default)]
    pub executables: Vec<LocationSpec>,

    #[serde(default)]
    pub archives: Vec<ThemeArchive>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        let packages = [
            "hyprland",
            "quickshell-git",
            "wofi",
            "easyeffects",
            "fish",
            "kitty",
            "swww",
            "grim",
            "slurp",
            "wl-clipboard",
            "brightnessctl",
            "pavucontrol",
            "ttf-jetbrains-mono-nerd",
        ];

        ShellConfig {
            packages: packages.iter().map(|p| p.to_string()).collect(),
            repository: Repository {
                url: "https://github.com/NibrasShell/NibrasShell.git".into(),
                branch: None,
                checkout: LocationSpec::new(PathKind::Home, ".cache/nibras/dotfiles"),
            },
            manager: Manager::default(),
            managed: vec![
                ManagedPath::new("hypr", PathKind::Config, "hypr", ".config/hypr"),
                ManagedPath::new("quickshell", PathKind::Config, "quickshell", ".config/quickshell"),
                ManagedPath::new("wofi", PathKind::Config, "wofi", ".config/wofi"),
                ManagedPath::new("easyeffects", PathKind::Config, "easyeffects", ".config/easyeffects"),
                ManagedPath::new(
                    "fish-config",
                    PathKind::Config,
                    "fish/config.fish",
                    ".config/fish/config.fish",
                )
                .preserved_by(Preserve::Copy),
            ],
            executables: vec![
                LocationSpec::new(PathKind::Config, "hypr/scripts"),
                LocationSpec::new(PathKind::Config, "quickshell/scripts"),
            ],
            archives: vec![
                ThemeArchive {
                    name: "gtk theme".into(),
                    archive: "themes/Nibras-Theme.tar.gz".into(),
                    target: LocationSpec::new(PathKind::Home, ".themes"),
                },
                ThemeArchive {
                    name: "icon theme".into(),
                    archive: "icons/Nibras-Icons.tar.gz".into(),
                    target: LocationSpec::new(PathKind::Home, ".icons"),
                },
            ],
        }
    }
}

impl ShellConfig {
    /// Create a new ShellConfig from the specified configuration file.
    ///
    /// # Errors
    /// A [ConfigError](error/enum.ConfigError.html) will be returned on an error reading from
    /// the specified file, or parsing the contents.
    pub fn with_file(path: &Path) -> Result<ShellConfig> {
        let contents = fs::read_to_string(path)?;
        let cfg: ShellConfig = toml::from_str(&contents[..])?;
        cfg.validate()?;

        Ok(cfg)
    }

    /// Every managed path needs its own name and its own entry inside a backup container.
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        let mut entries = HashSet::new();

        for managed in &self.managed {
            if !names.insert(managed.name.as_str()) {
                return Err(ConfigError::InvalidConfig(format!(
                    "managed path '{}' is listed more than once",
                    managed.name
                )));
            }
            if !entries.insert(managed.entry_name()) {
                return Err(ConfigError::InvalidConfig(format!(
                    "managed path '{}' reuses backup entry '{}'",
                    managed.name,
                    managed.entry_name()
                )));
            }
        }

        Ok(())
    }

    /// Load the explicitly given file, else the user's `nibras/nibras.toml`, else the built-in
    /// layout.
    pub fn load(explicit: Option<&Path>, roots: &Roots) -> Result<ShellConfig> {
        if let Some(path) = explicit {
            return ShellConfig::with_file(path);
        }

        let path = ShellConfig::default_path(roots);
        if path.is_file() {
            debug!(path = %path.display(), "loading configuration");
            ShellConfig::with_file(&path)
        } else {
            debug!("no configuration file, using built-in layout");
            Ok(ShellConfig::default())
        }
    }

    pub fn default_path(roots: &Roots) -> PathBuf {
        roots.config.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
