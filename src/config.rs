//! The TOML settings file.
//!
//! Settings live in `~/.dev-cleanup/config.toml`. Every field has a default,
//! so a missing file and a partial file both load. Command-line flags take
//! precedence over anything read here.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::artifacts::{DEFAULT_ARTIFACT_NAMES, DEFAULT_WORKSPACE_DIRS};
use crate::error::{CleanupError, Result};

/// Directory under the home directory that holds the config file.
pub const CONFIG_DIR_NAME: &str = ".dev-cleanup";

/// File name of the config file.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default trash command; moves directories to the system trash.
pub const DEFAULT_TRASH_COMMAND: &str = "trash";

/// Persisted user settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directories to scan; `~` is expanded when the scan runs
    pub roots: Vec<PathBuf>,
    /// Age bound applied when no age flag is given
    pub older_than_months: u32,
    /// Recognized artifact directory names
    pub cleanable_dirs: Vec<String>,
    /// Subdirectories whose members are searched for artifacts too
    pub workspace_dirs: Vec<String>,
    /// Command that receives each directory to delete
    pub trash_command: String,
    pub commit_timeout_secs: u64,
    pub size_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            roots: vec![PathBuf::from("~/Projects")],
            older_than_months: 6,
            cleanable_dirs: DEFAULT_ARTIFACT_NAMES.iter().map(|s| s.to_string()).collect(),
            workspace_dirs: DEFAULT_WORKSPACE_DIRS.iter().map(|s| s.to_string()).collect(),
            trash_command: DEFAULT_TRASH_COMMAND.to_string(),
            commit_timeout_secs: 5,
            size_timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Load settings from `path`. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| CleanupError::IoError {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| CleanupError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write settings to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| CleanupError::IoError {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).map_err(|source| CleanupError::IoError {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Roots with `~` expanded.
    pub fn expanded_roots(&self) -> Vec<PathBuf> {
        self.roots.iter().map(|root| expand_home(root)).collect()
    }

    pub fn commit_timeout(&self) -> Duration {
        Duration::from_secs(self.commit_timeout_secs)
    }

    pub fn size_timeout(&self) -> Duration {
        Duration::from_secs(self.size_timeout_secs)
    }
}

/// The default config file location, `~/.dev-cleanup/config.toml`.
pub fn default_config_path() -> Result<PathBuf> {
    let home = home::home_dir().ok_or(CleanupError::HomeDirNotFound)?;
    Ok(home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Replace a leading `~` component with the home directory.
///
/// Paths that do not start with `~`, or a `~` when the home directory is
/// unknown, are returned unchanged.
pub fn expand_home(path: &Path) -> PathBuf {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => match home::home_dir() {
            Some(home) => home.join(components.as_path()),
            None => path.to_path_buf(),
        },
        _ => path.to_path_buf(),
    }
}
