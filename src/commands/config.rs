//! The `config` command.

use std::io::Write;
use std::path::Path;

use super::write_out;
use crate::artifacts::{COMMON_ARTIFACT_NAMES, validate_dir_names};
use crate::cli::{ConfigAction, ConfigSetArgs};
use crate::config::Settings;
use crate::error::{CleanupError, Result};

/// Execute a config action against the file at `config_path`.
///
/// Unlike scanning, these actions fail on a malformed file instead of
/// falling back to defaults.
pub fn config(action: &ConfigAction, config_path: &Path, out: &mut impl Write) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let settings = Settings::load(config_path)?;
            let source = if config_path.exists() {
                config_path.display().to_string()
            } else {
                format!("{} (not found, showing defaults)", config_path.display())
            };
            let body = toml::to_string_pretty(&settings)?;
            write_out(out, &format!("# {source}\n{body}"))
        }
        ConfigAction::Path => write_out(out, &format!("{}\n", config_path.display())),
        ConfigAction::Init { force } => {
            if config_path.exists() && !force {
                return Err(CleanupError::ConfigError {
                    message: format!(
                        "'{}' already exists; pass --force to overwrite it",
                        config_path.display()
                    ),
                });
            }
            Settings::default().save(config_path)?;
            write_out(
                out,
                &format!(
                    "Wrote default settings to {}\nCommon cleanable directory names: {}\n",
                    config_path.display(),
                    COMMON_ARTIFACT_NAMES.join(", ")
                ),
            )
        }
        ConfigAction::Set(changes) => {
            if changes.is_empty() {
                return Err(CleanupError::ConfigError {
                    message: "nothing to set; pass at least one field".to_string(),
                });
            }
            let mut settings = Settings::load(config_path)?;
            apply_changes(&mut settings, changes)?;
            settings.save(config_path)?;
            write_out(out, &format!("Updated {}\n", config_path.display()))
        }
    }
}

fn apply_changes(settings: &mut Settings, changes: &ConfigSetArgs) -> Result<()> {
    if !changes.roots.is_empty() {
        settings.roots = changes.roots.clone();
    }
    if let Some(months) = changes.older_than {
        settings.older_than_months = months;
    }
    if !changes.dirs.is_empty() {
        let dirs = non_blank(&changes.dirs);
        if dirs.is_empty() {
            return Err(CleanupError::NoArtifactNames);
        }
        validate_dir_names("cleanable directory name", &dirs)?;
        settings.cleanable_dirs = dirs;
    }
    if !changes.workspace_dirs.is_empty() {
        let dirs = non_blank(&changes.workspace_dirs);
        validate_dir_names("workspace directory name", &dirs)?;
        settings.workspace_dirs = dirs;
    }
    if let Some(command) = &changes.trash_command {
        if command.trim().is_empty() {
            return Err(CleanupError::ConfigError {
                message: "the trash command is empty".to_string(),
            });
        }
        settings.trash_command = command.trim().to_string();
    }
    Ok(())
}

fn non_blank(names: &[String]) -> Vec<String> {
    names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
