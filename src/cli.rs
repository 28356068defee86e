//! Command-line interface definitions for dev-cleanup.
//!
//! This module defines the CLI structure using clap, including all subcommands
//! and their arguments. The main entry point is the [`Cli`] struct.
//!
//! # Example
//!
//! ```no_run
//! use dev_cleanup::cli::{Cli, Commands};
//!
//! // Parse command-line arguments
//! let cli = Cli::parse_args();
//!
//! // Access the parsed command
//! match &cli.command() {
//!     Commands::Scan { args, json } => {
//!         println!("Scanning {:?} (json: {json})", args.roots);
//!     }
//!     _ => {}
//! }
//! ```

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::default_config_path;
use crate::error::{CleanupError, Result};

/// Main command-line interface for dev-cleanup.
///
/// This struct represents the top-level CLI configuration, containing both
/// global options that apply to all commands and the specific subcommand
/// to execute.
#[derive(Parser)]
#[command(
    name = "dev-cleanup",
    bin_name = "dev-cleanup",
    author,
    version,
    about = "Find stale git projects and reclaim the space their dependency directories use",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    global_opts: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

/// Global options that apply to all dev-cleanup commands.
#[derive(Parser)]
pub struct GlobalOpts {
    /// Path to the config file (defaults to ~/.dev-cleanup/config.toml)
    #[arg(long, global = true, env = "DEV_CLEANUP_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output (use multiple times for more verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count, env = "DEV_CLEANUP_VERBOSE")]
    verbose: u8,

    /// Silence all output except for reports and errors
    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "verbose",
        env = "DEV_CLEANUP_QUIET"
    )]
    quiet: bool,
}

impl GlobalOpts {
    /// Create a new builder for constructing `GlobalOpts` programmatically.
    pub fn builder() -> GlobalOptsBuilder {
        GlobalOptsBuilder::default()
    }

    /// Get the effective config file path
    pub fn get_config_path(&self) -> Result<PathBuf> {
        match self.config() {
            Some(path) => Ok(normalize_path(path)),
            None => default_config_path(),
        }
    }

    /// Get the config path option
    pub fn config(&self) -> Option<&Path> {
        self.config.as_deref()
    }

    /// Get the verbose level
    pub fn verbose(&self) -> u8 {
        self.verbose
    }

    /// Check if quiet mode is enabled
    pub fn quiet(&self) -> bool {
        self.quiet
    }
}

/// Builder for constructing `GlobalOpts` programmatically.
#[derive(Default)]
pub struct GlobalOptsBuilder {
    config: Option<PathBuf>,
    verbose: u8,
    quiet: bool,
}

impl GlobalOptsBuilder {
    /// Set the config file path.
    pub fn config(mut self, path: Option<impl Into<PathBuf>>) -> Self {
        self.config = path.map(|p| p.into());
        self
    }

    /// Set the verbosity level (0 = normal, 1+ = verbose).
    pub fn verbose(mut self, level: u8) -> Self {
        self.verbose = level;
        self
    }

    /// Enable or disable quiet mode.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Build the `GlobalOpts` instance with the configured values.
    pub fn build(self) -> GlobalOpts {
        GlobalOpts {
            config: self.config,
            verbose: self.verbose,
            quiet: self.quiet,
        }
    }
}

impl Cli {
    /// Get the global options
    pub fn global_opts(&self) -> &GlobalOpts {
        &self.global_opts
    }

    /// Get the command
    pub fn command(&self) -> &Commands {
        &self.command
    }

    /// Create a builder for programmatic construction
    pub fn builder() -> CliBuilder {
        CliBuilder::default()
    }

    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Builder for [`Cli`]
#[derive(Debug, Default)]
pub struct CliBuilder {
    config: Option<PathBuf>,
    verbose: u8,
    quiet: bool,
    command: Option<Commands>,
}

impl CliBuilder {
    /// Set the config file path
    pub fn config(mut self, path: impl Into<PathBuf>) -> Self {
        self.config = Some(path.into());
        self
    }

    /// Set the verbose level
    pub fn verbose(mut self, level: u8) -> Self {
        self.verbose = level;
        self
    }

    /// Enable quiet mode
    pub fn quiet(mut self, enabled: bool) -> Self {
        self.quiet = enabled;
        self
    }

    /// Set the command
    pub fn command(mut self, command: Commands) -> Self {
        self.command = Some(command);
        self
    }

    /// Build the Cli instance
    pub fn build(self) -> Result<Cli> {
        let command = self.command.ok_or(CleanupError::ConfigError {
            message: "Command is required".to_string(),
        })?;

        Ok(Cli {
            global_opts: GlobalOpts::builder()
                .config(self.config)
                .verbose(self.verbose)
                .quiet(self.quiet)
                .build(),
            command,
        })
    }
}

/// Normalize a path to be absolute and clean, without requiring it to exist.
///
/// This function:
/// - Converts relative paths to absolute using the current directory
/// - Removes `.` and `..` components where possible
/// - Does NOT resolve symlinks (preserves user intent)
/// - Does NOT require the path to exist
pub(crate) fn normalize_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();

    let absolute = if path.is_relative() {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    } else {
        path.to_path_buf()
    };

    let mut components = Vec::new();
    for component in absolute.components() {
        use std::path::Component;
        match component {
            Component::ParentDir => {
                if let Some(last) = components.last()
                    && !matches!(last, Component::ParentDir | Component::RootDir)
                {
                    components.pop();
                    continue;
                }
                if matches!(components.last(), Some(Component::RootDir)) {
                    continue;
                }
                components.push(component);
            }
            Component::CurDir => continue,
            _ => components.push(component),
        }
    }

    let mut result = PathBuf::new();
    for component in components {
        result.push(component);
    }

    result
}

/// How the last commit of a repository is read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum CommitBackend {
    /// Run the `git` binary
    #[default]
    Git,
    /// Read the repository in-process with libgit2
    Libgit2,
}

/// How artifact directory sizes are measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SizeBackend {
    /// Run `du -sk` (allocated disk usage)
    #[default]
    Du,
    /// Walk the directory in-process (apparent file sizes)
    Walk,
}

/// Options shared by every command that runs a scan.
#[derive(Debug, Clone, Default, Args)]
pub struct ScanArgs {
    /// Only projects whose last commit is older than N months
    #[arg(short, long, value_name = "MONTHS", env = "DEV_CLEANUP_OLDER_THAN")]
    pub older_than: Option<u32>,

    /// Only projects whose last commit is younger than N months
    #[arg(short, long, value_name = "MONTHS", env = "DEV_CLEANUP_YOUNGER_THAN")]
    pub younger_than: Option<u32>,

    /// Root directory to scan (repeatable; defaults to `roots` in the config)
    #[arg(short, long = "roots", value_name = "DIR")]
    pub roots: Vec<PathBuf>,

    /// Cleanable directory names (comma-separated)
    #[arg(
        short,
        long,
        value_delimiter = ',',
        value_name = "NAMES",
        env = "DEV_CLEANUP_DIRS"
    )]
    pub dirs: Vec<String>,

    /// Number of worker threads (defaults to one per CPU)
    #[arg(short, long, env = "DEV_CLEANUP_JOBS")]
    pub jobs: Option<usize>,

    /// How to read last-commit information
    #[arg(long, value_enum, default_value_t, env = "DEV_CLEANUP_COMMIT_BACKEND")]
    pub commit_backend: CommitBackend,

    /// How to measure directory sizes
    #[arg(long, value_enum, default_value_t, env = "DEV_CLEANUP_SIZE_BACKEND")]
    pub size_backend: SizeBackend,

    /// List repositories that were left out and why
    #[arg(long)]
    pub show_ignored: bool,
}

/// Available dev-cleanup subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan for stale projects and report reclaimable space
    ///
    /// Walks each root for git repositories, keeps the ones whose last
    /// commit falls inside the age window, and lists their cleanable
    /// directories with sizes. Nothing is modified.
    Scan {
        #[command(flatten)]
        args: ScanArgs,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete cleanable directories of stale projects
    ///
    /// Runs a scan, then hands each cleanable directory of the selected
    /// projects to the trash command. Without --execute this is a dry run
    /// that only shows what would be deleted.
    Clean {
        #[command(flatten)]
        args: ScanArgs,

        /// Select every stale project
        #[arg(long, conflicts_with = "projects")]
        all: bool,

        /// Select a project by name or path (repeatable)
        #[arg(short = 'p', long = "project", value_name = "NAME")]
        projects: Vec<String>,

        /// Actually delete; otherwise only show what would be deleted
        #[arg(short, long, env = "DEV_CLEANUP_EXECUTE")]
        execute: bool,

        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,

        /// Command that removes one directory (e.g. "trash" or "rm -rf")
        #[arg(long, value_name = "COMMAND", env = "DEV_CLEANUP_TRASH_COMMAND")]
        trash_command: Option<String>,
    },

    /// Delete entire stale project directories
    ///
    /// Runs a scan in which every repository inside the age window is a
    /// candidate, with or without cleanable directories, then hands each
    /// selected project directory to the trash command. Without --execute
    /// this is a dry run that only lists what would be deleted.
    Nuke {
        #[command(flatten)]
        args: ScanArgs,

        /// Select every stale project
        #[arg(long, conflicts_with = "projects")]
        all: bool,

        /// Select a project by name or path (repeatable)
        #[arg(short = 'p', long = "project", value_name = "NAME")]
        projects: Vec<String>,

        /// Actually delete; otherwise only show what would be deleted
        #[arg(short, long, env = "DEV_CLEANUP_EXECUTE")]
        execute: bool,

        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,

        /// Command that removes one directory (e.g. "trash" or "rm -rf")
        #[arg(long, value_name = "COMMAND", env = "DEV_CLEANUP_TRASH_COMMAND")]
        trash_command: Option<String>,
    },

    /// Show or edit the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config file operations.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective settings
    Show,

    /// Print the config file path
    Path,

    /// Write the default settings to the config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Update fields in the config file
    Set(ConfigSetArgs),
}

/// Fields accepted by `config set`; only the given ones change.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigSetArgs {
    /// Replace the scan roots (repeatable)
    #[arg(long = "roots", value_name = "DIR")]
    pub roots: Vec<PathBuf>,

    /// Default age bound in months
    #[arg(long, value_name = "MONTHS")]
    pub older_than: Option<u32>,

    /// Replace the cleanable directory names (comma-separated)
    #[arg(long, value_delimiter = ',', value_name = "NAMES")]
    pub dirs: Vec<String>,

    /// Replace the workspace container names (comma-separated)
    #[arg(long, value_delimiter = ',', value_name = "NAMES")]
    pub workspace_dirs: Vec<String>,

    /// Command that removes one directory
    #[arg(long, value_name = "COMMAND")]
    pub trash_command: Option<String>,
}

impl ConfigSetArgs {
    /// True when no field was given.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
            && self.older_than.is_none()
            && self.dirs.is_empty()
            && self.workspace_dirs.is_empty()
            && self.trash_command.is_none()
    }
}
