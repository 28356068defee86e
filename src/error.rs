//! Error types for dev-cleanup.
//!
//! Scanning itself almost never fails: unreadable directories, repositories
//! without commits, and slow or missing external tools are all recovered
//! locally and surface only as statistics. The variants here cover the
//! remaining hard failures, which are caller-level configuration problems
//! and I/O on files the user asked us to read or write.
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//!
//! use dev_cleanup::error::{CleanupError, Result};
//!
//! fn require_roots(roots: &[PathBuf]) -> Result<()> {
//!     if roots.is_empty() {
//!         return Err(CleanupError::NoRoots);
//!     }
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Error types that can occur in dev-cleanup operations
#[derive(Error, Debug, Diagnostic)]
pub enum CleanupError {
    /// No root directories were supplied to a scan.
    ///
    /// Raised by the scanner before any traversal starts. Roots come from
    /// `--roots` or from the `roots` list in the config file.
    #[error("No root directories to scan")]
    #[diagnostic(
        code(dev_cleanup::scan::no_roots),
        help("Pass --roots <DIR> or set `roots` with 'dev-cleanup config set --roots <DIR>'.")
    )]
    NoRoots,

    /// No artifact directory names were supplied to a scan.
    #[error("No cleanable directory names selected")]
    #[diagnostic(
        code(dev_cleanup::scan::no_artifact_names),
        help("Pass --dirs node_modules,venv or set `cleanable_dirs` in the config file.")
    )]
    NoArtifactNames,

    /// The worker pool for a parallel scan could not be created.
    #[error("Failed to build the scan worker pool")]
    #[diagnostic(
        code(dev_cleanup::scan::thread_pool),
        help("Use a positive value for --jobs.")
    )]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// File system I/O error on a path the user asked for.
    #[error("I/O error accessing '{path}'")]
    #[diagnostic(code(dev_cleanup::io_error))]
    IoError {
        /// The path that caused the I/O error
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The config file exists but is not valid TOML for our settings.
    #[error("Failed to parse config file '{path}'")]
    #[diagnostic(
        code(dev_cleanup::config::parse_error),
        help("Fix the file by hand or rewrite it with 'dev-cleanup config init'.")
    )]
    ConfigParse {
        /// The config file path
        path: PathBuf,
        /// The underlying TOML error
        #[source]
        source: toml::de::Error,
    },

    /// Settings could not be serialized back to TOML.
    #[error("Failed to serialize settings")]
    #[diagnostic(code(dev_cleanup::config::serialize_error))]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Cannot determine the home directory for the default config path.
    #[error("Could not determine the home directory")]
    #[diagnostic(
        code(dev_cleanup::config::no_home),
        help("Set HOME, or pass --config <PATH> explicitly.")
    )]
    HomeDirNotFound,

    /// Invalid configuration value.
    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(dev_cleanup::config::error),
        help("Check the command-line flags and the config file.")
    )]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// The JSON report could not be produced.
    #[error("Failed to render JSON report")]
    #[diagnostic(code(dev_cleanup::report::json_error))]
    Json(#[from] serde_json::Error),
}

/// Type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CleanupError>;
