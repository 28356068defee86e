//! Hands artifact directories to an external removal command.
//!
//! Nothing is deleted in-process. The configured command (by default
//! `trash`, which keeps the directory recoverable) is run once per
//! directory with the path appended as its last argument.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use crate::error::{CleanupError, Result};
use crate::process::{CommandFailure, run_with_timeout};

/// Deadline for one removal.
pub const DEFAULT_REMOVE_TIMEOUT: Duration = Duration::from_secs(60);

/// A parsed removal command line such as `trash` or `rm -rf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrashCommand {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl TrashCommand {
    /// Split `command` on whitespace into a program and leading arguments.
    ///
    /// # Errors
    ///
    /// Returns [`CleanupError::ConfigError`] for an empty command.
    pub fn parse(command: &str) -> Result<Self> {
        let mut words = command.split_whitespace().map(str::to_string);
        let program = words.next().ok_or_else(|| CleanupError::ConfigError {
            message: "the trash command is empty".to_string(),
        })?;

        Ok(Self {
            program,
            args: words.collect(),
            timeout: DEFAULT_REMOVE_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Run the command on `path` and wait for it, up to the timeout.
    pub fn remove(&self, path: &Path) -> std::result::Result<(), CommandFailure> {
        let mut command = Command::new(&self.program);
        command.args(&self.args).arg(path);
        run_with_timeout(command, self.timeout).map(|_| ())
    }
}
