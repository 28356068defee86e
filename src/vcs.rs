//! Last-commit inspection for git repositories.
//!
//! The scanner only ever asks one question of a repository: when was the
//! tip of the checked-out history committed, and what was its subject?
//! [`CommitSource`] captures that question so the scan can run against the
//! `git` binary, against libgit2, or against a fake in tests.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use chrono::{DateTime, Utc};
use git2::Repository;
use serde::Serialize;

use crate::process::run_with_timeout;

/// Default per-repository deadline for the `git` binary.
pub const DEFAULT_COMMIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Timestamp and subject line of the most recent commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LastCommit {
    /// Commit time
    pub timestamp: DateTime<Utc>,
    /// First line of the commit message
    pub summary: String,
}

/// Source of last-commit information.
pub trait CommitSource: Send + Sync {
    /// The most recent commit on the checked-out history of `repo`.
    ///
    /// Returns `None` when the repository has no commits, cannot be read,
    /// or does not answer in time. Implementations never fail the scan.
    fn last_commit(&self, repo: &Path) -> Option<LastCommit>;
}

/// Asks the `git` binary, bounded by a timeout.
#[derive(Debug, Clone)]
pub struct GitCommand {
    program: String,
    timeout: Duration,
}

impl GitCommand {
    /// Use `git` from `PATH` with the given deadline.
    pub fn new(timeout: Duration) -> Self {
        Self {
            program: "git".to_string(),
            timeout,
        }
    }

    /// Use a specific git executable.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

impl Default for GitCommand {
    fn default() -> Self {
        Self::new(DEFAULT_COMMIT_TIMEOUT)
    }
}

impl CommitSource for GitCommand {
    fn last_commit(&self, repo: &Path) -> Option<LastCommit> {
        let mut command = Command::new(&self.program);
        command
            .args(["log", "-1", "--format=%ct|%s"])
            .current_dir(repo)
            .env("GIT_TERMINAL_PROMPT", "0");
        // Keep git from resolving an enclosing repository when this one is broken.
        if let Some(parent) = repo.parent() {
            command.env("GIT_CEILING_DIRECTORIES", parent);
        }

        let output = run_with_timeout(command, self.timeout).ok()?;
        parse_log_line(&output)
    }
}

/// Parse the `%ct|%s` line produced by `git log -1`.
///
/// Only the first `|` separates the fields; the subject may contain more.
pub fn parse_log_line(output: &str) -> Option<LastCommit> {
    let line = output.trim();
    if line.is_empty() {
        return None;
    }

    let (seconds, summary) = line.split_once('|')?;
    let seconds: i64 = seconds.trim().parse().ok()?;
    let timestamp = DateTime::from_timestamp(seconds, 0)?;

    Some(LastCommit {
        timestamp,
        summary: summary.to_string(),
    })
}

/// Reads the repository in-process with libgit2.
///
/// No subprocess is spawned, so no timeout applies; the lookup is a handful
/// of object reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct LibGit2;

impl CommitSource for LibGit2 {
    fn last_commit(&self, repo: &Path) -> Option<LastCommit> {
        let repository = Repository::open(repo).ok()?;
        let commit = repository.head().ok()?.peel_to_commit().ok()?;
        let timestamp = DateTime::from_timestamp(commit.time().seconds(), 0)?;
        let summary = commit.summary().unwrap_or_default().to_string();

        Some(LastCommit { timestamp, summary })
    }
}
