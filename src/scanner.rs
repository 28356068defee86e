//! The scan pipeline.
//!
//! Roots are walked for repositories one after another; each repository is
//! then inspected on the rayon pool. Inspection never fails: every outcome
//! (a project, an exclusion, or a skip after cancellation) comes back as a
//! value and is folded into the [`ScanResult`] on the calling thread, in
//! discovery order.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Local};
use rayon::prelude::*;

use crate::age::{AgeVerdict, AgeWindow};
use crate::artifacts::{
    DEFAULT_ARTIFACT_NAMES, DEFAULT_WORKSPACE_DIRS, find_artifacts, validate_dir_names,
};
use crate::discovery::find_repositories;
use crate::error::{CleanupError, Result};
use crate::logging::Logger;
use crate::model::{ArtifactDirectory, ExclusionReason, IgnoredRepo, ScanResult, StaleProject};
use crate::size::{DuProbe, SizeProbe, format_size};
use crate::vcs::{CommitSource, GitCommand};

/// Shared flag for stopping a scan from another thread.
///
/// Repositories not yet started when the flag is raised are skipped; the
/// scan still returns what it collected, marked as cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

enum RepoOutcome {
    Project(StaleProject),
    Excluded(IgnoredRepo),
    Skipped,
}

/// Finds stale projects and their cleanable directories.
pub struct Scanner {
    commit_source: Arc<dyn CommitSource>,
    size_probe: Arc<dyn SizeProbe>,
    older_than_months: Option<u32>,
    younger_than_months: Option<u32>,
    artifact_names: BTreeSet<String>,
    workspace_dirs: BTreeSet<String>,
    jobs: Option<usize>,
    record_ignored: bool,
    require_artifacts: bool,
    cancel: CancelToken,
    logger: Logger,
}

impl Scanner {
    /// Creates a new builder for [`Scanner`]
    pub fn builder() -> ScannerBuilder {
        ScannerBuilder::default()
    }

    /// Get the older-than bound in months
    pub fn older_than_months(&self) -> Option<u32> {
        self.older_than_months
    }

    /// Get the younger-than bound in months
    pub fn younger_than_months(&self) -> Option<u32> {
        self.younger_than_months
    }

    /// Get the recognized artifact directory names
    pub fn artifact_names(&self) -> &BTreeSet<String> {
        &self.artifact_names
    }

    /// Get the workspace container names
    pub fn workspace_dirs(&self) -> &BTreeSet<String> {
        &self.workspace_dirs
    }

    /// Whether a repository needs an artifact directory to become a project
    pub fn requires_artifacts(&self) -> bool {
        self.require_artifacts
    }

    /// Get the token that cancels this scanner's scans
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Scan `roots` with the age window resolved against the current time.
    pub fn scan(&self, roots: &[PathBuf]) -> Result<ScanResult> {
        self.scan_at(roots, Local::now())
    }

    /// Scan `roots` with the age window resolved against `now`.
    ///
    /// # Errors
    ///
    /// Fails only on caller errors: no roots, no artifact names, a name
    /// that is not a single directory name, or a worker pool that cannot be
    /// built. Everything that goes wrong inside
    /// the scanned trees is absorbed into the result.
    pub fn scan_at(&self, roots: &[PathBuf], now: DateTime<Local>) -> Result<ScanResult> {
        if roots.is_empty() {
            return Err(CleanupError::NoRoots);
        }
        if self.artifact_names.is_empty() {
            return Err(CleanupError::NoArtifactNames);
        }
        validate_dir_names("cleanable directory name", &self.artifact_names)?;
        validate_dir_names("workspace directory name", &self.workspace_dirs)?;
        if self.jobs == Some(0) {
            return Err(CleanupError::ConfigError {
                message: "the number of jobs must be at least 1".to_string(),
            });
        }

        let window = AgeWindow::new(now, self.older_than_months, self.younger_than_months);
        let mut result = ScanResult::new(self.older_than_months, self.younger_than_months);

        self.logger
            .verbose(1, format!("Scanning for {}", window.describe()));

        let mut repositories = Vec::new();
        for root in roots {
            if self.cancel.is_cancelled() {
                result.mark_cancelled();
                break;
            }
            if !root.is_dir() {
                self.logger.warn(format!(
                    "Root directory '{}' does not exist, skipping",
                    root.display()
                ));
                result.push_missing_root(root.clone());
                continue;
            }

            let root = std::path::absolute(root).unwrap_or_else(|_| root.clone());
            let found = find_repositories(&root);
            self.logger.verbose(
                1,
                format!("Found {} repositories in {}", found.len(), root.display()),
            );
            repositories.extend(found);
        }
        let repositories = suppress_overlaps(repositories);

        let outcomes = match self.jobs {
            Some(jobs) => rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build()?
                .install(|| self.inspect_all(&repositories, &window)),
            None => self.inspect_all(&repositories, &window),
        };

        for outcome in outcomes {
            match outcome {
                RepoOutcome::Project(project) => {
                    self.logger.verbose(
                        1,
                        format!(
                            "  {}: {} in {} directories",
                            project.name(),
                            format_size(project.total_size_bytes()),
                            project.artifacts().len()
                        ),
                    );
                    result.push_project(project);
                }
                RepoOutcome::Excluded(ignored) => {
                    self.logger.verbose(
                        2,
                        format!("  Skipping {}: {}", ignored.path.display(), ignored.reason),
                    );
                    result.push_excluded(ignored, self.record_ignored);
                }
                RepoOutcome::Skipped => result.mark_cancelled(),
            }
        }

        Ok(result)
    }

    fn inspect_all(&self, repositories: &[PathBuf], window: &AgeWindow) -> Vec<RepoOutcome> {
        repositories
            .par_iter()
            .map(|repo| {
                if self.cancel.is_cancelled() {
                    RepoOutcome::Skipped
                } else {
                    self.inspect(repo, window)
                }
            })
            .collect()
    }

    fn inspect(&self, repo: &Path, window: &AgeWindow) -> RepoOutcome {
        let excluded = |reason, last_commit| {
            RepoOutcome::Excluded(IgnoredRepo {
                path: repo.to_path_buf(),
                reason,
                last_commit,
            })
        };

        let Some(commit) = self.commit_source.last_commit(repo) else {
            return excluded(ExclusionReason::NoCommits, None);
        };

        match window.classify(commit.timestamp) {
            AgeVerdict::Within => {}
            AgeVerdict::TooRecent => {
                return excluded(ExclusionReason::TooRecent, Some(commit.timestamp));
            }
            AgeVerdict::TooOld => return excluded(ExclusionReason::TooOld, Some(commit.timestamp)),
        }

        let matches = find_artifacts(repo, &self.artifact_names, &self.workspace_dirs);
        if matches.is_empty() && self.require_artifacts {
            return excluded(ExclusionReason::NoCleanable, Some(commit.timestamp));
        }

        let artifacts = matches
            .into_iter()
            .map(|found| {
                let size = self.size_probe.size_of(&found.path);
                if size.is_none() {
                    self.logger.verbose(
                        1,
                        format!("  Could not measure {}", found.path.display()),
                    );
                }
                ArtifactDirectory::new(found.path, found.kind, size)
            })
            .collect();

        RepoOutcome::Project(StaleProject::new(repo.to_path_buf(), commit, artifacts))
    }
}

/// Drop repeated repositories and repositories nested inside another one,
/// which only happens when roots overlap. Order is otherwise preserved.
fn suppress_overlaps(repositories: Vec<PathBuf>) -> Vec<PathBuf> {
    let all: HashSet<PathBuf> = repositories.iter().cloned().collect();
    let mut seen = HashSet::new();

    repositories
        .into_iter()
        .filter(|repo| !repo.ancestors().skip(1).any(|ancestor| all.contains(ancestor)))
        .filter(|repo| seen.insert(repo.clone()))
        .collect()
}

/// Builder for [`Scanner`]
#[derive(Default)]
pub struct ScannerBuilder {
    commit_source: Option<Arc<dyn CommitSource>>,
    size_probe: Option<Arc<dyn SizeProbe>>,
    older_than_months: Option<u32>,
    younger_than_months: Option<u32>,
    artifact_names: Option<BTreeSet<String>>,
    workspace_dirs: Option<BTreeSet<String>>,
    jobs: Option<usize>,
    record_ignored: bool,
    keep_without_artifacts: bool,
    cancel: Option<CancelToken>,
    verbose: u8,
    quiet: bool,
}

impl ScannerBuilder {
    /// Set where last-commit information comes from (default: `git`)
    pub fn commit_source(mut self, source: impl CommitSource + 'static) -> Self {
        self.commit_source = Some(Arc::new(source));
        self
    }

    /// Set how artifact sizes are measured (default: `du`)
    pub fn size_probe(mut self, probe: impl SizeProbe + 'static) -> Self {
        self.size_probe = Some(Arc::new(probe));
        self
    }

    /// Keep only projects whose last commit is older than this many months
    pub fn older_than_months(mut self, months: impl Into<Option<u32>>) -> Self {
        self.older_than_months = months.into();
        self
    }

    /// Keep only projects whose last commit is younger than this many months
    pub fn younger_than_months(mut self, months: impl Into<Option<u32>>) -> Self {
        self.younger_than_months = months.into();
        self
    }

    /// Set the recognized artifact directory names
    pub fn artifact_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.artifact_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Set the workspace container names; empty means a strict one-level
    /// artifact search
    pub fn workspace_dirs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.workspace_dirs = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Run on a dedicated pool of this many threads instead of the global
    /// pool
    pub fn jobs(mut self, jobs: impl Into<Option<usize>>) -> Self {
        self.jobs = jobs.into();
        self
    }

    /// Keep a list of excluded repositories in the result
    pub fn record_ignored(mut self, enabled: bool) -> Self {
        self.record_ignored = enabled;
        self
    }

    /// Require an artifact directory for a repository to become a project
    /// (default: `true`). With `false`, in-window repositories without one
    /// are kept with an empty artifact list instead of being excluded.
    pub fn require_artifacts(mut self, required: bool) -> Self {
        self.keep_without_artifacts = !required;
        self
    }

    /// Share a cancellation token with the caller
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Set the verbosity level
    pub fn verbose(mut self, verbose: u8) -> Self {
        self.verbose = verbose;
        self
    }

    /// Enable or disable quiet mode
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Build the [`Scanner`]
    pub fn build(self) -> Scanner {
        Scanner {
            commit_source: self
                .commit_source
                .unwrap_or_else(|| Arc::new(GitCommand::default())),
            size_probe: self
                .size_probe
                .unwrap_or_else(|| Arc::new(DuProbe::default())),
            older_than_months: self.older_than_months,
            younger_than_months: self.younger_than_months,
            artifact_names: self.artifact_names.unwrap_or_else(|| {
                DEFAULT_ARTIFACT_NAMES.iter().map(|s| s.to_string()).collect()
            }),
            workspace_dirs: self.workspace_dirs.unwrap_or_else(|| {
                DEFAULT_WORKSPACE_DIRS.iter().map(|s| s.to_string()).collect()
            }),
            jobs: self.jobs,
            record_ignored: self.record_ignored,
            require_artifacts: !self.keep_without_artifacts,
            cancel: self.cancel.unwrap_or_default(),
            logger: Logger::new(self.verbose, self.quiet),
        }
    }
}
