//! Records produced by a scan.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::vcs::LastCommit;

/// Serialize a path as a string, replacing bytes that are not valid UTF-8.
pub(crate) fn serialize_path<P, S>(path: &P, serializer: S) -> Result<S::Ok, S::Error>
where
    P: AsRef<Path> + ?Sized,
    S: Serializer,
{
    serializer.serialize_str(&path.as_ref().to_string_lossy())
}

/// Serialize a list of paths like [`serialize_path`].
pub(crate) fn serialize_paths<P, S>(paths: &P, serializer: S) -> Result<S::Ok, S::Error>
where
    P: AsRef<[PathBuf]> + ?Sized,
    S: Serializer,
{
    serializer.collect_seq(paths.as_ref().iter().map(|path| path.to_string_lossy()))
}

/// A cleanable directory inside a stale project.
///
/// The size is measured once, when the directory is discovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactDirectory {
    #[serde(serialize_with = "serialize_path")]
    path: PathBuf,
    kind: String,
    size_bytes: Option<u64>,
}

impl ArtifactDirectory {
    pub fn new(path: PathBuf, kind: impl Into<String>, size_bytes: Option<u64>) -> Self {
        Self {
            path,
            kind: kind.into(),
            size_bytes,
        }
    }

    /// Get the absolute path of the directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the recognized name that matched, e.g. `node_modules`
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Get the measured size, or `None` when it could not be measured
    pub fn size_bytes(&self) -> Option<u64> {
        self.size_bytes
    }
}

/// A repository whose last commit falls inside the age window. It has at
/// least one artifact directory unless the scan was told not to require
/// one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaleProject {
    #[serde(serialize_with = "serialize_path")]
    path: PathBuf,
    name: String,
    last_commit: LastCommit,
    artifacts: Vec<ArtifactDirectory>,
}

impl StaleProject {
    /// The display name is the final path segment of `path`.
    pub fn new(path: PathBuf, last_commit: LastCommit, artifacts: Vec<ArtifactDirectory>) -> Self {
        let name = display_name(&path);
        Self {
            path,
            name,
            last_commit,
            artifacts,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn last_commit(&self) -> &LastCommit {
        &self.last_commit
    }

    pub fn artifacts(&self) -> &[ArtifactDirectory] {
        &self.artifacts
    }

    /// Sum of the measured artifact sizes.
    pub fn total_size_bytes(&self) -> u64 {
        self.artifacts
            .iter()
            .filter_map(ArtifactDirectory::size_bytes)
            .sum()
    }

    /// Number of artifacts whose size could not be measured.
    pub fn unmeasured_artifacts(&self) -> usize {
        self.artifacts
            .iter()
            .filter(|artifact| artifact.size_bytes().is_none())
            .count()
    }

    /// Whole days between the last commit and `now`, never negative.
    pub fn days_stale(&self, now: DateTime<Utc>) -> i64 {
        (now - self.last_commit.timestamp).num_days().max(0)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Counts of repositories excluded from the result, by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    pub too_recent: usize,
    pub too_old: usize,
    pub no_commits: usize,
    pub no_cleanable: usize,
}

impl FilterStats {
    /// Count one exclusion.
    pub fn record(&mut self, reason: ExclusionReason) {
        match reason {
            ExclusionReason::NoCommits => self.no_commits += 1,
            ExclusionReason::TooRecent => self.too_recent += 1,
            ExclusionReason::TooOld => self.too_old += 1,
            ExclusionReason::NoCleanable => self.no_cleanable += 1,
        }
    }

    /// Total number of excluded repositories.
    pub fn total(&self) -> usize {
        self.too_recent + self.too_old + self.no_commits + self.no_cleanable
    }
}

/// Why a repository did not become a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    NoCommits,
    TooRecent,
    TooOld,
    NoCleanable,
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ExclusionReason::NoCommits => "no commits",
            ExclusionReason::TooRecent => "too recent",
            ExclusionReason::TooOld => "too old",
            ExclusionReason::NoCleanable => "no cleanable directories",
        };
        f.write_str(text)
    }
}

/// An excluded repository, recorded when the scan is asked to keep them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IgnoredRepo {
    #[serde(serialize_with = "serialize_path")]
    pub path: PathBuf,
    pub reason: ExclusionReason,
    /// Last commit time, when the repository has one
    pub last_commit: Option<DateTime<Utc>>,
}

/// Everything one scan produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    projects: Vec<StaleProject>,
    total_repos_scanned: usize,
    older_than_months: Option<u32>,
    younger_than_months: Option<u32>,
    stats: FilterStats,
    ignored: Vec<IgnoredRepo>,
    #[serde(serialize_with = "serialize_paths")]
    missing_roots: Vec<PathBuf>,
    cancelled: bool,
}

impl ScanResult {
    pub(crate) fn new(older_than_months: Option<u32>, younger_than_months: Option<u32>) -> Self {
        Self {
            projects: Vec::new(),
            total_repos_scanned: 0,
            older_than_months,
            younger_than_months,
            stats: FilterStats::default(),
            ignored: Vec::new(),
            missing_roots: Vec::new(),
            cancelled: false,
        }
    }

    pub(crate) fn push_project(&mut self, project: StaleProject) {
        self.total_repos_scanned += 1;
        self.projects.push(project);
    }

    pub(crate) fn push_excluded(&mut self, ignored: IgnoredRepo, keep: bool) {
        self.total_repos_scanned += 1;
        self.stats.record(ignored.reason);
        if keep {
            self.ignored.push(ignored);
        }
    }

    pub(crate) fn push_missing_root(&mut self, root: PathBuf) {
        self.missing_roots.push(root);
    }

    pub(crate) fn mark_cancelled(&mut self) {
        self.cancelled = true;
    }

    /// Projects in discovery order
    pub fn projects(&self) -> &[StaleProject] {
        &self.projects
    }

    /// Take ownership of the projects
    pub fn into_projects(self) -> Vec<StaleProject> {
        self.projects
    }

    /// Repositories examined, whether or not they became projects
    pub fn total_repos_scanned(&self) -> usize {
        self.total_repos_scanned
    }

    pub fn older_than_months(&self) -> Option<u32> {
        self.older_than_months
    }

    pub fn younger_than_months(&self) -> Option<u32> {
        self.younger_than_months
    }

    pub fn stats(&self) -> &FilterStats {
        &self.stats
    }

    pub fn filtered_too_recent(&self) -> usize {
        self.stats.too_recent
    }

    pub fn filtered_too_old(&self) -> usize {
        self.stats.too_old
    }

    pub fn filtered_no_commits(&self) -> usize {
        self.stats.no_commits
    }

    pub fn filtered_no_cleanable(&self) -> usize {
        self.stats.no_cleanable
    }

    /// Excluded repositories; empty unless the scan recorded them
    pub fn ignored(&self) -> &[IgnoredRepo] {
        &self.ignored
    }

    /// Roots that did not exist when the scan ran
    pub fn missing_roots(&self) -> &[PathBuf] {
        &self.missing_roots
    }

    /// True when the scan stopped early on request
    pub fn cancelled(&self) -> bool {
        self.cancelled
    }

    /// Sum of the measured sizes of every project.
    pub fn total_size_bytes(&self) -> u64 {
        self.projects.iter().map(StaleProject::total_size_bytes).sum()
    }

    /// Artifacts across all projects whose size is unknown.
    pub fn unmeasured_artifacts(&self) -> usize {
        self.projects
            .iter()
            .map(StaleProject::unmeasured_artifacts)
            .sum()
    }
}
