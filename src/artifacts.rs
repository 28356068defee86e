//! Name-based discovery of cleanable directories inside a repository.
//!
//! A repository is searched at its root and exactly one level below, which
//! covers the common workspace layout of one dependency directory per
//! package. Immediate subdirectories named like a workspace container
//! (`packages/`, `apps/`, ...) get one more level so that
//! `packages/api/node_modules` is found. Nothing deeper is examined, and a
//! directory that already matched is never searched for further matches.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::discovery::is_hidden;
use crate::error::{CleanupError, Result};

/// Artifact directory names scanned for when none are configured.
pub const DEFAULT_ARTIFACT_NAMES: &[&str] = &["node_modules", "venv", ".venv", "env"];

/// Directory names offered as common choices in the config file.
pub const COMMON_ARTIFACT_NAMES: &[&str] = &[
    "node_modules",
    "venv",
    ".venv",
    "env",
    "target",
    ".next",
    "dist",
    "build",
    "__pycache__",
    ".pytest_cache",
    ".tox",
];

/// Immediate subdirectories that hold workspace members.
pub const DEFAULT_WORKSPACE_DIRS: &[&str] = &["packages", "apps", "libs", "services"];

/// A directory whose name matched one of the recognized artifact names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactMatch {
    /// Absolute path of the matched directory
    pub path: PathBuf,
    /// The recognized name it matched
    pub kind: String,
}

/// Finds artifact directories in `repo_root`.
///
/// # Arguments
///
/// * `repo_root` - Repository root to search
/// * `names` - Recognized artifact directory names
/// * `workspace_dirs` - Immediate subdirectory names whose children are
///   also searched; pass an empty set for a strict one-level search
///
/// # Returns
///
/// Matches at the root first (in name order), then matches below each
/// immediate subdirectory (subdirectories in name order).
pub fn find_artifacts(
    repo_root: &Path,
    names: &BTreeSet<String>,
    workspace_dirs: &BTreeSet<String>,
) -> Vec<ArtifactMatch> {
    let mut found = Vec::new();

    collect_matches(repo_root, names, &mut found);

    for subdir in searchable_subdirs(repo_root, names) {
        collect_matches(&subdir, names, &mut found);

        if is_named_in(&subdir, workspace_dirs) {
            for member in searchable_subdirs(&subdir, names) {
                collect_matches(&member, names, &mut found);
            }
        }
    }

    found
}

/// True when `name` is exactly one plain path segment, e.g. `node_modules`.
///
/// Separators, `.`, `..`, roots and prefixes are all rejected, so joining
/// the name onto a directory always yields a direct child of it.
pub fn is_plain_dir_name(name: &str) -> bool {
    if name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(segment)), None) if segment == name
    )
}

/// Check that every name in `names` is a plain directory name.
///
/// # Errors
///
/// Returns [`CleanupError::ConfigError`] naming the first offending entry;
/// `what` says which list it came from.
pub fn validate_dir_names<I, S>(what: &str, names: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for name in names {
        let name = name.as_ref();
        if !is_plain_dir_name(name) {
            return Err(CleanupError::ConfigError {
                message: format!("invalid {what} '{name}': expected a single directory name"),
            });
        }
    }
    Ok(())
}

/// Real (non-symlink) directory at `path`.
fn is_real_dir(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|meta| meta.is_dir())
}

fn collect_matches(dir: &Path, names: &BTreeSet<String>, found: &mut Vec<ArtifactMatch>) {
    for name in names.iter().filter(|name| is_plain_dir_name(name)) {
        let candidate = dir.join(name);
        if is_real_dir(&candidate) {
            found.push(ArtifactMatch {
                path: candidate,
                kind: name.clone(),
            });
        }
    }
}

/// Non-hidden child directories of `dir` that are not themselves artifacts.
/// Symlinks are skipped. Read failures yield no children.
fn searchable_subdirs(dir: &Path, names: &BTreeSet<String>) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut subdirs: Vec<PathBuf> = entries
        .flatten()
        .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_dir()))
        .map(|entry| entry.path())
        .filter(|path| !is_hidden(path) && !is_named_in(path, names))
        .collect();
    subdirs.sort();
    subdirs
}

fn is_named_in(path: &Path, names: &BTreeSet<String>) -> bool {
    path.file_name()
        .is_some_and(|name| names.contains(name.to_string_lossy().as_ref()))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn names(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn workspaces() -> BTreeSet<String> {
        names(DEFAULT_WORKSPACE_DIRS)
    }

    fn paths(found: &[ArtifactMatch]) -> Vec<PathBuf> {
        found.iter().map(|m| m.path.clone()).collect()
    }

    #[test]
    fn test_root_level_matches() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("node_modules/left-pad")).unwrap();
        fs::create_dir_all(root.join("venv/bin")).unwrap();
        fs::create_dir_all(root.join("src")).unwrap();

        let found = find_artifacts(root, &names(&["node_modules", "venv"]), &workspaces());
        assert_eq!(
            found,
            vec![
                ArtifactMatch {
                    path: root.join("node_modules"),
                    kind: "node_modules".to_string(),
                },
                ArtifactMatch {
                    path: root.join("venv"),
                    kind: "venv".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_one_level_deep_matches() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("frontend/node_modules")).unwrap();
        fs::create_dir_all(root.join("backend/venv")).unwrap();
        fs::create_dir_all(root.join("backend/src/venv")).unwrap();

        let found = find_artifacts(root, &names(&["node_modules", "venv"]), &workspaces());
        assert_eq!(
            paths(&found),
            vec![root.join("backend/venv"), root.join("frontend/node_modules")]
        );
    }

    #[test]
    fn test_monorepo_workspace_members() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("node_modules")).unwrap();
        fs::create_dir_all(root.join("packages/api/node_modules/foo/node_modules")).unwrap();

        let found = find_artifacts(root, &names(&["node_modules"]), &workspaces());
        assert_eq!(
            paths(&found),
            vec![
                root.join("node_modules"),
                root.join("packages/api/node_modules"),
            ]
        );
    }

    #[test]
    fn test_strict_search_without_workspace_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("packages/api/node_modules")).unwrap();

        let found = find_artifacts(root, &names(&["node_modules"]), &BTreeSet::new());
        assert!(found.is_empty());
    }

    #[test]
    fn test_does_not_search_inside_matched_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("node_modules/node_modules")).unwrap();

        let found = find_artifacts(root, &names(&["node_modules"]), &workspaces());
        assert_eq!(paths(&found), vec![root.join("node_modules")]);
    }

    #[test]
    fn test_skips_hidden_subdirectories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join(".git/venv")).unwrap();
        fs::create_dir_all(root.join(".cache/node_modules")).unwrap();

        let found = find_artifacts(root, &names(&["node_modules", "venv"]), &workspaces());
        assert!(found.is_empty());
    }

    #[test]
    fn test_hidden_artifact_name_at_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join(".venv")).unwrap();

        let found = find_artifacts(root, &names(&[".venv"]), &workspaces());
        assert_eq!(paths(&found), vec![root.join(".venv")]);
        assert_eq!(found[0].kind, ".venv");
    }

    #[test]
    fn test_files_with_artifact_names_are_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("env"), "SECRET=1\n").unwrap();
        fs::create_dir_all(root.join("app")).unwrap();
        fs::write(root.join("app/env"), "SECRET=2\n").unwrap();

        let found = find_artifacts(root, &names(&["env"]), &workspaces());
        assert!(found.is_empty());
    }

    #[test]
    fn test_missing_root_yields_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let found = find_artifacts(
            &temp_dir.path().join("missing"),
            &names(&["node_modules"]),
            &workspaces(),
        );
        assert!(found.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_subdirectory_is_not_searched() {
        let temp_dir = TempDir::new().unwrap();
        let repo = temp_dir.path().join("stale");
        let active = temp_dir.path().join("elsewhere/active");
        fs::create_dir_all(repo.join(".git")).unwrap();
        fs::create_dir_all(active.join("node_modules")).unwrap();
        std::os::unix::fs::symlink(&active, repo.join("shared")).unwrap();

        let found = find_artifacts(&repo, &names(&["node_modules"]), &BTreeSet::new());
        assert!(found.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_artifact_is_not_matched() {
        let temp_dir = TempDir::new().unwrap();
        let repo = temp_dir.path().join("stale");
        let shared = temp_dir.path().join("shared-deps");
        fs::create_dir_all(repo.join("packages/api")).unwrap();
        fs::create_dir_all(&shared).unwrap();
        std::os::unix::fs::symlink(&shared, repo.join("node_modules")).unwrap();
        std::os::unix::fs::symlink(&shared, repo.join("packages/api/node_modules")).unwrap();

        let found = find_artifacts(&repo, &names(&["node_modules"]), &workspaces());
        assert!(found.is_empty());
        assert!(shared.exists());
    }

    #[test]
    fn test_names_that_escape_the_repository_are_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let repo = temp_dir.path().join("stale");
        fs::create_dir_all(repo.join("app/build")).unwrap();

        let found = find_artifacts(&repo, &names(&["..", "/", ".", "app/build"]), &workspaces());
        assert!(found.is_empty());
    }

    #[test]
    fn test_plain_dir_names() {
        for name in ["node_modules", ".venv", "__pycache__", "a..b"] {
            assert!(is_plain_dir_name(name), "{name} should be accepted");
        }
        for name in ["", ".", "..", "/", "a/b", "a/", "./a", "..\\up", "/tmp"] {
            assert!(!is_plain_dir_name(name), "{name} should be rejected");
        }
    }

    #[test]
    fn test_validate_dir_names_reports_offender() {
        assert!(validate_dir_names("cleanable directory name", ["node_modules", "venv"]).is_ok());

        let err = validate_dir_names("cleanable directory name", ["node_modules", ".."]).unwrap_err();
        assert!(matches!(
            err,
            CleanupError::ConfigError { ref message } if message.contains("'..'")
        ));
    }
}
