//! Property tests for repository discovery over generated directory trees.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use dev_cleanup::discovery::{GIT_MARKER, find_repositories};
use proptest::prelude::*;
use tempfile::TempDir;

/// Directory names, including hidden ones and a dependency directory.
fn segment_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["a", "b", "src", "node_modules", ".hidden", ".cache"])
}

/// A relative directory path and whether it holds a repository marker.
fn entry_strategy() -> impl Strategy<Value = (Vec<&'static str>, bool)> {
    (prop::collection::vec(segment_strategy(), 1..5), any::<bool>())
}

fn build_tree(root: &Path, entries: &[(Vec<&'static str>, bool)]) -> BTreeSet<PathBuf> {
    let mut repos = BTreeSet::new();
    for (segments, is_repo) in entries {
        let dir = segments.iter().fold(root.to_path_buf(), |acc, s| acc.join(s));
        fs::create_dir_all(&dir).unwrap();
        if *is_repo {
            fs::create_dir_all(dir.join(GIT_MARKER)).unwrap();
            repos.insert(dir);
        }
    }
    repos
}

fn is_hidden_name(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// Repositories that should be found: no proper ancestor below the root is
/// a repository or a hidden directory.
fn expected_repositories(root: &Path, repos: &BTreeSet<PathBuf>) -> BTreeSet<PathBuf> {
    repos
        .iter()
        .filter(|repo| {
            let relative = repo.strip_prefix(root).unwrap();
            let mut ancestor = root.to_path_buf();
            let components: Vec<_> = relative.components().collect();
            for component in &components[..components.len() - 1] {
                ancestor.push(component);
                if repos.contains(&ancestor) || is_hidden_name(component.as_os_str()) {
                    return false;
                }
            }
            true
        })
        .cloned()
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_no_result_is_nested_in_another(
        entries in prop::collection::vec(entry_strategy(), 1..12)
    ) {
        let temp_dir = TempDir::new().unwrap();
        build_tree(temp_dir.path(), &entries);

        let found = find_repositories(temp_dir.path());
        for (i, outer) in found.iter().enumerate() {
            for (j, inner) in found.iter().enumerate() {
                if i != j {
                    prop_assert!(
                        !inner.starts_with(outer),
                        "{} is nested in {}",
                        inner.display(),
                        outer.display()
                    );
                }
            }
        }
    }

    #[test]
    fn prop_never_reports_inside_hidden_directories(
        entries in prop::collection::vec(entry_strategy(), 1..12)
    ) {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        build_tree(root, &entries);

        for repo in find_repositories(root) {
            let relative = repo.strip_prefix(root).unwrap();
            let components: Vec<_> = relative.components().collect();
            for component in &components[..components.len().saturating_sub(1)] {
                prop_assert!(
                    !is_hidden_name(component.as_os_str()),
                    "{} is beneath a hidden directory",
                    repo.display()
                );
            }
        }
    }

    #[test]
    fn prop_finds_exactly_the_reachable_repositories(
        entries in prop::collection::vec(entry_strategy(), 1..12)
    ) {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let repos = build_tree(root, &entries);

        let found = find_repositories(root);
        let found_set: BTreeSet<PathBuf> = found.iter().cloned().collect();

        prop_assert_eq!(found.len(), found_set.len());
        prop_assert_eq!(found_set, expected_repositories(root, &repos));
    }

    #[test]
    fn prop_discovery_is_deterministic(
        entries in prop::collection::vec(entry_strategy(), 1..12)
    ) {
        let temp_dir = TempDir::new().unwrap();
        build_tree(temp_dir.path(), &entries);

        prop_assert_eq!(
            find_repositories(temp_dir.path()),
            find_repositories(temp_dir.path())
        );
    }
}
