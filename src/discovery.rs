use std::fs;
use std::path::{Path, PathBuf};

/// Name of the git metadata entry that marks a repository root.
pub const GIT_MARKER: &str = ".git";

/// Returns true when `path` is the root of a git repository.
///
/// The marker may be a directory (a normal clone) or a file (a worktree or
/// a submodule whose git directory lives elsewhere).
pub fn is_repository(path: &Path) -> bool {
    fs::metadata(path.join(GIT_MARKER)).is_ok_and(|meta| meta.is_dir() || meta.is_file())
}

/// Returns true for entries whose name starts with a dot.
pub(crate) fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with('.'))
}

enum Visit {
    /// Test the directory and, if it is not a repository, walk its children.
    Descend(PathBuf),
    /// Test the directory but never walk below it.
    Probe(PathBuf),
}

/// Finds every git repository under `root`.
///
/// The walk stops at the first repository on each branch, so a project
/// checked out inside another project's working tree is never reported
/// separately and large dependency trees inside a repository are never
/// walked. Hidden directories are tested for being a repository but never
/// descended into. Directories that cannot be read are skipped.
///
/// Children are visited in name order, so the result is stable for an
/// unchanged tree. Symbolic links to directories are not followed.
///
/// # Arguments
///
/// * `root` - Directory to search; a missing or unreadable root yields an
///   empty list
///
/// # Returns
///
/// Repository roots in depth-first traversal order.
pub fn find_repositories(root: &Path) -> Vec<PathBuf> {
    let mut repositories = Vec::new();

    if !root.is_dir() {
        return repositories;
    }

    let mut stack = vec![Visit::Descend(root.to_path_buf())];

    while let Some(visit) = stack.pop() {
        let dir = match visit {
            Visit::Probe(dir) => {
                if is_repository(&dir) {
                    repositories.push(dir);
                }
                continue;
            }
            Visit::Descend(dir) => dir,
        };

        if is_repository(&dir) {
            repositories.push(dir);
            continue;
        }

        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };

        let mut children: Vec<PathBuf> = entries
            .flatten()
            .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_dir()))
            .map(|entry| entry.path())
            .collect();
        children.sort();

        // Reverse so the stack pops children in name order.
        for child in children.into_iter().rev() {
            if is_hidden(&child) {
                stack.push(Visit::Probe(child));
            } else {
                stack.push(Visit::Descend(child));
            }
        }
    }

    repositories
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn make_repo(path: &Path) {
        fs::create_dir_all(path.join(GIT_MARKER)).unwrap();
    }

    #[test]
    fn test_finds_sibling_repositories_in_name_order() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        make_repo(&root.join("beta"));
        make_repo(&root.join("alpha"));
        make_repo(&root.join("group/gamma"));

        let repos = find_repositories(root);
        assert_eq!(
            repos,
            vec![
                root.join("alpha"),
                root.join("beta"),
                root.join("group/gamma"),
            ]
        );
    }

    #[test]
    fn test_does_not_descend_into_repository() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        make_repo(&root.join("outer"));
        make_repo(&root.join("outer/vendor/inner"));

        let repos = find_repositories(root);
        assert_eq!(repos, vec![root.join("outer")]);
    }

    #[test]
    fn test_root_itself_is_a_repository() {
        let temp_dir = TempDir::new().unwrap();
        make_repo(temp_dir.path());
        make_repo(&temp_dir.path().join("nested"));

        let repos = find_repositories(temp_dir.path());
        assert_eq!(repos, vec![temp_dir.path().to_path_buf()]);
    }

    #[test]
    fn test_git_file_marks_a_worktree() {
        let temp_dir = TempDir::new().unwrap();
        let worktree = temp_dir.path().join("worktree");
        fs::create_dir_all(&worktree).unwrap();
        fs::write(worktree.join(GIT_MARKER), "gitdir: /elsewhere/.git/worktrees/x\n").unwrap();

        assert!(is_repository(&worktree));
        assert_eq!(find_repositories(temp_dir.path()), vec![worktree]);
    }

    #[test]
    fn test_hidden_directories_are_probed_but_not_walked() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        make_repo(&root.join(".dotfiles"));
        make_repo(&root.join(".cache/some/repo"));

        let repos = find_repositories(root);
        assert_eq!(repos, vec![root.join(".dotfiles")]);
    }

    #[test]
    fn test_missing_root_yields_nothing() {
        let temp_dir = TempDir::new().unwrap();
        assert!(find_repositories(&temp_dir.path().join("missing")).is_empty());
    }

    #[test]
    fn test_root_that_is_a_file_yields_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file.txt");
        fs::write(&file, "not a directory").unwrap();
        assert!(find_repositories(&file).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directories_are_not_followed() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("root");
        let elsewhere = temp_dir.path().join("elsewhere");
        make_repo(&elsewhere.join("project"));
        fs::create_dir_all(&root).unwrap();
        std::os::unix::fs::symlink(&elsewhere, root.join("link")).unwrap();

        assert!(find_repositories(&root).is_empty());
    }
}
