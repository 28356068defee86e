#![allow(dead_code)]

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};
use std::{env, fs};

use chrono::{DateTime, Utc};
use git2::{Repository, Signature, Time};
use tempfile::TempDir;

/// Global mutex to ensure only one test manipulates HOME at a time.
static HOME_MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// RAII guard that redirects HOME to a temporary directory.
///
/// While the guard is alive, anything that resolves the user's home
/// directory (the default config file, `~` in roots) lands in the sandbox,
/// so tests never read or write the developer's real settings.
pub struct TempHomeGuard {
    _lock: MutexGuard<'static, ()>,
    temp_home: TempDir,
    prev_home: Option<OsString>,
    #[cfg(windows)]
    prev_userprofile: Option<OsString>,
}

impl TempHomeGuard {
    /// Create a new guard with a fresh temporary home directory.
    pub fn new() -> Self {
        let lock = HOME_MUTEX
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let temp_home = TempDir::new().expect("failed to create temporary HOME");
        let prev_home = env::var_os("HOME");
        #[cfg(windows)]
        let prev_userprofile = env::var_os("USERPROFILE");

        // SAFETY: we hold HOME_MUTEX, ensuring no other thread mutates the
        // environment while we redirect HOME for the test.
        unsafe {
            env::set_var("HOME", temp_home.path());
            #[cfg(windows)]
            {
                env::set_var("USERPROFILE", temp_home.path());
            }
        }

        Self {
            _lock: lock,
            temp_home,
            prev_home,
            #[cfg(windows)]
            prev_userprofile,
        }
    }

    /// Path to the temporary HOME directory.
    pub fn home(&self) -> &Path {
        self.temp_home.path()
    }

    /// Where the default config file lives under the temporary HOME.
    pub fn config_path(&self) -> PathBuf {
        self.home().join(".dev-cleanup").join("config.toml")
    }
}

impl Drop for TempHomeGuard {
    fn drop(&mut self) {
        // SAFETY: guarded by HOME_MUTEX; we restore the environment to its
        // previous state before releasing the lock.
        unsafe {
            match self.prev_home.as_ref() {
                Some(prev) => env::set_var("HOME", prev),
                None => env::remove_var("HOME"),
            }
            #[cfg(windows)]
            {
                match self.prev_userprofile.as_ref() {
                    Some(prev) => env::set_var("USERPROFILE", prev),
                    None => env::remove_var("USERPROFILE"),
                }
            }
        }
    }
}

/// Initialize a repository at `path` with one commit dated `when`.
pub fn repo_with_commit_at(path: &Path, when: DateTime<Utc>, message: &str) -> Repository {
    fs::create_dir_all(path).unwrap();
    let repo = Repository::init(path).unwrap();
    commit_at(&repo, when, message);
    repo
}

/// Add a commit dated `when` on top of HEAD.
pub fn commit_at(repo: &Repository, when: DateTime<Utc>, message: &str) {
    let workdir = repo.workdir().unwrap().to_path_buf();
    fs::write(workdir.join("CHANGELOG.md"), format!("{message}\n")).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new("CHANGELOG.md")).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

    let signature =
        Signature::new("Test", "test@example.com", &Time::new(when.timestamp(), 0)).unwrap();
    let parent = repo.head().ok().and_then(|head| head.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(
        Some("HEAD"),
        &signature,
        &signature,
        message,
        &tree,
        &parents,
    )
    .unwrap();
}

/// Write a file of `len` bytes, creating parent directories.
pub fn write_bytes(path: &Path, len: usize) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, vec![b'x'; len]).unwrap();
}

/// True when the `git` binary can be run.
pub fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .is_ok()
}
