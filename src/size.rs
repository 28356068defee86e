//! Disk usage of artifact directories.
//!
//! A measurement either succeeds for the whole subtree or yields `None`;
//! partial sums are never reported, and `None` is kept distinct from an
//! empty directory all the way to the report.

use std::path::Path;
use std::process::Command;
use std::time::{Duration, Instant};

use walkdir::WalkDir;

use crate::process::run_with_timeout;

/// Default per-directory deadline for size measurement.
pub const DEFAULT_SIZE_TIMEOUT: Duration = Duration::from_secs(30);

/// Measures the size of a directory subtree.
pub trait SizeProbe: Send + Sync {
    /// Size of `path` in bytes, or `None` if it could not be measured.
    fn size_of(&self, path: &Path) -> Option<u64>;
}

/// Runs `du -sk`, which reports allocated disk blocks in KiB.
#[derive(Debug, Clone)]
pub struct DuProbe {
    program: String,
    timeout: Duration,
}

impl DuProbe {
    pub fn new(timeout: Duration) -> Self {
        Self {
            program: "du".to_string(),
            timeout,
        }
    }

    /// Use a specific du executable.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

impl Default for DuProbe {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE_TIMEOUT)
    }
}

impl SizeProbe for DuProbe {
    fn size_of(&self, path: &Path) -> Option<u64> {
        let mut command = Command::new(&self.program);
        command.arg("-sk").arg(path);

        let output = run_with_timeout(command, self.timeout).ok()?;
        parse_du_output(&output)
    }
}

/// Parse the KiB count from the first field of `du -sk` output.
pub fn parse_du_output(output: &str) -> Option<u64> {
    let kib: u64 = output.split_whitespace().next()?.parse().ok()?;
    kib.checked_mul(1024)
}

/// Walks the subtree in-process and sums the apparent size of its files.
///
/// Symbolic links are not followed. Any unreadable entry, or running past
/// the deadline, fails the whole measurement.
#[derive(Debug, Clone)]
pub struct WalkProbe {
    timeout: Duration,
}

impl WalkProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for WalkProbe {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE_TIMEOUT)
    }
}

impl SizeProbe for WalkProbe {
    fn size_of(&self, path: &Path) -> Option<u64> {
        if !path.is_dir() {
            return None;
        }

        let deadline = Instant::now() + self.timeout;
        let mut total: u64 = 0;

        for entry in WalkDir::new(path).follow_links(false) {
            if Instant::now() >= deadline {
                return None;
            }
            let entry = entry.ok()?;
            if entry.file_type().is_file() {
                total = total.checked_add(entry.metadata().ok()?.len())?;
            }
        }

        Some(total)
    }
}

/// Format size in human-readable format
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit_idx])
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn du_available() -> bool {
        Command::new("du").arg("--version").output().is_ok()
            || Command::new("du").arg("-sk").arg(".").output().is_ok()
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(100), "100 B");
        assert_eq!(format_size(1024), "1.0 KiB");
        assert_eq!(format_size(1536), "1.5 KiB");
        assert_eq!(format_size(50 * 1024 * 1024), "50.0 MiB");
        assert_eq!(format_size(1024 * 1024 * 1024), "1.0 GiB");
        assert_eq!(format_size(1024_u64.pow(4)), "1.0 TiB");
        assert_eq!(format_size(2048 * 1024_u64.pow(4)), "2048.0 TiB");
    }

    #[test]
    fn test_parse_du_output() {
        assert_eq!(parse_du_output("51200\t/work/a/venv\n"), Some(50 * 1024 * 1024));
        assert_eq!(parse_du_output("0\t/empty\n"), Some(0));
        assert_eq!(parse_du_output(""), None);
        assert_eq!(parse_du_output("du: cannot access"), None);
    }

    #[test]
    fn test_walk_probe_sums_file_sizes() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("node_modules");
        fs::create_dir_all(dir.join("a/b")).unwrap();
        fs::write(dir.join("one.js"), vec![b'x'; 1000]).unwrap();
        fs::write(dir.join("a/two.js"), vec![b'x'; 2000]).unwrap();
        fs::write(dir.join("a/b/three.js"), vec![b'x'; 3000]).unwrap();

        assert_eq!(WalkProbe::default().size_of(&dir), Some(6000));
    }

    #[test]
    fn test_walk_probe_empty_directory_is_zero() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(WalkProbe::default().size_of(temp_dir.path()), Some(0));
    }

    #[test]
    fn test_walk_probe_missing_directory_is_unmeasured() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(
            WalkProbe::default().size_of(&temp_dir.path().join("missing")),
            None
        );
    }

    #[test]
    fn test_walk_probe_zero_timeout_is_unmeasured() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("file"), "data").unwrap();
        assert_eq!(WalkProbe::new(Duration::ZERO).size_of(temp_dir.path()), None);
    }

    #[test]
    fn test_du_probe_measures_directory() {
        if !du_available() {
            eprintln!("du not installed, skipping");
            return;
        }
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("blob"), vec![b'x'; 64 * 1024]).unwrap();

        let size = DuProbe::default().size_of(temp_dir.path()).unwrap();
        assert_eq!(size % 1024, 0);
        assert!(size > 0);
    }

    #[test]
    fn test_du_probe_missing_directory_is_unmeasured() {
        let temp_dir = TempDir::new().unwrap();
        let probe = DuProbe::default();
        assert_eq!(probe.size_of(&temp_dir.path().join("missing")), None);
    }

    #[test]
    fn test_du_probe_missing_binary_is_unmeasured() {
        let temp_dir = TempDir::new().unwrap();
        let probe = DuProbe::default().with_program("dev-cleanup-no-such-du");
        assert_eq!(probe.size_of(temp_dir.path()), None);
    }
}
