//! Human and machine renderings of a [`ScanResult`].

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::age::describe_bounds;
use crate::error::Result;
use crate::model::{
    ArtifactDirectory, FilterStats, IgnoredRepo, ScanResult, StaleProject, serialize_path,
    serialize_paths,
};
use crate::size::format_size;
use crate::vcs::LastCommit;

const HEADERS: [&str; 6] = [
    "#",
    "Project",
    "Last Commit",
    "Days Stale",
    "Cleanable Dirs",
    "Total Size",
];

/// Columns rendered right-aligned.
const NUMERIC: [bool; 6] = [true, false, false, true, false, true];

const PROJECT_HEADERS: [&str; 5] = ["#", "Project", "Last Commit", "Days Stale", "Path"];
const PROJECT_NUMERIC: [bool; 5] = [true, false, false, true, false];

/// Calendar date of `timestamp` on the local calendar.
pub fn format_date(timestamp: DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

/// Artifact kinds of a project, with a count when a kind appears more than
/// once, e.g. `node_modules (3), venv`.
pub fn summarize_kinds(artifacts: &[ArtifactDirectory]) -> String {
    let mut kinds: Vec<(&str, usize)> = Vec::new();
    for artifact in artifacts {
        match kinds.iter_mut().find(|(kind, _)| *kind == artifact.kind()) {
            Some((_, count)) => *count += 1,
            None => kinds.push((artifact.kind(), 1)),
        }
    }

    kinds
        .iter()
        .map(|(kind, count)| {
            if *count > 1 {
                format!("{kind} ({count})")
            } else {
                (*kind).to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Size with a marker when part of it could not be measured.
fn size_cell(project: &StaleProject) -> String {
    let size = format_size(project.total_size_bytes());
    if project.unmeasured_artifacts() > 0 {
        format!("{size}*")
    } else {
        size
    }
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

/// One-line summary of what the scan examined and why repositories were
/// left out.
pub fn stats_line(total_repos_scanned: usize, stats: &FilterStats) -> String {
    format!(
        "Scanned {}: {} too recent, {} too old, {} without commits, {} without cleanable directories",
        plural(total_repos_scanned, "repository", "repositories"),
        stats.too_recent,
        stats.too_old,
        stats.no_commits,
        stats.no_cleanable
    )
}

/// Render the scan as a text table for the terminal.
pub fn render_text(result: &ScanResult, now: DateTime<Utc>) -> String {
    let description = describe_bounds(result.older_than_months(), result.younger_than_months());
    let mut out = String::new();

    if result.projects().is_empty() {
        let _ = writeln!(out, "No stale projects found ({description}).");
    } else {
        let _ = writeln!(out, "Stale Projects ({description})");
        let _ = writeln!(out);

        let rows: Vec<[String; 6]> = result
            .projects()
            .iter()
            .enumerate()
            .map(|(idx, project)| {
                [
                    (idx + 1).to_string(),
                    project.name().to_string(),
                    format_date(project.last_commit().timestamp),
                    project.days_stale(now).to_string(),
                    summarize_kinds(project.artifacts()),
                    size_cell(project),
                ]
            })
            .collect();

        write_table(&mut out, HEADERS, NUMERIC, &rows);

        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Total reclaimable space: {} across {}",
            format_size(result.total_size_bytes()),
            plural(result.projects().len(), "project", "projects")
        );
    }

    let _ = writeln!(
        out,
        "{}",
        stats_line(result.total_repos_scanned(), result.stats())
    );

    let unmeasured = result.unmeasured_artifacts();
    if unmeasured > 0 {
        let _ = writeln!(
            out,
            "* {} could not be measured and {} not included in the totals.",
            plural(unmeasured, "directory", "directories"),
            if unmeasured == 1 { "is" } else { "are" }
        );
    }

    if result.cancelled() {
        let _ = writeln!(out, "Scan cancelled; results are incomplete.");
    }

    if !result.ignored().is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Ignored repositories:");
        for ignored in result.ignored() {
            let _ = match ignored.last_commit {
                Some(timestamp) => writeln!(
                    out,
                    "  {} ({}, last commit {})",
                    ignored.path.display(),
                    ignored.reason,
                    format_date(timestamp)
                ),
                None => writeln!(out, "  {} ({})", ignored.path.display(), ignored.reason),
            };
        }
    }

    out
}

/// Render the projects of a whole-project scan: every in-window repository,
/// listed for removal in its entirety.
pub fn render_project_list(result: &ScanResult, now: DateTime<Utc>) -> String {
    let description = describe_bounds(result.older_than_months(), result.younger_than_months());
    let mut out = String::new();

    if result.projects().is_empty() {
        let _ = writeln!(out, "No stale projects found ({description}).");
    } else {
        let _ = writeln!(out, "Stale Projects - WILL BE DELETED ({description})");
        let _ = writeln!(out);

        let rows: Vec<[String; 5]> = result
            .projects()
            .iter()
            .enumerate()
            .map(|(idx, project)| {
                [
                    (idx + 1).to_string(),
                    project.name().to_string(),
                    format_date(project.last_commit().timestamp),
                    project.days_stale(now).to_string(),
                    project.path().display().to_string(),
                ]
            })
            .collect();
        write_table(&mut out, PROJECT_HEADERS, PROJECT_NUMERIC, &rows);
        let _ = writeln!(out);
    }

    let _ = writeln!(
        out,
        "Scanned {}, {} in range",
        plural(result.total_repos_scanned(), "repository", "repositories"),
        plural(result.projects().len(), "project", "projects")
    );
    if result.cancelled() {
        let _ = writeln!(out, "Scan cancelled; results are incomplete.");
    }

    out
}

fn write_table<const N: usize>(
    out: &mut String,
    headers: [&str; N],
    numeric: [bool; N],
    rows: &[[String; N]],
) {
    let mut widths = headers.map(|header| header.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    write_row(out, &headers.map(str::to_string), &widths, numeric);
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    let _ = writeln!(out, "{}", rule.join("  "));
    for row in rows {
        write_row(out, row, &widths, numeric);
    }
}

fn write_row<const N: usize>(
    out: &mut String,
    cells: &[String; N],
    widths: &[usize; N],
    numeric: [bool; N],
) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .zip(numeric)
        .map(|((cell, &width), numeric)| {
            if numeric {
                format!("{cell:>width$}")
            } else {
                format!("{cell:<width$}")
            }
        })
        .collect();
    let _ = writeln!(out, "{}", line.join("  ").trim_end());
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    filter: String,
    older_than_months: Option<u32>,
    younger_than_months: Option<u32>,
    total_repos_scanned: usize,
    filtered: &'a FilterStats,
    total_size_bytes: u64,
    unmeasured_artifacts: usize,
    cancelled: bool,
    #[serde(serialize_with = "serialize_paths")]
    missing_roots: &'a [PathBuf],
    projects: Vec<JsonProject<'a>>,
    #[serde(skip_serializing_if = "is_empty")]
    ignored: &'a [IgnoredRepo],
}

fn is_empty(ignored: &&[IgnoredRepo]) -> bool {
    ignored.is_empty()
}

#[derive(Debug, Serialize)]
struct JsonProject<'a> {
    name: &'a str,
    #[serde(serialize_with = "serialize_path")]
    path: &'a Path,
    last_commit: &'a LastCommit,
    days_stale: i64,
    total_size_bytes: u64,
    artifacts: &'a [ArtifactDirectory],
}

/// Render the scan as pretty-printed JSON, including computed totals.
pub fn render_json(result: &ScanResult, now: DateTime<Utc>) -> Result<String> {
    let report = JsonReport {
        filter: describe_bounds(result.older_than_months(), result.younger_than_months()),
        older_than_months: result.older_than_months(),
        younger_than_months: result.younger_than_months(),
        total_repos_scanned: result.total_repos_scanned(),
        filtered: result.stats(),
        total_size_bytes: result.total_size_bytes(),
        unmeasured_artifacts: result.unmeasured_artifacts(),
        cancelled: result.cancelled(),
        missing_roots: result.missing_roots(),
        projects: result
            .projects()
            .iter()
            .map(|project| JsonProject {
                name: project.name(),
                path: project.path(),
                last_commit: project.last_commit(),
                days_stale: project.days_stale(now),
                total_size_bytes: project.total_size_bytes(),
                artifacts: project.artifacts(),
            })
            .collect(),
        ignored: result.ignored(),
    };

    Ok(serde_json::to_string_pretty(&report)?)
}
