//! The `scan` command and the settings resolution every scanning command
//! shares.

use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;

use super::write_out;
use crate::cli::{CommitBackend, ScanArgs, SizeBackend, normalize_path};
use crate::config::{Settings, expand_home};
use crate::error::Result;
use crate::report::{render_json, render_text};
use crate::scanner::{Scanner, ScannerBuilder};
use crate::size::{DuProbe, WalkProbe};
use crate::vcs::{GitCommand, LibGit2};

/// Roots from the command line if any were given, else from the settings.
/// `~` is expanded and relative roots are made absolute.
pub(crate) fn resolve_roots(args: &ScanArgs, settings: &Settings) -> Vec<PathBuf> {
    let roots = if args.roots.is_empty() {
        &settings.roots
    } else {
        &args.roots
    };

    roots
        .iter()
        .map(|root| normalize_path(expand_home(root)))
        .collect()
}

/// Age bounds from the command line; when neither is given the configured
/// `older_than_months` applies.
pub(crate) fn resolve_age_bounds(args: &ScanArgs, settings: &Settings) -> (Option<u32>, Option<u32>) {
    match (args.older_than, args.younger_than) {
        (None, None) => (Some(settings.older_than_months), None),
        bounds => bounds,
    }
}

/// Artifact names from `--dirs` if given, else from the settings. Blank
/// entries are dropped.
pub(crate) fn resolve_artifact_names(args: &ScanArgs, settings: &Settings) -> Vec<String> {
    let names = if args.dirs.is_empty() {
        &settings.cleanable_dirs
    } else {
        &args.dirs
    };

    names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Scanner settings from command-line flags layered over the settings.
pub(crate) fn scanner_builder(
    args: &ScanArgs,
    settings: &Settings,
    verbose: u8,
    quiet: bool,
) -> ScannerBuilder {
    let (older, younger) = resolve_age_bounds(args, settings);
    let workspace_dirs = settings
        .workspace_dirs
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string);

    let builder = Scanner::builder()
        .older_than_months(older)
        .younger_than_months(younger)
        .artifact_names(resolve_artifact_names(args, settings))
        .workspace_dirs(workspace_dirs)
        .jobs(args.jobs)
        .record_ignored(args.show_ignored)
        .verbose(verbose)
        .quiet(quiet);

    let builder = match args.commit_backend {
        CommitBackend::Git => builder.commit_source(GitCommand::new(settings.commit_timeout())),
        CommitBackend::Libgit2 => builder.commit_source(LibGit2),
    };

    match args.size_backend {
        SizeBackend::Du => builder.size_probe(DuProbe::new(settings.size_timeout())),
        SizeBackend::Walk => builder.size_probe(WalkProbe::new(settings.size_timeout())),
    }
}

/// Build a scanner from command-line flags layered over the settings.
pub(crate) fn build_scanner(args: &ScanArgs, settings: &Settings, verbose: u8, quiet: bool) -> Scanner {
    scanner_builder(args, settings, verbose, quiet).build()
}

/// Execute the scan command: scan and print the report to `out`.
pub fn scan(
    args: &ScanArgs,
    json: bool,
    settings: &Settings,
    verbose: u8,
    quiet: bool,
    out: &mut impl Write,
) -> Result<()> {
    let roots = resolve_roots(args, settings);
    let result = build_scanner(args, settings, verbose, quiet).scan(&roots)?;

    let now = Utc::now();
    let report = if json {
        let mut json = render_json(&result, now)?;
        json.push('\n');
        json
    } else {
        render_text(&result, now)
    };

    write_out(out, &report)
}
