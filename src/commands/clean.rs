//! The `clean` command: scan, select projects, and remove their cleanable
//! directories through the trash command.

use std::fmt::Write as _;
use std::io::{BufRead, Write};
use std::path::Path;

use chrono::Utc;

use super::scan::{build_scanner, resolve_roots};
use super::{read_answer, write_out};
use crate::cli::{ScanArgs, normalize_path};
use crate::config::Settings;
use crate::error::Result;
use crate::logging::Logger;
use crate::model::StaleProject;
use crate::removal::TrashCommand;
use crate::report::render_text;
use crate::size::format_size;

/// What a clean run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanSummary {
    /// Projects chosen for cleaning
    pub selected_projects: usize,
    /// Directories the trash command handled successfully
    pub deleted: usize,
    /// Directories the trash command failed on
    pub failed: usize,
    /// Measured size of the deleted directories
    pub reclaimed_bytes: u64,
    /// False for a dry run or when the prompt was declined
    pub executed: bool,
}

pub struct Clean<'a> {
    args: &'a ScanArgs,
    settings: &'a Settings,
    all: bool,
    projects: &'a [String],
    execute: bool,
    yes: bool,
    trash_command: Option<&'a str>,
    verbose: u8,
    quiet: bool,
}

pub struct CleanBuilder<'a> {
    args: &'a ScanArgs,
    settings: &'a Settings,
    all: bool,
    projects: &'a [String],
    execute: bool,
    yes: bool,
    trash_command: Option<&'a str>,
    verbose: u8,
    quiet: bool,
}

impl<'a> CleanBuilder<'a> {
    pub fn new(args: &'a ScanArgs, settings: &'a Settings) -> Self {
        Self {
            args,
            settings,
            all: false,
            projects: &[],
            execute: false,
            yes: false,
            trash_command: None,
            verbose: 0,
            quiet: false,
        }
    }

    pub fn all(mut self, all: bool) -> Self {
        self.all = all;
        self
    }

    pub fn projects(mut self, projects: &'a [String]) -> Self {
        self.projects = projects;
        self
    }

    pub fn execute(mut self, execute: bool) -> Self {
        self.execute = execute;
        self
    }

    pub fn yes(mut self, yes: bool) -> Self {
        self.yes = yes;
        self
    }

    pub fn trash_command(mut self, command: Option<&'a str>) -> Self {
        self.trash_command = command;
        self
    }

    pub fn verbose(mut self, verbose: u8) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn build(self) -> Clean<'a> {
        Clean {
            args: self.args,
            settings: self.settings,
            all: self.all,
            projects: self.projects,
            execute: self.execute,
            yes: self.yes,
            trash_command: self.trash_command,
            verbose: self.verbose,
            quiet: self.quiet,
        }
    }
}

impl<'a> Clean<'a> {
    pub fn builder(args: &'a ScanArgs, settings: &'a Settings) -> CleanBuilder<'a> {
        CleanBuilder::new(args, settings)
    }

    /// Execute the clean command.
    ///
    /// The confirmation prompt is read from `input`; the report, the plan
    /// and per-directory results go to `out`.
    pub fn clean<R: BufRead, W: Write>(self, input: &mut R, out: &mut W) -> Result<CleanSummary> {
        let logger = Logger::new(self.verbose, self.quiet);
        let trash = TrashCommand::parse(
            self.trash_command
                .unwrap_or(self.settings.trash_command.as_str()),
        )?;

        let roots = resolve_roots(self.args, self.settings);
        let result = build_scanner(self.args, self.settings, self.verbose, self.quiet).scan(&roots)?;
        write_out(out, &render_text(&result, Utc::now()))?;

        let mut summary = CleanSummary::default();

        if !self.all && self.projects.is_empty() {
            if !result.projects().is_empty() {
                write_out(
                    out,
                    "\nNo projects selected. Pass --all or --project NAME to choose what to clean.\n",
                )?;
            }
            return Ok(summary);
        }

        let selected = select_projects(result.into_projects(), self.all, self.projects, logger);
        summary.selected_projects = selected.len();

        if selected.is_empty() {
            write_out(out, "\nNothing to clean.\n")?;
            return Ok(summary);
        }

        write_out(out, &render_plan(&selected, self.execute))?;

        if !self.execute {
            write_out(
                out,
                "Dry run: nothing was deleted. Re-run with --execute to delete.\n",
            )?;
            return Ok(summary);
        }

        if !self.yes {
            write_out(out, "Proceed with deletion? [y/N] ")?;
            if !read_answer(input)? {
                write_out(out, "Aborted.\n")?;
                return Ok(summary);
            }
        }

        summary.executed = true;
        for project in &selected {
            for artifact in project.artifacts() {
                match trash.remove(artifact.path()) {
                    Ok(()) => {
                        summary.deleted += 1;
                        summary.reclaimed_bytes += artifact.size_bytes().unwrap_or(0);
                        write_out(out, &format!("  ✓ {}\n", artifact.path().display()))?;
                    }
                    Err(err) => {
                        summary.failed += 1;
                        write_out(
                            out,
                            &format!("  ✗ {}: {err}\n", artifact.path().display()),
                        )?;
                    }
                }
            }
        }

        write_out(
            out,
            &format!(
                "\nDeleted {} directories, {} failed, reclaimed {}\n",
                summary.deleted,
                summary.failed,
                format_size(summary.reclaimed_bytes)
            ),
        )?;

        Ok(summary)
    }
}

/// Projects chosen by `--all` or by `--project` selectors, in scan order.
/// Selectors that match nothing are warned about.
pub(crate) fn select_projects(
    projects: Vec<StaleProject>,
    all: bool,
    selectors: &[String],
    logger: Logger,
) -> Vec<StaleProject> {
    for selector in selectors {
        if !projects
            .iter()
            .any(|project| matches_selector(project, selector))
        {
            logger.warn(format!("No stale project matches '{selector}'"));
        }
    }

    projects
        .into_iter()
        .filter(|project| {
            all || selectors
                .iter()
                .any(|selector| matches_selector(project, selector))
        })
        .collect()
}

/// A selector matches the project's display name or, as a path, the
/// project's path.
fn matches_selector(project: &StaleProject, selector: &str) -> bool {
    project.name() == selector || normalize_path(Path::new(selector)) == project.path()
}

fn render_plan(selected: &[StaleProject], execute: bool) -> String {
    let mut out = String::new();
    let heading = if execute {
        "Will delete:"
    } else {
        "Would delete:"
    };
    let _ = writeln!(out);
    let _ = writeln!(out, "{heading}");

    let mut total = 0;
    let mut unmeasured = 0;
    for project in selected {
        let _ = writeln!(out, "  {} ({})", project.name(), project.path().display());
        for artifact in project.artifacts() {
            let size = match artifact.size_bytes() {
                Some(bytes) => format_size(bytes),
                None => "size unknown".to_string(),
            };
            let _ = writeln!(out, "    {} ({size})", artifact.path().display());
        }
        total += project.total_size_bytes();
        unmeasured += project.unmeasured_artifacts();
    }

    let _ = write!(out, "Total to reclaim: {}", format_size(total));
    if unmeasured > 0 {
        let _ = write!(out, " plus {unmeasured} unmeasured");
    }
    let _ = writeln!(out);
    out
}
