//! The `nuke` command: scan, select projects, and remove the selected
//! project directories in their entirety.

use std::fmt::Write as _;
use std::io::{BufRead, Write};

use chrono::Utc;

use super::clean::select_projects;
use super::scan::{resolve_roots, scanner_builder};
use super::{read_answer, write_out};
use crate::cli::ScanArgs;
use crate::config::Settings;
use crate::error::Result;
use crate::logging::Logger;
use crate::model::StaleProject;
use crate::removal::TrashCommand;
use crate::report::render_project_list;

/// What a nuke run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NukeSummary {
    /// Projects chosen for deletion
    pub selected_projects: usize,
    /// Project directories the trash command handled successfully
    pub deleted: usize,
    /// Project directories the trash command failed on
    pub failed: usize,
    /// False for a dry run or when the prompt was declined
    pub executed: bool,
}

pub struct Nuke<'a> {
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

pub struct NukeBuilder<'a> {
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

impl<'a> NukeBuilder<'a> {
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

    pub fn build(self) -> Nuke<'a> {
        Nuke {
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

impl<'a> Nuke<'a> {
    pub fn builder(args: &'a ScanArgs, settings: &'a Settings) -> NukeBuilder<'a> {
        NukeBuilder::new(args, settings)
    }

    /// Execute the nuke command.
    ///
    /// Unlike `clean`, every repository inside the age window is a
    /// candidate, with or without cleanable directories, and the whole
    /// project directory is removed.
    pub fn nuke<R: BufRead, W: Write>(self, input: &mut R, out: &mut W) -> Result<NukeSummary> {
        let logger = Logger::new(self.verbose, self.quiet);
        let trash = TrashCommand::parse(
            self.trash_command
                .unwrap_or(self.settings.trash_command.as_str()),
        )?;

        let roots = resolve_roots(self.args, self.settings);
        let result = scanner_builder(self.args, self.settings, self.verbose, self.quiet)
            .require_artifacts(false)
            .build()
            .scan(&roots)?;
        write_out(out, &render_project_list(&result, Utc::now()))?;

        let mut summary = NukeSummary::default();

        if !self.all && self.projects.is_empty() {
            if !result.projects().is_empty() {
                write_out(
                    out,
                    "\nNo projects selected. Pass --all or --project NAME to choose what to delete.\n",
                )?;
            }
            return Ok(summary);
        }

        let selected = select_projects(result.into_projects(), self.all, self.projects, logger);
        summary.selected_projects = selected.len();

        if selected.is_empty() {
            write_out(out, "\nNothing to delete.\n")?;
            return Ok(summary);
        }

        write_out(out, &render_plan(&selected))?;

        if !self.execute {
            write_out(
                out,
                "Dry run: nothing was deleted. Re-run with --execute to delete.\n",
            )?;
            return Ok(summary);
        }

        if !self.yes {
            write_out(
                out,
                &format!(
                    "This deletes the entire project directories, including uncommitted work.\nDelete {} local projects? [y/N] ",
                    selected.len()
                ),
            )?;
            if !read_answer(input)? {
                write_out(out, "Aborted.\n")?;
                return Ok(summary);
            }
        }

        summary.executed = true;
        for project in &selected {
            match trash.remove(project.path()) {
                Ok(()) => {
                    summary.deleted += 1;
                    write_out(out, &format!("  ✓ {}\n", project.path().display()))?;
                }
                Err(err) => {
                    summary.failed += 1;
                    write_out(out, &format!("  ✗ {}: {err}\n", project.path().display()))?;
                }
            }
        }

        write_out(
            out,
            &format!(
                "\nDeleted {} projects, {} failed\n",
                summary.deleted, summary.failed
            ),
        )?;

        Ok(summary)
    }
}

fn render_plan(selected: &[StaleProject]) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "Projects to be deleted:");
    for project in selected {
        let _ = writeln!(out, "  - {}", project.path().display());
    }
    out
}
