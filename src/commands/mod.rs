//! Implementation of dev-cleanup subcommands.
//!
//! `mod.rs` is a thin dispatcher; command logic lives in `scan`, `clean`,
//! `nuke` and `config`.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::cli::{Cli, Commands, GlobalOpts};
use crate::config::Settings;
use crate::error::{CleanupError, Result};
use crate::logging::Logger;

pub(crate) mod clean;
pub(crate) mod config;
pub(crate) mod nuke;
pub(crate) mod scan;

pub use clean::{Clean, CleanBuilder, CleanSummary};
pub use config::config;
pub use nuke::{Nuke, NukeBuilder, NukeSummary};
pub use scan::scan;


/// Execute commands based on the parsed CLI arguments.
pub fn execute(cli: &Cli) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    execute_with_io(cli, &mut stdin.lock(), &mut stdout.lock())
}

/// Execute commands with explicit input and output streams.
pub fn execute_with_io<R: BufRead, W: Write>(cli: &Cli, input: &mut R, out: &mut W) -> Result<()> {
    let quiet = cli.global_opts().quiet();
    let verbose = if quiet {
        0
    } else {
        cli.global_opts().verbose()
    };
    let logger = Logger::new(verbose, quiet);

    match cli.command() {
        Commands::Scan { args, json } => {
            let settings = load_settings(cli.global_opts(), logger);
            scan(args, *json, &settings, verbose, quiet, out)
        }
        Commands::Clean {
            args,
            all,
            projects,
            execute,
            yes,
            trash_command,
        } => {
            let settings = load_settings(cli.global_opts(), logger);
            Clean::builder(args, &settings)
                .all(*all)
                .projects(projects)
                .execute(*execute)
                .yes(*yes)
                .trash_command(trash_command.as_deref())
                .verbose(verbose)
                .quiet(quiet)
                .build()
                .clean(input, out)
                .map(|_| ())
        }
        Commands::Nuke {
            args,
            all,
            projects,
            execute,
            yes,
            trash_command,
        } => {
            let settings = load_settings(cli.global_opts(), logger);
            Nuke::builder(args, &settings)
                .all(*all)
                .projects(projects)
                .execute(*execute)
                .yes(*yes)
                .trash_command(trash_command.as_deref())
                .verbose(verbose)
                .quiet(quiet)
                .build()
                .nuke(input, out)
                .map(|_| ())
        }
        Commands::Config { action } => {
            let config_path = cli.global_opts().get_config_path()?;
            config(action, &config_path, out)
        }
    }
}

/// Settings for a scanning command. A config file that cannot be found,
/// read, or parsed is reported and replaced by the defaults.
fn load_settings(global: &GlobalOpts, logger: Logger) -> Settings {
    let loaded = global
        .get_config_path()
        .and_then(|path| {
            logger.verbose(2, format!("Reading settings from {}", path.display()));
            Settings::load(&path)
        });

    match loaded {
        Ok(settings) => settings,
        Err(err) => {
            let detail = std::error::Error::source(&err)
                .map(|source| format!(": {source}"))
                .unwrap_or_default();
            logger.warn(format!("{err}{detail}; using default settings"));
            Settings::default()
        }
    }
}

/// Write report text to the output stream.
pub(crate) fn write_out(out: &mut impl Write, text: &str) -> Result<()> {
    out.write_all(text.as_bytes())
        .and_then(|()| out.flush())
        .map_err(|source| CleanupError::IoError {
            path: PathBuf::from("<stdout>"),
            source,
        })
}

/// Read a yes/no answer; anything but `y` or `yes` is a no.
pub(crate) fn read_answer(input: &mut impl BufRead) -> Result<bool> {
    let mut line = String::new();
    input
        .read_line(&mut line)
        .map_err(|source| CleanupError::IoError {
            path: PathBuf::from("<stdin>"),
            source,
        })?;
    let answer = line.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}
