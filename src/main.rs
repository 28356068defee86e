//! # dev-cleanup CLI
//!
//! Finds stale git projects and reclaims the space their dependency
//! directories use.
//!
//! ## Commands
//!
//! - **scan**: report stale projects and their cleanable directories
//! - **clean**: delete cleanable directories of selected projects (dry run
//!   unless `--execute`)
//! - **config**: show, locate, initialize, or edit the settings file
//!
//! ## Quick Start
//!
//! ```bash
//! # Projects untouched for more than 6 months under ~/Projects
//! dev-cleanup scan
//!
//! # Projects 3 to 12 months old, as JSON
//! dev-cleanup scan -o 3 -y 12 --json
//!
//! # Move every stale project's node_modules to the trash
//! dev-cleanup clean --all --dirs node_modules --execute
//! ```
//!
//! ## Environment Variables
//!
//! - `DEV_CLEANUP_CONFIG`: Config file location (default:
//!   ~/.dev-cleanup/config.toml)
//! - `DEV_CLEANUP_VERBOSE`: Enable verbose output
//! - `DEV_CLEANUP_QUIET`: Silence all output except reports and errors
//!
//! See individual commands for more environment variables.

use std::io::IsTerminal;

use dev_cleanup::cli::Cli;

fn main() -> miette::Result<()> {
    miette::set_panic_hook();

    if std::io::stderr().is_terminal() {
        miette::set_hook(Box::new(|_| {
            Box::new(
                miette::GraphicalReportHandler::new()
                    .with_theme(miette::GraphicalTheme::unicode_nocolor())
                    .with_context_lines(3),
            )
        }))?;
    } else {
        // Plain output for logs and pipes
        miette::set_hook(Box::new(|_| {
            Box::new(
                miette::GraphicalReportHandler::new()
                    .with_theme(miette::GraphicalTheme::none())
                    .with_context_lines(0),
            )
        }))?;
    }

    let cli = Cli::parse_args();

    dev_cleanup::commands::execute(&cli).map_err(Into::into)
}
