//! # dev-cleanup
//!
//! Finds git projects you have stopped working on and reports how much disk
//! space their dependency directories (`node_modules`, virtualenvs, ...)
//! occupy, so you can decide what to remove.
//!
//! ## Overview
//!
//! A scan walks each root directory for git repositories, reads the date of
//! each repository's last commit, keeps the ones inside an age window given
//! in calendar months, and lists their cleanable directories with sizes.
//! Scanning never modifies anything; deletion is a separate, explicit step
//! that hands directories to an external trash command.
//!
//! ## Architecture
//!
//! - [`discovery`]: repository discovery with nested-repository suppression
//! - [`vcs`]: last-commit lookup through `git` or libgit2
//! - [`artifacts`]: name-based discovery of cleanable directories
//! - [`size`]: directory size measurement through `du` or an in-process walk
//! - [`age`]: calendar-month age windows
//! - [`scanner`]: the parallel scan pipeline
//! - [`model`]: the records a scan produces
//! - [`report`]: text and JSON rendering
//! - [`config`]: the TOML settings file
//! - [`removal`]: the trash command
//! - [`cli`] and [`commands`]: the command-line front end
//! - [`error`]: error types with thiserror + miette
//!
//! ## Library Usage
//!
//! ```no_run
//! use std::path::PathBuf;
//!
//! use dev_cleanup::scanner::Scanner;
//! use dev_cleanup::vcs::LibGit2;
//! use dev_cleanup::size::WalkProbe;
//!
//! let scanner = Scanner::builder()
//!     .commit_source(LibGit2)
//!     .size_probe(WalkProbe::default())
//!     .older_than_months(6)
//!     .artifact_names(["node_modules", "venv"])
//!     .build();
//!
//! let result = scanner.scan(&[PathBuf::from("/home/me/Projects")])?;
//! for project in result.projects() {
//!     println!("{}: {} bytes", project.name(), project.total_size_bytes());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! Problems inside the scanned trees (unreadable directories, repositories
//! without commits, slow or missing external tools) never fail a scan; they
//! show up as exclusion statistics or unmeasured sizes. Only caller errors
//! are returned, as [`error::CleanupError`].

pub mod age;
pub mod artifacts;
pub mod cli;
pub mod commands;
pub mod config;
pub mod discovery;
pub mod error;
pub mod model;
pub mod removal;
pub mod report;
pub mod scanner;
pub mod size;
pub mod vcs;

// Internal modules
mod logging;
mod process;

pub use process::CommandFailure;
