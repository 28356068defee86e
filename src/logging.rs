use std::fmt::Display;

/// Stderr logger driven by the `-v` count and the `-q` flag.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Logger {
    verbose: u8,
    quiet: bool,
}

impl Logger {
    pub(crate) fn new(verbose: u8, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    pub(crate) fn warn(&self, message: impl Display) {
        if !self.quiet {
            eprintln!("Warning: {message}");
        }
    }

    pub(crate) fn verbose(&self, level: u8, message: impl Display) {
        if !self.quiet && self.verbose >= level {
            eprintln!("{message}");
        }
    }
}
