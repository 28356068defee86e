//! Bounded execution of external commands.
//!
//! `git`, `du` and the trash command are all invoked through
//! [`run_with_timeout`]; a child that outlives its deadline is killed and
//! reported as [`CommandFailure::TimedOut`].

use std::io::Read;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Why an external command produced no usable output.
#[derive(Debug, Error)]
pub enum CommandFailure {
    /// The program could not be started (typically not installed).
    #[error("failed to start: {0}")]
    Spawn(#[source] std::io::Error),

    /// The program ran but exited unsuccessfully.
    #[error("exited with {0}")]
    Exit(ExitStatus),

    /// The program did not finish before the deadline and was killed.
    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    /// Waiting on the child or reading its output failed.
    #[error("failed while waiting: {0}")]
    Wait(#[source] std::io::Error),
}

/// Run `command` to completion, returning its stdout (lossily decoded).
///
/// Stdin is closed and stderr is discarded. Stdout is drained on a helper
/// thread so a chatty child cannot block on a full pipe while we poll it.
/// The deadline covers that drain too: a descendant that keeps the pipe
/// open after the child exits does not extend the call.
pub(crate) fn run_with_timeout(
    mut command: Command,
    timeout: Duration,
) -> Result<String, CommandFailure> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(CommandFailure::Spawn)?;

    let reader = child.stdout.take().map(|mut stdout| {
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = sender.send(stdout.read_to_end(&mut buf).map(|_| buf));
        });
        receiver
    });

    let started = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if started.elapsed() >= timeout => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(CommandFailure::TimedOut(timeout));
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(err) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(CommandFailure::Wait(err));
            }
        }
    };

    if !status.success() {
        return Err(CommandFailure::Exit(status));
    }

    let stdout = match reader {
        Some(receiver) => {
            let remaining = timeout.saturating_sub(started.elapsed());
            match receiver.recv_timeout(remaining.max(POLL_INTERVAL)) {
                Ok(read) => read.map_err(CommandFailure::Wait)?,
                Err(RecvTimeoutError::Timeout) => return Err(CommandFailure::TimedOut(timeout)),
                Err(RecvTimeoutError::Disconnected) => Vec::new(),
            }
        }
        None => Vec::new(),
    };

    Ok(String::from_utf8_lossy(&stdout).into_owned())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_captures_stdout() {
        let mut command = Command::new("sh");
        command.args(["-c", "echo hello"]);
        let output = run_with_timeout(command, Duration::from_secs(5)).unwrap();
        assert_eq!(output.trim(), "hello");
    }

    #[test]
    fn test_nonzero_exit_is_failure() {
        let mut command = Command::new("sh");
        command.args(["-c", "exit 3"]);
        let result = run_with_timeout(command, Duration::from_secs(5));
        assert!(matches!(result, Err(CommandFailure::Exit(_))));
    }

    #[test]
    fn test_missing_program_is_spawn_failure() {
        let command = Command::new("dev-cleanup-no-such-program");
        let result = run_with_timeout(command, Duration::from_secs(5));
        assert!(matches!(result, Err(CommandFailure::Spawn(_))));
    }

    #[test]
    fn test_lingering_descendant_does_not_extend_deadline() {
        let mut command = Command::new("sh");
        command.args(["-c", "sleep 5 & echo started"]);
        let started = Instant::now();
        let result = run_with_timeout(command, Duration::from_millis(300));
        assert!(matches!(result, Err(CommandFailure::TimedOut(_))));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_slow_command_times_out() {
        let mut command = Command::new("sh");
        command.args(["-c", "sleep 5"]);
        let started = Instant::now();
        let result = run_with_timeout(command, Duration::from_millis(100));
        assert!(matches!(result, Err(CommandFailure::TimedOut(_))));
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}
