//! Shared test utilities for the packager crate.

use crate::error::{PackagerError, Result};
use crate::git::{CommandExecutor, CommitId, Revision, RevisionSource};
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::process::{ExitStatus, Output};

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(unix)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(windows)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code.unsigned_abs())
}

/// Creates a successful command `Output` with the given stdout.
#[must_use]
pub fn stdout_output(stdout: &str) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.as_bytes().to_vec(),
        stderr: Vec::new(),
    }
}

/// Creates a failed command `Output` with the given stderr message.
#[must_use]
pub fn failure_output(stderr: &str) -> Output {
    Output {
        status: exit_status(128),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

/// Represents an expected command invocation for testing.
#[derive(Debug)]
pub struct ExpectedCall {
    /// The command to execute (e.g., "git").
    pub cmd: &'static str,
    /// The arguments to pass to the command.
    pub args: Vec<&'static str>,
    /// The result to return when this command is invoked.
    pub result: Result<Output>,
}

/// A stub implementation of `CommandExecutor` for testing.
///
/// Replays expected command invocations in order. An unexpected or
/// mismatched invocation yields [`PackagerError::StubMismatch`].
#[derive(Debug)]
pub struct StubExecutor {
    expected: RefCell<VecDeque<ExpectedCall>>,
}

impl StubExecutor {
    /// Creates a new `StubExecutor` with the given expected calls.
    #[must_use]
    pub fn new(expected: Vec<ExpectedCall>) -> Self {
        Self {
            expected: RefCell::new(expected.into()),
        }
    }

    /// Returns `true` once every expected invocation has been consumed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.expected.borrow().is_empty()
    }
}

impl CommandExecutor for StubExecutor {
    fn run(&self, cmd: &str, args: &[&str]) -> Result<Output> {
        let call = self
            .expected
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| PackagerError::StubMismatch {
                message: format!("unexpected invocation: {cmd} {}", args.join(" ")),
            })?;

        if call.cmd != cmd || call.args.as_slice() != args {
            return Err(PackagerError::StubMismatch {
                message: format!(
                    "expected {} {}, got {cmd} {}",
                    call.cmd,
                    call.args.join(" "),
                    args.join(" ")
                ),
            });
        }

        call.result
    }
}

/// A [`RevisionSource`] that always reports the same revision.
#[derive(Debug, Clone)]
pub struct StubRevisionSource {
    revision: Revision,
}

impl StubRevisionSource {
    /// Creates a stub reporting `commit` made at `epoch_seconds`.
    ///
    /// # Errors
    ///
    /// Returns an error if `commit` is not a full commit id or the timestamp
    /// is out of range.
    pub fn new(commit: &str, epoch_seconds: i64) -> Result<Self> {
        let committed_at = DateTime::<Utc>::from_timestamp(epoch_seconds, 0).ok_or_else(|| {
            PackagerError::InvalidRevision {
                value: epoch_seconds.to_string(),
                reason: "commit timestamp is out of range".to_owned(),
            }
        })?;
        Ok(Self {
            revision: Revision {
                commit: CommitId::try_from(commit)?,
                committed_at,
            },
        })
    }
}

impl RevisionSource for StubRevisionSource {
    fn current_revision(&self) -> Result<Revision> {
        Ok(self.revision.clone())
    }
}
