//! Revision metadata for the provenance record.
//!
//! The package records which commit of the results repository it was built
//! from and when that commit was made. Both come from `git`, run through a
//! [`CommandExecutor`] so tests can replay canned output. Each git call has
//! a timeout to prevent hangs on a wedged repository.

use crate::error::{PackagerError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use std::fmt;
use std::io;
use std::process::{Command, Output, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Default timeout for git operations.
const GIT_TIMEOUT: Duration = Duration::from_secs(60);

/// Length of a SHA-1 object name.
const SHA1_LEN: usize = 40;

/// Length of a SHA-256 object name.
const SHA256_LEN: usize = 64;

/// Abstraction for running external commands.
pub trait CommandExecutor {
    /// Runs a command with arguments and returns the captured output.
    ///
    /// # Errors
    ///
    /// Returns any I/O errors encountered while spawning or running the
    /// command. A timeout is an I/O error of kind
    /// [`io::ErrorKind::TimedOut`].
    fn run(&self, cmd: &str, args: &[&str]) -> Result<Output>;
}

/// Executes commands on the host system inside a working directory.
#[derive(Debug, Clone)]
pub struct SystemCommandExecutor {
    working_dir: Utf8PathBuf,
    timeout: Duration,
}

impl SystemCommandExecutor {
    /// Creates an executor running commands in `working_dir`.
    #[must_use]
    pub fn new(working_dir: &Utf8Path) -> Self {
        Self {
            working_dir: working_dir.to_owned(),
            timeout: GIT_TIMEOUT,
        }
    }

    /// Replaces the per-command timeout.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }
}

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, cmd: &str, args: &[&str]) -> Result<Output> {
        let mut child = Command::new(cmd)
            .args(args)
            .current_dir(self.working_dir.as_std_path())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(status) = child.wait_timeout(self.timeout)? {
            let stdout = child
                .stdout
                .take()
                .map(io::read_to_string)
                .transpose()?
                .unwrap_or_default();
            let stderr = child
                .stderr
                .take()
                .map(io::read_to_string)
                .transpose()?
                .unwrap_or_default();

            return Ok(Output {
                status,
                stdout: stdout.into_bytes(),
                stderr: stderr.into_bytes(),
            });
        }

        if child.kill().is_err() {
            // The process may already have exited.
        }
        if child.wait().is_err() {
            // Nothing left to reap.
        }
        Err(PackagerError::Io(io::Error::new(
            io::ErrorKind::TimedOut,
            format!(
                "{cmd} {} timed out after {} seconds",
                args.join(" "),
                self.timeout.as_secs()
            ),
        )))
    }
}

/// A validated full commit identifier.
///
/// # Examples
///
/// ```
/// use curvepack::git::CommitId;
///
/// let commit = CommitId::try_from("a".repeat(40).as_str()).expect("valid commit id");
/// assert_eq!(commit.as_str().len(), 40);
/// assert!(CommitId::try_from("abc1234").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitId(String);

impl CommitId {
    /// Return the commit id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for CommitId {
    type Error = PackagerError;

    fn try_from(value: &str) -> Result<Self> {
        validate_commit_id(value)?;
        Ok(Self(value.to_owned()))
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn validate_commit_id(value: &str) -> Result<()> {
    let reject = |reason: String| PackagerError::InvalidRevision {
        value: value.to_owned(),
        reason,
    };

    if value.len() != SHA1_LEN && value.len() != SHA256_LEN {
        return Err(reject(format!(
            "commit id must be {SHA1_LEN} or {SHA256_LEN} characters, got {}",
            value.len()
        )));
    }
    if let Some(bad) = value
        .chars()
        .find(|c| !c.is_ascii_digit() && !matches!(*c, 'a'..='f'))
    {
        return Err(reject(format!("non-hex character '{bad}'")));
    }
    Ok(())
}

/// The revision a package is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    /// Full commit identifier.
    pub commit: CommitId,
    /// Author timestamp of the commit.
    pub committed_at: DateTime<Utc>,
}

/// Source of the current revision.
#[cfg_attr(test, mockall::automock)]
pub trait RevisionSource {
    /// Returns the revision currently checked out.
    ///
    /// # Errors
    ///
    /// Returns an error if the revision cannot be determined. Callers treat
    /// this as fatal.
    fn current_revision(&self) -> Result<Revision>;
}

/// [`RevisionSource`] that asks `git` about `HEAD`.
pub struct GitRevisionSource<E> {
    executor: E,
}

impl<E: CommandExecutor> GitRevisionSource<E> {
    /// Creates a revision source running git through `executor`.
    pub const fn new(executor: E) -> Self {
        Self { executor }
    }

    fn git(&self, operation: &'static str, args: &[&str]) -> Result<String> {
        let output = self.executor.run("git", args).map_err(|err| match err {
            PackagerError::Io(io_err) if io_err.kind() == io::ErrorKind::TimedOut => {
                PackagerError::Git {
                    operation,
                    message: io_err.to_string(),
                }
            }
            other => other,
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PackagerError::Git {
                operation,
                message: stderr.trim().to_owned(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
    }
}

impl<E: CommandExecutor> RevisionSource for GitRevisionSource<E> {
    fn current_revision(&self) -> Result<Revision> {
        let commit = self.git("rev-parse", &["rev-parse", "HEAD"])?;
        let commit = CommitId::try_from(commit.as_str())?;

        let timestamp = self.git("log", &["log", "-1", "--format=%at"])?;
        let committed_at = parse_epoch_seconds(&timestamp)?;

        Ok(Revision {
            commit,
            committed_at,
        })
    }
}

/// Parses a Unix timestamp as printed by `git log --format=%at`.
///
/// # Errors
///
/// Returns [`PackagerError::InvalidRevision`] if `value` is not an integer
/// or lies outside the representable date range.
pub fn parse_epoch_seconds(value: &str) -> Result<DateTime<Utc>> {
    let seconds: i64 = value
        .parse()
        .map_err(|err: std::num::ParseIntError| PackagerError::InvalidRevision {
            value: value.to_owned(),
            reason: format!("commit timestamp is not an integer: {err}"),
        })?;
    DateTime::<Utc>::from_timestamp(seconds, 0).ok_or_else(|| PackagerError::InvalidRevision {
        value: value.to_owned(),
        reason: "commit timestamp is out of range".to_owned(),
    })
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
