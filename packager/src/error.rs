//! Error types for the measurement packager.
//!
//! Only conditions that abort a run are represented here. Missing artefacts
//! and other recoverable filesystem failures are logged and collected in the
//! pipeline report instead of being returned as errors.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that abort a packaging run.
#[derive(Debug, Error)]
pub enum PackagerError {
    /// The manifest file is absent, so the run cannot start.
    #[error("manifest not found at {path}: wrong working directory?")]
    ManifestNotFound {
        /// Path where the manifest was expected.
        path: Utf8PathBuf,
    },

    /// A git command needed for the provenance record failed.
    #[error("git {operation} failed: {message}")]
    Git {
        /// The git operation that failed (rev-parse, log, etc.).
        operation: &'static str,
        /// Description of the failure.
        message: String,
    },

    /// Git answered, but with something that is not a usable revision.
    #[error("invalid revision metadata {value:?}: {reason}")]
    InvalidRevision {
        /// The offending value as reported by git.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization of a metadata document failed.
    #[error("metadata serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Writing the compressed archive failed.
    #[error("failed to write archive {path}")]
    Archive {
        /// Destination path of the archive.
        path: Utf8PathBuf,
        /// The underlying error that caused the write to fail.
        #[source]
        source: std::io::Error,
    },

    /// Test stub received an unexpected or mismatched command invocation.
    #[cfg(any(test, feature = "test-support"))]
    #[error("stub mismatch: {message}")]
    StubMismatch {
        /// Description of what was expected versus what was received.
        message: String,
    },
}

impl PackagerError {
    /// Returns `true` for errors caused by missing or unusable revision
    /// metadata.
    ///
    /// # Examples
    ///
    /// ```
    /// use curvepack::error::PackagerError;
    ///
    /// let err = PackagerError::Git {
    ///     operation: "rev-parse",
    ///     message: "not a git repository".to_owned(),
    /// };
    /// assert!(err.is_provenance());
    /// ```
    #[must_use]
    pub const fn is_provenance(&self) -> bool {
        matches!(self, Self::Git { .. } | Self::InvalidRevision { .. })
    }
}

/// Result type alias using [`PackagerError`].
pub type Result<T> = std::result::Result<T, PackagerError>;
