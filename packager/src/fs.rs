//! Filesystem capability used by the pipeline.
//!
//! Collection and metadata emission only need a handful of operations, so
//! they go through [`Filesystem`] rather than `std::fs` directly. Tests swap
//! in a mock to exercise failure paths that are awkward to provoke on disk.

use camino::Utf8Path;
use std::io;

/// Filesystem operations needed to build the export tree.
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem {
    /// Returns `true` if `path` exists and is a regular file.
    fn is_file(&self, path: &Utf8Path) -> bool;

    /// Reads the whole file at `path` as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid UTF-8.
    fn read_to_string(&self, path: &Utf8Path) -> io::Result<String>;

    /// Creates `path` and any missing ancestors.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created.
    fn create_dir_all(&self, path: &Utf8Path) -> io::Result<()>;

    /// Copies the file at `from` to `to`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or the destination
    /// cannot be written.
    fn copy(&self, from: &Utf8Path, to: &Utf8Path) -> io::Result<()>;

    /// Writes `contents` to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn write(&self, path: &Utf8Path, contents: &[u8]) -> io::Result<()>;
}

/// [`Filesystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFilesystem;

impl Filesystem for StdFilesystem {
    fn is_file(&self, path: &Utf8Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Utf8Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn create_dir_all(&self, path: &Utf8Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn copy(&self, from: &Utf8Path, to: &Utf8Path) -> io::Result<()> {
        std::fs::copy(from, to).map(|_| ())
    }

    fn write(&self, path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
        std::fs::write(path, contents)
    }
}
