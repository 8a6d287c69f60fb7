//! Compressed archive of the export tree.
//!
//! Members are named relative to the export root, so extracting the archive
//! recreates the tree's children without an `export/` prefix. Member order
//! follows the directory listing. The archive file itself is never archived,
//! even when it is written inside the tree.

use crate::error::{PackagerError, Result};
use crate::paths::normalize;
use camino::{Utf8Path, Utf8PathBuf};
use flate2::Compression;
use flate2::write::GzEncoder;
use log::debug;
use std::fs;
use std::io::Write;

/// Writes an archive of a directory tree.
#[cfg_attr(test, mockall::automock)]
pub trait Archiver {
    /// Archives every child of `source_root` into `archive_path`.
    ///
    /// Returns the names of the top-level members in the order they were
    /// added.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::Archive`] if the tree cannot be read or the
    /// archive cannot be written.
    fn write_archive(&self, source_root: &Utf8Path, archive_path: &Utf8Path)
    -> Result<Vec<String>>;
}

/// [`Archiver`] producing a gzip-compressed tar file.
#[derive(Debug, Clone, Copy)]
pub struct TarGzArchiver {
    level: Compression,
}

impl TarGzArchiver {
    /// Creates an archiver with the given gzip compression level.
    #[must_use]
    pub const fn with_level(level: Compression) -> Self {
        Self { level }
    }
}

impl Default for TarGzArchiver {
    fn default() -> Self {
        Self::with_level(Compression::default())
    }
}

impl Archiver for TarGzArchiver {
    fn write_archive(
        &self,
        source_root: &Utf8Path,
        archive_path: &Utf8Path,
    ) -> Result<Vec<String>> {
        create_archive(source_root, archive_path, self.level).map_err(|source| {
            PackagerError::Archive {
                path: archive_path.to_owned(),
                source,
            }
        })
    }
}

fn create_archive(
    source_root: &Utf8Path,
    archive_path: &Utf8Path,
    level: Compression,
) -> std::io::Result<Vec<String>> {
    let output_file = fs::File::create(archive_path)?;
    let encoder = GzEncoder::new(output_file, level);
    let mut archive = tar::Builder::new(encoder);
    let skip = normalize(archive_path);
    let mut members = Vec::new();

    for entry in source_root.read_dir_utf8()? {
        let entry = entry?;
        let name = Utf8PathBuf::from(entry.file_name());
        if append_entry(&mut archive, entry.path(), &name, &skip)? {
            members.push(name.into_string());
        }
    }

    let encoder = archive.into_inner()?;
    encoder.finish()?;
    Ok(members)
}

/// Appends `path` as `name`, recursing into directories.
///
/// The archive being written is skipped wherever it sits in the tree.
/// Returns `false` if `path` was skipped.
fn append_entry<W: Write>(
    archive: &mut tar::Builder<W>,
    path: &Utf8Path,
    name: &Utf8Path,
    skip: &Utf8Path,
) -> std::io::Result<bool> {
    if normalize(path).as_path() == skip {
        debug!("skipping {path}: it is the archive being written");
        return Ok(false);
    }

    if path.is_dir() {
        archive.append_dir(name, path)?;
        for child in path.read_dir_utf8()? {
            let child = child?;
            append_entry(archive, child.path(), &name.join(child.file_name()), skip)?;
        }
    } else {
        archive.append_path_with_name(path, name)?;
    }
    debug!("archived {path} as {name}");
    Ok(true)
}
