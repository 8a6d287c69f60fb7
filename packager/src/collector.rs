//! Export tree collection.
//!
//! Every manifest entry fans out into `<export>/<name>/<source>/` with up to
//! two files: `graphic.txt` and `raw.csv`. A missing source artefact is
//! reported and skipped; nothing here aborts the run.

use crate::fs::Filesystem;
use crate::manifest::ManifestEntry;
use crate::output::{ArtefactKind, MissingArtefact, write_line};
use crate::paths::join_normalized;
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, warn};
use std::io::Write;

/// A filesystem operation that failed without aborting the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoverableFailure {
    /// Path the operation was applied to.
    pub path: Utf8PathBuf,
    /// Description of the failure.
    pub reason: String,
}

/// Outcome of collecting all manifest entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectReport {
    /// Artefacts copied into the export tree.
    pub copied: Vec<Utf8PathBuf>,
    /// Artefacts absent from their source directory.
    pub missing: Vec<MissingArtefact>,
    /// Directory creations or copies that failed.
    pub failures: Vec<RecoverableFailure>,
}

/// Copies manifest artefacts into the export tree.
pub struct ExportCollector<'a> {
    fs: &'a dyn Filesystem,
    results_root: &'a Utf8Path,
    export_root: &'a Utf8Path,
}

impl<'a> ExportCollector<'a> {
    /// Creates a collector reading from `results_root` and writing below
    /// `export_root`.
    #[must_use]
    pub fn new(
        fs: &'a dyn Filesystem,
        results_root: &'a Utf8Path,
        export_root: &'a Utf8Path,
    ) -> Self {
        Self {
            fs,
            results_root,
            export_root,
        }
    }

    /// Source directory of `entry`.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use curvepack::collector::ExportCollector;
    /// use curvepack::fs::StdFilesystem;
    /// use curvepack::manifest::ManifestEntry;
    ///
    /// let collector = ExportCollector::new(
    ///     &StdFilesystem,
    ///     Utf8Path::new("results"),
    ///     Utf8Path::new("export"),
    /// );
    /// let entry = ManifestEntry::new("HD600", "./oratory1990/data/over-ear/HD600", "oratory1990");
    /// assert_eq!(
    ///     collector.source_dir(&entry).as_str(),
    ///     "results/oratory1990/data/over-ear/HD600"
    /// );
    /// ```
    #[must_use]
    pub fn source_dir(&self, entry: &ManifestEntry) -> Utf8PathBuf {
        join_normalized(self.results_root, &entry.relative_path)
    }

    /// Destination directory of `entry`.
    #[must_use]
    pub fn dest_dir(&self, entry: &ManifestEntry) -> Utf8PathBuf {
        join_normalized(&self.export_root.join(&entry.name), &entry.source)
    }

    /// Collects every entry in order.
    ///
    /// Missing artefacts are written to `diagnostics` as they are found.
    pub fn collect_all(
        &self,
        entries: &[ManifestEntry],
        diagnostics: &mut dyn Write,
    ) -> CollectReport {
        let mut report = CollectReport::default();
        for entry in entries {
            self.collect_entry(entry, diagnostics, &mut report);
        }
        report
    }

    fn collect_entry(
        &self,
        entry: &ManifestEntry,
        diagnostics: &mut dyn Write,
        report: &mut CollectReport,
    ) {
        let source_dir = self.source_dir(entry);
        let dest_dir = self.dest_dir(entry);

        debug!("creating {dest_dir}");
        if let Err(err) = self.fs.create_dir_all(&dest_dir) {
            warn!("could not create {dest_dir}: {err}");
            report.failures.push(RecoverableFailure {
                path: dest_dir.clone(),
                reason: err.to_string(),
            });
        }

        for kind in ArtefactKind::ALL {
            let source = source_dir.join(kind.source_file_name(&entry.name));
            if !self.fs.is_file(&source) {
                let missing = MissingArtefact { kind, path: source };
                write_line(diagnostics, &missing);
                report.missing.push(missing);
                continue;
            }

            let dest = dest_dir.join(kind.export_file_name());
            debug!("copying {source} -> {dest}");
            match self.fs.copy(&source, &dest) {
                Ok(()) => report.copied.push(dest),
                Err(err) => {
                    warn!("could not copy {source} to {dest}: {err}");
                    report.failures.push(RecoverableFailure {
                        path: dest,
                        reason: err.to_string(),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "collector_tests.rs"]
mod tests;
