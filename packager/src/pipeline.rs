//! Packaging pipeline orchestration.
//!
//! A run is strictly sequential: parse the manifest, collect artefacts into
//! the export tree, rank sources, write the metadata documents, and archive
//! the tree. Only a missing manifest or unavailable revision metadata abort
//! the run; every other failure is logged and recorded in the
//! [`PackageReport`].

use crate::archive::Archiver;
use crate::collector::{ExportCollector, RecoverableFailure};
use crate::error::{PackagerError, Result};
use crate::fs::Filesystem;
use crate::git::RevisionSource;
use crate::manifest::parse_manifest;
use crate::metadata::{ProvenanceRecord, write_index, write_version};
use crate::output::MissingArtefact;
use crate::ranking::{DeviceGroups, PREFERENCE_ORDER, RankedRow, rank_sources};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Local;
use log::{error, info};
use std::io::Write;

/// Manifest location below the root directory.
pub const MANIFEST_PATH: &str = "results/INDEX.md";
/// Results tree below the root directory.
pub const RESULTS_DIR: &str = "results";
/// Export tree below the root directory.
pub const EXPORT_DIR: &str = "export";
/// Archive location below the root directory.
pub const ARCHIVE_PATH: &str = "archive.tar.gz";
/// Index document name inside the export tree.
pub const INDEX_FILE: &str = "index.json";
/// Provenance document name inside the export tree.
pub const VERSION_FILE: &str = "version.json";

/// Resolved input and output locations for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageConfig {
    /// Manifest listing the entries to package.
    pub manifest_path: Utf8PathBuf,
    /// Directory the manifest's relative paths resolve against.
    pub results_root: Utf8PathBuf,
    /// Directory receiving the export tree.
    pub export_root: Utf8PathBuf,
    /// Destination of `index.json`.
    pub index_path: Utf8PathBuf,
    /// Destination of `version.json`.
    pub version_path: Utf8PathBuf,
    /// Destination of the compressed archive.
    pub archive_path: Utf8PathBuf,
}

impl PackageConfig {
    /// Standard layout below `root`.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use curvepack::pipeline::PackageConfig;
    ///
    /// let config = PackageConfig::rooted_at(Utf8Path::new("/data/eq"));
    /// assert_eq!(config.manifest_path.as_str(), "/data/eq/results/INDEX.md");
    /// assert_eq!(config.index_path.as_str(), "/data/eq/export/index.json");
    /// assert_eq!(config.archive_path.as_str(), "/data/eq/archive.tar.gz");
    /// ```
    #[must_use]
    pub fn rooted_at(root: &Utf8Path) -> Self {
        Self::with_export_root(root, root.join(EXPORT_DIR))
    }

    /// Standard layout below `root` with the export tree moved to
    /// `export_root`. The metadata documents follow the export tree.
    #[must_use]
    pub fn with_export_root(root: &Utf8Path, export_root: Utf8PathBuf) -> Self {
        Self {
            manifest_path: root.join(MANIFEST_PATH),
            results_root: root.join(RESULTS_DIR),
            index_path: export_root.join(INDEX_FILE),
            version_path: export_root.join(VERSION_FILE),
            archive_path: root.join(ARCHIVE_PATH),
            export_root,
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageReport {
    /// Number of manifest entries parsed.
    pub entries: usize,
    /// Number of distinct devices.
    pub devices: usize,
    /// Rows written to `index.json`.
    pub rows: Vec<RankedRow>,
    /// Provenance written to `version.json`.
    pub provenance: Option<ProvenanceRecord>,
    /// Artefacts copied into the export tree.
    pub copied: usize,
    /// Artefacts absent from their source directory.
    pub missing: Vec<MissingArtefact>,
    /// Recoverable failures, in the order they happened.
    pub failures: Vec<RecoverableFailure>,
    /// Top-level archive members, empty if archiving failed.
    pub archive_members: Vec<String>,
}

/// Runs the packaging pipeline against injected capabilities.
pub struct Packager<'a> {
    fs: &'a dyn Filesystem,
    archiver: &'a dyn Archiver,
    revisions: &'a dyn RevisionSource,
}

impl<'a> Packager<'a> {
    /// Creates a packager from its capabilities.
    #[must_use]
    pub fn new(
        fs: &'a dyn Filesystem,
        archiver: &'a dyn Archiver,
        revisions: &'a dyn RevisionSource,
    ) -> Self {
        Self {
            fs,
            archiver,
            revisions,
        }
    }

    /// Runs one packaging pass.
    ///
    /// Missing-artefact diagnostics are written to `diagnostics`.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::ManifestNotFound`] if the manifest is absent,
    /// an I/O error if it cannot be read, or a provenance error if the
    /// current revision cannot be determined.
    pub fn run(
        &self,
        config: &PackageConfig,
        diagnostics: &mut dyn Write,
    ) -> Result<PackageReport> {
        let text = self.read_manifest(&config.manifest_path)?;
        let entries = parse_manifest(&text);
        info!("parsed {} manifest entries", entries.len());

        let collector = ExportCollector::new(self.fs, &config.results_root, &config.export_root);
        let collected = collector.collect_all(&entries, diagnostics);
        info!(
            "copied {} artefacts, {} missing",
            collected.copied.len(),
            collected.missing.len()
        );

        let groups = DeviceGroups::from_entries(&entries);
        let rows = rank_sources(&PREFERENCE_ORDER, &groups);

        let mut report = PackageReport {
            entries: entries.len(),
            devices: groups.len(),
            copied: collected.copied.len(),
            missing: collected.missing,
            failures: collected.failures,
            ..PackageReport::default()
        };

        self.ensure_export_root(&config.export_root, &mut report);
        if let Err(err) = write_index(self.fs, &config.index_path, &rows) {
            record_failure(&mut report, &config.index_path, &err);
        }
        report.rows = rows;

        let revision = self.revisions.current_revision()?;
        let provenance = ProvenanceRecord::new(&revision, &Local::now());
        if let Err(err) = write_version(self.fs, &config.version_path, &provenance) {
            record_failure(&mut report, &config.version_path, &err);
        }
        report.provenance = Some(provenance);

        match self
            .archiver
            .write_archive(&config.export_root, &config.archive_path)
        {
            Ok(members) => {
                info!("wrote {} with {} members", config.archive_path, members.len());
                report.archive_members = members;
            }
            Err(err) => record_failure(&mut report, &config.archive_path, &err),
        }

        Ok(report)
    }

    fn read_manifest(&self, path: &Utf8Path) -> Result<String> {
        if !self.fs.is_file(path) {
            return Err(PackagerError::ManifestNotFound {
                path: path.to_owned(),
            });
        }
        Ok(self.fs.read_to_string(path)?)
    }

    fn ensure_export_root(&self, export_root: &Utf8Path, report: &mut PackageReport) {
        if let Err(err) = self.fs.create_dir_all(export_root) {
            record_failure(report, export_root, &PackagerError::Io(err));
        }
    }
}

fn record_failure(report: &mut PackageReport, path: &Utf8Path, err: &PackagerError) {
    error!("{path}: {err}");
    report.failures.push(RecoverableFailure {
        path: path.to_owned(),
        reason: err.to_string(),
    });
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
