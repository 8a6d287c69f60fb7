//! Unit tests for export tree collection.

use super::*;
use crate::fs::{MockFilesystem, StdFilesystem};
use rstest::{fixture, rstest};
use std::fs;
use tempfile::TempDir;

struct Layout {
    _temp: TempDir,
    results: Utf8PathBuf,
    export: Utf8PathBuf,
}

#[fixture]
fn layout() -> Layout {
    let temp = TempDir::new().expect("temp dir creation succeeds");
    let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("UTF-8 temp path");
    Layout {
        results: root.join("results"),
        export: root.join("export"),
        _temp: temp,
    }
}

fn write_file(path: &Utf8Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, contents).expect("write file");
}

fn hd600() -> ManifestEntry {
    ManifestEntry::new("HD600", "measurements/hd600", "oratory1990")
}

#[rstest]
fn copies_both_artefacts(layout: Layout) {
    let source_dir = layout.results.join("measurements/hd600");
    write_file(&source_dir.join("HD600 GraphicEQ.txt"), "GraphicEQ: 20 -1.0");
    write_file(&source_dir.join("HD600.csv"), "frequency,raw\n20,1.0\n");

    let collector = ExportCollector::new(&StdFilesystem, &layout.results, &layout.export);
    let mut diagnostics = Vec::new();
    let report = collector.collect_all(&[hd600()], &mut diagnostics);

    let dest = layout.export.join("HD600/oratory1990");
    assert_eq!(
        fs::read_to_string(dest.join("graphic.txt")).expect("graphic copied"),
        "GraphicEQ: 20 -1.0"
    );
    assert_eq!(
        fs::read_to_string(dest.join("raw.csv")).expect("csv copied"),
        "frequency,raw\n20,1.0\n"
    );
    assert_eq!(report.copied.len(), 2);
    assert!(report.missing.is_empty());
    assert!(diagnostics.is_empty());
}

#[rstest]
fn missing_graphic_eq_is_reported_and_csv_still_copied(layout: Layout) {
    let source_dir = layout.results.join("measurements/hd600");
    write_file(&source_dir.join("HD600.csv"), "frequency,raw\n");

    let collector = ExportCollector::new(&StdFilesystem, &layout.results, &layout.export);
    let mut diagnostics = Vec::new();
    let report = collector.collect_all(&[hd600()], &mut diagnostics);

    let text = String::from_utf8(diagnostics).expect("UTF-8 diagnostics");
    assert_eq!(
        text,
        format!("[GraphicEQ] File missing: {source_dir}/HD600 GraphicEQ.txt\n")
    );
    let dest = layout.export.join("HD600/oratory1990");
    assert!(!dest.join("graphic.txt").exists());
    assert!(dest.join("raw.csv").is_file());
    assert_eq!(report.missing.len(), 1);
}

#[rstest]
fn entry_without_artefacts_still_gets_directory(layout: Layout) {
    let collector = ExportCollector::new(&StdFilesystem, &layout.results, &layout.export);
    let mut diagnostics = Vec::new();
    let report = collector.collect_all(
        &[ManifestEntry::new("HD650", "nowhere", "Crinacle (GRAS)")],
        &mut diagnostics,
    );

    assert!(layout.export.join("HD650/Crinacle (GRAS)").is_dir());
    let text = String::from_utf8(diagnostics).expect("UTF-8 diagnostics");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines.first().is_some_and(|l| l.starts_with("[GraphicEQ] File missing: ")));
    assert!(lines.get(1).is_some_and(|l| l.starts_with("[CSV] File missing: ")));
    assert!(lines.get(1).is_some_and(|l| l.ends_with("nowhere/HD650.csv")));
    assert_eq!(report.missing.len(), 2);
}

#[rstest]
fn source_path_is_normalized(layout: Layout) {
    let collector = ExportCollector::new(&StdFilesystem, &layout.results, &layout.export);
    let entry = ManifestEntry::new("X", "./a/../b//c", "Rtings");
    assert_eq!(collector.source_dir(&entry), layout.results.join("b/c"));
    assert_eq!(collector.dest_dir(&entry), layout.export.join("X/Rtings"));
}

#[test]
fn copy_failure_is_recorded_and_collection_continues() {
    let mut filesystem = MockFilesystem::new();
    filesystem.expect_create_dir_all().returning(|_| Ok(()));
    filesystem.expect_is_file().returning(|_| true);
    filesystem.expect_copy().returning(|from, _| {
        if from.as_str().ends_with(".csv") {
            Err(std::io::Error::other("disk full"))
        } else {
            Ok(())
        }
    });

    let collector = ExportCollector::new(
        &filesystem,
        Utf8Path::new("results"),
        Utf8Path::new("export"),
    );
    let entries = [
        ManifestEntry::new("A", "a", "Rtings"),
        ManifestEntry::new("B", "b", "Rtings"),
    ];
    let mut diagnostics = Vec::new();
    let report = collector.collect_all(&entries, &mut diagnostics);

    assert_eq!(report.copied.len(), 2);
    assert_eq!(report.failures.len(), 2);
    assert!(
        report
            .failures
            .iter()
            .all(|failure| failure.reason.contains("disk full"))
    );
    assert!(diagnostics.is_empty());
}

#[test]
fn directory_failure_does_not_stop_copies() {
    let mut filesystem = MockFilesystem::new();
    filesystem
        .expect_create_dir_all()
        .times(1)
        .returning(|_| Err(std::io::Error::other("read-only filesystem")));
    filesystem.expect_is_file().returning(|_| false);
    filesystem.expect_copy().never();

    let collector = ExportCollector::new(
        &filesystem,
        Utf8Path::new("results"),
        Utf8Path::new("export"),
    );
    let mut diagnostics = Vec::new();
    let report = collector.collect_all(&[hd600()], &mut diagnostics);

    assert_eq!(report.failures.len(), 1);
    assert_eq!(
        report.failures.first().map(|f| f.path.as_str()),
        Some("export/HD600/oratory1990")
    );
    assert_eq!(report.missing.len(), 2);
}

#[test]
fn entries_are_collected_in_manifest_order() {
    let mut filesystem = MockFilesystem::new();
    filesystem.expect_create_dir_all().returning(|_| Ok(()));
    filesystem.expect_is_file().returning(|_| false);

    let collector = ExportCollector::new(
        &filesystem,
        Utf8Path::new("results"),
        Utf8Path::new("export"),
    );
    let entries = [
        ManifestEntry::new("B", "b", "Rtings"),
        ManifestEntry::new("A", "a", "Rtings"),
    ];
    let mut diagnostics = Vec::new();
    collector.collect_all(&entries, &mut diagnostics);

    let text = String::from_utf8(diagnostics).expect("UTF-8 diagnostics");
    let expected = concat!(
        "[GraphicEQ] File missing: results/b/B GraphicEQ.txt\n",
        "[CSV] File missing: results/b/B.csv\n",
        "[GraphicEQ] File missing: results/a/A GraphicEQ.txt\n",
        "[CSV] File missing: results/a/A.csv\n",
    );
    assert_eq!(text, expected);
}
