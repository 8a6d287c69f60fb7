//! Metadata documents shipped alongside the export tree.
//!
//! `index.json` lists every device/source pairing with its rank and is what
//! the selector front-end loads. `version.json` records the commit the
//! package was built from and when it was built.

use crate::error::Result;
use crate::fs::Filesystem;
use crate::git::Revision;
use crate::ranking::RankedRow;
use camino::Utf8Path;
use chrono::{DateTime, Local, TimeZone};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Format shared by both provenance timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Contents of `version.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceRecord {
    /// Full identifier of the packaged commit.
    pub commit: String,
    /// Commit time in UTC.
    pub commit_time: String,
    /// Packaging time in the local time zone.
    pub package_time: String,
}

impl ProvenanceRecord {
    /// Builds the record for `revision`, packaged at `packaged_at`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{DateTime, Local, Utc};
    /// use curvepack::git::{CommitId, Revision};
    /// use curvepack::metadata::ProvenanceRecord;
    ///
    /// let revision = Revision {
    ///     commit: CommitId::try_from("0123456789abcdef0123456789abcdef01234567")
    ///         .expect("valid commit id"),
    ///     committed_at: DateTime::<Utc>::from_timestamp(1_700_000_000, 0)
    ///         .expect("valid timestamp"),
    /// };
    /// let record = ProvenanceRecord::new(&revision, &Local::now());
    /// assert_eq!(record.commit_time, "2023/11/14 22:13:20");
    /// ```
    #[must_use]
    pub fn new(revision: &Revision, packaged_at: &DateTime<Local>) -> Self {
        Self {
            commit: revision.commit.to_string(),
            commit_time: format_timestamp(&revision.committed_at),
            package_time: format_timestamp(packaged_at),
        }
    }
}

/// Formats `time` as `YYYY/MM/DD HH:MM:SS` in its own time zone.
#[must_use]
pub fn format_timestamp<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// Serializes the ranked table as a JSON array of `{n, s, r}` objects.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn index_json(rows: &[RankedRow]) -> Result<String> {
    // Compact, with non-ASCII left unescaped; parses to the same values as a
    // spaced, `\u`-escaped rendering.
    Ok(serde_json::to_string(rows)?)
}

/// Serializes the provenance record as a JSON object.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn version_json(record: &ProvenanceRecord) -> Result<String> {
    // Same compact encoding as `index_json`.
    Ok(serde_json::to_string(record)?)
}

/// Parses an `index.json` document back into rows.
///
/// # Errors
///
/// Returns an error if the document is not a JSON array of rows.
pub fn parse_index(json: &str) -> Result<Vec<RankedRow>> {
    Ok(serde_json::from_str(json)?)
}

/// Writes `index.json` to `path`.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_index(fs: &dyn Filesystem, path: &Utf8Path, rows: &[RankedRow]) -> Result<()> {
    let json = index_json(rows)?;
    debug!("writing {} index rows to {path}", rows.len());
    fs.write(path, json.as_bytes())?;
    Ok(())
}

/// Writes `version.json` to `path`.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_version(
    fs: &dyn Filesystem,
    path: &Utf8Path,
    record: &ProvenanceRecord,
) -> Result<()> {
    let json = version_json(record)?;
    debug!("writing provenance for {} to {path}", record.commit);
    fs.write(path, json.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{MockFilesystem, StdFilesystem};
    use crate::git::CommitId;
    use chrono::{FixedOffset, Utc};
    use rstest::{fixture, rstest};
    use std::collections::HashSet;

    #[fixture]
    fn rows() -> Vec<RankedRow> {
        vec![
            RankedRow {
                name: "HD600".to_owned(),
                source: "oratory1990".to_owned(),
                rank: 1,
            },
            RankedRow {
                name: "HD600".to_owned(),
                source: "SomeRandomSite".to_owned(),
                rank: -1,
            },
            RankedRow {
                name: "Ünïcödé \"Pro\"".to_owned(),
                source: "Crinacle (IEC 711)".to_owned(),
                rank: 1,
            },
        ]
    }

    #[fixture]
    fn revision() -> Revision {
        Revision {
            commit: CommitId::try_from("0123456789abcdef0123456789abcdef01234567")
                .expect("valid commit id"),
            committed_at: DateTime::<Utc>::from_timestamp(1_700_000_000, 0)
                .expect("valid timestamp"),
        }
    }

    #[rstest]
    fn index_json_round_trips(rows: Vec<RankedRow>) {
        let json = index_json(&rows).expect("serialize");
        let parsed = parse_index(&json).expect("parse");
        let expected: HashSet<RankedRow> = rows.into_iter().collect();
        let actual: HashSet<RankedRow> = parsed.into_iter().collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn json_is_compact_and_keeps_non_ascii_verbatim() {
        let rows = [RankedRow {
            name: "Ünïcödé".to_owned(),
            source: "Rtings".to_owned(),
            rank: 1,
        }];
        assert_eq!(
            index_json(&rows).expect("serialize"),
            r#"[{"n":"Ünïcödé","s":"Rtings","r":1}]"#
        );
    }

    #[test]
    fn empty_index_is_an_empty_array() {
        assert_eq!(index_json(&[]).expect("serialize"), "[]");
    }

    #[rstest]
    fn index_json_uses_short_keys(rows: Vec<RankedRow>) {
        let json = index_json(&rows).expect("serialize");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
        let first = value
            .as_array()
            .and_then(|array| array.first())
            .and_then(serde_json::Value::as_object)
            .expect("first row object");
        let keys: Vec<&str> = first.keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 3);
        for key in ["n", "s", "r"] {
            assert!(first.contains_key(key), "missing key: {key}");
        }
    }

    #[rstest]
    fn version_json_has_three_fields(revision: Revision) {
        let record = ProvenanceRecord::new(&revision, &Local::now());
        let value: serde_json::Value =
            serde_json::from_str(&version_json(&record).expect("serialize")).expect("valid JSON");
        let object = value.as_object().expect("object");
        assert_eq!(object.len(), 3);
        assert_eq!(
            object.get("commit").and_then(serde_json::Value::as_str),
            Some("0123456789abcdef0123456789abcdef01234567")
        );
        assert_eq!(
            object.get("commit_time").and_then(serde_json::Value::as_str),
            Some("2023/11/14 22:13:20")
        );
        assert!(object.contains_key("package_time"));
    }

    #[test]
    fn format_timestamp_uses_the_zone_of_the_value() {
        let offset = FixedOffset::east_opt(2 * 3600).expect("valid offset");
        let utc = DateTime::<Utc>::from_timestamp(0, 0).expect("epoch");
        assert_eq!(format_timestamp(&utc), "1970/01/01 00:00:00");
        assert_eq!(
            format_timestamp(&utc.with_timezone(&offset)),
            "1970/01/01 02:00:00"
        );
    }

    #[rstest]
    fn package_time_is_local_wall_clock(revision: Revision) {
        let now = Local::now();
        let record = ProvenanceRecord::new(&revision, &now);
        assert_eq!(record.package_time, now.format(TIMESTAMP_FORMAT).to_string());
    }

    #[rstest]
    fn write_index_goes_through_filesystem(rows: Vec<RankedRow>) {
        let mut filesystem = MockFilesystem::new();
        filesystem
            .expect_write()
            .withf(|path, contents| {
                path.as_str() == "export/index.json" && contents.first() == Some(&b'[')
            })
            .times(1)
            .returning(|_, _| Ok(()));

        write_index(&filesystem, Utf8Path::new("export/index.json"), &rows).expect("write");
    }

    #[rstest]
    fn write_version_surfaces_io_errors(revision: Revision) {
        let mut filesystem = MockFilesystem::new();
        filesystem
            .expect_write()
            .returning(|_, _| Err(std::io::Error::other("read-only")));

        let record = ProvenanceRecord::new(&revision, &Local::now());
        let result = write_version(&filesystem, Utf8Path::new("export/version.json"), &record);
        assert!(matches!(result, Err(crate::error::PackagerError::Io(_))));
    }

    #[rstest]
    fn written_index_is_readable(rows: Vec<RankedRow>) {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = camino::Utf8PathBuf::try_from(temp.path().join("index.json"))
            .expect("UTF-8 path");
        write_index(&StdFilesystem, &path, &rows).expect("write");
        let text = std::fs::read_to_string(&path).expect("read");
        assert_eq!(parse_index(&text).expect("parse"), rows);
    }
}
