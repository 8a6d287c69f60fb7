//! Manifest parsing.
//!
//! The manifest is a Markdown index whose interesting lines look like
//! `[<name>](<percent-encoded-path>) by <source>`. Every other line is
//! ignored without comment.

use percent_encoding::percent_decode_str;
use regex::Regex;
use std::sync::LazyLock;

/// Matches one manifest link anywhere on a line.
///
/// The name excludes square brackets, the path excludes parentheses, and the
/// `by` keyword is matched case-insensitively. The source runs to the end of
/// the line.
#[expect(
    clippy::expect_used,
    reason = "the pattern is a literal covered by unit tests"
)]
static ENTRY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[([^\[\]]+)\]\(([^()]+)\)\s+by\s+(.+)").expect("manifest pattern compiles")
});

/// One device/source pairing listed in the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Device identifier, e.g. `HD600`.
    pub name: String,
    /// Percent-decoded directory of the entry below the results root.
    pub relative_path: String,
    /// Free-text attribution, e.g. `oratory1990` or `Crinacle (IEC 711)`.
    pub source: String,
}

impl ManifestEntry {
    /// Creates an entry from already-decoded parts.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        relative_path: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            relative_path: relative_path.into(),
            source: source.into(),
        }
    }
}

/// Parses a single manifest line.
///
/// Returns `None` when the line does not contain a manifest link.
///
/// # Examples
///
/// ```
/// use curvepack::manifest::parse_line;
///
/// let entry = parse_line("- [HD600](measurements%2Fhd600) by oratory1990")
///     .expect("line matches");
/// assert_eq!(entry.name, "HD600");
/// assert_eq!(entry.relative_path, "measurements/hd600");
/// assert_eq!(entry.source, "oratory1990");
///
/// assert!(parse_line("[HD600](measurements%2Fhd600) oratory1990").is_none());
/// ```
#[must_use]
pub fn parse_line(line: &str) -> Option<ManifestEntry> {
    let captures = ENTRY_PATTERN.captures(line)?;
    let name = captures.get(1)?.as_str();
    let uri = captures.get(2)?.as_str();
    let source = captures.get(3)?.as_str();

    let relative_path = percent_decode_str(uri).decode_utf8_lossy();
    Some(ManifestEntry::new(name, relative_path, source))
}

/// Parses manifest text into entries, preserving manifest order.
///
/// Lines without a manifest link are skipped, so an empty or entirely
/// unrelated manifest yields an empty list.
#[must_use]
pub fn parse_manifest(text: &str) -> Vec<ManifestEntry> {
    text.lines().filter_map(parse_line).collect()
}
