//! User-facing diagnostic lines.
//!
//! Missing artefacts are reported with a fixed `[<kind>] File missing:`
//! prefix that downstream tooling greps for, so the wording lives here
//! rather than in the log format.

use camino::Utf8PathBuf;
use std::fmt;
use std::io::Write;

/// The two artefacts collected for every manifest entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtefactKind {
    /// The `<name> GraphicEQ.txt` equalizer preset.
    GraphicEq,
    /// The `<name>.csv` raw measurement table.
    Csv,
}

impl ArtefactKind {
    /// Both kinds, in collection order.
    pub const ALL: [Self; 2] = [Self::GraphicEq, Self::Csv];

    /// Tag used in diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::GraphicEq => "GraphicEQ",
            Self::Csv => "CSV",
        }
    }

    /// File name of the artefact inside an entry's source directory.
    ///
    /// # Examples
    ///
    /// ```
    /// use curvepack::output::ArtefactKind;
    ///
    /// assert_eq!(ArtefactKind::GraphicEq.source_file_name("HD600"), "HD600 GraphicEQ.txt");
    /// assert_eq!(ArtefactKind::Csv.source_file_name("HD600"), "HD600.csv");
    /// ```
    #[must_use]
    pub fn source_file_name(self, name: &str) -> String {
        match self {
            Self::GraphicEq => format!("{name} GraphicEQ.txt"),
            Self::Csv => format!("{name}.csv"),
        }
    }

    /// File name of the artefact inside the export tree.
    #[must_use]
    pub const fn export_file_name(self) -> &'static str {
        match self {
            Self::GraphicEq => "graphic.txt",
            Self::Csv => "raw.csv",
        }
    }
}

/// An artefact that was expected but not found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingArtefact {
    /// Which artefact is missing.
    pub kind: ArtefactKind,
    /// Full path that was checked.
    pub path: Utf8PathBuf,
}

impl fmt::Display for MissingArtefact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] File missing: {}", self.kind.label(), self.path)
    }
}

/// Writes `message` and a newline to `out`, ignoring write failures.
pub fn write_line(out: &mut dyn Write, message: impl fmt::Display) {
    if writeln!(out, "{message}").is_err() {
        // Best-effort reporting; ignore write failures.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::graphic_eq(
        ArtefactKind::GraphicEq,
        "measurements/hd600/HD600 GraphicEQ.txt",
        "[GraphicEQ] File missing: measurements/hd600/HD600 GraphicEQ.txt"
    )]
    #[case::csv(
        ArtefactKind::Csv,
        "results/hd600/HD600.csv",
        "[CSV] File missing: results/hd600/HD600.csv"
    )]
    fn missing_artefact_formats_diagnostic(
        #[case] kind: ArtefactKind,
        #[case] path: &str,
        #[case] expected: &str,
    ) {
        let missing = MissingArtefact {
            kind,
            path: Utf8PathBuf::from(path),
        };
        assert_eq!(missing.to_string(), expected);
    }

    #[test]
    fn write_line_appends_newline() {
        let mut out = Vec::new();
        write_line(&mut out, "hello");
        assert_eq!(out, b"hello\n");
    }
}
