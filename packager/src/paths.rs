//! Lexical path normalization.
//!
//! Manifest entries carry user-supplied path fragments and names, so the
//! source and destination directories are normalized without touching the
//! filesystem: `.` components vanish, `..` consumes the preceding normal
//! component, and redundant separators collapse.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

/// Normalizes `path` lexically.
///
/// Leading `..` components of a relative path are kept, while `..` directly
/// below the root is dropped. An empty result becomes `.`.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use curvepack::paths::normalize;
///
/// let path = normalize(Utf8Path::new("results/./a//b/../c"));
/// assert_eq!(path.as_str(), "results/a/c");
/// ```
#[must_use]
pub fn normalize(path: &Utf8Path) -> Utf8PathBuf {
    let mut parts: Vec<Utf8Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => match parts.last() {
                Some(Utf8Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Utf8Component::RootDir | Utf8Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return Utf8PathBuf::from(".");
    }
    parts.iter().collect()
}

/// Joins `fragment` onto `base` and normalizes the result.
///
/// An absolute `fragment` replaces `base`, as [`Utf8Path::join`] does.
#[must_use]
pub fn join_normalized(base: &Utf8Path, fragment: &str) -> Utf8PathBuf {
    normalize(&base.join(fragment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain("results/measurements/hd600", "results/measurements/hd600")]
    #[case::cur_dir("./results/./a", "results/a")]
    #[case::parent_dir("results/a/../b", "results/b")]
    #[case::doubled_separator("results//a///b", "results/a/b")]
    #[case::trailing_separator("results/a/", "results/a")]
    #[case::leading_parent("../a/b", "../a/b")]
    #[case::parent_above_relative("a/../../b", "../b")]
    #[case::root_parent("/../a", "/a")]
    #[case::collapses_to_empty("a/..", ".")]
    fn normalizes_lexically(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(Utf8Path::new(input)).as_str(), expected);
    }

    #[test]
    fn join_keeps_spaces_and_parentheses() {
        let joined = join_normalized(Utf8Path::new("export/HD600"), "Crinacle (IEC 711)");
        assert_eq!(joined.as_str(), "export/HD600/Crinacle (IEC 711)");
    }

    #[test]
    fn join_with_absolute_fragment_replaces_base() {
        let joined = join_normalized(Utf8Path::new("results"), "/abs/dir");
        assert_eq!(joined.as_str(), "/abs/dir");
    }
}
