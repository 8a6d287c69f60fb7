//! Per-device source ranking.
//!
//! Sources are grouped by device name and ranked against a fixed preference
//! order. Ranks are per device: the preference order is first narrowed to
//! the terms that actually occur for the device, and each source's rank is
//! its position in that narrowed list. Sources matching no preferred term
//! get [`UNRANKED`].

use crate::manifest::ManifestEntry;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Preferred measurement sources, most trusted first.
pub const PREFERENCE_ORDER: [&str; 6] = [
    "oratory1990",
    "Crinacle",
    "Innerfidelity",
    "Rtings",
    "Headphone.com",
    "Reference Audio Analyzer",
];

/// Rank given to a source that matches no preferred term.
pub const UNRANKED: i32 = -1;

/// One row of the published index.
///
/// Field names are kept to one letter because the index is downloaded by a
/// browser front-end on every visit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RankedRow {
    /// Device name.
    #[serde(rename = "n")]
    pub name: String,
    /// Source attribution.
    #[serde(rename = "s")]
    pub source: String,
    /// 1-based rank within the device, or [`UNRANKED`].
    #[serde(rename = "r")]
    pub rank: i32,
}

/// Sources grouped by device, in first-seen device order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceGroups {
    groups: Vec<(String, Vec<String>)>,
}

impl DeviceGroups {
    /// Groups manifest entries by device name.
    ///
    /// Devices keep the order of their first appearance and sources keep
    /// manifest order, duplicates included.
    ///
    /// # Examples
    ///
    /// ```
    /// use curvepack::manifest::ManifestEntry;
    /// use curvepack::ranking::DeviceGroups;
    ///
    /// let entries = [
    ///     ManifestEntry::new("HD600", "a", "Rtings"),
    ///     ManifestEntry::new("HD650", "b", "Crinacle"),
    ///     ManifestEntry::new("HD600", "c", "oratory1990"),
    /// ];
    /// let groups = DeviceGroups::from_entries(&entries);
    /// let names: Vec<&str> = groups.iter().map(|(name, _)| name).collect();
    /// assert_eq!(names, ["HD600", "HD650"]);
    /// ```
    #[must_use]
    pub fn from_entries(entries: &[ManifestEntry]) -> Self {
        let mut positions: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<(String, Vec<String>)> = Vec::new();

        for entry in entries {
            let position = *positions.entry(entry.name.as_str()).or_insert_with(|| {
                groups.push((entry.name.clone(), Vec::new()));
                groups.len() - 1
            });
            if let Some((_, sources)) = groups.get_mut(position) {
                sources.push(entry.source.clone());
            }
        }

        Self { groups }
    }

    /// Iterates over `(device, sources)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups
            .iter()
            .map(|(name, sources)| (name.as_str(), sources.as_slice()))
    }

    /// Number of distinct devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns `true` when no device was grouped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Builds the preference terms present for one device.
///
/// Every `(term, source)` pair is visited in preference order, and the term
/// is appended once per matching source. Two sources sharing a preferred
/// prefix therefore insert that term twice.
#[must_use]
pub fn preferred_present<'a>(preference: &[&'a str], sources: &[String]) -> Vec<&'a str> {
    preference
        .iter()
        .flat_map(|term| {
            sources
                .iter()
                .filter(move |source| source.starts_with(term))
                .map(move |_| *term)
        })
        .collect()
}

/// Ranks one source against the device's present preference terms.
///
/// The rank is the 1-based index of the first term that prefixes `source`,
/// or [`UNRANKED`] when none does.
#[must_use]
pub fn rank_of(present: &[&str], source: &str) -> i32 {
    present
        .iter()
        .position(|term| source.starts_with(term))
        .and_then(|index| i32::try_from(index + 1).ok())
        .unwrap_or(UNRANKED)
}

/// Ranks every source of one device, one row per source occurrence.
///
/// # Examples
///
/// ```
/// use curvepack::ranking::{PREFERENCE_ORDER, rank_device};
///
/// let sources = vec!["SomeRandomSite".to_owned(), "Crinacle".to_owned()];
/// let rows = rank_device(&PREFERENCE_ORDER, "HD600", &sources);
/// let ranks: Vec<i32> = rows.iter().map(|row| row.rank).collect();
/// assert_eq!(ranks, [-1, 1]);
/// ```
#[must_use]
pub fn rank_device(preference: &[&str], name: &str, sources: &[String]) -> Vec<RankedRow> {
    let present = preferred_present(preference, sources);
    if let Some(term) = first_repeated(&present) {
        warn!(
            "{name}: preferred source {term:?} appears more than once; ranks after it are not contiguous"
        );
    }

    sources
        .iter()
        .map(|source| RankedRow {
            name: name.to_owned(),
            source: source.clone(),
            rank: rank_of(&present, source),
        })
        .collect()
}

/// Ranks all grouped devices against `preference`.
///
/// Rows follow device order, then source order within each device.
#[must_use]
pub fn rank_sources(preference: &[&str], groups: &DeviceGroups) -> Vec<RankedRow> {
    groups
        .iter()
        .flat_map(|(name, sources)| rank_device(preference, name, sources))
        .collect()
}

fn first_repeated<'a>(present: &[&'a str]) -> Option<&'a str> {
    present
        .windows(2)
        .find_map(|pair| match pair {
            [a, b] if a == b => Some(*a),
            _ => None,
        })
}

#[cfg(test)]
#[path = "ranking_tests.rs"]
mod tests;
