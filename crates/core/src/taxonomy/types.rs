//! Types for the taxonomy snapshot and its change notifications.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::PatchOperation;

/// Sentinel bucket key meaning "all torrents".
pub const ALL_KEY: &str = "";

/// Sentinel tag bucket for torrents without tags.
pub const UNTAGGED_KEY: &str = "untagged";

/// Facet buckets keyed by label, iterated in insertion order.
pub type Buckets = IndexMap<String, u64>;

/// Errors that can occur while driving the taxonomy or replaying a patch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaxonomyError {
    #[error("Taxonomy cycle already in progress")]
    CycleAlreadyStarted,

    #[error("No taxonomy cycle in progress")]
    NoCycleInProgress,

    #[error("Invalid patch path: {0}")]
    InvalidPatchPath(String),

    #[error("Patch target not found: {0}")]
    MissingPatchTarget(String),
}

/// One mapping of the taxonomy snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    StatusCounts,
    TagCounts,
    TagSizes,
    TrackerCounts,
    TrackerSizes,
    LocationCounts,
    LocationSizes,
}

impl Facet {
    /// All facets in snapshot field order. Diffs are emitted in this order.
    pub const ALL: [Facet; 7] = [
        Facet::StatusCounts,
        Facet::TagCounts,
        Facet::TagSizes,
        Facet::TrackerCounts,
        Facet::TrackerSizes,
        Facet::LocationCounts,
        Facet::LocationSizes,
    ];

    /// Field name as serialized and used in patch paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            Facet::StatusCounts => "statusCounts",
            Facet::TagCounts => "tagCounts",
            Facet::TagSizes => "tagSizes",
            Facet::TrackerCounts => "trackerCounts",
            Facet::TrackerSizes => "trackerSizes",
            Facet::LocationCounts => "locationCounts",
            Facet::LocationSizes => "locationSizes",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|facet| facet.as_str() == name)
    }
}

/// The aggregated index at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomySnapshot {
    /// Torrents per status label, plus the `""` total.
    pub status_counts: Buckets,
    /// Torrents per tag, plus the `""` total and the `untagged` bucket.
    pub tag_counts: Buckets,
    /// Bytes per tag.
    pub tag_sizes: Buckets,
    /// Torrents per tracker, plus the `""` total.
    pub tracker_counts: Buckets,
    /// Bytes per tracker.
    pub tracker_sizes: Buckets,
    /// Torrents per save directory, plus an unused `""` bucket.
    pub location_counts: Buckets,
    /// Bytes per save directory.
    pub location_sizes: Buckets,
}

impl Default for TaxonomySnapshot {
    fn default() -> Self {
        Self {
            status_counts: buckets(&[ALL_KEY]),
            tag_counts: buckets(&[ALL_KEY, UNTAGGED_KEY]),
            tag_sizes: Buckets::new(),
            tracker_counts: buckets(&[ALL_KEY]),
            tracker_sizes: Buckets::new(),
            location_counts: buckets(&[ALL_KEY]),
            location_sizes: buckets(&[ALL_KEY]),
        }
    }
}

impl TaxonomySnapshot {
    /// Create the empty snapshot a process starts with.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn facet(&self, facet: Facet) -> &Buckets {
        match facet {
            Facet::StatusCounts => &self.status_counts,
            Facet::TagCounts => &self.tag_counts,
            Facet::TagSizes => &self.tag_sizes,
            Facet::TrackerCounts => &self.tracker_counts,
            Facet::TrackerSizes => &self.tracker_sizes,
            Facet::LocationCounts => &self.location_counts,
            Facet::LocationSizes => &self.location_sizes,
        }
    }

    pub fn facet_mut(&mut self, facet: Facet) -> &mut Buckets {
        match facet {
            Facet::StatusCounts => &mut self.status_counts,
            Facet::TagCounts => &mut self.tag_counts,
            Facet::TagSizes => &mut self.tag_sizes,
            Facet::TrackerCounts => &mut self.tracker_counts,
            Facet::TrackerSizes => &mut self.tracker_sizes,
            Facet::LocationCounts => &mut self.location_counts,
            Facet::LocationSizes => &mut self.location_sizes,
        }
    }
}

/// Zero-valued buckets for the given keys.
pub(crate) fn buckets(keys: &[&str]) -> Buckets {
    keys.iter().map(|key| (key.to_string(), 0)).collect()
}

/// Full snapshot returned to callers needing a baseline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyResponse {
    pub id: u64,
    pub taxonomy: TaxonomySnapshot,
}

/// Change notification emitted at the end of a cycle that changed the taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyDiffChange {
    /// Monotonic, time-derived identifier.
    pub id: u64,
    /// Operations transforming the previous snapshot into the current one.
    pub diff: Vec<PatchOperation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot_seeds_sentinels() {
        let snapshot = TaxonomySnapshot::new();
        assert_eq!(snapshot.status_counts, buckets(&[""]));
        assert_eq!(snapshot.tag_counts, buckets(&["", "untagged"]));
        assert!(snapshot.tag_sizes.is_empty());
        assert_eq!(snapshot.tracker_counts, buckets(&[""]));
        assert!(snapshot.tracker_sizes.is_empty());
        assert_eq!(snapshot.location_counts, buckets(&[""]));
        assert_eq!(snapshot.location_sizes, buckets(&[""]));
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let json = serde_json::to_value(TaxonomySnapshot::new()).unwrap();
        for facet in Facet::ALL {
            assert!(json.get(facet.as_str()).is_some(), "missing {}", facet.as_str());
        }
        assert_eq!(json["tagCounts"]["untagged"], 0);
        assert_eq!(json["statusCounts"][""], 0);
    }

    #[test]
    fn test_facet_from_name() {
        for facet in Facet::ALL {
            assert_eq!(Facet::from_name(facet.as_str()), Some(facet));
        }
        assert_eq!(Facet::from_name("status_counts"), None);
    }

    #[test]
    fn test_facet_mut_targets_matching_field() {
        let mut snapshot = TaxonomySnapshot::new();
        snapshot
            .facet_mut(Facet::TrackerSizes)
            .insert("tracker.example.org".to_string(), 42);
        assert_eq!(snapshot.tracker_sizes["tracker.example.org"], 42);
        assert_eq!(snapshot.facet(Facet::TrackerSizes).len(), 1);
        assert!(snapshot.tag_sizes.is_empty());
    }

    #[test]
    fn test_clone_is_independent() {
        let original = TaxonomySnapshot::new();
        let mut copy = original.clone();
        copy.tag_counts.insert("movies".to_string(), 3);
        assert!(!original.tag_counts.contains_key("movies"));
    }
}
