//! Facet listings for display.

use std::cmp::Ordering;

use serde::Serialize;

use crate::filter::FilterType;

use super::types::{Buckets, TaxonomySnapshot, ALL_KEY};

/// One row of a facet listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetRow {
    pub name: String,
    pub count: u64,
    /// Total bytes, for facets that track sizes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Case-insensitive ordering with a byte-wise tie-breaker.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Keys of a count mapping in display order.
///
/// The `""` sentinel sorts first. A mapping holding nothing but the sentinel
/// yields no rows at all.
pub fn facet_listing(counts: &Buckets) -> Vec<String> {
    if counts.len() == 1 && counts.contains_key(ALL_KEY) {
        return Vec::new();
    }

    let mut keys: Vec<String> = counts.keys().cloned().collect();
    keys.sort_by(|a, b| match (a.is_empty(), b.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => locale_compare(a, b),
    });
    keys
}

/// Listing rows of one facet, with sizes where the facet has them.
pub fn facet_rows(taxonomy: &TaxonomySnapshot, facet: FilterType) -> Vec<FacetRow> {
    let (counts, sizes) = match facet {
        FilterType::Status => (&taxonomy.status_counts, None),
        FilterType::Tag => (&taxonomy.tag_counts, Some(&taxonomy.tag_sizes)),
        FilterType::Tracker => (&taxonomy.tracker_counts, Some(&taxonomy.tracker_sizes)),
        FilterType::Location => (&taxonomy.location_counts, Some(&taxonomy.location_sizes)),
    };

    facet_listing(counts)
        .into_iter()
        .map(|name| FacetRow {
            count: counts.get(&name).copied().unwrap_or(0),
            size: sizes.and_then(|sizes| sizes.get(&name).copied()),
            name,
        })
        .collect()
}
