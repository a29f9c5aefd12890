//! Facet filtering over already-loaded torrents.

use serde::{Deserialize, Serialize};

use crate::taxonomy::UNTAGGED_KEY;
use crate::torrent::TorrentProperties;

/// The facet a filter selects on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    Status,
    Tracker,
    Tag,
    Location,
}

impl FilterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterType::Status => "status",
            FilterType::Tracker => "tracker",
            FilterType::Tag => "tag",
            FilterType::Location => "location",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "status" => Some(FilterType::Status),
            "tracker" => Some(FilterType::Tracker),
            "tag" => Some(FilterType::Tag),
            "location" => Some(FilterType::Location),
            _ => None,
        }
    }
}

/// Selected values of one facet.
///
/// An empty selection is an inactive filter and matches everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetFilter {
    #[serde(rename = "type")]
    pub facet: FilterType,
    #[serde(default)]
    pub values: Vec<String>,
}

impl FacetFilter {
    pub fn new<I, S>(facet: FilterType, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            facet,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.values.is_empty()
    }

    /// Check whether a single torrent passes this filter.
    pub fn matches(&self, torrent: &TorrentProperties) -> bool {
        if !self.is_active() {
            return true;
        }

        match self.facet {
            FilterType::Status => torrent
                .status
                .iter()
                .any(|status| self.selects(status.as_str())),
            FilterType::Tracker => torrent.tracker_uris.iter().any(|uri| self.selects(uri)),
            FilterType::Tag => {
                (torrent.tags.is_empty() && self.selects(UNTAGGED_KEY))
                    || torrent.tags.iter().any(|tag| self.selects(tag))
            }
            // Prefix match so a parent directory selects everything below it.
            FilterType::Location => self
                .values
                .iter()
                .any(|directory| torrent.directory.starts_with(directory.as_str())),
        }
    }

    fn selects(&self, value: &str) -> bool {
        self.values.iter().any(|selected| selected == value)
    }
}

/// Return the torrents matching `filter`, preserving input order.
pub fn filter_torrents(torrents: &[TorrentProperties], filter: &FacetFilter) -> Vec<TorrentProperties> {
    if !filter.is_active() {
        return torrents.to_vec();
    }

    torrents
        .iter()
        .filter(|torrent| filter.matches(torrent))
        .cloned()
        .collect()
}
