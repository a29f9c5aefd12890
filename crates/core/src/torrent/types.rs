//! Types for torrent records.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Status label of a torrent.
///
/// A torrent usually carries several at once, e.g. a torrent that is
/// uploading is `seeding`, `complete` and `active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TorrentStatus {
    /// Checking file integrity.
    Checking,
    /// Uploading to peers.
    Seeding,
    /// All wanted pieces are downloaded.
    Complete,
    /// Downloading from peers.
    Downloading,
    /// Paused by the user.
    Paused,
    /// Stopped by the user or the client.
    Stopped,
    /// Error state.
    Error,
    /// No data is being transferred.
    Inactive,
    /// Data is being transferred.
    Active,
}

impl TorrentStatus {
    /// Every known status, in the order they are seeded into status counts.
    pub const ALL: [TorrentStatus; 9] = [
        TorrentStatus::Checking,
        TorrentStatus::Seeding,
        TorrentStatus::Complete,
        TorrentStatus::Downloading,
        TorrentStatus::Paused,
        TorrentStatus::Stopped,
        TorrentStatus::Error,
        TorrentStatus::Inactive,
        TorrentStatus::Active,
    ];

    /// Returns the label used as bucket key and in API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            TorrentStatus::Checking => "checking",
            TorrentStatus::Seeding => "seeding",
            TorrentStatus::Complete => "complete",
            TorrentStatus::Downloading => "downloading",
            TorrentStatus::Paused => "paused",
            TorrentStatus::Stopped => "stopped",
            TorrentStatus::Error => "error",
            TorrentStatus::Inactive => "inactive",
            TorrentStatus::Active => "active",
        }
    }

    /// Parse a label produced by [`TorrentStatus::as_str`].
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == label)
    }
}

/// Properties of a single torrent consumed by the taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TorrentProperties {
    /// Info hash (lowercase hex).
    pub hash: String,
    /// Torrent name.
    pub name: String,
    /// Current status labels.
    pub status: Vec<TorrentStatus>,
    /// User-assigned tags.
    pub tags: Vec<String>,
    /// Tracker identifiers (host names).
    #[serde(rename = "trackerURIs")]
    pub tracker_uris: Vec<String>,
    /// Save directory, reported verbatim by the client.
    pub directory: String,
    /// Total size in bytes.
    pub size_bytes: u64,
}

/// All torrents of one list pass, keyed by hash in list order.
pub type TorrentList = IndexMap<String, TorrentProperties>;

/// Build a [`TorrentList`] from records, keyed by hash.
///
/// A later record with the same hash replaces the earlier one.
pub fn torrent_list<I>(torrents: I) -> TorrentList
where
    I: IntoIterator<Item = TorrentProperties>,
{
    torrents
        .into_iter()
        .map(|torrent| (torrent.hash.clone(), torrent))
        .collect()
}
