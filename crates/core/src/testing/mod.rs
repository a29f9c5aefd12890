//! Testing utilities and mock implementations.
//!
//! This module provides a mock torrent source and record fixtures, allowing
//! taxonomy cycles and the HTTP API to be exercised without a real client.
//!
//! # Example
//!
//! ```rust,ignore
//! use taxonomy_core::testing::{fixtures, MockTorrentSource};
//!
//! let source = MockTorrentSource::with_torrents(vec![fixtures::torrent("abc")]);
//!
//! // Use in a ClientGateway...
//! ```

mod mock_torrent_source;

pub use mock_torrent_source::MockTorrentSource;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::torrent::{TorrentProperties, TorrentStatus};

    /// Create a seeding torrent with one tag and one tracker.
    pub fn torrent(hash: &str) -> TorrentProperties {
        torrent_with(
            hash,
            &[
                TorrentStatus::Seeding,
                TorrentStatus::Complete,
                TorrentStatus::Inactive,
            ],
            &["linux"],
            &["tracker.example.org"],
            "/downloads",
            1024 * 1024 * 100, // 100 MB
        )
    }

    /// Create a torrent with every taxonomy-relevant property spelled out.
    pub fn torrent_with(
        hash: &str,
        status: &[TorrentStatus],
        tags: &[&str],
        trackers: &[&str],
        directory: &str,
        size_bytes: u64,
    ) -> TorrentProperties {
        TorrentProperties {
            hash: hash.to_string(),
            name: format!("Torrent {}", hash),
            status: status.to_vec(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            tracker_uris: trackers.iter().map(|t| t.to_string()).collect(),
            directory: directory.to_string(),
            size_bytes,
        }
    }
}
