//! Torrent source abstraction.
//!
//! A source is any torrent client backend able to list its torrents with the
//! properties the taxonomy aggregates.

mod qbittorrent;
mod types;

pub use qbittorrent::QBittorrentSource;
pub use types::*;
