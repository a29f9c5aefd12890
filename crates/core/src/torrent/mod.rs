//! Torrent records as reported by a torrent client.
//!
//! These are the inputs of the taxonomy cycle: every record carries the facet
//! values (status, tags, trackers, location) that the index aggregates.

mod types;

pub use types::*;
