//! HTTP and WebSocket front end of the torrent taxonomy.

pub mod api;
pub mod metrics;
pub mod state;
