//! Client gateway driving the taxonomy from a torrent source.
//!
//! Every poll lists the source's torrents and runs one taxonomy cycle over
//! them while holding the taxonomy write lock, so cycles never interleave.

mod runner;
mod types;

pub use runner::ClientGateway;
pub use types::GatewayError;
