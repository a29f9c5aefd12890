//! Types for torrent source operations.

use async_trait::async_trait;
use thiserror::Error;

use crate::torrent::TorrentProperties;

/// Errors that can occur while listing torrents from a source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Request timeout")]
    Timeout,
}

/// Trait for torrent client backends feeding the taxonomy.
#[async_trait]
pub trait TorrentSource: Send + Sync {
    /// Backend name for logging and metrics.
    fn name(&self) -> &str;

    /// List every torrent known to the backend.
    async fn list_torrents(&self) -> Result<Vec<TorrentProperties>, SourceError>;
}
