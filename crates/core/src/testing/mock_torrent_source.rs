//! Mock torrent source for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::source::{SourceError, TorrentSource};
use crate::torrent::TorrentProperties;

/// Mock implementation of the TorrentSource trait.
///
/// Provides controllable behavior for testing:
/// - Replace, add or remove listed torrents between cycles
/// - Simulate a failing listing
/// - Count how often the source was listed
///
/// # Example
///
/// ```rust,ignore
/// let source = MockTorrentSource::with_torrents(vec![fixtures::torrent("a")]);
///
/// source.add_torrent(fixtures::torrent("b")).await;
/// source.set_next_error(SourceError::Timeout).await;
///
/// assert!(source.list_torrents().await.is_err());
/// assert_eq!(source.list_torrents().await?.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct MockTorrentSource {
    /// Torrents returned by the next listing, in order.
    torrents: Arc<RwLock<Vec<TorrentProperties>>>,
    /// If set, the next listing will fail with this error.
    next_error: Arc<RwLock<Option<SourceError>>>,
    list_calls: AtomicUsize,
}

impl MockTorrentSource {
    /// Create a mock source listing no torrents.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock source listing the given torrents.
    pub fn with_torrents(torrents: Vec<TorrentProperties>) -> Self {
        Self {
            torrents: Arc::new(RwLock::new(torrents)),
            ..Self::default()
        }
    }

    /// Replace the listed torrents.
    pub async fn set_torrents(&self, torrents: Vec<TorrentProperties>) {
        *self.torrents.write().await = torrents;
    }

    /// Append a torrent, or replace the one with the same hash in place.
    pub async fn add_torrent(&self, torrent: TorrentProperties) {
        let mut torrents = self.torrents.write().await;
        match torrents.iter_mut().find(|t| t.hash == torrent.hash) {
            Some(existing) => *existing = torrent,
            None => torrents.push(torrent),
        }
    }

    /// Remove a torrent by hash. Returns whether it was listed.
    pub async fn remove_torrent(&self, hash: &str) -> bool {
        let mut torrents = self.torrents.write().await;
        let before = torrents.len();
        torrents.retain(|t| t.hash != hash);
        torrents.len() != before
    }

    /// Modify a listed torrent in place. Returns whether it was found.
    pub async fn update_torrent<F>(&self, hash: &str, update: F) -> bool
    where
        F: FnOnce(&mut TorrentProperties),
    {
        let mut torrents = self.torrents.write().await;
        match torrents.iter_mut().find(|t| t.hash == hash) {
            Some(torrent) => {
                update(torrent);
                true
            }
            None => false,
        }
    }

    /// Make the next listing fail with the given error.
    pub async fn set_next_error(&self, error: SourceError) {
        *self.next_error.write().await = Some(error);
    }

    /// Number of `list_torrents` calls so far, failed ones included.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TorrentSource for MockTorrentSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_torrents(&self) -> Result<Vec<TorrentProperties>, SourceError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        Ok(self.torrents.read().await.clone())
    }
}
