//! Client gateway implementation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::config::GatewayConfig;
use crate::filter::{filter_torrents, FacetFilter};
use crate::metrics::{SOURCE_REQUESTS, SOURCE_REQUEST_DURATION};
use crate::source::TorrentSource;
use crate::taxonomy::{TaxonomyDiffChange, TaxonomyService};
use crate::torrent::{torrent_list, TorrentList, TorrentProperties};

use super::types::GatewayError;

/// Polls a torrent source and feeds each listing through the taxonomy.
#[derive(Clone)]
pub struct ClientGateway {
    source: Arc<dyn TorrentSource>,
    taxonomy: Arc<RwLock<TaxonomyService>>,
    poll_interval: Duration,

    // Runtime state
    torrents: Arc<RwLock<TorrentList>>,
    // Held from listing through the store, so poll and manual refresh never interleave.
    refresh_lock: Arc<Mutex<()>>,
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl ClientGateway {
    /// Create a new gateway.
    pub fn new(
        source: Arc<dyn TorrentSource>,
        taxonomy: Arc<RwLock<TaxonomyService>>,
        config: &GatewayConfig,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            source,
            taxonomy,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            torrents: Arc::new(RwLock::new(TorrentList::new())),
            refresh_lock: Arc::new(Mutex::new(())),
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// List the source once and run a taxonomy cycle over the result.
    ///
    /// A failed listing leaves both the taxonomy and the loaded torrents as
    /// they were. Concurrent calls run one after another, each listing the
    /// source afresh.
    pub async fn refresh(&self) -> Result<Option<TaxonomyDiffChange>, GatewayError> {
        let _guard = self.refresh_lock.lock().await;
        let source_name = self.source.name().to_string();
        let started = Instant::now();
        let listed = self.source.list_torrents().await;

        SOURCE_REQUEST_DURATION
            .with_label_values(&[source_name.as_str()])
            .observe(started.elapsed().as_secs_f64());
        let status = if listed.is_ok() { "success" } else { "error" };
        SOURCE_REQUESTS
            .with_label_values(&[source_name.as_str(), status])
            .inc();

        let torrents = torrent_list(listed?);

        let mut taxonomy = self.taxonomy.write().await;
        let change = taxonomy.process_list(&torrents)?;
        debug!(
            "Processed {} torrents from {} ({} patch operations)",
            torrents.len(),
            source_name,
            change.as_ref().map_or(0, |c| c.diff.len())
        );

        // Stored before the taxonomy lock is released so both views agree.
        *self.torrents.write().await = torrents;
        drop(taxonomy);
        Ok(change)
    }

    /// Start the polling loop (spawns a background task).
    ///
    /// The first refresh runs immediately.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Client gateway already running");
            return;
        }

        info!(
            "Starting client gateway for {} (every {} ms)",
            self.source.name(),
            self.poll_interval.as_millis()
        );

        let gateway = self.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            gateway.poll_once().await;
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Client gateway received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(gateway.poll_interval) => {
                        if !gateway.is_running() {
                            break;
                        }
                        gateway.poll_once().await;
                    }
                }
            }
            info!("Client gateway loop stopped");
        });
    }

    /// Stop the polling loop.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Client gateway not running");
            return;
        }

        info!("Stopping client gateway");
        let _ = self.shutdown_tx.send(());
    }

    async fn poll_once(&self) {
        if let Err(e) = self.refresh().await {
            warn!("Client gateway refresh failed: {}", e);
        }
    }

    /// Torrents of the last successful listing, in source order.
    pub async fn torrents(&self) -> Vec<TorrentProperties> {
        self.torrents.read().await.values().cloned().collect()
    }

    /// Torrents of the last successful listing that match `filter`.
    pub async fn filter_torrents(&self, filter: &FacetFilter) -> Vec<TorrentProperties> {
        filter_torrents(&self.torrents().await, filter)
    }
}
