//! Taxonomy cycle controller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::metrics::{
    TAXONOMY_CYCLES, TAXONOMY_PATCH_OPERATIONS, TAXONOMY_REJECTED_SIGNALS, TAXONOMY_TORRENTS,
};
use crate::torrent::{TorrentList, TorrentProperties};

use super::diff::compare;
use super::types::{TaxonomyDiffChange, TaxonomyError, TaxonomyResponse, TaxonomySnapshot};

/// Callback invoked synchronously with every emitted change.
pub type TaxonomyChangeHandler = Arc<dyn Fn(&TaxonomyDiffChange) + Send + Sync>;

/// Where the controller is within a cycle.
#[derive(Debug)]
enum CyclePhase {
    Idle,
    /// Accumulating records; holds the snapshot taken at cycle start.
    Accumulating { previous: TaxonomySnapshot },
}

/// Maintains the taxonomy snapshot across list cycles and emits diffs.
///
/// A cycle is driven by three signals, strictly in this order:
/// `on_cycle_start`, any number of `on_record`, then `on_cycle_end`.
/// Signals out of that order are rejected and leave the state untouched.
pub struct TaxonomyService {
    taxonomy: TaxonomySnapshot,
    phase: CyclePhase,
    handlers: Vec<TaxonomyChangeHandler>,
    last_id: AtomicU64,
}

impl Default for TaxonomyService {
    fn default() -> Self {
        Self::new()
    }
}

impl TaxonomyService {
    pub fn new() -> Self {
        Self {
            taxonomy: TaxonomySnapshot::new(),
            phase: CyclePhase::Idle,
            handlers: Vec::new(),
            last_id: AtomicU64::new(0),
        }
    }

    /// Register a handler for taxonomy changes.
    pub fn on_taxonomy_change(&mut self, handler: TaxonomyChangeHandler) {
        self.handlers.push(handler);
    }

    /// Current snapshot with a fresh identifier.
    pub fn get_taxonomy(&self) -> TaxonomyResponse {
        TaxonomyResponse {
            id: self.next_id(),
            taxonomy: self.taxonomy.clone(),
        }
    }

    /// Read-only view of the current snapshot.
    pub fn taxonomy(&self) -> &TaxonomySnapshot {
        &self.taxonomy
    }

    pub fn cycle_in_progress(&self) -> bool {
        matches!(self.phase, CyclePhase::Accumulating { .. })
    }

    /// Begin a cycle: keep a copy of the current snapshot and reset the buckets.
    pub fn on_cycle_start(&mut self) -> Result<(), TaxonomyError> {
        if self.cycle_in_progress() {
            return Err(reject("cycle_start", TaxonomyError::CycleAlreadyStarted));
        }

        self.phase = CyclePhase::Accumulating {
            previous: self.taxonomy.clone(),
        };
        self.taxonomy.reset_buckets();
        Ok(())
    }

    /// Accumulate one torrent into the current snapshot.
    pub fn on_record(&mut self, torrent: &TorrentProperties) -> Result<(), TaxonomyError> {
        if !self.cycle_in_progress() {
            return Err(reject("record", TaxonomyError::NoCycleInProgress));
        }

        self.taxonomy.accumulate(torrent);
        Ok(())
    }

    /// Finish a cycle, emitting the diff to every handler when it is non-empty.
    ///
    /// Only the number of entries in `torrents` is used.
    pub fn on_cycle_end(
        &mut self,
        torrents: &TorrentList,
    ) -> Result<Option<TaxonomyDiffChange>, TaxonomyError> {
        let previous = match std::mem::replace(&mut self.phase, CyclePhase::Idle) {
            CyclePhase::Accumulating { previous } => previous,
            CyclePhase::Idle => {
                return Err(reject("cycle_end", TaxonomyError::NoCycleInProgress));
            }
        };

        let total = torrents.len() as u64;
        self.taxonomy.finalize(total);
        TAXONOMY_TORRENTS.set(total as i64);

        let diff = compare(&previous, &self.taxonomy);
        if diff.is_empty() {
            debug!("Taxonomy cycle over {} torrents, no changes", total);
            TAXONOMY_CYCLES.with_label_values(&["unchanged"]).inc();
            return Ok(None);
        }

        debug!(
            "Taxonomy cycle over {} torrents, {} patch operations",
            total,
            diff.len()
        );
        TAXONOMY_CYCLES.with_label_values(&["emitted"]).inc();
        TAXONOMY_PATCH_OPERATIONS
            .with_label_values(&[])
            .observe(diff.len() as f64);

        let change = TaxonomyDiffChange {
            id: self.next_id(),
            diff,
        };
        for handler in &self.handlers {
            handler(&change);
        }
        Ok(Some(change))
    }

    /// Run a complete cycle over `torrents`.
    pub fn process_list(
        &mut self,
        torrents: &TorrentList,
    ) -> Result<Option<TaxonomyDiffChange>, TaxonomyError> {
        self.on_cycle_start()?;
        for torrent in torrents.values() {
            self.on_record(torrent)?;
        }
        self.on_cycle_end(torrents)
    }

    /// Milliseconds since the epoch, bumped past the last issued id if needed.
    fn next_id(&self) -> u64 {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let last = self
            .last_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        now.max(last + 1)
    }
}

fn reject(signal: &str, error: TaxonomyError) -> TaxonomyError {
    warn!("Rejected taxonomy {} signal: {}", signal, error);
    TAXONOMY_REJECTED_SIGNALS.with_label_values(&[signal]).inc();
    error
}
