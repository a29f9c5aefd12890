//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Taxonomy cycles (emitted diffs, patch sizes, rejected signals)
//! - Torrent sources (list requests and their duration)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Taxonomy Metrics
// =============================================================================

/// Completed taxonomy cycles by result.
pub static TAXONOMY_CYCLES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "taxonomy_cycles_total",
            "Total completed taxonomy cycles",
        ),
        &["result"], // "emitted", "unchanged"
    )
    .unwrap()
});

/// Patch operations per emitted diff.
pub static TAXONOMY_PATCH_OPERATIONS: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "taxonomy_patch_operations",
            "Number of patch operations per emitted taxonomy diff",
        )
        .buckets(vec![1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0]),
        &[],
    )
    .unwrap()
});

/// Torrents counted in the last completed cycle.
pub static TAXONOMY_TORRENTS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "taxonomy_torrents",
        "Torrents counted in the last completed taxonomy cycle",
    )
    .unwrap()
});

/// Lifecycle signals rejected because they arrived out of order.
pub static TAXONOMY_REJECTED_SIGNALS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "taxonomy_rejected_signals_total",
            "Lifecycle signals rejected because they arrived out of order",
        ),
        &["signal"], // "cycle_start", "record", "cycle_end"
    )
    .unwrap()
});

// =============================================================================
// Source Metrics
// =============================================================================

/// Torrent source list requests by result.
pub static SOURCE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "taxonomy_source_requests_total",
            "Total torrent source list requests",
        ),
        &["source", "status"], // status: "success", "error"
    )
    .unwrap()
});

/// Torrent source list request duration.
pub static SOURCE_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "taxonomy_source_request_duration_seconds",
            "Duration of torrent source list requests",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["source"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Taxonomy
        Box::new(TAXONOMY_CYCLES.clone()),
        Box::new(TAXONOMY_PATCH_OPERATIONS.clone()),
        Box::new(TAXONOMY_TORRENTS.clone()),
        Box::new(TAXONOMY_REJECTED_SIGNALS.clone()),
        // Sources
        Box::new(SOURCE_REQUESTS.clone()),
        Box::new(SOURCE_REQUEST_DURATION.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::Registry;

    #[test]
    fn test_all_metrics_register() {
        let registry = Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }
        TAXONOMY_CYCLES.with_label_values(&["emitted"]).inc();
        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.contains(&"taxonomy_cycles_total".to_string()));
    }
}
