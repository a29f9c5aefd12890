//! Per-facet bookkeeping on the current snapshot.
//!
//! Every increment seeds a missing bucket with zero before adding to it.

use crate::torrent::{TorrentProperties, TorrentStatus};

use super::types::{buckets, Buckets, TaxonomySnapshot, ALL_KEY, UNTAGGED_KEY};

fn add(bucket: &mut Buckets, key: &str, amount: u64) {
    let value = bucket.entry(key.to_string()).or_insert(0);
    *value = value.saturating_add(amount);
}

impl TaxonomySnapshot {
    /// Reset every facet to its zero state at the start of a cycle.
    ///
    /// Known statuses stay present at zero so that a status nobody carries
    /// anymore shows up as a change to zero instead of disappearing.
    pub fn reset_buckets(&mut self) {
        for status in TorrentStatus::ALL {
            self.status_counts.insert(status.as_str().to_string(), 0);
        }
        self.status_counts.insert(ALL_KEY.to_string(), 0);

        self.tag_counts = buckets(&[ALL_KEY, UNTAGGED_KEY]);
        self.tag_sizes = Buckets::new();
        self.tracker_counts = buckets(&[ALL_KEY]);
        self.tracker_sizes = Buckets::new();
        self.location_counts = buckets(&[ALL_KEY]);
        self.location_sizes = Buckets::new();
    }

    /// Write the cycle's torrent count into the `""` sentinels.
    ///
    /// The location facet keeps its sentinel untouched.
    pub fn finalize(&mut self, total: u64) {
        self.status_counts.insert(ALL_KEY.to_string(), total);
        self.tag_counts.insert(ALL_KEY.to_string(), total);
        self.tracker_counts.insert(ALL_KEY.to_string(), total);
    }

    /// Accumulate every facet of one torrent.
    pub fn accumulate(&mut self, torrent: &TorrentProperties) {
        self.increment_status_counts(&torrent.status);
        self.increment_tag_counts(&torrent.tags);
        self.increment_tag_sizes(&torrent.tags, torrent.size_bytes);
        self.increment_tracker_counts(&torrent.tracker_uris);
        self.increment_tracker_sizes(&torrent.tracker_uris, torrent.size_bytes);
        self.increment_location_counts_and_sizes(&torrent.directory, torrent.size_bytes);
    }

    pub fn increment_status_counts(&mut self, statuses: &[TorrentStatus]) {
        for status in statuses {
            add(&mut self.status_counts, status.as_str(), 1);
        }
    }

    pub fn increment_tag_counts(&mut self, tags: &[String]) {
        if tags.is_empty() {
            add(&mut self.tag_counts, UNTAGGED_KEY, 1);
        }

        for tag in tags {
            add(&mut self.tag_counts, tag, 1);
        }
    }

    pub fn increment_tag_sizes(&mut self, tags: &[String], size_bytes: u64) {
        for tag in tags {
            add(&mut self.tag_sizes, tag, size_bytes);
        }
    }

    pub fn increment_tracker_counts(&mut self, trackers: &[String]) {
        for tracker in trackers {
            add(&mut self.tracker_counts, tracker, 1);
        }
    }

    pub fn increment_tracker_sizes(&mut self, trackers: &[String], size_bytes: u64) {
        for tracker in trackers {
            add(&mut self.tracker_sizes, tracker, size_bytes);
        }
    }

    /// The directory string is the bucket key as-is, without normalization.
    pub fn increment_location_counts_and_sizes(&mut self, directory: &str, size_bytes: u64) {
        add(&mut self.location_counts, directory, 1);
        add(&mut self.location_sizes, directory, size_bytes);
    }
}
