//! Observability for the snapshot feed
//!
//! Counters for ingestion, fan-out and analysis, plus a rolling latency
//! window for publish sweeps. Exported as a flat map for the stats
//! endpoint.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Core metrics for the snapshot feed.
pub struct FeedMetrics {
    // Ingestion
    pub snapshots_ingested: AtomicU64,
    pub snapshots_rejected: AtomicU64,

    // Broadcasting
    pub messages_delivered: AtomicU64,
    pub subscribers_evicted: AtomicU64,
    pub connected_subscribers: AtomicU64,
    pub publish_latency_ns: Mutex<LatencyTracker>,

    // Analysis
    pub analyses_succeeded: AtomicU64,
    pub analyses_failed: AtomicU64,
    pub analyses_skipped: AtomicU64,
}

impl FeedMetrics {
    pub fn new() -> Self {
        Self {
            snapshots_ingested: AtomicU64::new(0),
            snapshots_rejected: AtomicU64::new(0),
            messages_delivered: AtomicU64::new(0),
            subscribers_evicted: AtomicU64::new(0),
            connected_subscribers: AtomicU64::new(0),
            publish_latency_ns: Mutex::new(LatencyTracker::new(1000)),
            analyses_succeeded: AtomicU64::new(0),
            analyses_failed: AtomicU64::new(0),
            analyses_skipped: AtomicU64::new(0),
        }
    }

    pub fn record_ingested(&self) {
        self.snapshots_ingested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.snapshots_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one publish sweep.
    pub fn record_publish(&self, delivered: usize, latency_ns: u64) {
        self.messages_delivered
            .fetch_add(delivered as u64, Ordering::Relaxed);
        if let Ok(mut tracker) = self.publish_latency_ns.lock() {
            tracker.record(latency_ns);
        }
    }

    pub fn record_eviction(&self) {
        self.subscribers_evicted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_connected_subscribers(&self, count: u64) {
        self.connected_subscribers.store(count, Ordering::Relaxed);
    }

    pub fn record_analysis_succeeded(&self) {
        self.analyses_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_analysis_failed(&self) {
        self.analyses_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_analysis_skipped(&self) {
        self.analyses_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Export metrics as a BTreeMap for exposition.
    pub fn export(&self) -> BTreeMap<String, u64> {
        let mut m = BTreeMap::new();
        m.insert("snapshots_ingested".to_string(), self.snapshots_ingested.load(Ordering::Relaxed));
        m.insert("snapshots_rejected".to_string(), self.snapshots_rejected.load(Ordering::Relaxed));
        m.insert("messages_delivered".to_string(), self.messages_delivered.load(Ordering::Relaxed));
        m.insert("subscribers_evicted".to_string(), self.subscribers_evicted.load(Ordering::Relaxed));
        m.insert("connected_subscribers".to_string(), self.connected_subscribers.load(Ordering::Relaxed));
        m.insert("analyses_succeeded".to_string(), self.analyses_succeeded.load(Ordering::Relaxed));
        m.insert("analyses_failed".to_string(), self.analyses_failed.load(Ordering::Relaxed));
        m.insert("analyses_skipped".to_string(), self.analyses_skipped.load(Ordering::Relaxed));
        if let Ok(tracker) = self.publish_latency_ns.lock() {
            if let Some(p99) = tracker.percentile(99) {
                m.insert("publish_latency_p99_ns".to_string(), p99);
            }
        }
        m
    }
}

impl Default for FeedMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Rolling window of latency samples for percentile calculation.
pub struct LatencyTracker {
    samples: VecDeque<u64>,
    max_samples: usize,
}

impl LatencyTracker {
    pub fn new(max_samples: usize) -> Self {
        let max_samples = max_samples.max(1);
        Self {
            samples: VecDeque::with_capacity(max_samples),
            max_samples,
        }
    }

    pub fn record(&mut self, value: u64) {
        if self.samples.len() == self.max_samples {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    /// Get a percentile value (0-100) over the current window.
    pub fn percentile(&self, p: usize) -> Option<u64> {
        if self.samples.is_empty() {
            return None;
        }

        let mut sorted: Vec<u64> = self.samples.iter().copied().collect();
        sorted.sort_unstable();

        let idx = (p.min(100) as f64 / 100.0 * (sorted.len() - 1) as f64) as usize;
        Some(sorted[idx])
    }
}
