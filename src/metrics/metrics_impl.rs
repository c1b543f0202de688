//! Atomic implementation of the facade metrics sink.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::metrics::snapshot::CacheMetricsSnapshot;
use crate::metrics::traits::{MetricsReset, MetricsSnapshotProvider};
use crate::traits::MetricsSink;

/// Lock-free counters behind [`MetricsSink`](crate::traits::MetricsSink).
///
/// All updates are relaxed fetch-adds: one per counter touched per
/// operation, cheap enough to leave attached in production.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use priokit::builder::CacheBuilder;
/// use priokit::metrics::{AtomicCacheMetrics, MetricsSnapshotProvider};
///
/// let metrics = Arc::new(AtomicCacheMetrics::default());
/// let cache = CacheBuilder::new()
///     .max_nodes(16)
///     .metrics_sink(metrics.clone())
///     .try_build()
///     .unwrap();
///
/// cache.insert(100.0, "AAPL", 1, 60.0);
/// assert!(cache.get_highest_priority("AAPL").is_some());
///
/// let snapshot = metrics.snapshot();
/// assert_eq!(snapshot.inserts, 1);
/// assert_eq!(snapshot.hits, 1);
/// ```
#[derive(Debug, Default)]
pub struct AtomicCacheMetrics {
    inserts: AtomicU64,
    insert_failures: AtomicU64,
    insert_latency_ns_total: AtomicU64,

    retrieves: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    retrieve_latency_ns_total: AtomicU64,

    batch_inserts: AtomicU64,
    batch_insert_items: AtomicU64,
    batch_insert_failures: AtomicU64,
    batch_retrieves: AtomicU64,
    batch_retrieve_keys: AtomicU64,
}

impl MetricsSink for AtomicCacheMetrics {
    fn record_insert(&self, latency_ns: u64, success: bool) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
        self.insert_latency_ns_total
            .fetch_add(latency_ns, Ordering::Relaxed);
        if !success {
            self.insert_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn record_retrieve(&self, latency_ns: u64, _success: bool, hit: bool) {
        self.retrieves.fetch_add(1, Ordering::Relaxed);
        self.retrieve_latency_ns_total
            .fetch_add(latency_ns, Ordering::Relaxed);
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn record_batch_insert(&self, _latency_ns: u64, len: usize, success: bool) {
        self.batch_inserts.fetch_add(1, Ordering::Relaxed);
        self.batch_insert_items
            .fetch_add(len as u64, Ordering::Relaxed);
        if !success {
            self.batch_insert_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn record_batch_retrieve(&self, _latency_ns: u64, len: usize) {
        self.batch_retrieves.fetch_add(1, Ordering::Relaxed);
        self.batch_retrieve_keys
            .fetch_add(len as u64, Ordering::Relaxed);
    }
}

impl MetricsSnapshotProvider<CacheMetricsSnapshot> for AtomicCacheMetrics {
    fn snapshot(&self) -> CacheMetricsSnapshot {
        CacheMetricsSnapshot {
            inserts: self.inserts.load(Ordering::Relaxed),
            insert_failures: self.insert_failures.load(Ordering::Relaxed),
            insert_latency_ns_total: self.insert_latency_ns_total.load(Ordering::Relaxed),
            retrieves: self.retrieves.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            retrieve_latency_ns_total: self.retrieve_latency_ns_total.load(Ordering::Relaxed),
            batch_inserts: self.batch_inserts.load(Ordering::Relaxed),
            batch_insert_items: self.batch_insert_items.load(Ordering::Relaxed),
            batch_insert_failures: self.batch_insert_failures.load(Ordering::Relaxed),
            batch_retrieves: self.batch_retrieves.load(Ordering::Relaxed),
            batch_retrieve_keys: self.batch_retrieve_keys.load(Ordering::Relaxed),
        }
    }
}

impl MetricsReset for AtomicCacheMetrics {
    fn reset_metrics(&self) {
        self.inserts.store(0, Ordering::Relaxed);
        self.insert_failures.store(0, Ordering::Relaxed);
        self.insert_latency_ns_total.store(0, Ordering::Relaxed);
        self.retrieves.store(0, Ordering::Relaxed);
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.retrieve_latency_ns_total.store(0, Ordering::Relaxed);
        self.batch_inserts.store(0, Ordering::Relaxed);
        self.batch_insert_items.store(0, Ordering::Relaxed);
        self.batch_insert_failures.store(0, Ordering::Relaxed);
        self.batch_retrieves.store(0, Ordering::Relaxed);
        self.batch_retrieve_keys.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_recording_splits_success_and_failure() {
        let metrics = AtomicCacheMetrics::default();
        metrics.record_insert(100, true);
        metrics.record_insert(300, false);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.inserts, 2);
        assert_eq!(snapshot.insert_failures, 1);
        assert_eq!(snapshot.insert_latency_ns_total, 400);
        assert_eq!(snapshot.avg_insert_latency_ns(), 200.0);
    }

    #[test]
    fn retrieve_recording_splits_hit_and_miss() {
        let metrics = AtomicCacheMetrics::default();
        metrics.record_retrieve(50, true, true);
        metrics.record_retrieve(50, true, true);
        metrics.record_retrieve(100, true, false);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.retrieves, 3);
        assert_eq!(snapshot.hits, 2);
        assert_eq!(snapshot.misses, 1);
        assert!((snapshot.hit_rate() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn batch_recording_accumulates_sizes() {
        let metrics = AtomicCacheMetrics::default();
        metrics.record_batch_insert(1_000, 100, true);
        metrics.record_batch_insert(1_000, 50, false);
        metrics.record_batch_retrieve(500, 10);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.batch_inserts, 2);
        assert_eq!(snapshot.batch_insert_items, 150);
        assert_eq!(snapshot.batch_insert_failures, 1);
        assert_eq!(snapshot.batch_retrieves, 1);
        assert_eq!(snapshot.batch_retrieve_keys, 10);
    }

    #[test]
    fn reset_zeroes_every_counter() {
        let metrics = AtomicCacheMetrics::default();
        metrics.record_insert(10, true);
        metrics.record_retrieve(10, true, true);
        metrics.record_batch_insert(10, 5, true);
        metrics.record_batch_retrieve(10, 5);

        metrics.reset_metrics();
        assert_eq!(metrics.snapshot(), CacheMetricsSnapshot::default());
    }

    #[test]
    fn concurrent_recording_loses_nothing() {
        use std::sync::Arc;

        let metrics = Arc::new(AtomicCacheMetrics::default());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let metrics = Arc::clone(&metrics);
            handles.push(std::thread::spawn(move || {
                for _ in 0..1_000 {
                    metrics.record_insert(1, true);
                    metrics.record_retrieve(1, true, true);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.inserts, 4_000);
        assert_eq!(snapshot.retrieves, 4_000);
        assert_eq!(snapshot.hits, 4_000);
    }
}
