//! Point-in-time view of the cache counters.

/// Counters captured from [`AtomicCacheMetrics`](crate::metrics::AtomicCacheMetrics).
///
/// Each field is read individually with relaxed loads; under concurrent
/// traffic the snapshot is coherent enough for monitoring, not a strong
/// cross-counter cut.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheMetricsSnapshot {
    pub inserts: u64,
    pub insert_failures: u64,
    pub insert_latency_ns_total: u64,

    pub retrieves: u64,
    pub hits: u64,
    pub misses: u64,
    pub retrieve_latency_ns_total: u64,

    pub batch_inserts: u64,
    pub batch_insert_items: u64,
    pub batch_insert_failures: u64,
    pub batch_retrieves: u64,
    pub batch_retrieve_keys: u64,
}

impl CacheMetricsSnapshot {
    /// Hits over completed retrievals, in `[0, 1]`. Zero when idle.
    pub fn hit_rate(&self) -> f64 {
        if self.retrieves == 0 {
            0.0
        } else {
            self.hits as f64 / self.retrieves as f64
        }
    }

    /// Mean insert latency in nanoseconds. Zero when idle.
    pub fn avg_insert_latency_ns(&self) -> f64 {
        if self.inserts == 0 {
            0.0
        } else {
            self.insert_latency_ns_total as f64 / self.inserts as f64
        }
    }

    /// Mean retrieval latency in nanoseconds. Zero when idle.
    pub fn avg_retrieve_latency_ns(&self) -> f64 {
        if self.retrieves == 0 {
            0.0
        } else {
            self.retrieve_latency_ns_total as f64 / self.retrieves as f64
        }
    }
}
