//! Fluent construction for [`PriorityCache`](crate::cache::PriorityCache).
//!
//! Wraps [`CacheConfig`](crate::config::CacheConfig) with per-field setters
//! and attaches the optional boundary collaborators. `try_build` validates
//! and fails with [`BuildError`](crate::error::BuildError) instead of
//! panicking.
//!
//! ## Example
//!
//! ```rust
//! use priokit::builder::CacheBuilder;
//!
//! let cache = CacheBuilder::new()
//!     .max_nodes(1_000)
//!     .default_expiry_seconds(5.0)
//!     .try_build()
//!     .unwrap();
//!
//! cache.insert(100.0, "AAPL", 1, 60.0);
//! assert_eq!(cache.capacity(), 1_000);
//! ```

use std::sync::Arc;

use crate::cache::PriorityCache;
use crate::config::CacheConfig;
use crate::error::BuildError;
use crate::traits::{ErrorReporter, MetricsSink};

/// Builder for [`PriorityCache`] instances.
pub struct CacheBuilder {
    config: CacheConfig,
    metrics: Option<Arc<dyn MetricsSink>>,
    reporter: Option<Arc<dyn ErrorReporter>>,
}

impl CacheBuilder {
    /// Starts from the default configuration.
    pub fn new() -> Self {
        Self::from_config(CacheConfig::default())
    }

    /// Starts from an existing configuration.
    pub fn from_config(config: CacheConfig) -> Self {
        Self {
            config,
            metrics: None,
            reporter: None,
        }
    }

    /// Arena capacity: total record slot count.
    pub fn max_nodes(mut self, max_nodes: usize) -> Self {
        self.config.max_nodes = max_nodes;
        self
    }

    /// Background reclamation cadence in milliseconds.
    pub fn cleanup_interval_ms(mut self, interval_ms: u64) -> Self {
        self.config.cleanup_interval_ms = interval_ms;
        self
    }

    /// Advisory upper bound on arena memory, in mebibytes.
    pub fn max_memory_mb(mut self, max_memory_mb: usize) -> Self {
        self.config.max_memory_mb = max_memory_mb;
        self
    }

    /// Recommended caller parallelism. Not enforced.
    pub fn num_worker_threads(mut self, threads: usize) -> Self {
        self.config.num_worker_threads = threads;
        self
    }

    /// Recommended `insert_batch` size. Not enforced.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    /// Per-bucket heap capacity; `0` derives `max_nodes / 10`.
    pub fn heap_initial_capacity(mut self, capacity: usize) -> Self {
        self.config.heap_initial_capacity = capacity;
        self
    }

    /// NUMA placement hint; ignored by the default build.
    pub fn numa(mut self, enable: bool, node: i32) -> Self {
        self.config.enable_numa = enable;
        self.config.numa_node = node;
        self
    }

    /// TTL applied by `insert_with_default_ttl`, in seconds.
    pub fn default_expiry_seconds(mut self, seconds: f64) -> Self {
        self.config.default_expiry_seconds = seconds;
        self
    }

    /// Upper bound on slots retired per reclamation cycle.
    pub fn max_expired_per_cleanup(mut self, max: usize) -> Self {
        self.config.max_expired_per_cleanup = max;
        self
    }

    /// Attaches a metrics sink invoked at the facade boundary.
    pub fn metrics_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.metrics = Some(sink);
        self
    }

    /// Attaches an error reporter for classified failure reports.
    pub fn error_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Validates the configuration and builds the cache.
    pub fn try_build(self) -> Result<PriorityCache, BuildError> {
        PriorityCache::with_collaborators(self.config, self.metrics, self.reporter)
    }
}

impl Default for CacheBuilder {
    fn default() -> Self {
        Self::new()
    }
}
