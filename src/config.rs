//! Cache configuration.
//!
//! [`CacheConfig`] collects every tunable the cache consumes, with defaults
//! sized for a single-process trading-style workload. Construction validates
//! the fields that must be positive; everything else is advisory.
//!
//! ## Example Usage
//!
//! ```
//! use priokit::config::CacheConfig;
//!
//! let config = CacheConfig {
//!     max_nodes: 50_000,
//!     ..CacheConfig::default()
//! };
//! assert!(config.validate().is_ok());
//! assert_eq!(config.bucket_capacity(), 5_000);
//! ```

use crate::error::ConfigError;

/// Number of shards in the key index. Fixed; `hash_table_buckets` in the
/// config is accepted for compatibility but the core index does not resize.
pub const INDEX_SHARDS: usize = 64;

/// Tunables consumed by [`PriorityCache`](crate::cache::PriorityCache).
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Arena capacity: total record slot count. The cache can never hold
    /// more than this many successful inserts over its lifetime.
    pub max_nodes: usize,
    /// Background reclamation cadence in milliseconds.
    pub cleanup_interval_ms: u64,
    /// Advisory upper bound on arena memory, in mebibytes.
    pub max_memory_mb: usize,
    /// Recommended parallelism for callers. Not enforced.
    pub num_worker_threads: usize,
    /// Recommended batch size for `insert_batch`. Not enforced.
    pub batch_size: usize,
    /// Shard count hint. The core index uses [`INDEX_SHARDS`] regardless.
    pub hash_table_buckets: usize,
    /// Per-bucket heap capacity. `0` derives `max_nodes / 10` (minimum 1).
    pub heap_initial_capacity: usize,
    /// NUMA placement hint. The default build performs no placement.
    pub enable_numa: bool,
    /// Preferred NUMA node; `-1` means auto-detect.
    pub numa_node: i32,
    /// TTL applied when the caller does not pass one, in seconds.
    pub default_expiry_seconds: f64,
    /// Upper bound on slots retired per reclamation cycle.
    pub max_expired_per_cleanup: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_nodes: 10_000,
            cleanup_interval_ms: 1_000,
            max_memory_mb: 1_024,
            num_worker_threads: 4,
            batch_size: 100,
            hash_table_buckets: INDEX_SHARDS,
            heap_initial_capacity: 0,
            enable_numa: false,
            numa_node: -1,
            default_expiry_seconds: 60.0,
            max_expired_per_cleanup: 1_000,
        }
    }
}

impl CacheConfig {
    /// Validates the fields that must be positive.
    ///
    /// # Example
    ///
    /// ```
    /// use priokit::config::CacheConfig;
    ///
    /// assert!(CacheConfig::default().validate().is_ok());
    ///
    /// let bad = CacheConfig { cleanup_interval_ms: 0, ..CacheConfig::default() };
    /// assert!(bad.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_nodes == 0 {
            return Err(ConfigError::new("max_nodes must be > 0"));
        }
        if self.cleanup_interval_ms == 0 {
            return Err(ConfigError::new("cleanup_interval_ms must be > 0"));
        }
        if self.max_memory_mb == 0 {
            return Err(ConfigError::new("max_memory_mb must be > 0"));
        }
        if self.num_worker_threads == 0 {
            return Err(ConfigError::new("num_worker_threads must be > 0"));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::new("batch_size must be > 0"));
        }
        if self.hash_table_buckets == 0 {
            return Err(ConfigError::new("hash_table_buckets must be > 0"));
        }
        Ok(())
    }

    /// Effective per-bucket heap capacity: the configured value, or
    /// `max_nodes / 10` (minimum 1) when left at `0`.
    pub fn bucket_capacity(&self) -> usize {
        if self.heap_initial_capacity > 0 {
            self.heap_initial_capacity
        } else {
            (self.max_nodes / 10).max(1)
        }
    }

    /// Arena footprint implied by `max_nodes`, in bytes.
    pub fn arena_bytes(&self) -> usize {
        self.max_nodes
            .saturating_mul(std::mem::size_of::<crate::ds::arena::Record>())
    }
}
