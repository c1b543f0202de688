//! Priority cache facade.
//!
//! [`PriorityCache`] composes the arena, the key index, and the per-key
//! priority heaps into the public insert / retrieve / batch API, and owns
//! the background reclamation worker.
//!
//! ## Data flow
//!
//! ```text
//!   insert(value, key, priority, ttl)
//!     │ 1. arena.claim()              CapacityExhausted → false
//!     │ 2. arena.write(slot, …)       stamps created_ns
//!     │ 3. index.get_or_create(key)
//!     └ 4. bucket.push(slot)          BucketFull → false (slot consumed)
//!
//!   get_highest_priority(key)
//!     │ 1. index.get(key)             miss → None
//!     └ 2. bucket.pop() loop          expired → reclaim queue, continue
//!                                     live    → Some(record)
//! ```
//!
//! ## Contract notes
//!
//! - Steady-state failures are `false`/`None`, never panics or `Err`.
//! - A `push` failure consumes the claimed slot; recycling it would put
//!   reclamation on the wait-free insert path.
//! - There is no happens-before from a concurrent insert to a retrieval:
//!   a reader may miss a record whose sift has not completed, or see an
//!   older lower-priority one. Quiescent reads observe everything.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::clock;
use crate::config::CacheConfig;
use crate::ds::arena::{NodeArena, Record, SlotId};
use crate::ds::index::KeyIndex;
use crate::error::{BuildError, ErrorKind, Severity};
use crate::reclaim::{ReclaimQueue, Reclaimer};
use crate::traits::{ErrorReporter, MetricsSink};

/// One item of an [`insert_batch`](PriorityCache::insert_batch) call.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    pub value: f64,
    pub key: String,
    pub priority: i32,
    pub ttl_seconds: f64,
}

impl BatchItem {
    pub fn new(value: f64, key: impl Into<String>, priority: i32, ttl_seconds: f64) -> Self {
        Self {
            value,
            key: key.into(),
            priority,
            ttl_seconds,
        }
    }
}

/// Concurrent in-memory priority cache keyed by midpoint symbols.
///
/// Any number of threads may call any operation concurrently; the insert
/// and retrieve hot paths take no locks.
///
/// # Example
///
/// ```
/// use priokit::cache::PriorityCache;
/// use priokit::config::CacheConfig;
///
/// let cache = PriorityCache::new(CacheConfig::default()).unwrap();
///
/// cache.insert(100.0, "AAPL", 1, 60.0);
/// cache.insert(101.0, "AAPL", 3, 60.0);
///
/// let best = cache.get_highest_priority("AAPL").unwrap();
/// assert_eq!(best.priority(), 3);
/// assert_eq!(best.value(), 101.0);
/// ```
pub struct PriorityCache {
    config: CacheConfig,
    arena: NodeArena,
    index: KeyIndex,
    /// Lifetime insert counter. Advisory: never decremented on expiry or
    /// pop, may transiently overshoot under concurrent batch pre-checks.
    total_nodes: AtomicUsize,
    reclaim: Arc<ReclaimQueue>,
    reclaimer: Mutex<Option<Reclaimer>>,
    metrics: Option<Arc<dyn MetricsSink>>,
    reporter: Option<Arc<dyn ErrorReporter>>,
}

impl PriorityCache {
    /// Builds a cache from `config` with no collaborators attached.
    ///
    /// Fails fast on invalid configuration or refused allocations; these
    /// are the only fatal errors the cache ever surfaces.
    pub fn new(config: CacheConfig) -> Result<Self, BuildError> {
        Self::with_collaborators(config, None, None)
    }

    pub(crate) fn with_collaborators(
        config: CacheConfig,
        metrics: Option<Arc<dyn MetricsSink>>,
        reporter: Option<Arc<dyn ErrorReporter>>,
    ) -> Result<Self, BuildError> {
        config.validate()?;
        let budget_bytes = config.max_memory_mb.saturating_mul(1024 * 1024);
        if config.arena_bytes() > budget_bytes {
            return Err(BuildError::InvalidConfig(crate::error::ConfigError::new(
                format!(
                    "arena of {} nodes ({} bytes) exceeds max_memory_mb = {}",
                    config.max_nodes,
                    config.arena_bytes(),
                    config.max_memory_mb
                ),
            )));
        }

        let arena = NodeArena::try_new(config.max_nodes)?;
        let index = KeyIndex::new(config.bucket_capacity());
        let reclaim = Arc::new(ReclaimQueue::new());
        let reclaimer = Reclaimer::spawn(
            Arc::clone(&reclaim),
            config.cleanup_interval_ms,
            config.max_expired_per_cleanup,
        )
        .map_err(|err| BuildError::AllocationFailure(format!("reclaim worker: {err}")))?;

        Ok(Self {
            config,
            arena,
            index,
            total_nodes: AtomicUsize::new(0),
            reclaim,
            reclaimer: Mutex::new(Some(reclaimer)),
            metrics,
            reporter,
        })
    }

    /// Inserts a record under `key`. Returns `false` when the arena is
    /// exhausted or the key's bucket is full; never blocks.
    ///
    /// A bucket-full failure still consumes the claimed arena slot.
    pub fn insert(&self, value: f64, key: &str, priority: i32, ttl_seconds: f64) -> bool {
        let start = clock::now_ns();
        let success = self.insert_inner(value, key, priority, ttl_seconds);
        if let Some(sink) = &self.metrics {
            sink.record_insert(clock::now_ns().saturating_sub(start), success);
        }
        success
    }

    /// [`insert`](Self::insert) with the configured `default_expiry_seconds`.
    pub fn insert_with_default_ttl(&self, value: f64, key: &str, priority: i32) -> bool {
        self.insert(value, key, priority, self.config.default_expiry_seconds)
    }

    fn insert_inner(&self, value: f64, key: &str, priority: i32, ttl_seconds: f64) -> bool {
        let Some(slot) = self.arena.claim() else {
            self.report(
                ErrorKind::CapacityExhausted,
                Severity::Medium,
                "arena has no free slot",
                "insert",
            );
            return false;
        };
        // SAFETY: `slot` was just claimed, so this thread is its unique
        // claimant and nothing can observe it before the push below.
        unsafe { self.arena.write(slot, value, priority, ttl_seconds) };

        let bucket = self.index.get_or_create(key);
        if !bucket.push(&self.arena, slot) {
            // The slot stays consumed; see the module-level contract notes.
            self.report(
                ErrorKind::BucketFull,
                Severity::Medium,
                "priority bucket at capacity",
                "insert",
            );
            return false;
        }
        self.total_nodes.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Inserts a batch under one capacity reservation.
    ///
    /// Returns `false` without inserting anything when the advisory insert
    /// count or the arena cannot cover `items.len()` slots (a failed arena
    /// reservation still wastes its range). Once the reservation succeeds
    /// the call returns `true`, and per-item bucket-full failures are
    /// silently swallowed: those records are lost but their slots consumed.
    /// This is record-level best-effort, not all-or-nothing atomicity.
    pub fn insert_batch(&self, items: &[BatchItem]) -> bool {
        let start = clock::now_ns();
        let success = self.insert_batch_inner(items);
        if let Some(sink) = &self.metrics {
            sink.record_batch_insert(
                clock::now_ns().saturating_sub(start),
                items.len(),
                success,
            );
        }
        success
    }

    fn insert_batch_inner(&self, items: &[BatchItem]) -> bool {
        if items.is_empty() {
            return true;
        }
        let advisory = self.total_nodes.load(Ordering::Relaxed);
        if advisory + items.len() > self.config.max_nodes {
            self.report(
                ErrorKind::CapacityExhausted,
                Severity::Medium,
                "batch exceeds remaining capacity",
                "insert_batch",
            );
            return false;
        }
        let Some(range) = self.arena.claim_range(items.len()) else {
            self.report(
                ErrorKind::CapacityExhausted,
                Severity::Medium,
                "arena reservation failed",
                "insert_batch",
            );
            return false;
        };

        for (offset, item) in items.iter().enumerate() {
            let slot = SlotId(range.start + offset);
            // SAFETY: the reserved range is exclusively ours and each slot
            // is written once before its push publishes it.
            unsafe { self.arena.write(slot, item.value, item.priority, item.ttl_seconds) };
            let _ = self.index.get_or_create(&item.key).push(&self.arena, slot);
        }
        self.total_nodes.fetch_add(items.len(), Ordering::Relaxed);
        true
    }

    /// Returns the highest-priority live record for `key`, or `None` when
    /// the key is unknown or its bucket holds only expired records.
    ///
    /// Destructive: the returned record (and any expired record skipped on
    /// the way to it) leaves the cache. Expired slots go to the reclaim
    /// queue. Under concurrent inserts the result is *a* high-priority live
    /// record; see the relaxed-heap contract.
    pub fn get_highest_priority(&self, key: &str) -> Option<Record> {
        let start = clock::now_ns();
        let result = self.retrieve_inner(key);
        if let Some(sink) = &self.metrics {
            sink.record_retrieve(
                clock::now_ns().saturating_sub(start),
                true,
                result.is_some(),
            );
        }
        result
    }

    fn retrieve_inner(&self, key: &str) -> Option<Record> {
        let bucket = self.index.get(key)?;
        while let Some(slot) = bucket.pop(&self.arena) {
            let record = self.arena.read(slot);
            if record.is_expired_at(clock::now_ns()) {
                self.reclaim.retire(slot);
                continue;
            }
            return Some(record);
        }
        None
    }

    /// Pointwise [`get_highest_priority`](Self::get_highest_priority) over
    /// `keys`; results are position-aligned with the input. No cross-key
    /// atomicity.
    pub fn get_highest_priority_batch<S: AsRef<str>>(&self, keys: &[S]) -> Vec<Option<Record>> {
        let start = clock::now_ns();
        let results = keys
            .iter()
            .map(|key| self.retrieve_inner(key.as_ref()))
            .collect();
        if let Some(sink) = &self.metrics {
            sink.record_batch_retrieve(clock::now_ns().saturating_sub(start), keys.len());
        }
        results
    }

    /// Stops and joins the background reclaimer, sweeping its queue.
    /// Idempotent; `Drop` calls it. The data plane stays usable afterwards,
    /// but expired slots popped later are no longer counted as reclaimed.
    pub fn close(&self) {
        if let Some(mut reclaimer) = self.reclaimer.lock().take() {
            reclaimer.stop();
        }
    }

    /// Arena capacity (`max_nodes`).
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Successful inserts over the cache's lifetime. An insert counter,
    /// not a live-record count: it never decreases on expiry or pop.
    pub fn inserted_total(&self) -> usize {
        self.total_nodes.load(Ordering::Relaxed)
    }

    /// Expired slots retired by the background worker (or the close sweep).
    pub fn reclaimed_total(&self) -> u64 {
        self.reclaim.reclaimed_total()
    }

    /// Distinct keys that ever received an insert.
    pub fn key_count(&self) -> usize {
        self.index.len()
    }

    /// The configuration this cache was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn report(&self, kind: ErrorKind, severity: Severity, message: &str, site: &'static str) {
        if let Some(reporter) = &self.reporter {
            reporter.report(kind, severity, message, site);
        }
    }
}

impl Drop for PriorityCache {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for PriorityCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriorityCache")
            .field("capacity", &self.capacity())
            .field("inserted_total", &self.inserted_total())
            .field("key_count", &self.key_count())
            .finish()
    }
}
