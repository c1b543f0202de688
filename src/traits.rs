//! # Boundary Collaborator Traits
//!
//! The cache facade observes the outside world through three small traits.
//! The data plane depends on none of them being present: every hook is an
//! `Option<Arc<dyn ...>>` consulted at the facade boundary, never inside
//! the lock-free structures.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────┐
//!   │                     PriorityCache                        │
//!   │                                                          │
//!   │  insert / insert_batch        get_highest_priority(_batch)
//!   │        │                               │                 │
//!   └────────┼───────────────────────────────┼─────────────────┘
//!            ▼                               ▼
//!   ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐
//!   │   MetricsSink   │   │  ErrorReporter  │   │    DiskTier     │
//!   │ latency/success │   │ kind + severity │   │ demote/retrieve │
//!   │   (optional)    │   │   (optional)    │   │  (declared only)│
//!   └─────────────────┘   └─────────────────┘   └─────────────────┘
//! ```
//!
//! ## Design Goals
//! - **Single responsibility**: sinks record, reporters classify, tiers
//!   store. None of them can influence data-plane outcomes.
//! - **Never on the hot path by default**: a cache built without
//!   collaborators performs zero virtual calls per operation.

use crate::ds::arena::Record;
use crate::error::{ErrorKind, Severity};

/// Observer for operation latency and outcomes at the facade boundary.
///
/// Implementations must be cheap and non-blocking; they are invoked inline
/// on insert/retrieve completion. The built-in
/// [`AtomicCacheMetrics`](crate::metrics::AtomicCacheMetrics) (feature
/// `metrics`) is one implementation; production monitoring can supply its
/// own.
pub trait MetricsSink: Send + Sync {
    /// One `insert` completed in `latency_ns`; `success` is its return.
    fn record_insert(&self, latency_ns: u64, success: bool);

    /// One retrieval completed in `latency_ns`. `success` is whether the
    /// operation ran to completion (always true today), `hit` whether a
    /// live record was returned.
    fn record_retrieve(&self, latency_ns: u64, success: bool, hit: bool);

    /// One `insert_batch` of `len` items completed.
    fn record_batch_insert(&self, latency_ns: u64, len: usize, success: bool);

    /// One `get_highest_priority_batch` over `len` keys completed.
    fn record_batch_retrieve(&self, latency_ns: u64, len: usize);
}

/// Receiver for classified error reports from the facade's failure sites.
///
/// Steady-state failures are part of the cache contract (they surface as
/// `false`/`None` to callers); the reporter exists so an operator can see
/// them without the cache logging anything itself.
pub trait ErrorReporter: Send + Sync {
    /// `site` names the reporting operation, e.g. `"insert"`.
    fn report(&self, kind: ErrorKind, severity: Severity, message: &str, site: &'static str);
}

/// Interface to a disk-backed cold tier.
///
/// Declared for the boundary; the in-memory core neither demotes to nor
/// retrieves from a disk tier.
pub trait DiskTier: Send + Sync {
    /// Offers a record for demotion; `true` means the tier accepted it.
    fn try_demote(&self, key: &str, record: &Record) -> bool;

    /// Attempts retrieval of the best record the tier holds for `key`.
    fn try_retrieve(&self, key: &str) -> Option<Record>;
}
