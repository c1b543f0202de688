//! Built-in cache metrics (feature `metrics`).
//!
//! Separates *recording*, *snapshotting*, and *reset* responsibilities:
//! [`AtomicCacheMetrics`] records through the facade-boundary
//! [`MetricsSink`](crate::traits::MetricsSink) trait, snapshot consumers
//! read a coherent-enough [`CacheMetricsSnapshot`] via
//! [`MetricsSnapshotProvider`], and bench/test code resets counters between
//! iterations via [`MetricsReset`]. The core cache works identically with
//! this module compiled out.

pub mod metrics_impl;
pub mod snapshot;
pub mod traits;

pub use metrics_impl::AtomicCacheMetrics;
pub use snapshot::CacheMetricsSnapshot;
pub use traits::{MetricsReset, MetricsSnapshotProvider};
