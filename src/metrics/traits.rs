//! Consumption-side metrics traits.
//!
//! Recording happens through [`MetricsSink`](crate::traits::MetricsSink) at
//! the facade boundary; these traits cover the other two responsibilities
//! so recorders stay write-only and consumers stay read-only.

/// Snapshot provider for monitoring, benches, and tests.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Reset metrics between tests or benchmark iterations.
pub trait MetricsReset {
    fn reset_metrics(&self);
}
