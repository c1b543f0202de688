pub use crate::builder::CacheBuilder;
pub use crate::cache::{BatchItem, PriorityCache};
pub use crate::config::CacheConfig;
pub use crate::ds::Record;
pub use crate::error::{BuildError, ConfigError, ErrorKind, Severity};
pub use crate::traits::{DiskTier, ErrorReporter, MetricsSink};

#[cfg(feature = "metrics")]
pub use crate::metrics::{AtomicCacheMetrics, CacheMetricsSnapshot, MetricsSnapshotProvider};
