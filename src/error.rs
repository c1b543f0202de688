//! Error types for the priokit library.
//!
//! ## Key Components
//!
//! - [`ErrorKind`]: Classification of every failure site on the data plane
//!   and at construction time. Steady-state kinds (`CapacityExhausted`,
//!   `BucketFull`) never surface as `Err`; operations report them through
//!   `false`/`None` returns and, when attached, the
//!   [`ErrorReporter`](crate::traits::ErrorReporter) collaborator.
//! - [`Severity`]: Reporter-facing severity grading.
//! - [`ConfigError`]: Returned when [`CacheConfig`](crate::config::CacheConfig)
//!   validation fails.
//! - [`BuildError`]: Fatal construction-time error returned by
//!   [`PriorityCache::new`](crate::cache::PriorityCache::new) and
//!   [`CacheBuilder::try_build`](crate::builder::CacheBuilder::try_build).
//!
//! ## Example Usage
//!
//! ```
//! use priokit::config::CacheConfig;
//!
//! let bad = CacheConfig {
//!     max_nodes: 0,
//!     ..CacheConfig::default()
//! };
//! assert!(bad.validate().is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// ErrorKind / Severity
// ---------------------------------------------------------------------------

/// Classification of cache failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The arena has no free slot; the pool index reached `max_nodes`.
    CapacityExhausted,
    /// A priority bucket is at its fixed capacity.
    BucketFull,
    /// Configuration failed validation.
    InvalidConfig,
    /// The OS refused memory during construction.
    AllocationFailure,
}

impl ErrorKind {
    /// Short stable name, suitable for metrics labels.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::CapacityExhausted => "capacity_exhausted",
            ErrorKind::BucketFull => "bucket_full",
            ErrorKind::InvalidConfig => "invalid_config",
            ErrorKind::AllocationFailure => "allocation_failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity grading passed to [`ErrorReporter`](crate::traits::ErrorReporter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by [`CacheConfig::validate`](crate::config::CacheConfig::validate)
/// and the builder's `try_build()`. Carries a human-readable description of
/// which parameter failed validation.
///
/// # Example
///
/// ```
/// use priokit::config::CacheConfig;
///
/// let err = CacheConfig { batch_size: 0, ..CacheConfig::default() }
///     .validate()
///     .unwrap_err();
/// assert!(err.to_string().contains("batch_size"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// BuildError
// ---------------------------------------------------------------------------

/// Fatal construction-time error.
///
/// Steady-state operations never return this; only `new`/`try_build` do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Configuration failed [`validate`](crate::config::CacheConfig::validate).
    InvalidConfig(ConfigError),
    /// The allocator refused the arena reservation.
    AllocationFailure(String),
}

impl BuildError {
    /// The taxonomy kind for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BuildError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            BuildError::AllocationFailure(_) => ErrorKind::AllocationFailure,
        }
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::InvalidConfig(err) => write!(f, "invalid configuration: {err}"),
            BuildError::AllocationFailure(msg) => write!(f, "allocation failure: {msg}"),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::InvalidConfig(err) => Some(err),
            BuildError::AllocationFailure(_) => None,
        }
    }
}

impl From<ConfigError> for BuildError {
    fn from(err: ConfigError) -> Self {
        BuildError::InvalidConfig(err)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
