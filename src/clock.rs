//! Monotonic nanosecond clock shared by the whole crate.
//!
//! Record timestamps and expiry checks all use the same arbitrary monotonic
//! epoch: the first call to [`now_ns`] anchors a process-wide `Instant`, and
//! every later call reports nanoseconds elapsed since that anchor. The epoch
//! is meaningless across processes; only differences matter.

use std::sync::OnceLock;
use std::time::Instant;

static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Nanoseconds since the process-wide monotonic epoch.
///
/// The first call anchors the epoch, so the earliest observable value is 0.
/// Monotonic: never decreases, unaffected by wall-clock adjustments.
#[inline]
pub fn now_ns() -> u64 {
    EPOCH.get_or_init(Instant::now).elapsed().as_nanos() as u64
}

/// Converts a TTL in seconds to nanoseconds, saturating at `u64::MAX`.
///
/// Negative and NaN inputs clamp to zero (an already-expired record).
#[inline]
pub fn ttl_to_ns(ttl_seconds: f64) -> u64 {
    if ttl_seconds.is_nan() || ttl_seconds <= 0.0 {
        return 0;
    }
    let ns = ttl_seconds * 1e9;
    if ns >= u64::MAX as f64 {
        u64::MAX
    } else {
        ns as u64
    }
}
