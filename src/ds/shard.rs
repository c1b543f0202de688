//! Shard selection for the key index.
//!
//! Maps a key's UTF-8 bytes to a shard in `[0, shards)` with 64-bit FNV-1a.
//! The hash is part of the index contract (the same key must land on the
//! same shard for the lifetime of the cache), so this is a fixed function
//! rather than a pluggable `Hasher`.
//!
//! ## Architecture
//!
//! ```text
//!   "AAPL" ──FNV-1a──▶ 0x…hash ──% shards──▶ shard index
//!
//!   ┌─────────┬─────────┬───┬─────────┐
//!   │ shard 0 │ shard 1 │ … │ shard 63│
//!   │ keys    │ keys    │   │ keys    │
//!   └─────────┴─────────┴───┴─────────┘
//! ```
//!
//! Properties
//! ──────────
//! • Deterministic: same key always yields the same shard
//! • Uniform enough for short symbol-style keys at 64 shards
//!
//! ## Performance
//!
//! - `shard_for_key`: O(len(key)), one multiply + xor per byte

const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

/// 64-bit FNV-1a over a byte slice.
#[inline]
pub fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for &byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Deterministic shard selector over FNV-1a.
///
/// Maps any string key to a shard index in `[0, shards)`. The same
/// `(key, shards)` pair always produces the same result.
///
/// # Example
///
/// ```
/// use priokit::ds::ShardSelector;
///
/// let selector = ShardSelector::new(64);
///
/// let shard = selector.shard_for_key("AAPL");
/// assert!(shard < 64);
/// assert_eq!(selector.shard_for_key("AAPL"), shard);
/// ```
#[derive(Debug, PartialEq, Eq)]
pub struct ShardSelector {
    shards: usize,
}

impl ShardSelector {
    /// Creates a selector for `shards` shards.
    ///
    /// The shard count is clamped to at least 1.
    pub fn new(shards: usize) -> Self {
        Self {
            shards: shards.max(1),
        }
    }

    /// Returns the number of shards.
    pub fn shard_count(&self) -> usize {
        self.shards
    }

    /// Maps a key to a shard index in `[0, shards)`.
    #[inline]
    pub fn shard_for_key(&self, key: &str) -> usize {
        (fnv1a_64(key.as_bytes()) % self.shards as u64) as usize
    }
}
