//! Sharded lock-free key → bucket index.
//!
//! A fixed array of [`INDEX_SHARDS`] atomic list heads. Each list node owns
//! one `(key, PriorityHeap)` pair; nodes are prepended with a CAS and never
//! removed until the index drops (append-never-remove). Lookups are
//! read-only traversals.
//!
//! ## Architecture
//!
//! ```text
//!   heads: [AtomicPtr; 64]
//!
//!   shard 17:  head ─▶ ("MSFT", heap) ─▶ ("AAPL", heap) ─▶ null
//!   shard 40:  head ─▶ ("GOOG", heap) ─▶ null
//!
//!   shard = fnv1a_64(key) % 64
//! ```
//!
//! ## Key Concepts
//!
//! - **At most one bucket per key**: creation re-traverses from the current
//!   head before every CAS attempt; a racing creator that loses the CAS
//!   finds the winner's node and drops its own pre-built bucket.
//! - **Stable borrows**: a `&PriorityHeap` handed out lives as long as the
//!   index, because reachable nodes are never unlinked or freed early.
//!
//! ## Performance
//!
//! - `get`: O(keys in shard); lists stay short at the intended key counts
//! - `get_or_create`: same, plus one allocation on the create path

use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};
use std::thread;

use crate::config::INDEX_SHARDS;
use crate::ds::heap::PriorityHeap;
use crate::ds::shard::ShardSelector;

/// One shard-list entry, owning its key and bucket.
struct IndexNode {
    key: String,
    bucket: PriorityHeap,
    next: AtomicPtr<IndexNode>,
}

/// Lock-free map from key to its priority bucket.
///
/// Buckets are created lazily on first insert for a key and live until the
/// index is dropped.
pub struct KeyIndex {
    heads: [AtomicPtr<IndexNode>; INDEX_SHARDS],
    selector: ShardSelector,
    bucket_capacity: usize,
}

impl KeyIndex {
    /// Creates an empty index whose buckets are built with
    /// `bucket_capacity` heap cells.
    pub fn new(bucket_capacity: usize) -> Self {
        Self {
            heads: std::array::from_fn(|_| AtomicPtr::new(ptr::null_mut())),
            selector: ShardSelector::new(INDEX_SHARDS),
            bucket_capacity,
        }
    }

    /// Read-only lookup. Never creates a bucket.
    pub fn get(&self, key: &str) -> Option<&PriorityHeap> {
        let shard = self.selector.shard_for_key(key);
        let mut node = self.heads[shard].load(Ordering::Acquire);
        while !node.is_null() {
            // SAFETY: reachable nodes are published with release stores and
            // stay allocated until the index drops.
            let node_ref = unsafe { &*node };
            if node_ref.key == key {
                return Some(&node_ref.bucket);
            }
            node = node_ref.next.load(Ordering::Acquire);
        }
        None
    }

    /// Returns the bucket for `key`, creating it on first use.
    ///
    /// The create path pre-builds a node, then CAS-prepends it to the shard
    /// head. Before every attempt it re-traverses from the current head; if
    /// a racing writer already inserted this key, the pre-built node is
    /// dropped and the existing bucket returned, so at most one bucket per
    /// key ever becomes reachable.
    pub fn get_or_create(&self, key: &str) -> &PriorityHeap {
        if let Some(bucket) = self.get(key) {
            return bucket;
        }

        let shard = self.selector.shard_for_key(key);
        let new_node = Box::into_raw(Box::new(IndexNode {
            key: key.to_owned(),
            bucket: PriorityHeap::new(self.bucket_capacity),
            next: AtomicPtr::new(ptr::null_mut()),
        }));

        loop {
            let head = self.heads[shard].load(Ordering::Acquire);

            let mut cursor = head;
            while !cursor.is_null() {
                // SAFETY: as in `get`; the traversal never outlives &self.
                let node_ref = unsafe { &*cursor };
                if node_ref.key == key {
                    // Lost the race: this key already has a bucket.
                    // SAFETY: new_node was never published; we still own it.
                    drop(unsafe { Box::from_raw(new_node) });
                    return &node_ref.bucket;
                }
                cursor = node_ref.next.load(Ordering::Acquire);
            }

            // SAFETY: new_node is unpublished, so this store is exclusive.
            unsafe { (*new_node).next.store(head, Ordering::Relaxed) };
            if self.heads[shard]
                .compare_exchange_weak(head, new_node, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                // SAFETY: the node is now reachable and lives until drop.
                return unsafe { &(*new_node).bucket };
            }
            thread::yield_now();
        }
    }

    /// Number of distinct keys with a bucket. O(keys); advisory under
    /// concurrent creation.
    pub fn len(&self) -> usize {
        let mut count = 0;
        for head in &self.heads {
            let mut node = head.load(Ordering::Acquire);
            while !node.is_null() {
                count += 1;
                // SAFETY: as in `get`.
                node = unsafe { &*node }.next.load(Ordering::Acquire);
            }
        }
        count
    }

    /// Whether the index holds no buckets.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for KeyIndex {
    fn drop(&mut self) {
        for head in &self.heads {
            let mut node = head.swap(ptr::null_mut(), Ordering::Relaxed);
            while !node.is_null() {
                // SAFETY: &mut self gives exclusive access; every reachable
                // node was allocated by Box::into_raw and freed nowhere else.
                let boxed = unsafe { Box::from_raw(node) };
                node = boxed.next.load(Ordering::Relaxed);
            }
        }
    }
}

impl std::fmt::Debug for KeyIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyIndex")
            .field("shards", &INDEX_SHARDS)
            .field("bucket_capacity", &self.bucket_capacity)
            .field("len", &self.len())
            .finish()
    }
}
