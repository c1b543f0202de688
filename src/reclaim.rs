//! Lazy reclamation of expired slots.
//!
//! Retrieval drops expired records instead of returning them; their slot ids
//! land in a [`ReclaimQueue`] and a single background worker retires them on
//! a fixed cadence. Slots live in the arena slab, so "retiring" releases no
//! memory: it removes the id from the pending set and counts it, keeping
//! the double-free hazard of freeing pool-owned records out of the design.
//!
//! The data plane never blocks on the worker: `retire` is one short
//! mutex-protected push, and a missing or stopped worker only means the
//! queue drains at teardown instead.
//!
//! ## Operations
//! - `retire(slot)`: enqueue an expired slot (called from retrieval)
//! - worker: waits `cleanup_interval_ms` on a condvar, drains up to
//!   `max_expired_per_cleanup` slots per cycle
//! - `stop()`: signal, join, then sweep whatever is still queued

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::ds::arena::SlotId;

/// Queue of expired slots awaiting retirement.
#[derive(Debug)]
pub struct ReclaimQueue {
    pending: Mutex<VecDeque<SlotId>>,
    wakeup: Condvar,
    shutdown: AtomicBool,
    reclaimed: AtomicU64,
}

impl ReclaimQueue {
    pub(crate) fn new() -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            wakeup: Condvar::new(),
            shutdown: AtomicBool::new(false),
            reclaimed: AtomicU64::new(0),
        }
    }

    /// Enqueues an expired slot. Called from the retrieval path; the lock
    /// hold is one push, never a wait.
    pub(crate) fn retire(&self, slot: SlotId) {
        self.pending.lock().push_back(slot);
    }

    /// Slots queued but not yet retired.
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    /// Slots retired over the queue's lifetime.
    pub fn reclaimed_total(&self) -> u64 {
        self.reclaimed.load(Ordering::Relaxed)
    }

    /// Retires up to `max` queued slots; returns how many were taken.
    fn drain(&self, max: usize) -> usize {
        let mut pending = self.pending.lock();
        let take = pending.len().min(max);
        // Retirement is discard: the arena slab owns the record memory.
        pending.drain(..take).for_each(drop);
        drop(pending);
        self.reclaimed.fetch_add(take as u64, Ordering::Relaxed);
        take
    }

    fn signal_shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
        self.wakeup.notify_all();
    }
}

/// Handle to the background reclamation worker.
#[derive(Debug)]
pub struct Reclaimer {
    queue: Arc<ReclaimQueue>,
    handle: Option<JoinHandle<()>>,
}

impl Reclaimer {
    /// Spawns the worker. Fails only if the OS refuses a thread.
    pub(crate) fn spawn(
        queue: Arc<ReclaimQueue>,
        cleanup_interval_ms: u64,
        max_per_cycle: usize,
    ) -> std::io::Result<Self> {
        let worker_queue = Arc::clone(&queue);
        let interval = Duration::from_millis(cleanup_interval_ms);
        let handle = std::thread::Builder::new()
            .name("priokit-reclaim".into())
            .spawn(move || {
                loop {
                    {
                        let mut pending = worker_queue.pending.lock();
                        if worker_queue.shutdown.load(Ordering::Acquire) {
                            break;
                        }
                        let _ = worker_queue.wakeup.wait_for(&mut pending, interval);
                    }
                    if worker_queue.shutdown.load(Ordering::Acquire) {
                        break;
                    }
                    worker_queue.drain(max_per_cycle);
                }
            })?;
        Ok(Self {
            queue,
            handle: Some(handle),
        })
    }

    /// Signals the worker, joins it, then sweeps the remaining queue.
    /// Idempotent.
    pub(crate) fn stop(&mut self) {
        self.queue.signal_shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        self.queue.drain(usize::MAX);
    }
}

impl Drop for Reclaimer {
    fn drop(&mut self) {
        self.stop();
    }
}
