// ==============================================
// PRIORITY CACHE CONCURRENCY TESTS (integration)
// ==============================================
//
// Race-heavy tests for the lock-free index, the relaxed heap, and the
// capacity protocol under contention. These loop many iterations and are
// slow, so they sit behind the `concurrency` feature:
//
//   cargo test --features concurrency --test cache_concurrency

#![cfg(feature = "concurrency")]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use priokit::builder::CacheBuilder;
use priokit::cache::{BatchItem, PriorityCache};

fn contended_cache(max_nodes: usize) -> Arc<PriorityCache> {
    Arc::new(
        CacheBuilder::new()
            .max_nodes(max_nodes)
            .cleanup_interval_ms(60_000)
            .heap_initial_capacity(max_nodes)
            .try_build()
            .unwrap(),
    )
}

// ==============================================
// Racing bucket creation
// ==============================================
//
// Many threads inserting under the same brand-new key must converge on a
// single bucket: afterwards, key_count is exactly the distinct key count
// and every record drains back out.

#[test]
fn racing_inserts_on_fresh_keys_create_one_bucket_per_key() {
    const THREADS: usize = 8;
    const ITERATIONS: usize = 200;

    for round in 0..ITERATIONS {
        let cache = contended_cache(64);
        let barrier = Arc::new(Barrier::new(THREADS));

        let mut handles = Vec::new();
        for worker in 0..THREADS {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            handles.push(thread::spawn(move || {
                barrier.wait();
                let key = format!("SYM-{}", round % 3);
                assert!(cache.insert(worker as f64, &key, worker as i32, 60.0));
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.key_count(), 1);
        let key = format!("SYM-{}", round % 3);
        let mut drained = 0;
        while cache.get_highest_priority(&key).is_some() {
            drained += 1;
        }
        assert_eq!(drained, THREADS);
    }
}

// ==============================================
// Mixed insert/retrieve traffic
// ==============================================
//
// Writers and readers share three symbols. Every record a reader observes
// must be live, in-range, and counted at most once overall (pop is
// destructive); the post-race drain accounts for the rest.

#[test]
fn mixed_traffic_never_duplicates_or_fabricates_records() {
    const WRITERS: usize = 4;
    const READERS: usize = 4;
    const PER_WRITER: usize = 250;

    let cache = contended_cache(8 * 1024);
    let barrier = Arc::new(Barrier::new(WRITERS + READERS));
    let retrieved = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for worker in 0..WRITERS {
        let cache = Arc::clone(&cache);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            let mut successes = 0usize;
            for i in 0..PER_WRITER {
                let symbol = ["AAPL", "GOOG", "MSFT"][i % 3];
                if cache.insert((worker * PER_WRITER + i) as f64, symbol, (i % 11) as i32, 60.0)
                {
                    successes += 1;
                }
            }
            successes
        }));
    }

    let mut reader_handles = Vec::new();
    for reader in 0..READERS {
        let cache = Arc::clone(&cache);
        let barrier = Arc::clone(&barrier);
        let retrieved = Arc::clone(&retrieved);
        reader_handles.push(thread::spawn(move || {
            barrier.wait();
            for i in 0..PER_WRITER {
                let symbol = ["AAPL", "GOOG", "MSFT"][(reader + i) % 3];
                if let Some(record) = cache.get_highest_priority(symbol) {
                    assert!((0..=10).contains(&record.priority()));
                    retrieved.fetch_add(1, Ordering::Relaxed);
                }
            }
        }));
    }

    let inserted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    for handle in reader_handles {
        handle.join().unwrap();
    }

    let mut remaining = 0usize;
    for symbol in ["AAPL", "GOOG", "MSFT"] {
        while cache.get_highest_priority(symbol).is_some() {
            remaining += 1;
        }
    }

    // Destructive pops: everything inserted is observed exactly once,
    // either during the race or in the drain.
    assert_eq!(retrieved.load(Ordering::Relaxed) + remaining, inserted);
}

// ==============================================
// Capacity under contention
// ==============================================

#[test]
fn contended_inserts_stop_exactly_at_capacity() {
    const THREADS: usize = 8;
    const CAPACITY: usize = 500;

    let cache = contended_cache(CAPACITY);
    let barrier = Arc::new(Barrier::new(THREADS));

    let mut handles = Vec::new();
    for worker in 0..THREADS {
        let cache = Arc::clone(&cache);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            let key = format!("K{worker}");
            let mut successes = 0usize;
            // Attempt far more than a fair share.
            for i in 0..CAPACITY {
                if cache.insert(i as f64, &key, 0, 60.0) {
                    successes += 1;
                }
            }
            successes
        }));
    }

    let successes: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(successes, CAPACITY);
    assert_eq!(cache.inserted_total(), CAPACITY);
    assert!(!cache.insert(0.0, "K0", 0, 60.0));
}

// ==============================================
// Concurrent batches
// ==============================================
//
// Batch reservations are one fetch-add each, so concurrent batches can
// never oversubscribe the arena even when some reservations fail.

#[test]
fn concurrent_batches_never_oversubscribe_the_arena() {
    const THREADS: usize = 8;
    const BATCH: usize = 100;
    const CAPACITY: usize = 450;

    for _ in 0..20 {
        let cache = contended_cache(CAPACITY);
        let barrier = Arc::new(Barrier::new(THREADS));

        let mut handles = Vec::new();
        for worker in 0..THREADS {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            handles.push(thread::spawn(move || {
                let items: Vec<BatchItem> = (0..BATCH)
                    .map(|i| BatchItem::new(i as f64, format!("B{worker}"), i as i32, 60.0))
                    .collect();
                barrier.wait();
                cache.insert_batch(&items)
            }));
        }

        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&ok| ok)
            .count();

        // At most floor(450 / 100) batches can win a reservation.
        assert!(accepted <= CAPACITY / BATCH);
        assert_eq!(cache.inserted_total(), accepted * BATCH);

        let mut drained = 0usize;
        for worker in 0..THREADS {
            let key = format!("B{worker}");
            while cache.get_highest_priority(&key).is_some() {
                drained += 1;
            }
        }
        assert_eq!(drained, accepted * BATCH);
    }
}
