//! Micro-operation benchmarks for the priority cache.
//!
//! Run with: `cargo bench --bench ops`
//!
//! Measures per-operation latency (nanoseconds) for insert, retrieve, and
//! batch paths. Inserts consume arena capacity, so each timed pass gets a
//! fresh cache and the timer covers only the operation loop.

use std::hint::black_box;
use std::time::{Duration, Instant};

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use rand::{Rng, SeedableRng};

use priokit::builder::CacheBuilder;
use priokit::cache::{BatchItem, PriorityCache};

const OPS: u64 = 10_000;
const BATCH: usize = 100;
const SYMBOLS: [&str; 3] = ["AAPL", "GOOG", "MSFT"];

fn bench_cache(max_nodes: usize) -> PriorityCache {
    CacheBuilder::new()
        .max_nodes(max_nodes)
        .cleanup_interval_ms(60_000)
        .heap_initial_capacity(max_nodes)
        .try_build()
        .unwrap()
}

// ============================================================================
// Insert Latency (ns/op)
// ============================================================================

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_ns");
    group.throughput(Throughput::Elements(OPS));

    group.bench_function("single_key", |b| {
        b.iter_custom(|iters| {
            let mut total = Duration::ZERO;
            for _ in 0..iters {
                let cache = bench_cache(OPS as usize);
                let start = Instant::now();
                for i in 0..OPS {
                    black_box(cache.insert(i as f64, "AAPL", (i % 11) as i32, 60.0));
                }
                total += start.elapsed();
            }
            total
        })
    });

    group.bench_function("spread_keys", |b| {
        b.iter_custom(|iters| {
            let mut total = Duration::ZERO;
            for _ in 0..iters {
                let cache = bench_cache(OPS as usize);
                let start = Instant::now();
                for i in 0..OPS {
                    let symbol = SYMBOLS[(i % 3) as usize];
                    black_box(cache.insert(i as f64, symbol, (i % 11) as i32, 60.0));
                }
                total += start.elapsed();
            }
            total
        })
    });

    group.finish();
}

// ============================================================================
// Retrieve Latency (ns/op)
// ============================================================================

fn bench_retrieve(c: &mut Criterion) {
    let mut group = c.benchmark_group("retrieve_ns");
    group.throughput(Throughput::Elements(OPS));

    // Pops are destructive, so hits prefill inside the timing loop.
    group.bench_function("hit", |b| {
        b.iter_custom(|iters| {
            let mut rng = rand::rngs::StdRng::seed_from_u64(7);
            let mut total = Duration::ZERO;
            for _ in 0..iters {
                let cache = bench_cache(OPS as usize);
                for _ in 0..OPS {
                    let value = rng.gen_range(100.0..200.0);
                    let priority = rng.gen_range(0..=10);
                    cache.insert(value, "AAPL", priority, 60.0);
                }
                let start = Instant::now();
                for _ in 0..OPS {
                    black_box(cache.get_highest_priority("AAPL"));
                }
                total += start.elapsed();
            }
            total
        })
    });

    group.bench_function("miss_unknown_key", |b| {
        b.iter_custom(|iters| {
            let cache = bench_cache(64);
            cache.insert(1.0, "AAPL", 1, 60.0);
            let start = Instant::now();
            for _ in 0..iters {
                for _ in 0..OPS {
                    black_box(cache.get_highest_priority("NOPE"));
                }
            }
            start.elapsed()
        })
    });

    group.finish();
}

// ============================================================================
// Batch Latency (ns/batch)
// ============================================================================

fn bench_batches(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_ns");
    group.throughput(Throughput::Elements(BATCH as u64));

    group.bench_function("insert_batch_100", |b| {
        b.iter_custom(|iters| {
            let mut total = Duration::ZERO;
            for _ in 0..iters {
                let cache = bench_cache(BATCH);
                let items: Vec<BatchItem> = (0..BATCH)
                    .map(|i| BatchItem::new(i as f64, SYMBOLS[i % 3], i as i32, 60.0))
                    .collect();
                let start = Instant::now();
                black_box(cache.insert_batch(&items));
                total += start.elapsed();
            }
            total
        })
    });

    group.bench_function("retrieve_batch_100_keys", |b| {
        b.iter_custom(|iters| {
            let cache = bench_cache(1_024);
            for (i, symbol) in SYMBOLS.iter().enumerate() {
                cache.insert(i as f64, symbol, i as i32, 60.0);
            }
            let keys: Vec<&str> = (0..BATCH).map(|i| SYMBOLS[i % 3]).collect();
            let start = Instant::now();
            for _ in 0..iters {
                // Mostly misses after the first pass; measures the walk.
                black_box(cache.get_highest_priority_batch(&keys));
            }
            start.elapsed()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_insert, bench_retrieve, bench_batches);
criterion_main!(benches);
