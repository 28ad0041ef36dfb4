use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use taskpool::pool::ThreadPool;
use std::hint::black_box;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn started_pool(workers: usize) -> ThreadPool {
    let mut pool = ThreadPool::new();
    pool.init(workers);
    pool.start();
    pool
}

// Benchmark 1: submit + handle-wait overhead
fn bench_submit_overhead(c: &mut Criterion) {
    let mut group = c.benchmark_group("submit_overhead");

    for size in [100usize, 1_000, 10_000] {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(
            BenchmarkId::new("with_handle", size),
            &size,
            |b, &size| {
                let pool = started_pool(num_cpus::get());
                b.iter(|| {
                    let handles: Vec<_> = (0..size)
                        .map(|i| pool.submit(move || black_box(i)))
                        .collect();
                    for handle in handles {
                        black_box(handle.wait().unwrap());
                    }
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("fire_and_barrier", size),
            &size,
            |b, &size| {
                let pool = started_pool(num_cpus::get());
                b.iter(|| {
                    for i in 0..size {
                        pool.submit(move || {
                            black_box(i);
                        });
                    }
                    assert!(pool.wait_for_all_done(-1));
                });
            },
        );
    }

    group.finish();
}

// Benchmark 2: barrier throughput across worker counts
fn bench_worker_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("worker_scaling");
    const TASKS: usize = 2_000;
    group.throughput(Throughput::Elements(TASKS as u64));

    for workers in [1usize, 2, 4, 8] {
        group.bench_with_input(
            BenchmarkId::from_parameter(workers),
            &workers,
            |b, &workers| {
                let pool = started_pool(workers);
                let counter = Arc::new(AtomicUsize::new(0));
                b.iter(|| {
                    for _ in 0..TASKS {
                        let counter = Arc::clone(&counter);
                        pool.submit(move || {
                            counter.fetch_add(1, Ordering::Relaxed);
                        });
                    }
                    assert!(pool.wait_for_all_done(-1));
                });
            },
        );
    }

    group.finish();
}

// Benchmark 3: lifecycle cost (start + stop of N workers)
fn bench_lifecycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("lifecycle");

    for workers in [1usize, 4, 16] {
        group.bench_with_input(
            BenchmarkId::new("start_stop", workers),
            &workers,
            |b, &workers| {
                b.iter(|| {
                    let mut pool = ThreadPool::new();
                    pool.init(workers);
                    pool.start();
                    pool.stop();
                    black_box(&pool);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_submit_overhead,
    bench_worker_scaling,
    bench_lifecycle
);
criterion_main!(benches);
