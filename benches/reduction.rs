//! Reduction benchmarks using criterion.
//!
//! Compares chunked reductions on a shared pool against call-scoped pools.

use chunkpool::{Reducer, WorkerPool};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn bench_transform(c: &mut Criterion) {
    let num_threads = num_cpus::get();
    let pool = WorkerPool::new(num_threads).expect("Pool creation failed");
    let shared = Reducer::with_pool(&pool);
    let scoped = Reducer::new();

    let mut group = c.benchmark_group("transform");
    group.sample_size(20);

    for size in [1_000usize, 100_000, 1_000_000] {
        let data: Vec<u64> = (0..size as u64).collect();

        group.bench_with_input(BenchmarkId::new("shared_pool", size), &data, |b, data| {
            b.iter(|| {
                shared
                    .transform(num_threads, data.as_slice(), |x: &u64| black_box(x.wrapping_mul(31)))
                    .expect("transform failed")
            })
        });

        group.bench_with_input(BenchmarkId::new("scoped_pool", size), &data, |b, data| {
            b.iter(|| {
                scoped
                    .transform(num_threads, data.as_slice(), |x: &u64| black_box(x.wrapping_mul(31)))
                    .expect("transform failed")
            })
        });
    }

    group.finish();
}

fn bench_maximum(c: &mut Criterion) {
    let num_threads = num_cpus::get();
    let pool = WorkerPool::new(num_threads).expect("Pool creation failed");
    let reducer = Reducer::with_pool(&pool);

    let mut group = c.benchmark_group("maximum");
    for threads in [1usize, 2, 4, num_threads] {
        let data: Vec<u64> = (0..500_000u64).map(|x| x.wrapping_mul(2654435761) % 1_000_003).collect();
        group.bench_with_input(BenchmarkId::from_parameter(threads), &data, |b, data| {
            b.iter(|| {
                reducer
                    .maximum(threads, data.as_slice(), |a: &u64, b: &u64| a.cmp(b))
                    .expect("maximum failed")
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_transform, bench_maximum);
criterion_main!(benches);
