//! Compare sequential vs parallel career batches.
//!
//! Run with: `cargo bench --bench career_parallel`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use basho::config::LeagueConfig;
use basho::parallel::{career_seeds, run_careers, run_careers_sequential, WorkerPool};

fn bench_careers_sequential_vs_parallel(c: &mut Criterion) {
    let config = LeagueConfig::default();
    let seeds = career_seeds(42, 8);
    let cycles = 2;

    let mut group = c.benchmark_group("careers");
    group.sample_size(10);
    group.measurement_time(std::time::Duration::from_secs(20));

    group.bench_function("sequential", |b| {
        b.iter(|| black_box(run_careers_sequential(&config, &seeds, cycles)));
    });

    group.bench_function("parallel", |b| {
        let pool = WorkerPool::shared();
        b.iter(|| black_box(run_careers(&config, &seeds, cycles, &pool)));
    });

    group.finish();
}

criterion_group!(benches, bench_careers_sequential_vs_parallel);
criterion_main!(benches);
