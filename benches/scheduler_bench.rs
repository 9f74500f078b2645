//! Daily scheduling cost on a full default league.
//!
//! Run with: `cargo bench --bench scheduler`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use basho::config::LeagueConfig;
use basho::league::LeagueBuilder;
use basho::schedule::{schedule_day, FacedSet};
use basho::sim::Rng;

fn bench_schedule_day(c: &mut Criterion) {
    let config = LeagueConfig::default();
    let league = LeagueBuilder::new(&config).seed(42).build();

    let mut group = c.benchmark_group("schedule");
    group.sample_size(30);

    group.bench_function("day_1", |b| {
        b.iter(|| {
            let mut faced = FacedSet::new();
            let mut rng = Rng::new(42);
            black_box(schedule_day(
                &league.registry,
                &mut faced,
                1,
                &config,
                &mut rng,
            ))
        });
    });

    group.bench_function("full_tournament", |b| {
        b.iter(|| {
            let mut faced = FacedSet::new();
            let mut rng = Rng::new(42);
            for day in 1..=config.tournament_days {
                black_box(schedule_day(
                    &league.registry,
                    &mut faced,
                    day,
                    &config,
                    &mut rng,
                ));
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_schedule_day);
criterion_main!(benches);
