use criterion::{Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::hint::black_box;

use databall::ratings::{MinutesUnit, compute_derived_stats};
use databall::season::{SeasonOptions, season_ratings};
use databall::stat_name::StatName;
use databall::synthetic::{LeagueConfig, SyntheticLeague, generate_league};
use databall::windowed::{WindowOptions, compute_windowed_features};

fn full_league() -> SyntheticLeague {
    let mut rng = StdRng::seed_from_u64(1);
    let config = LeagueConfig {
        teams: 30,
        first_season: 2010,
        seasons: 3,
        rounds: 1,
    };
    generate_league(&config, &mut rng)
}

fn bench_derived_stats(c: &mut Criterion) {
    let records = full_league().records();
    c.bench_function("derived_stats", |b| {
        b.iter(|| {
            let derived = compute_derived_stats(black_box(&records), MinutesUnit::Infer);
            black_box(derived.len());
        })
    });
}

fn bench_windowed_features(c: &mut Criterion) {
    let records = full_league().records();
    let derived = compute_derived_stats(&records, MinutesUnit::Infer);
    let names = StatName::default_features();
    let rolling = WindowOptions::rolling(10).expect("positive window");

    c.bench_function("windowed_expanding", |b| {
        b.iter(|| {
            let table = compute_windowed_features(
                black_box(&derived),
                &names,
                &WindowOptions::expanding(),
            )
            .unwrap();
            black_box(table.len());
        })
    });
    c.bench_function("windowed_rolling_10", |b| {
        b.iter(|| {
            let table = compute_windowed_features(black_box(&derived), &names, &rolling).unwrap();
            black_box(table.len());
        })
    });
}

fn bench_season_ratings(c: &mut Criterion) {
    let records = full_league().records();
    c.bench_function("season_ratings", |b| {
        b.iter(|| {
            let out = season_ratings(black_box(&records), SeasonOptions::default()).unwrap();
            black_box(out.len());
        })
    });
}

criterion_group!(
    perf,
    bench_derived_stats,
    bench_windowed_features,
    bench_season_ratings
);
criterion_main!(perf);
