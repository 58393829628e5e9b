use criterion::{black_box, criterion_group, criterion_main, Criterion};
use feature_defaults::{FeatureStat, FeatureStats};
use feature_engine::schema::{ENGINE_FEATURES, HYDRAULICS_FEATURES};
use feature_engine::{assemble_hydraulics, impute_row, FeaturePayload, HydraulicsReadings, RandomJitter};

fn stats_for(features: &[&str]) -> FeatureStats {
    features
        .iter()
        .map(|f| (f.to_string(), FeatureStat::new(0.0, 50.0, 100.0)))
        .collect()
}

fn bench_impute_engine(c: &mut Criterion) {
    let stats = stats_for(&ENGINE_FEATURES);
    let payload = FeaturePayload::from([
        ("op_setting_1".to_string(), 1.0),
        ("sensor_4".to_string(), 500.0),
        ("sensor_11".to_string(), 47.0),
    ]);

    c.bench_function("impute_engine_row", |b| {
        b.iter(|| impute_row(black_box(&ENGINE_FEATURES[..]), black_box(&payload), &stats))
    });
}

fn bench_hydraulics(c: &mut Criterion) {
    let stats = stats_for(&HYDRAULICS_FEATURES);
    let readings = HydraulicsReadings {
        ps6_mean: 2600.0,
        ps5_mean: 2400.0,
        ce_mean: 30.0,
        ts4_mean: 40.0,
        ts2_mean: 50.0,
        ts1_mean: 45.0,
        cp_mean: 2.0,
        ts3_mean: 45.0,
    };
    let mut jitter = RandomJitter::seeded(1);

    c.bench_function("assemble_hydraulics", |b| {
        b.iter(|| assemble_hydraulics(black_box(&readings), &stats, &mut jitter))
    });
}

criterion_group!(benches, bench_impute_engine, bench_hydraulics);
criterion_main!(benches);
