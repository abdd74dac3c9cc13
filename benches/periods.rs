//! Periodicity benchmark: dominant-gap estimation and hyper-period reduction.

use can_hyper::period::{compute_hyper_period, estimate_period};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_estimate_period(c: &mut Criterion) {
    // 10 ms period with ±0.2 ms deterministic jitter
    let ts: Vec<f64> = (0..10_000)
        .map(|i| i as f64 * 0.01 + ((i * 7919) % 5) as f64 * 0.0001 - 0.0002)
        .collect();

    c.bench_function("estimate_period_10k", |b| {
        b.iter(|| estimate_period(black_box(&ts), black_box(0.0001)))
    });
}

fn bench_hyper_period(c: &mut Criterion) {
    let periods: Vec<Option<f64>> = (0..45).map(|i| Some(0.010 + 0.005 * (i % 10) as f64)).collect();

    c.bench_function("hyper_period_45_ids", |b| {
        b.iter(|| compute_hyper_period(black_box(periods.iter().copied()), 0.0001, 5.0).unwrap())
    });
}

criterion_group!(benches, bench_estimate_period, bench_hyper_period);
criterion_main!(benches);
