//! Table storage benchmark: persist and reload in both formats.

use can_hyper::capture::Identifier;
use can_hyper::features::{FeatureTable, WindowAggregate};
use can_hyper::storage::{load_table, persist, TableFormat};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tempfile::tempdir;

fn make_table(rows: usize) -> FeatureTable {
    FeatureTable::from_aggregates(
        (0..rows)
            .map(|i| WindowAggregate {
                identifier: Identifier::normalize(&format!("{:X}", i % 45)).unwrap(),
                hyper_idx: (i / 45) as i64,
                n_frames: 200,
                mean_gap_ms: 25.0 + (i % 7) as f64 * 0.125,
                std_gap_ms: 0.3,
                util_bits: 200 * 111,
                has_dos: i % 45 == 0,
                has_fuzzy: i % 3 == 0,
                has_imp: i % 45 == 20,
            })
            .collect(),
    )
}

fn bench_persist(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let table = make_table(10_000);

    let mut g = c.benchmark_group("persist_10k_rows");
    for format in [TableFormat::Columnar, TableFormat::Csv] {
        let path = dir.path().join(format!("table.{}", format.extension()));
        g.bench_function(format.to_string().as_str(), |b| {
            b.iter(|| black_box(persist(&table, &path, format)).unwrap())
        });
    }
    g.finish();
}

fn bench_load(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let table = make_table(10_000);
    let saved = persist(&table, &dir.path().join("table.zst"), TableFormat::Columnar).unwrap();

    c.bench_function("load_10k_rows", |b| b.iter(|| black_box(load_table(&saved.path)).unwrap()));
}

criterion_group!(benches, bench_persist, bench_load);
criterion_main!(benches);
