//! Benchmarks for scoring and prediction.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use faultflow::metrics::Metric;
use faultflow::models::{GradientBooster, Stump};

fn scoring_benchmark(c: &mut Criterion) {
    let y_true: Vec<usize> = (0..10_000).map(|i| usize::from(i % 3 == 0)).collect();
    let y_pred: Vec<usize> = (0..10_000).map(|i| usize::from(i % 2 == 0)).collect();

    c.bench_function("f1_10k", |b| {
        b.iter(|| black_box(Metric::F1.score(&y_true, &y_pred, 1)))
    });

    let model = GradientBooster::from_parts(
        4,
        0.0,
        0.3,
        (0..50)
            .map(|i| Stump {
                feature: i % 4,
                threshold: (i % 10) as f64 / 10.0,
                left: -0.5,
                right: 0.5,
            })
            .collect(),
    );
    let rows: Vec<Vec<f64>> = (0..1_000)
        .map(|i| vec![(i % 7) as f64, (i % 11) as f64, (i % 13) as f64, (i % 17) as f64])
        .collect();

    c.bench_function("predict_1k_rows_50_stumps", |b| {
        b.iter(|| black_box(model.predict(&rows).unwrap()))
    });
}

criterion_group!(benches, scoring_benchmark);
criterion_main!(benches);
