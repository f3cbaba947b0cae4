use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array2;
use rand::prelude::*;
use wals_origins::config::{ImputationConfig, ReductionConfig};
use wals_origins::{DensityReducer, KnnImputer, LabeledMatrix, PresenceMatrix};

fn create_presence(languages: usize, features: usize) -> PresenceMatrix {
    let mut rng = StdRng::seed_from_u64(42);
    // Coverage falls off with both language and feature rank, as in WALS.
    let values = Array2::from_shape_fn((languages, features), |(i, j)| {
        let p = 0.98 - 0.6 * (i as f64 / languages as f64) - 0.3 * (j as f64 / features as f64);
        rng.gen::<f64>() < p
    });
    let rows = (0..languages).map(|i| format!("l{:04}", i)).collect();
    let cols = (0..features).map(|j| format!("{}A", j + 1)).collect();
    LabeledMatrix::new(rows, cols, values).unwrap()
}

fn create_scaled(n_rows: usize, n_cols: usize) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(7);
    Array2::from_shape_fn((n_rows, n_cols), |_| {
        if rng.gen::<f64>() < 0.1 {
            f64::NAN
        } else {
            rng.gen()
        }
    })
}

fn bench_reduction(c: &mut Criterion) {
    let mut group = c.benchmark_group("reduction");

    for &languages in [500, 2000].iter() {
        let presence = create_presence(languages, 190);
        let reducer = DensityReducer::new(ReductionConfig::with_threshold(0.9)).unwrap();
        group.bench_with_input(
            BenchmarkId::new("reduce", languages),
            &presence,
            |b, presence| b.iter(|| reducer.reduce(black_box(presence)).unwrap()),
        );
    }

    group.finish();
}

fn bench_imputation(c: &mut Criterion) {
    let mut group = c.benchmark_group("imputation");

    for &n_rows in [100, 300].iter() {
        let x = create_scaled(n_rows, 120);
        group.bench_with_input(BenchmarkId::new("knn", n_rows), &x, |b, x| {
            b.iter(|| {
                let mut imputer = KnnImputer::new(&ImputationConfig::default()).unwrap();
                imputer.fit_transform(black_box(x)).unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_reduction, bench_imputation);
criterion_main!(benches);
