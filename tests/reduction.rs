//! Density reduction on generated and fixture presence matrices.

mod common;

use common::*;
use ndarray::Array2;
use proptest::prelude::*;
use std::collections::HashSet;
use wals_origins::config::ReductionConfig;
use wals_origins::{DensityReducer, WalsError};

fn presence_strategy() -> impl Strategy<Value = Array2<bool>> {
    (2usize..14, 2usize..10).prop_flat_map(|(rows, cols)| {
        proptest::collection::vec(prop::bool::weighted(0.7), rows * cols)
            .prop_map(move |cells| Array2::from_shape_vec((rows, cols), cells).unwrap())
    })
}

proptest! {
    #[test]
    fn reduction_reaches_threshold_or_reports_insufficient_data(
        cells in presence_strategy(),
        threshold in 0.3f64..=1.0,
        sort in any::<bool>(),
    ) {
        let matrix = presence(cells);
        let reducer = DensityReducer::new(ReductionConfig {
            density_threshold: threshold,
            n_features_to_drop: 1,
            n_languages_to_drop: 1,
            sort_by_coverage: sort,
        }).unwrap();

        match reducer.reduce(&matrix) {
            Ok(reduction) => {
                let report = &reduction.report;
                prop_assert!(reduction.matrix.density().unwrap() >= threshold);
                prop_assert_eq!(report.final_dim, reduction.matrix.dim());
                prop_assert_eq!(report.initial_dim, matrix.dim());

                let rows: HashSet<&String> = matrix.row_labels().iter().collect();
                let cols: HashSet<&String> = matrix.col_labels().iter().collect();
                prop_assert!(reduction.matrix.row_labels().iter().all(|l| rows.contains(l)));
                prop_assert!(reduction.matrix.col_labels().iter().all(|l| cols.contains(l)));

                let mut previous = matrix.dim();
                for step in &report.history {
                    prop_assert!(step.languages < previous.0);
                    prop_assert!(step.features < previous.1);
                    previous = (step.languages, step.features);
                }
                match report.history.last() {
                    Some(last) => prop_assert!((last.density - report.final_density).abs() < 1e-12),
                    None => prop_assert!(report.initial_density >= threshold),
                }
            }
            Err(err) => {
                let is_insufficient = matches!(err, WalsError::InsufficientData { .. });
                prop_assert!(is_insufficient);
            }
        }
    }
}

#[test]
fn test_fixture_reduction_at_ninety_percent() {
    let data = synthetic_data();
    let matrix = data.presence_matrix().unwrap();
    assert_eq!(matrix.dim(), (NUM_LANGUAGES, 9));

    let reducer = DensityReducer::new(ReductionConfig::with_threshold(0.9)).unwrap();
    let reduction = reducer.reduce(&matrix).unwrap();

    assert_eq!(reduction.matrix.dim(), (65, 7));
    assert_eq!(reduction.report.iterations(), 2);
    assert!(reduction.report.final_density >= 0.9);
    for sparse in SPARSE_FEATURES {
        assert!(!reduction.matrix.contains_column(sparse));
    }
    for feature in ["1A", "81A", "143E"] {
        assert!(reduction.matrix.contains_column(feature));
    }
}

#[test]
fn test_fixture_reduction_to_full_density() {
    let data = synthetic_data();
    let matrix = data.presence_matrix().unwrap();
    let reducer = DensityReducer::new(ReductionConfig::with_threshold(1.0)).unwrap();
    let reduction = reducer.reduce(&matrix).unwrap();

    assert_eq!(reduction.matrix.dim(), (55, 4));
    assert_eq!(reduction.matrix.density(), Some(1.0));
    let mut features = reduction.matrix.col_labels().to_vec();
    features.sort();
    assert_eq!(features, vec!["143E", "81A", "82A", "95A"]);
}

#[test]
fn test_fixture_naive_density_is_not_above_reduced() {
    let data = synthetic_data();
    let matrix = data.presence_matrix().unwrap();
    let reducer = DensityReducer::new(ReductionConfig::with_threshold(0.9)).unwrap();
    let report = reducer.reduce(&matrix).unwrap().report;

    assert!(report.naive_density <= report.final_density);
    assert!(report.initial_density < 0.9);
}
