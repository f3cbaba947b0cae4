//! Constants and configuration defaults.

use crate::core::types::Code;

/// Marker for a value that is not attested for a language.
pub const MISSING_CODE: Code = -1;

/// Default target density of a reduced sample.
pub const DEFAULT_DENSITY_THRESHOLD: f64 = 0.95;

/// Default number of features dropped per reduction pass.
pub const DEFAULT_FEATURES_TO_DROP: usize = 1;

/// Default number of languages dropped per reduction pass.
pub const DEFAULT_LANGUAGES_TO_DROP: usize = 2;

/// Default number of donors used by the KNN imputer.
pub const DEFAULT_N_NEIGHBORS: usize = 5;

/// Default DBSCAN neighbourhood radius, in radians of great-circle angle.
pub const DEFAULT_CLUSTER_EPS: f64 = 0.12;

/// Default DBSCAN core-point threshold (the point itself included).
pub const DEFAULT_CLUSTER_MIN_SAMPLES: usize = 3;

/// Default fraction of languages held out for testing origin models.
pub const DEFAULT_TEST_FRACTION: f64 = 0.25;

/// Default seed of the train/test split.
pub const DEFAULT_SPLIT_SEED: u64 = 5312;

/// Default seed of the origin models (cross-validation folds).
pub const DEFAULT_MODEL_SEED: u64 = 5364;

/// Default number of cross-validation folds.
pub const DEFAULT_CV_FOLDS: usize = 5;

/// Inverse regularization strengths searched by cross-validated logistic models.
pub const DEFAULT_LOGISTIC_CS: [f64; 7] = [0.2, 0.3, 0.5, 0.8, 1.0, 1.5, 2.0];

/// Ridge penalties searched by cross-validated linear models.
pub const DEFAULT_RIDGE_ALPHAS: [f64; 5] = [0.01, 0.1, 1.0, 10.0, 100.0];

/// Features that can be recovered from other retained features.
///
/// 95A, 96A and 97A cross-tabulate verb-object order with other orders;
/// 143E and 143F are subsumed by the classification in 143A.
pub const REDUNDANT_FEATURES: [&str; 5] = ["95A", "96A", "97A", "143E", "143F"];

/// Crate version
pub const WALS_ORIGINS_VERSION: &str = env!("CARGO_PKG_VERSION");
