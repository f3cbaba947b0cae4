//! Configuration sections, one per pipeline stage.

use crate::core::constants::*;
use crate::core::error::{Result, WalsError};
use crate::core::types::{NeighborWeights, UnknownFeaturePolicy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the four WALS tables live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding the CSV files
    pub dir: PathBuf,
    /// Languages table
    pub languages_file: String,
    /// Features table
    pub parameters_file: String,
    /// Observations table
    pub values_file: String,
    /// Value-code legends
    pub codes_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            dir: PathBuf::from("data"),
            languages_file: "languages.csv".to_string(),
            parameters_file: "parameters.csv".to_string(),
            values_file: "values.csv".to_string(),
            codes_file: "codes.csv".to_string(),
        }
    }
}

/// Parameters of the density-driven reducer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReductionConfig {
    /// Target fraction of present cells, in `(0, 1]`
    pub density_threshold: f64,
    /// Rank of the coverage cutoff among features
    pub n_features_to_drop: usize,
    /// Rank of the coverage cutoff among languages
    pub n_languages_to_drop: usize,
    /// Order rows and columns by descending coverage before reducing
    pub sort_by_coverage: bool,
}

impl Default for ReductionConfig {
    fn default() -> Self {
        ReductionConfig {
            density_threshold: DEFAULT_DENSITY_THRESHOLD,
            n_features_to_drop: DEFAULT_FEATURES_TO_DROP,
            n_languages_to_drop: DEFAULT_LANGUAGES_TO_DROP,
            sort_by_coverage: true,
        }
    }
}

impl ReductionConfig {
    /// Config for a target density with the default drop counts.
    pub fn with_threshold(density_threshold: f64) -> Self {
        ReductionConfig {
            density_threshold,
            ..ReductionConfig::default()
        }
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if !(self.density_threshold > 0.0 && self.density_threshold <= 1.0) {
            return Err(WalsError::invalid_parameter(
                "density_threshold",
                self.density_threshold.to_string(),
                "must be in (0, 1]",
            ));
        }
        if self.n_features_to_drop == 0 {
            return Err(WalsError::invalid_parameter(
                "n_features_to_drop",
                "0",
                "must be at least 1",
            ));
        }
        if self.n_languages_to_drop == 0 {
            return Err(WalsError::invalid_parameter(
                "n_languages_to_drop",
                "0",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Feature encoding options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EncodingConfig {
    /// Treatment table to use instead of the built-in one
    pub treatment_file: Option<PathBuf>,
    /// Handling of features without a treatment
    pub unknown_features: UnknownFeaturePolicy,
}

/// KNN imputation options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImputationConfig {
    /// Number of donors per missing cell
    pub n_neighbors: usize,
    /// Donor weighting
    pub weights: NeighborWeights,
}

impl Default for ImputationConfig {
    fn default() -> Self {
        ImputationConfig {
            n_neighbors: DEFAULT_N_NEIGHBORS,
            weights: NeighborWeights::Distance,
        }
    }
}

impl ImputationConfig {
    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if self.n_neighbors == 0 {
            return Err(WalsError::invalid_parameter(
                "n_neighbors",
                "0",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Geographic clustering options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Neighbourhood radius in radians of great-circle angle
    pub eps: f64,
    /// Points (self included) needed for a core point
    pub min_samples: usize,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        ClusteringConfig {
            eps: DEFAULT_CLUSTER_EPS,
            min_samples: DEFAULT_CLUSTER_MIN_SAMPLES,
        }
    }
}

impl ClusteringConfig {
    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if !(self.eps > 0.0 && self.eps.is_finite()) {
            return Err(WalsError::invalid_parameter(
                "eps",
                self.eps.to_string(),
                "must be positive",
            ));
        }
        if self.min_samples == 0 {
            return Err(WalsError::invalid_parameter(
                "min_samples",
                "0",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Origin model options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OriginConfig {
    /// Fraction of languages held out for testing
    pub test_fraction: f64,
    /// Seed of the train/test split
    pub split_seed: u64,
    /// Seed of the cross-validation folds
    pub model_seed: u64,
    /// Pick regularization by cross-validation
    pub cross_validate: bool,
    /// Folds used by cross-validation
    pub cv_folds: usize,
    /// Candidate inverse regularization strengths for logistic models
    pub logistic_cs: Vec<f64>,
    /// Candidate penalties for ridge models
    pub ridge_alphas: Vec<f64>,
}

impl Default for OriginConfig {
    fn default() -> Self {
        OriginConfig {
            test_fraction: DEFAULT_TEST_FRACTION,
            split_seed: DEFAULT_SPLIT_SEED,
            model_seed: DEFAULT_MODEL_SEED,
            cross_validate: false,
            cv_folds: DEFAULT_CV_FOLDS,
            logistic_cs: DEFAULT_LOGISTIC_CS.to_vec(),
            ridge_alphas: DEFAULT_RIDGE_ALPHAS.to_vec(),
        }
    }
}

impl OriginConfig {
    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(WalsError::invalid_parameter(
                "test_fraction",
                self.test_fraction.to_string(),
                "must be in (0, 1)",
            ));
        }
        if self.cv_folds < 2 {
            return Err(WalsError::invalid_parameter(
                "cv_folds",
                self.cv_folds.to_string(),
                "must be at least 2",
            ));
        }
        if self.logistic_cs.is_empty() || self.logistic_cs.iter().any(|&c| c <= 0.0) {
            return Err(WalsError::invalid_parameter(
                "logistic_cs",
                format!("{:?}", self.logistic_cs),
                "must be a non-empty list of positive values",
            ));
        }
        if self.ridge_alphas.is_empty() || self.ridge_alphas.iter().any(|&a| a <= 0.0) {
            return Err(WalsError::invalid_parameter(
                "ridge_alphas",
                format!("{:?}", self.ridge_alphas),
                "must be a non-empty list of positive values",
            ));
        }
        Ok(())
    }
}
