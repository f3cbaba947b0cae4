//! # WALS origins
//!
//! Analysis of the World Atlas of Language Structures (WALS): choose a dense
//! sample of languages and features, encode the categorical feature values
//! into numeric columns, fill the remaining gaps, and measure how much of
//! each feature is explained by language family and geography.
//!
//! ## Pipeline
//!
//! 1. [`dataset`]: read the four CLDF tables and build the language ×
//!    feature presence matrix.
//! 2. [`sampling`]: greedily drop sparse features and languages until the
//!    presence matrix reaches a target density, then assemble a
//!    [`Sample`].
//! 3. [`encoding`]: turn each feature into ordinal or one-hot columns
//!    according to a [`TreatmentTable`].
//! 4. [`preprocessing`]: min-max scale and KNN-impute the encoded values.
//! 5. [`geo`]: cluster languages into regions by location.
//! 6. [`origins`]: fit logistic and ridge models of every column on family
//!    and region.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wals_origins::{Sample, SampleOptions, WalsData};
//!
//! # fn main() -> wals_origins::Result<()> {
//! wals_origins::init();
//! let data = Arc::new(WalsData::load_dir("data/cldf")?);
//! let sample = Sample::of_density(data, 0.95, SampleOptions::wals_default()?)?;
//! println!(
//!     "{} languages x {} features",
//!     sample.language_ids().len(),
//!     sample.feature_ids().len()
//! );
//!
//! let imputed = sample.drop_redundant()?;
//! for (code, name) in imputed.value_names("81A") {
//!     println!("81A {}: {}", code, name);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    non_snake_case,
    non_upper_case_globals
)]

// Core infrastructure module - always available
pub mod core;

// Configuration management module
pub mod config;

// Input tables and labelled matrices
pub mod dataset;

// Density reduction and sample assembly
pub mod sampling;

// Feature encoding
pub mod encoding;

// Scaling and imputation
pub mod preprocessing;

// Geographic clustering
pub mod geo;

// Family and region models
pub mod origins;

// End-to-end analysis
pub mod pipeline;

// Re-export core functionality for convenience
pub use crate::core::{
    constants::*,
    error::{Result, WalsError},
    types::*,
};

// Re-export configuration functionality
pub use config::{AnalysisConfig, ConfigBuilder};

// Re-export dataset functionality
pub use dataset::{LabeledMatrix, PresenceMatrix, ValueMatrix, WalsData};

// Re-export sampling functionality
pub use sampling::{DensityReducer, Reduction, ReductionReport, Sample, SampleOptions};

// Re-export encoding functionality
pub use encoding::{ColumnTransformer, EncodedMatrix, FeatureTreatment, TreatmentTable};

// Re-export preprocessing functionality
pub use preprocessing::{KnnImputer, MinMaxScaler};

// Re-export geographic functionality
pub use geo::{cluster_sample, Dbscan, RegionNames, Regions};

// Re-export origin models
pub use origins::{OriginDataset, OriginReport, OriginResult, OriginTable};

// Re-export the analysis driver
pub use pipeline::{run_analysis, AnalysisOutput};

// Version information
pub use crate::core::constants::WALS_ORIGINS_VERSION as VERSION;

/// Initialize logging at the default verbosity.
///
/// `RUST_LOG` overrides the level. Later calls are no-ops.
pub fn init() {
    crate::core::init_logging(VerbosityLevel::default());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
