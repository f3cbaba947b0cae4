//! Fundamental data types shared across the crate.

use serde::{Deserialize, Serialize};

/// Raw integer code of a WALS feature value.
///
/// Valid codes run from 1 to the feature's domain size; [`MISSING_CODE`]
/// marks a language with no recorded value.
///
/// [`MISSING_CODE`]: crate::core::constants::MISSING_CODE
pub type Code = i32;

/// Verbosity level for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerbosityLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warning,
    /// Information, warnings, and errors
    Info,
    /// Per-iteration diagnostics
    Debug,
}

impl Default for VerbosityLevel {
    fn default() -> Self {
        VerbosityLevel::Info
    }
}

impl VerbosityLevel {
    /// Maps the verbosity onto a `log` level filter.
    pub fn level_filter(self) -> log::LevelFilter {
        match self {
            VerbosityLevel::Error => log::LevelFilter::Error,
            VerbosityLevel::Warning => log::LevelFilter::Warn,
            VerbosityLevel::Info => log::LevelFilter::Info,
            VerbosityLevel::Debug => log::LevelFilter::Debug,
        }
    }
}

/// What the column dispatcher does with a feature that has no treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownFeaturePolicy {
    /// Leave the feature out of the encoded matrix and log a warning
    Skip,
    /// Fail with [`WalsError::UnknownFeature`](crate::core::error::WalsError::UnknownFeature)
    Error,
}

impl Default for UnknownFeaturePolicy {
    fn default() -> Self {
        UnknownFeaturePolicy::Skip
    }
}

/// Neighbour weighting used by the KNN imputer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborWeights {
    /// Every donor counts the same
    Uniform,
    /// Donors weighted by inverse distance
    Distance,
}

impl Default for NeighborWeights {
    fn default() -> Self {
        NeighborWeights::Distance
    }
}
