//! Top-level analysis configuration and its builder.

use crate::config::sections::*;
use crate::core::error::{Result, WalsError};
use crate::core::types::{UnknownFeaturePolicy, VerbosityLevel};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration of a full analysis run.
///
/// Every section has defaults, so a configuration file only needs to name
/// what differs from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Input tables
    pub data: DataConfig,
    /// Density-driven reduction
    pub reduction: ReductionConfig,
    /// Feature encoding
    pub encoding: EncodingConfig,
    /// Missing-value imputation
    pub imputation: ImputationConfig,
    /// Geographic clustering
    pub clustering: ClusteringConfig,
    /// Origin models
    pub origins: OriginConfig,
    /// Directory receiving reports
    pub output_dir: PathBuf,
    /// Verbosity level for logging
    pub verbosity: VerbosityLevel,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            data: DataConfig::default(),
            reduction: ReductionConfig::default(),
            encoding: EncodingConfig::default(),
            imputation: ImputationConfig::default(),
            clustering: ClusteringConfig::default(),
            origins: OriginConfig::default(),
            output_dir: PathBuf::from("reports"),
            verbosity: VerbosityLevel::Info,
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.reduction.validate()?;
        self.imputation.validate()?;
        self.clustering.validate()?;
        self.origins.validate()?;
        Ok(())
    }

    /// Load configuration from a `.toml` or `.json` file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: AnalysisConfig = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            _ => {
                return Err(WalsError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a `.toml` or `.json` file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)
                .map_err(|e| WalsError::config(format!("Failed to serialize config: {}", e)))?,
            _ => {
                return Err(WalsError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply `WALS_*` environment variable overrides.
    pub fn apply_environment_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("WALS_DATA_DIR") {
            self.data.dir = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("WALS_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("WALS_DENSITY_THRESHOLD") {
            self.reduction.density_threshold = val
                .parse()
                .map_err(|_| WalsError::config("Invalid WALS_DENSITY_THRESHOLD"))?;
        }
        if let Ok(val) = std::env::var("WALS_TREATMENT_FILE") {
            self.encoding.treatment_file = Some(PathBuf::from(val));
        }
        if let Ok(val) = std::env::var("WALS_VERBOSITY") {
            self.verbosity = match val.as_str() {
                "error" => VerbosityLevel::Error,
                "warning" => VerbosityLevel::Warning,
                "info" => VerbosityLevel::Info,
                "debug" => VerbosityLevel::Debug,
                _ => return Err(WalsError::config("Invalid WALS_VERBOSITY")),
            };
        }
        self.validate()
    }
}

/// Builder for [`AnalysisConfig`].
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: AnalysisConfig,
}

impl ConfigBuilder {
    /// Start from the defaults
    pub fn new() -> Self {
        ConfigBuilder {
            config: AnalysisConfig::default(),
        }
    }

    /// Directory of the input tables
    pub fn data_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.data.dir = dir.into();
        self
    }

    /// Target density of the reduced sample
    pub fn density_threshold(mut self, threshold: f64) -> Self {
        self.config.reduction.density_threshold = threshold;
        self
    }

    /// Drop counts per reduction pass
    pub fn drop_counts(mut self, features: usize, languages: usize) -> Self {
        self.config.reduction.n_features_to_drop = features;
        self.config.reduction.n_languages_to_drop = languages;
        self
    }

    /// Treatment table file
    pub fn treatment_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.encoding.treatment_file = Some(path.into());
        self
    }

    /// Handling of features without a treatment
    pub fn unknown_features(mut self, policy: UnknownFeaturePolicy) -> Self {
        self.config.encoding.unknown_features = policy;
        self
    }

    /// Donors per imputed cell
    pub fn n_neighbors(mut self, n: usize) -> Self {
        self.config.imputation.n_neighbors = n;
        self
    }

    /// DBSCAN parameters
    pub fn clustering(mut self, eps: f64, min_samples: usize) -> Self {
        self.config.clustering.eps = eps;
        self.config.clustering.min_samples = min_samples;
        self
    }

    /// Cross-validate origin model regularization
    pub fn cross_validate(mut self, enabled: bool) -> Self {
        self.config.origins.cross_validate = enabled;
        self
    }

    /// Report directory
    pub fn output_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// Logging verbosity
    pub fn verbosity(mut self, verbosity: VerbosityLevel) -> Self {
        self.config.verbosity = verbosity;
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<AnalysisConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
