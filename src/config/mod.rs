//! Configuration management.
//!
//! [`AnalysisConfig`] gathers one section per pipeline stage. It can be read
//! from TOML or JSON, overridden from `WALS_*` environment variables and
//! assembled in code with [`ConfigBuilder`].

pub mod core;
pub mod sections;

pub use self::core::{AnalysisConfig, ConfigBuilder};
pub use self::sections::{
    ClusteringConfig, DataConfig, EncodingConfig, ImputationConfig, OriginConfig,
    ReductionConfig,
};
