//! Choosing and assembling samples of languages and features.

pub mod reducer;
pub mod sample;

pub use reducer::{DensityReducer, Reduction, ReductionReport, ReductionStep};
pub use sample::{feature_sort_key, ProcessedValues, Sample, SampleOptions, SampleSummary};
