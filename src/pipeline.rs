//! End-to-end analysis: reduce, impute, cluster and model.

use crate::config::AnalysisConfig;
use crate::core::error::{Result, WalsError};
use crate::dataset::WalsData;
use crate::geo::{cluster_sample, RegionNames, Regions};
use crate::origins::{OriginDataset, OriginReport, OriginTable};
use crate::sampling::{DensityReducer, Sample, SampleOptions, SampleSummary};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// File name of the logistic model report
pub const LOGISTIC_REPORT: &str = "logistic.csv";
/// File name of the linear model report
pub const LINEAR_REPORT: &str = "linear.csv";
/// File name of the sample summary
pub const SAMPLE_REPORT: &str = "sample.json";

/// Everything one analysis run produces.
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    /// Imputed sample without redundant features
    pub sample: Sample,
    /// Region of every sampled language
    pub regions: Regions,
    /// Logistic models of one-hot columns
    pub logistic: OriginReport,
    /// Ridge models of ordinal columns
    pub linear: OriginReport,
}

#[derive(Serialize)]
struct SampleReport<'a> {
    sample: SampleSummary,
    regions: &'a Regions,
}

impl AnalysisOutput {
    /// Write `logistic.csv`, `linear.csv` and `sample.json` into `dir`,
    /// creating it if needed.
    pub fn write<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        self.logistic.write_csv(dir.join(LOGISTIC_REPORT))?;
        self.linear.write_csv(dir.join(LINEAR_REPORT))?;

        let report = SampleReport {
            sample: self.sample.summary(),
            regions: &self.regions,
        };
        fs::write(dir.join(SAMPLE_REPORT), serde_json::to_string_pretty(&report)?)?;
        log::info!("Reports written to {}", dir.display());
        Ok(())
    }
}

/// Run the whole analysis on loaded tables.
pub fn run_analysis(config: &AnalysisConfig, data: Arc<WalsData>) -> Result<AnalysisOutput> {
    config.validate()?;
    let options = SampleOptions::from_config(config)?;
    let treatment = Arc::clone(&options.treatment);

    let reducer = DensityReducer::new(config.reduction.clone())?;
    let sample = Sample::reduced(data, &reducer, options)?.drop_redundant()?;

    let regions = cluster_sample(&sample, &config.clustering, &RegionNames::default())?;
    let origins = OriginTable::from_sample(&sample, &regions)?;
    let processed = sample
        .processed()
        .ok_or_else(|| WalsError::not_fitted("sample imputation"))?;
    let dataset = OriginDataset::new(&processed.imputed, origins, config.origins.clone())?
        .with_names(treatment);

    let cv = config.origins.cross_validate;
    let logistic = dataset.full_logistic_model(cv)?;
    let linear = dataset.full_linear_model(cv)?;

    Ok(AnalysisOutput {
        sample,
        regions,
        logistic,
        linear,
    })
}
