//! Full WALS origins analysis from the command line.
//!
//! Usage: `wals_report [config.toml|config.json]`
//!
//! Without a configuration file the defaults are used. `WALS_*` environment
//! variables override either. Reports land in the configured output
//! directory.

use anyhow::{Context, Result};
use std::sync::Arc;
use wals_origins::core::init_logging;
use wals_origins::pipeline::{LINEAR_REPORT, LOGISTIC_REPORT, SAMPLE_REPORT};
use wals_origins::{run_analysis, AnalysisConfig, WalsData};

fn main() -> Result<()> {
    let mut config = match std::env::args().nth(1) {
        Some(path) => AnalysisConfig::load_from_file(&path)
            .with_context(|| format!("reading configuration {}", path))?,
        None => AnalysisConfig::default(),
    };
    config
        .apply_environment_overrides()
        .context("applying WALS_* overrides")?;
    init_logging(config.verbosity);

    log::info!("wals_report {}", wals_origins::VERSION);
    let data = WalsData::load(&config.data)
        .with_context(|| format!("loading tables from {}", config.data.dir.display()))?;
    let output = run_analysis(&config, Arc::new(data)).context("running analysis")?;

    println!(
        "Sample: {} languages x {} features",
        output.sample.language_ids().len(),
        output.sample.feature_ids().len()
    );
    println!(
        "Regions: {} cluster(s), {} outlier(s)",
        output.regions.clustering.n_clusters, output.regions.clustering.n_noise
    );
    if let Some(best) = output
        .logistic
        .rows()
        .iter()
        .max_by(|a, b| a.test_score.total_cmp(&b.test_score))
    {
        println!("\nBest explained one-hot column:\n{}", best);
    }

    output
        .write(&config.output_dir)
        .with_context(|| format!("writing reports to {}", config.output_dir.display()))?;
    println!(
        "\nWrote {}, {} and {} to {}",
        LOGISTIC_REPORT,
        LINEAR_REPORT,
        SAMPLE_REPORT,
        config.output_dir.display()
    );
    Ok(())
}
