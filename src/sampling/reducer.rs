//! Density-driven reduction of a presence matrix.
//!
//! The reducer repeatedly removes the least-covered features and languages
//! until the fraction of present cells reaches a target. Each pass computes
//! column and row coverage of the current submatrix, takes the `n`-th lowest
//! coverage as a cutoff and drops everything at or below it. Ties at the
//! cutoff go together, so a pass may remove more than `n` items. Rows and
//! columns are chosen from the same pre-removal sums and removed at once.

use crate::config::ReductionConfig;
use crate::core::error::{Result, WalsError};
use crate::dataset::PresenceMatrix;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// State after one reduction pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReductionStep {
    /// 1-based pass number
    pub iteration: usize,
    /// Languages left
    pub languages: usize,
    /// Features left
    pub features: usize,
    /// Density after the pass
    pub density: f64,
}

/// Diagnostics of a reduction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReductionReport {
    /// Density of the input
    pub initial_density: f64,
    /// Input dimensions `(languages, features)`
    pub initial_dim: (usize, usize),
    /// Density reached
    pub final_density: f64,
    /// Output dimensions `(languages, features)`
    pub final_dim: (usize, usize),
    /// Density of the same-sized top-left block of the coverage-sorted input
    pub naive_density: f64,
    /// One entry per pass
    pub history: Vec<ReductionStep>,
}

impl ReductionReport {
    /// Number of passes performed
    pub fn iterations(&self) -> usize {
        self.history.len()
    }
}

/// Result of a reduction: the dense submatrix and how it was reached.
#[derive(Debug, Clone)]
pub struct Reduction {
    /// Surviving languages and features
    pub matrix: PresenceMatrix,
    /// Diagnostics
    pub report: ReductionReport,
}

/// Greedy density-driven reducer.
#[derive(Debug, Clone)]
pub struct DensityReducer {
    config: ReductionConfig,
}

impl DensityReducer {
    /// Create a reducer, validating the configuration.
    pub fn new(config: ReductionConfig) -> Result<Self> {
        config.validate()?;
        Ok(DensityReducer { config })
    }

    /// Configuration in use
    pub fn config(&self) -> &ReductionConfig {
        &self.config
    }

    /// Reduce `matrix` until its density reaches the threshold.
    ///
    /// Fails with [`WalsError::InsufficientData`] when the matrix is empty,
    /// when a drop count reaches the number of remaining rows or columns,
    /// or when a pass would leave nothing behind.
    pub fn reduce(&self, matrix: &PresenceMatrix) -> Result<Reduction> {
        let sorted = matrix.sort_by_coverage();
        let input = if self.config.sort_by_coverage {
            &sorted
        } else {
            matrix
        };
        let initial_density = input
            .density()
            .ok_or_else(|| WalsError::insufficient_data("presence matrix is empty"))?;

        let threshold = self.config.density_threshold;
        let mut current = input.clone();
        let mut density = initial_density;
        let mut history = Vec::new();
        let mut iteration = 1;

        while density < threshold {
            let (nrows, ncols) = current.dim();
            if self.config.n_features_to_drop >= ncols {
                return Err(WalsError::insufficient_data(format!(
                    "cannot drop {} of {} remaining features at density {:.3}",
                    self.config.n_features_to_drop, ncols, density
                )));
            }
            if self.config.n_languages_to_drop >= nrows {
                return Err(WalsError::insufficient_data(format!(
                    "cannot drop {} of {} remaining languages at density {:.3}",
                    self.config.n_languages_to_drop, nrows, density
                )));
            }

            let cols = survivors(&current.column_coverage(), self.config.n_features_to_drop);
            let rows = survivors(&current.row_coverage(), self.config.n_languages_to_drop);
            if cols.is_empty() || rows.is_empty() {
                return Err(WalsError::insufficient_data(format!(
                    "pass {} would remove every {} at density {:.3}",
                    iteration,
                    if cols.is_empty() { "feature" } else { "language" },
                    density
                )));
            }

            current = current.select(&rows, &cols);
            density = current
                .density()
                .ok_or_else(|| WalsError::insufficient_data("reduction emptied the matrix"))?;
            let step = ReductionStep {
                iteration,
                languages: current.nrows(),
                features: current.ncols(),
                density,
            };
            log::debug!(
                "Iteration {}: {} languages x {} features, density {:.1}%",
                step.iteration,
                step.languages,
                step.features,
                step.density * 100.0
            );
            if iteration % 5 == 0 || density >= threshold {
                log::info!("Iteration {}: reached density {:.1}%", iteration, density * 100.0);
            }
            history.push(step);
            iteration += 1;
        }

        let (languages, features) = current.dim();
        let naive_rows: Vec<usize> = (0..languages).collect();
        let naive_cols: Vec<usize> = (0..features).collect();
        let naive_density = sorted
            .select(&naive_rows, &naive_cols)
            .density()
            .unwrap_or(0.0);
        log::info!("Kept {} languages and {} features", languages, features);
        log::info!(
            "The naive approach would have a density of {:.1}%",
            naive_density * 100.0
        );

        let report = ReductionReport {
            initial_density,
            initial_dim: input.dim(),
            final_density: density,
            final_dim: (languages, features),
            naive_density,
            history,
        };
        Ok(Reduction {
            matrix: current,
            report,
        })
    }
}

/// Positions whose coverage lies strictly above the `n`-th lowest value.
fn survivors(coverage: &Array1<usize>, n: usize) -> Vec<usize> {
    let mut ascending = coverage.to_vec();
    ascending.sort_unstable();
    let cutoff = ascending[n - 1];
    coverage
        .iter()
        .enumerate()
        .filter(|&(_, &c)| c > cutoff)
        .map(|(i, _)| i)
        .collect()
}
