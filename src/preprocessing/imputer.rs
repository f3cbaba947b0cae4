//! K-nearest-neighbour imputation of missing (NaN) cells.
//!
//! Distances between rows use only the coordinates both rows have, scaled up
//! by the share of coordinates that were skipped:
//! `sqrt(total / present * sum_of_squares)`. Rows sharing no coordinate are
//! never neighbours. For every missing cell the donors are the fitted rows
//! that have that column, and the `k` nearest of them are averaged.

use crate::config::ImputationConfig;
use crate::core::error::{Result, WalsError};
use crate::core::types::NeighborWeights;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rayon::prelude::*;

/// Distance over the coordinates present in both rows, or `None` when
/// there are none.
pub fn nan_euclidean(a: ArrayView1<f64>, b: ArrayView1<f64>) -> Option<f64> {
    let total = a.len();
    let mut present = 0usize;
    let mut sum = 0.0;
    for (&x, &y) in a.iter().zip(b.iter()) {
        if x.is_nan() || y.is_nan() {
            continue;
        }
        present += 1;
        sum += (x - y) * (x - y);
    }
    if present == 0 {
        None
    } else {
        Some((total as f64 / present as f64 * sum).sqrt())
    }
}

/// KNN imputer over a float matrix with NaN as the missing marker.
#[derive(Debug, Clone)]
pub struct KnnImputer {
    n_neighbors: usize,
    weights: NeighborWeights,
    donors: Option<Array2<f64>>,
    means: Option<Array1<f64>>,
}

impl KnnImputer {
    /// Unfitted imputer.
    pub fn new(config: &ImputationConfig) -> Result<Self> {
        config.validate()?;
        Ok(KnnImputer {
            n_neighbors: config.n_neighbors,
            weights: config.weights,
            donors: None,
            means: None,
        })
    }

    /// Remember the donor rows and per-column means.
    ///
    /// A column with no value at all cannot be imputed and is rejected.
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self> {
        let mut means = Array1::zeros(x.ncols());
        for (j, column) in x.axis_iter(Axis(1)).enumerate() {
            let (sum, count) = column
                .iter()
                .filter(|v| !v.is_nan())
                .fold((0.0, 0usize), |(s, c), &v| (s + v, c + 1));
            if count == 0 {
                return Err(WalsError::insufficient_data(format!(
                    "column {} has no observed value to impute from",
                    j
                )));
            }
            means[j] = sum / count as f64;
        }
        self.donors = Some(x.clone());
        self.means = Some(means);
        Ok(self)
    }

    /// Fill every NaN in `x` from the fitted donors.
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (donors, means) = match (&self.donors, &self.means) {
            (Some(donors), Some(means)) => (donors, means),
            _ => return Err(WalsError::not_fitted("KnnImputer")),
        };
        if x.ncols() != donors.ncols() {
            return Err(WalsError::dimension_mismatch(
                format!("{} columns", donors.ncols()),
                format!("{} columns", x.ncols()),
            ));
        }

        let fills: Vec<Vec<(usize, f64)>> = (0..x.nrows())
            .into_par_iter()
            .map(|i| self.impute_row(x.row(i), donors, means))
            .collect();

        let mut out = x.clone();
        let mut filled = 0usize;
        for (i, row_fills) in fills.into_iter().enumerate() {
            for (j, value) in row_fills {
                out[[i, j]] = value;
                filled += 1;
            }
        }
        log::debug!(
            "Imputed {} cell(s) with k={} ({:?} weights)",
            filled,
            self.n_neighbors,
            self.weights
        );
        Ok(out)
    }

    /// Fit and transform in one step.
    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }

    fn impute_row(
        &self,
        row: ArrayView1<f64>,
        donors: &Array2<f64>,
        means: &Array1<f64>,
    ) -> Vec<(usize, f64)> {
        let missing: Vec<usize> = row
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_nan())
            .map(|(j, _)| j)
            .collect();
        if missing.is_empty() {
            return Vec::new();
        }

        let distances: Vec<Option<f64>> = donors
            .axis_iter(Axis(0))
            .map(|donor| nan_euclidean(row, donor))
            .collect();

        missing
            .into_iter()
            .map(|j| {
                let mut candidates: Vec<(f64, f64)> = distances
                    .iter()
                    .zip(donors.column(j).iter())
                    .filter_map(|(d, &v)| match d {
                        Some(d) if !v.is_nan() => Some((*d, v)),
                        _ => None,
                    })
                    .collect();
                if candidates.is_empty() {
                    return (j, means[j]);
                }
                // Stable: equal distances keep donor order.
                candidates.sort_by(|a, b| a.0.total_cmp(&b.0));
                candidates.truncate(self.n_neighbors);
                (j, self.weighted_mean(&candidates))
            })
            .collect()
    }

    fn weighted_mean(&self, neighbours: &[(f64, f64)]) -> f64 {
        match self.weights {
            NeighborWeights::Uniform => {
                neighbours.iter().map(|&(_, v)| v).sum::<f64>() / neighbours.len() as f64
            }
            NeighborWeights::Distance => {
                let exact: Vec<f64> = neighbours
                    .iter()
                    .filter(|&&(d, _)| d == 0.0)
                    .map(|&(_, v)| v)
                    .collect();
                if !exact.is_empty() {
                    return exact.iter().sum::<f64>() / exact.len() as f64;
                }
                let (num, den) = neighbours
                    .iter()
                    .fold((0.0, 0.0), |(num, den), &(d, v)| (num + v / d, den + 1.0 / d));
                num / den
            }
        }
    }
}
