//! Missing-aware conversion and min-max scaling of encoded columns.

use crate::core::constants::MISSING_CODE;
use crate::core::error::{Result, WalsError};
use crate::dataset::LabeledMatrix;
use crate::encoding::EncodedMatrix;
use ndarray::{Array1, Array2, Axis};
use std::collections::BTreeSet;

/// Codes as floats, with the missing marker turned into NaN.
pub fn to_float(encoded: &EncodedMatrix) -> LabeledMatrix<f64> {
    encoded.map(|&code| {
        if code == MISSING_CODE {
            f64::NAN
        } else {
            code as f64
        }
    })
}

/// Drop columns with at most one distinct non-missing value.
///
/// Returns the reduced matrix and the labels that were dropped.
pub fn drop_constant_columns(encoded: &EncodedMatrix) -> (EncodedMatrix, Vec<String>) {
    let mut dropped = Vec::new();
    let kept = encoded.retain_columns(|label, column| {
        let distinct: BTreeSet<i32> = column
            .iter()
            .copied()
            .filter(|&c| c != MISSING_CODE)
            .collect();
        if distinct.len() > 1 {
            true
        } else {
            dropped.push(label.to_string());
            false
        }
    });
    if !dropped.is_empty() {
        log::debug!("Dropped {} constant column(s): {}", dropped.len(), dropped.join(", "));
    }
    (kept, dropped)
}

/// Per-column rescaling to `[0, 1]` that ignores NaN.
#[derive(Debug, Clone, Default)]
pub struct MinMaxScaler {
    min: Option<Array1<f64>>,
    scale: Option<Array1<f64>>,
}

impl MinMaxScaler {
    /// Unfitted scaler
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn per-column minimum and range, skipping NaN.
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self> {
        let mut min = Array1::from_elem(x.ncols(), f64::NAN);
        let mut scale = Array1::from_elem(x.ncols(), 1.0);
        for (j, column) in x.axis_iter(Axis(1)).enumerate() {
            let present = column.iter().copied().filter(|v| !v.is_nan());
            let (lo, hi) = present.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
            if lo.is_finite() {
                min[j] = lo;
                let range = hi - lo;
                scale[j] = if range > 0.0 { 1.0 / range } else { 1.0 };
            }
        }
        self.min = Some(min);
        self.scale = Some(scale);
        Ok(self)
    }

    /// Rescale; NaN stays NaN.
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (min, scale) = match (&self.min, &self.scale) {
            (Some(min), Some(scale)) => (min, scale),
            _ => return Err(WalsError::not_fitted("MinMaxScaler")),
        };
        if x.ncols() != min.len() {
            return Err(WalsError::dimension_mismatch(
                format!("{} columns", min.len()),
                format!("{} columns", x.ncols()),
            ));
        }
        let mut out = x.clone();
        for (j, mut column) in out.axis_iter_mut(Axis(1)).enumerate() {
            column.mapv_inplace(|v| (v - min[j]) * scale[j]);
        }
        Ok(out)
    }

    /// Fit and transform in one step.
    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }

    /// Learned per-column minimum
    pub fn data_min(&self) -> Option<&Array1<f64>> {
        self.min.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn encoded(body: Array2<i32>) -> EncodedMatrix {
        let rows = (0..body.nrows()).map(|i| format!("l{}", i)).collect();
        let cols = (0..body.ncols()).map(|j| format!("c{}", j)).collect();
        LabeledMatrix::new(rows, cols, body).unwrap()
    }

    #[test]
    fn test_to_float() {
        let m = to_float(&encoded(array![[1, -1], [0, 3]]));
        assert_eq!(m.values()[[0, 0]], 1.0);
        assert!(m.values()[[0, 1]].is_nan());
        assert_eq!(m.values()[[1, 1]], 3.0);
    }

    #[test]
    fn test_drop_constant_columns() {
        let m = encoded(array![[1, 0, -1, 2], [1, 1, -1, -1], [-1, 0, -1, 2]]);
        let (kept, dropped) = drop_constant_columns(&m);
        assert_eq!(kept.col_labels(), &["c1"]);
        assert_eq!(dropped, vec!["c0", "c2", "c3"]);
    }

    #[test]
    fn test_min_max_scaler_ignores_nan() {
        let x = array![[1.0, 5.0], [3.0, f64::NAN], [2.0, 5.0]];
        let mut scaler = MinMaxScaler::new();
        let out = scaler.fit_transform(&x).unwrap();
        assert_abs_diff_eq!(out[[0, 0]], 0.0);
        assert_abs_diff_eq!(out[[1, 0]], 1.0);
        assert_abs_diff_eq!(out[[2, 0]], 0.5);
        assert_abs_diff_eq!(out[[0, 1]], 0.0);
        assert!(out[[1, 1]].is_nan());
    }

    #[test]
    fn test_scaler_errors() {
        let scaler = MinMaxScaler::new();
        assert!(matches!(
            scaler.transform(&array![[1.0]]),
            Err(WalsError::NotFitted { .. })
        ));

        let mut scaler = MinMaxScaler::new();
        scaler.fit(&array![[1.0, 2.0]]).unwrap();
        assert!(scaler.transform(&array![[1.0]]).is_err());
    }
}
