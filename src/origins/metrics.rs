//! Scores and rate transforms for origin models.

use crate::core::error::{Result, WalsError};
use ndarray::{Array1, ArrayView1};

const PROB_EPS: f64 = 1e-15;

/// Mean binary cross-entropy of probabilities `prob` for 0/1 labels `y`.
///
/// Probabilities are clipped to `[1e-15, 1 - 1e-15]`.
pub fn log_loss(y: ArrayView1<f64>, prob: ArrayView1<f64>) -> Result<f64> {
    if y.len() != prob.len() {
        return Err(WalsError::dimension_mismatch(
            format!("{} labels", y.len()),
            format!("{} probabilities", prob.len()),
        ));
    }
    if y.is_empty() {
        return Err(WalsError::insufficient_data("log loss of an empty set"));
    }
    let total: f64 = y
        .iter()
        .zip(prob.iter())
        .map(|(&t, &p)| {
            let p = p.clamp(PROB_EPS, 1.0 - PROB_EPS);
            -(t * p.ln() + (1.0 - t) * (1.0 - p).ln())
        })
        .sum();
    Ok(total / y.len() as f64)
}

/// Log loss relative to always predicting the observed base rate:
/// `1 - LL / LL_baseline`.
///
/// A perfect model scores 1 and the baseline scores 0. Labels of a single
/// class have no baseline to compare against and yield
/// [`WalsError::DegenerateTarget`].
pub fn log_odds_vs_baseline(feature: &str, y: ArrayView1<f64>, prob: ArrayView1<f64>) -> Result<f64> {
    let n = y.len();
    let positives = y.iter().filter(|&&t| t == 1.0).count();
    if n == 0 || positives == 0 || positives == n {
        return Err(WalsError::degenerate_target(
            feature,
            "evaluation labels contain a single class",
        ));
    }
    let rate = positives as f64 / n as f64;
    let baseline = Array1::from_elem(n, rate);
    let baseline_loss = log_loss(y, baseline.view())?;
    let loss = log_loss(y, prob)?;
    Ok(1.0 - loss / baseline_loss)
}

/// Coefficient of determination.
///
/// A constant target scores 1 when predicted exactly and 0 otherwise.
pub fn r2_score(y: ArrayView1<f64>, pred: ArrayView1<f64>) -> Result<f64> {
    if y.len() != pred.len() {
        return Err(WalsError::dimension_mismatch(
            format!("{} targets", y.len()),
            format!("{} predictions", pred.len()),
        ));
    }
    let mean = y
        .mean()
        .ok_or_else(|| WalsError::insufficient_data("R² of an empty set"))?;
    let ss_res: f64 = y.iter().zip(pred.iter()).map(|(t, p)| (t - p).powi(2)).sum();
    let ss_tot: f64 = y.iter().map(|t| (t - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

/// `p / (1 - p)`
pub fn odds(p: f64) -> f64 {
    p / (1.0 - p)
}

/// Odds of the observed rate over the odds of the innate rate.
pub fn odds_shift(innate: f64, observed: f64) -> f64 {
    odds(observed) / odds(innate)
}
