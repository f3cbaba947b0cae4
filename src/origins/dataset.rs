//! Languages' origins (family, region) aligned with their feature values,
//! and the models fitted on them.

use crate::config::OriginConfig;
use crate::core::error::{Result, WalsError};
use crate::dataset::LabeledMatrix;
use crate::encoding::TreatmentTable;
use crate::geo::Regions;
use crate::origins::metrics::{log_loss, log_odds_vs_baseline, r2_score};
use crate::origins::models::{sigmoid, LogisticRegression, RidgeRegression};
use crate::origins::report::{OriginReport, OriginResult};
use crate::sampling::Sample;
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Category used for languages without a recorded family.
pub const UNKNOWN_FAMILY: &str = "Unknown";

/// Categorical origin columns of a set of languages.
#[derive(Debug, Clone, PartialEq)]
pub struct OriginTable {
    language_ids: Vec<String>,
    columns: Vec<String>,
    values: Vec<Vec<String>>,
    categories: Vec<Vec<String>>,
}

impl OriginTable {
    /// Table of `values[language][column]`; each column's categories are
    /// its distinct values in sorted order.
    pub fn new(language_ids: Vec<String>, columns: Vec<String>, values: Vec<Vec<String>>) -> Result<Self> {
        if values.len() != language_ids.len() {
            return Err(WalsError::dimension_mismatch(
                format!("{} rows", language_ids.len()),
                format!("{} rows", values.len()),
            ));
        }
        if let Some(row) = values.iter().find(|row| row.len() != columns.len()) {
            return Err(WalsError::dimension_mismatch(
                format!("{} origin columns", columns.len()),
                format!("{} origin columns", row.len()),
            ));
        }
        let categories = (0..columns.len())
            .map(|c| {
                values
                    .iter()
                    .map(|row| row[c].clone())
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect()
            })
            .collect();
        Ok(OriginTable {
            language_ids,
            columns,
            values,
            categories,
        })
    }

    /// Replace the category lists; values outside them encode as all zeros.
    pub fn with_categories(mut self, categories: Vec<Vec<String>>) -> Result<Self> {
        if categories.len() != self.columns.len() {
            return Err(WalsError::dimension_mismatch(
                format!("{} category lists", self.columns.len()),
                format!("{} category lists", categories.len()),
            ));
        }
        self.categories = categories;
        Ok(self)
    }

    /// Family and geographic region of every language of `sample`.
    pub fn from_sample(sample: &Sample, regions: &Regions) -> Result<Self> {
        let families: HashMap<&str, &str> = sample
            .languages()
            .iter()
            .map(|l| (l.id.as_str(), l.family.as_deref().unwrap_or(UNKNOWN_FAMILY)))
            .collect();
        let values = sample
            .language_ids()
            .iter()
            .map(|id| {
                let region = regions.region_of(id).ok_or_else(|| {
                    WalsError::data_loading(format!("language {} has no region", id))
                })?;
                let family = families.get(id.as_str()).copied().unwrap_or(UNKNOWN_FAMILY);
                Ok(vec![family.to_string(), region.to_string()])
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(
            sample.language_ids().to_vec(),
            vec!["family".to_string(), "region".to_string()],
            values,
        )
    }

    /// Language codes in row order
    pub fn language_ids(&self) -> &[String] {
        &self.language_ids
    }

    /// Origin column names
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Category list of each column
    pub fn categories(&self) -> &[Vec<String>] {
        &self.categories
    }

    /// Number of languages
    pub fn len(&self) -> usize {
        self.language_ids.len()
    }

    /// True when there are no languages
    pub fn is_empty(&self) -> bool {
        self.language_ids.is_empty()
    }

    /// Names of the one-hot design columns: every category of every column.
    pub fn coefficient_names(&self) -> Vec<String> {
        self.categories.iter().flatten().cloned().collect()
    }

    /// One-hot design matrix of the given rows.
    pub fn design_matrix(&self, rows: &[usize]) -> Array2<f64> {
        let offsets: Vec<usize> = self
            .categories
            .iter()
            .scan(0, |acc, cats| {
                let start = *acc;
                *acc += cats.len();
                Some(start)
            })
            .collect();
        let width: usize = self.categories.iter().map(|c| c.len()).sum();
        let mut design = Array2::zeros((rows.len(), width));
        for (i, &row) in rows.iter().enumerate() {
            for (c, value) in self.values[row].iter().enumerate() {
                if let Some(k) = self.categories[c].iter().position(|cat| cat == value) {
                    design[[i, offsets[c] + k]] = 1.0;
                }
            }
        }
        design
    }
}

/// Feature values and origins of the same languages, split into training
/// and testing sets.
#[derive(Debug, Clone)]
pub struct OriginDataset {
    values: LabeledMatrix<f64>,
    origins: OriginTable,
    train: Vec<usize>,
    test: Vec<usize>,
    config: OriginConfig,
    names: Option<Arc<TreatmentTable>>,
}

impl OriginDataset {
    /// Align `values` to the languages of `origins` and split them with a
    /// seeded shuffle, holding out `test_fraction` (rounded up) for testing.
    pub fn new(values: &LabeledMatrix<f64>, origins: OriginTable, config: OriginConfig) -> Result<Self> {
        config.validate()?;
        if let Some(missing) = origins
            .language_ids()
            .iter()
            .find(|id| values.row_position(id).is_none())
        {
            return Err(WalsError::data_loading(format!(
                "language {} has origins but no values",
                missing
            )));
        }
        let values = values.reindex(origins.language_ids(), values.col_labels(), f64::NAN)?;

        let n = origins.len();
        let n_test = (config.test_fraction * n as f64).ceil() as usize;
        if n_test == 0 || n_test >= n {
            return Err(WalsError::insufficient_data(format!(
                "cannot split {} languages into training and testing sets",
                n
            )));
        }
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut StdRng::seed_from_u64(config.split_seed));
        let test = order[..n_test].to_vec();
        let train = order[n_test..].to_vec();
        log::info!(
            "Split {} languages into {} training and {} testing",
            n,
            train.len(),
            test.len()
        );

        Ok(OriginDataset {
            values,
            origins,
            train,
            test,
            config,
            names: None,
        })
    }

    /// Name report rows with the short names of `table`.
    pub fn with_names(mut self, table: Arc<TreatmentTable>) -> Self {
        self.names = Some(table);
        self
    }

    /// Values aligned to the origin rows
    pub fn values(&self) -> &LabeledMatrix<f64> {
        &self.values
    }

    /// Origins
    pub fn origins(&self) -> &OriginTable {
        &self.origins
    }

    /// Row positions of the training set
    pub fn train_rows(&self) -> &[usize] {
        &self.train
    }

    /// Row positions of the testing set
    pub fn test_rows(&self) -> &[usize] {
        &self.test
    }

    fn shortname(&self, feature: &str) -> String {
        match &self.names {
            Some(table) => table.shortname(feature),
            None => feature.to_string(),
        }
    }

    fn target(&self, feature: &str) -> Result<Array1<f64>> {
        let column = self
            .values
            .column(feature)
            .ok_or_else(|| WalsError::unknown_feature(feature))?;
        if column.iter().any(|v| !v.is_finite()) {
            return Err(WalsError::insufficient_data(format!(
                "feature {} has missing values",
                feature
            )));
        }
        Ok(column.to_owned())
    }

    /// Logistic model of one binary (one-hot derived) column.
    ///
    /// Values are rounded to 0/1. With `cv` the penalty is chosen from the
    /// configured candidates by k-fold log loss on the training set.
    pub fn logistic_model(&self, feature: &str, cv: bool) -> Result<OriginResult> {
        let full = self.target(feature)?.mapv(round_half_even);
        if full.iter().any(|&v| v != 0.0 && v != 1.0) {
            return Err(WalsError::degenerate_target(feature, "values are not binary"));
        }
        let y_train = full.select(Axis(0), &self.train);
        let y_test = full.select(Axis(0), &self.test);
        if is_single_class(&y_train) {
            return Err(WalsError::degenerate_target(
                feature,
                "training labels contain a single class",
            ));
        }

        let x_train = self.origins.design_matrix(&self.train);
        let x_test = self.origins.design_matrix(&self.test);
        let c = if cv { self.select_c(&x_train, &y_train)? } else { 1.0 };

        let mut model = LogisticRegression::new(c);
        model.fit(&x_train, &y_train)?;
        let train_score =
            log_odds_vs_baseline(feature, y_train.view(), model.predict_proba(&x_train)?.view())?;
        let test_score =
            log_odds_vs_baseline(feature, y_test.view(), model.predict_proba(&x_test)?.view())?;

        let coefficients = model
            .coefficients()
            .map(|w| w.to_vec())
            .unwrap_or_default();
        Ok(OriginResult {
            feature: feature.to_string(),
            name: self.shortname(feature),
            train_score,
            test_score,
            observed_rate: full.mean().unwrap_or(0.0),
            innate_rate: sigmoid(model.intercept()),
            coefficients: self
                .origins
                .coefficient_names()
                .into_iter()
                .zip(coefficients)
                .collect(),
        })
    }

    /// Logistic models of every one-hot derived column (names containing
    /// `_`). Columns that cannot be modelled are skipped with a warning.
    pub fn full_logistic_model(&self, cv: bool) -> Result<OriginReport> {
        let features: Vec<&String> = self
            .values
            .col_labels()
            .iter()
            .filter(|f| f.contains('_'))
            .collect();
        let results = features
            .par_iter()
            .map(|feature| match self.logistic_model(feature, cv) {
                Ok(result) => Ok(Some(result)),
                Err(e) if e.is_recoverable() => {
                    log::warn!("Skipping {}: {}", feature, e);
                    Ok(None)
                }
                Err(e) => Err(e),
            })
            .collect::<Result<Vec<_>>>()?;
        let rows: Vec<OriginResult> = results.into_iter().flatten().collect();
        if rows.is_empty() {
            return Err(WalsError::insufficient_data(
                "no one-hot column could be modelled",
            ));
        }
        log::info!("Fitted {} of {} logistic models", rows.len(), features.len());
        Ok(OriginReport::new(rows))
    }

    /// Ridge model of every ordinal column (names without `_`), fitted
    /// jointly. With `cv` the penalty is chosen from the configured
    /// candidates by k-fold R².
    pub fn full_linear_model(&self, cv: bool) -> Result<OriginReport> {
        let features: Vec<String> = self
            .values
            .col_labels()
            .iter()
            .filter(|f| !f.contains('_'))
            .cloned()
            .collect();
        if features.is_empty() {
            return Err(WalsError::insufficient_data("sample has no ordinal column"));
        }
        let columns = features
            .iter()
            .map(|f| self.target(f))
            .collect::<Result<Vec<_>>>()?;
        let mut full = Array2::zeros((self.origins.len(), features.len()));
        for (k, column) in columns.iter().enumerate() {
            full.column_mut(k).assign(column);
        }

        let y_train = full.select(Axis(0), &self.train);
        let y_test = full.select(Axis(0), &self.test);
        let x_train = self.origins.design_matrix(&self.train);
        let x_test = self.origins.design_matrix(&self.test);
        let alpha = if cv {
            self.select_alpha(&x_train, &y_train)?
        } else {
            1.0
        };

        let mut model = RidgeRegression::new(alpha);
        model.fit(&x_train, &y_train)?;
        let pred_train = model.predict(&x_train)?;
        let pred_test = model.predict(&x_test)?;
        let intercepts = model
            .intercepts()
            .ok_or_else(|| WalsError::not_fitted("RidgeRegression"))?;
        let weights = model
            .coefficients()
            .ok_or_else(|| WalsError::not_fitted("RidgeRegression"))?;
        let names = self.origins.coefficient_names();

        let mut rows = Vec::with_capacity(features.len());
        for (k, feature) in features.iter().enumerate() {
            rows.push(OriginResult {
                feature: feature.clone(),
                name: self.shortname(feature),
                train_score: r2_score(y_train.column(k), pred_train.column(k))?,
                test_score: r2_score(y_test.column(k), pred_test.column(k))?,
                observed_rate: full.column(k).mean().unwrap_or(0.0),
                innate_rate: intercepts[k],
                coefficients: names
                    .iter()
                    .cloned()
                    .zip(weights.row(k).iter().copied())
                    .collect(),
            });
        }
        log::info!("Fitted ridge model of {} ordinal features (alpha {})", rows.len(), alpha);
        Ok(OriginReport::new(rows))
    }

    fn select_c(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let folds = k_folds(x.nrows(), self.config.cv_folds, self.config.model_seed)?;
        let mut best: Option<(f64, f64)> = None;
        for &c in &self.config.logistic_cs {
            let mut losses = Vec::new();
            for (fit_rows, score_rows) in &folds {
                let y_fit = y.select(Axis(0), fit_rows);
                if is_single_class(&y_fit) {
                    continue;
                }
                let mut model = LogisticRegression::new(c);
                model.fit(&x.select(Axis(0), fit_rows), &y_fit)?;
                let prob = model.predict_proba(&x.select(Axis(0), score_rows))?;
                losses.push(log_loss(y.select(Axis(0), score_rows).view(), prob.view())?);
            }
            if losses.is_empty() {
                continue;
            }
            let mean = losses.iter().sum::<f64>() / losses.len() as f64;
            log::trace!("C = {}: mean log loss {:.4}", c, mean);
            if best.map_or(true, |(_, loss)| mean < loss) {
                best = Some((c, mean));
            }
        }
        Ok(best.map(|(c, _)| c).unwrap_or(1.0))
    }

    fn select_alpha(&self, x: &Array2<f64>, y: &Array2<f64>) -> Result<f64> {
        let folds = k_folds(x.nrows(), self.config.cv_folds, self.config.model_seed)?;
        let mut best: Option<(f64, f64)> = None;
        for &alpha in &self.config.ridge_alphas {
            let mut scores = Vec::with_capacity(folds.len());
            for (fit_rows, score_rows) in &folds {
                let mut model = RidgeRegression::new(alpha);
                model.fit(&x.select(Axis(0), fit_rows), &y.select(Axis(0), fit_rows))?;
                let pred = model.predict(&x.select(Axis(0), score_rows))?;
                let truth = y.select(Axis(0), score_rows);
                let mut total = 0.0;
                for k in 0..y.ncols() {
                    total += r2_score(truth.column(k), pred.column(k))?;
                }
                scores.push(total / y.ncols() as f64);
            }
            let mean = scores.iter().sum::<f64>() / scores.len() as f64;
            log::trace!("alpha = {}: mean R² {:.4}", alpha, mean);
            if best.map_or(true, |(_, score)| mean > score) {
                best = Some((alpha, mean));
            }
        }
        Ok(best.map(|(alpha, _)| alpha).unwrap_or(1.0))
    }
}

/// `(fit, score)` row positions of `k` shuffled folds over `n` rows.
///
/// The first `n % k` folds hold one extra row.
pub fn k_folds(n: usize, k: usize, seed: u64) -> Result<Vec<(Vec<usize>, Vec<usize>)>> {
    if k < 2 || n < k {
        return Err(WalsError::insufficient_data(format!(
            "cannot make {} folds from {} rows",
            k, n
        )));
    }
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(&mut StdRng::seed_from_u64(seed));

    let mut folds = Vec::with_capacity(k);
    let mut start = 0;
    for fold in 0..k {
        let size = n / k + usize::from(fold < n % k);
        let score: Vec<usize> = order[start..start + size].to_vec();
        let fit: Vec<usize> = order[..start]
            .iter()
            .chain(order[start + size..].iter())
            .copied()
            .collect();
        folds.push((fit, score));
        start += size;
    }
    Ok(folds)
}

fn is_single_class(y: &Array1<f64>) -> bool {
    y.iter().all(|&v| v == 1.0) || y.iter().all(|&v| v == 0.0)
}

/// Round to the nearest integer, ties to even.
fn round_half_even(v: f64) -> f64 {
    let r = v.round();
    if (v - v.trunc()).abs() == 0.5 {
        2.0 * (v / 2.0).round()
    } else {
        r
    }
}
