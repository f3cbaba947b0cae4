//! Single-feature encoders.
//!
//! Both encoders follow the same life cycle: construct from a
//! [`FeatureTreatment`], `fit` on the feature's column, then `transform`
//! any column of the same feature. The missing marker `-1` is never
//! treated as a category.

use crate::core::constants::MISSING_CODE;
use crate::core::error::{Result, WalsError};
use crate::core::types::Code;
use crate::encoding::treatment::{in_domain, FeatureTreatment};
use ndarray::{Array2, ArrayView1};
use std::collections::{BTreeMap, BTreeSet};

/// Keeps a feature ordinal, recoding selected values.
#[derive(Debug, Clone)]
pub struct OrdinalEncoder {
    recode: BTreeMap<Code, Code>,
    domain: Option<u32>,
    feature: Option<String>,
}

impl OrdinalEncoder {
    /// Encoder applying `recode`; unmapped codes pass through.
    pub fn new(recode: BTreeMap<Code, Code>, domain: Option<u32>) -> Result<Self> {
        FeatureTreatment::Ordinal {
            recode: recode.clone(),
            domain,
        }
        .validate("<ordinal>")?;
        Ok(OrdinalEncoder {
            recode,
            domain,
            feature: None,
        })
    }

    /// Record the feature name.
    pub fn fit(&mut self, feature: &str, _column: ArrayView1<'_, Code>) -> Result<()> {
        self.feature = Some(feature.to_string());
        Ok(())
    }

    /// True once `fit` has run
    pub fn is_fitted(&self) -> bool {
        self.feature.is_some()
    }

    /// Recode the column; output has a single column.
    pub fn transform(&self, column: ArrayView1<'_, Code>) -> Result<Array2<Code>> {
        let feature = self
            .feature
            .as_deref()
            .ok_or_else(|| WalsError::not_fitted("OrdinalEncoder"))?;
        let mut out = Array2::zeros((column.len(), 1));
        for (row, &raw) in column.iter().enumerate() {
            if raw == MISSING_CODE {
                out[[row, 0]] = MISSING_CODE;
                continue;
            }
            if let Some(n) = self.domain {
                if !in_domain(raw, n) {
                    return Err(WalsError::invalid_code(feature, raw, n));
                }
            }
            out[[row, 0]] = self.recode.get(&raw).copied().unwrap_or(raw);
        }
        Ok(out)
    }

    /// The feature name, once fitted
    pub fn column_names(&self) -> Result<Vec<String>> {
        self.feature
            .clone()
            .map(|f| vec![f])
            .ok_or_else(|| WalsError::not_fitted("OrdinalEncoder"))
    }
}

/// Fitted layout of a one-hot feature.
#[derive(Debug, Clone)]
struct OneHotLayout {
    feature: String,
    /// Codes that get a column, ascending
    codes: Vec<Code>,
}

/// One indicator column per category, with redistribution of rare codes.
///
/// A redistributed code loses its own indicator and sets the indicators
/// of its targets instead. A code that is redistributed but never a
/// target of any redistribution gets no column at all; with an empty
/// target list it is encoded as all zeros.
#[derive(Debug, Clone)]
pub struct OneHotEncoder {
    domain: u32,
    redistribute: BTreeMap<Code, Vec<Code>>,
    layout: Option<OneHotLayout>,
}

impl OneHotEncoder {
    /// Encoder over codes `1..=domain`.
    pub fn new(domain: u32, redistribute: BTreeMap<Code, Vec<Code>>) -> Result<Self> {
        FeatureTreatment::OneHot {
            domain,
            redistribute: redistribute.clone(),
        }
        .validate("<one_hot>")?;
        Ok(OneHotEncoder {
            domain,
            redistribute,
            layout: None,
        })
    }

    /// Codes that are redistributed and never restored as a target.
    fn removed_not_restored(&self) -> BTreeSet<Code> {
        let restored: BTreeSet<Code> = self.redistribute.values().flatten().copied().collect();
        self.redistribute
            .keys()
            .filter(|k| !restored.contains(k))
            .copied()
            .collect()
    }

    /// Decide the derived columns of `feature`.
    pub fn fit(&mut self, feature: &str, _column: ArrayView1<'_, Code>) -> Result<()> {
        let dropped = self.removed_not_restored();
        let codes = (1..=self.domain as Code)
            .filter(|c| !dropped.contains(c))
            .collect();
        self.layout = Some(OneHotLayout {
            feature: feature.to_string(),
            codes,
        });
        Ok(())
    }

    /// True once `fit` has run
    pub fn is_fitted(&self) -> bool {
        self.layout.is_some()
    }

    fn layout(&self) -> Result<&OneHotLayout> {
        self.layout
            .as_ref()
            .ok_or_else(|| WalsError::not_fitted("OneHotEncoder"))
    }

    /// Encode the column into indicator columns.
    ///
    /// Rows whose raw value is `-1` are `-1` in every derived column.
    pub fn transform(&self, column: ArrayView1<'_, Code>) -> Result<Array2<Code>> {
        let layout = self.layout()?;
        if let Some(&bad) = column
            .iter()
            .find(|&&raw| raw != MISSING_CODE && !in_domain(raw, self.domain))
        {
            return Err(WalsError::invalid_code(&layout.feature, bad, self.domain));
        }

        let position: BTreeMap<Code, usize> = layout
            .codes
            .iter()
            .enumerate()
            .map(|(i, &c)| (c, i))
            .collect();
        let mut out = Array2::zeros((column.len(), layout.codes.len()));

        for (row, &raw) in column.iter().enumerate() {
            if raw == MISSING_CODE {
                out.row_mut(row).fill(MISSING_CODE);
                continue;
            }
            if !self.redistribute.contains_key(&raw) {
                if let Some(&c) = position.get(&raw) {
                    out[[row, c]] = 1;
                }
            }
            if let Some(targets) = self.redistribute.get(&raw) {
                for target in targets {
                    if let Some(&c) = position.get(target) {
                        out[[row, c]] = 1;
                    }
                }
            }
        }
        Ok(out)
    }

    /// Derived column names, `"{feature}_{code}"`.
    pub fn column_names(&self) -> Result<Vec<String>> {
        let layout = self.layout()?;
        Ok(layout
            .codes
            .iter()
            .map(|c| format!("{}_{}", layout.feature, c))
            .collect())
    }
}

/// Either encoder, dispatched on the feature's treatment.
#[derive(Debug, Clone)]
pub enum FeatureEncoder {
    /// Ordinal feature
    Ordinal(OrdinalEncoder),
    /// One-hot feature
    OneHot(OneHotEncoder),
}

impl FeatureEncoder {
    /// Unfitted encoder for a treatment.
    pub fn from_treatment(treatment: &FeatureTreatment) -> Result<Self> {
        Ok(match treatment {
            FeatureTreatment::Ordinal { recode, domain } => {
                FeatureEncoder::Ordinal(OrdinalEncoder::new(recode.clone(), *domain)?)
            }
            FeatureTreatment::OneHot {
                domain,
                redistribute,
            } => FeatureEncoder::OneHot(OneHotEncoder::new(*domain, redistribute.clone())?),
        })
    }

    /// Fit on the feature's column.
    pub fn fit(&mut self, feature: &str, column: ArrayView1<'_, Code>) -> Result<()> {
        match self {
            FeatureEncoder::Ordinal(e) => e.fit(feature, column),
            FeatureEncoder::OneHot(e) => e.fit(feature, column),
        }
    }

    /// Encode a column of the fitted feature.
    pub fn transform(&self, column: ArrayView1<'_, Code>) -> Result<Array2<Code>> {
        match self {
            FeatureEncoder::Ordinal(e) => e.transform(column),
            FeatureEncoder::OneHot(e) => e.transform(column),
        }
    }

    /// Names of the produced columns.
    pub fn column_names(&self) -> Result<Vec<String>> {
        match self {
            FeatureEncoder::Ordinal(e) => e.column_names(),
            FeatureEncoder::OneHot(e) => e.column_names(),
        }
    }

    /// True once `fit` has run
    pub fn is_fitted(&self) -> bool {
        match self {
            FeatureEncoder::Ordinal(e) => e.is_fitted(),
            FeatureEncoder::OneHot(e) => e.is_fitted(),
        }
    }
}
