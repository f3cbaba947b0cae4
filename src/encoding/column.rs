//! Column dispatcher: applies each feature's encoder to its own column.

use crate::core::error::{Result, WalsError};
use crate::core::types::{Code, UnknownFeaturePolicy};
use crate::dataset::{LabeledMatrix, ValueMatrix};
use crate::encoding::encoders::FeatureEncoder;
use crate::encoding::treatment::TreatmentTable;
use rayon::prelude::*;
use std::sync::Arc;

/// Encoded language × derived-column matrix; cells are 0, 1, ordinal
/// codes, or `-1` where the source value was missing.
pub type EncodedMatrix = LabeledMatrix<Code>;

/// Encodes a whole value matrix by walking the treatment table in order.
///
/// Each feature present in the input is encoded from its single column and
/// the per-feature blocks are concatenated side by side. Input features
/// without a treatment are handled by the configured
/// [`UnknownFeaturePolicy`].
#[derive(Debug, Clone)]
pub struct ColumnTransformer {
    table: Arc<TreatmentTable>,
    policy: UnknownFeaturePolicy,
    fitted: Option<Vec<(String, FeatureEncoder)>>,
}

impl ColumnTransformer {
    /// Unfitted transformer over `table`.
    pub fn new(table: Arc<TreatmentTable>, policy: UnknownFeaturePolicy) -> Self {
        ColumnTransformer {
            table,
            policy,
            fitted: None,
        }
    }

    /// Treatment table in use
    pub fn table(&self) -> &TreatmentTable {
        &self.table
    }

    /// True once `fit` has run
    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Fit one encoder per treated feature present in `values`.
    pub fn fit(&mut self, values: &ValueMatrix) -> Result<&mut Self> {
        let unknown: Vec<&String> = values
            .col_labels()
            .iter()
            .filter(|f| !self.table.contains(f))
            .collect();
        if !unknown.is_empty() {
            match self.policy {
                UnknownFeaturePolicy::Error => {
                    return Err(WalsError::unknown_feature(unknown[0].as_str()));
                }
                UnknownFeaturePolicy::Skip => {
                    log::warn!(
                        "Skipping {} feature(s) without a treatment: {}",
                        unknown.len(),
                        unknown
                            .iter()
                            .map(|s| s.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    );
                }
            }
        }

        let mut fitted = Vec::new();
        for spec in self.table.iter() {
            let column = match values.column(&spec.id) {
                Some(column) => column,
                None => continue,
            };
            let mut encoder = FeatureEncoder::from_treatment(&spec.treatment)?;
            encoder.fit(&spec.id, column)?;
            fitted.push((spec.id.clone(), encoder));
        }
        log::debug!(
            "Fitted encoders for {} of {} features",
            fitted.len(),
            values.ncols()
        );
        self.fitted = Some(fitted);
        Ok(self)
    }

    /// Encode `values` with the fitted encoders.
    ///
    /// Every fitted feature must be present in `values`.
    pub fn transform(&self, values: &ValueMatrix) -> Result<EncodedMatrix> {
        let fitted = self
            .fitted
            .as_ref()
            .ok_or_else(|| WalsError::not_fitted("ColumnTransformer"))?;

        let blocks = fitted
            .par_iter()
            .map(|(feature, encoder)| {
                let column = values
                    .column(feature)
                    .ok_or_else(|| WalsError::unknown_feature(feature.as_str()))?;
                let block = encoder.transform(column)?;
                LabeledMatrix::new(values.row_labels().to_vec(), encoder.column_names()?, block)
            })
            .collect::<Result<Vec<_>>>()?;

        LabeledMatrix::hconcat(values.row_labels().to_vec(), blocks)
    }

    /// Fit and transform in one step.
    pub fn fit_transform(&mut self, values: &ValueMatrix) -> Result<EncodedMatrix> {
        self.fit(values)?;
        self.transform(values)
    }

    /// Names of every produced column, in output order.
    pub fn column_names(&self) -> Result<Vec<String>> {
        let fitted = self
            .fitted
            .as_ref()
            .ok_or_else(|| WalsError::not_fitted("ColumnTransformer"))?;
        let mut names = Vec::new();
        for (_, encoder) in fitted {
            names.extend(encoder.column_names()?);
        }
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::treatment::{FeatureSpec, FeatureTreatment};
    use ndarray::array;

    fn table() -> Arc<TreatmentTable> {
        Arc::new(
            TreatmentTable::new(vec![
                FeatureSpec::new("26A", FeatureTreatment::ordinal([(1, 4)]).unwrap()),
                FeatureSpec::new(
                    "4A",
                    FeatureTreatment::one_hot(4, [(1, vec![]), (4, vec![2, 3])]).unwrap(),
                ),
                FeatureSpec::new("82A", FeatureTreatment::one_hot(3, []).unwrap()),
            ])
            .unwrap(),
        )
    }

    fn values(cols: &[&str], body: ndarray::Array2<Code>) -> ValueMatrix {
        let rows = (0..body.nrows()).map(|i| format!("l{}", i)).collect();
        LabeledMatrix::new(rows, cols.iter().map(|c| c.to_string()).collect(), body).unwrap()
    }

    #[test]
    fn test_table_order_and_skipping() {
        // Input column order differs from table order; 82A is absent.
        let input = values(&["4A", "26A"], array![[1, 1], [2, 2], [4, 4], [-1, -1]]);
        let mut transformer = ColumnTransformer::new(table(), UnknownFeaturePolicy::Skip);
        let encoded = transformer.fit_transform(&input).unwrap();

        assert_eq!(encoded.col_labels(), &["26A", "4A_2", "4A_3"]);
        assert_eq!(
            encoded.values(),
            array![[4, 0, 0], [2, 1, 0], [4, 1, 1], [-1, -1, -1]]
        );
        assert_eq!(transformer.column_names().unwrap(), encoded.col_labels());
    }

    #[test]
    fn test_unknown_feature_policy() {
        let input = values(&["26A", "999Z"], array![[1, 1]]);

        let mut skip = ColumnTransformer::new(table(), UnknownFeaturePolicy::Skip);
        let encoded = skip.fit_transform(&input).unwrap();
        assert_eq!(encoded.col_labels(), &["26A"]);

        let mut strict = ColumnTransformer::new(table(), UnknownFeaturePolicy::Error);
        assert!(matches!(
            strict.fit(&input),
            Err(WalsError::UnknownFeature { .. })
        ));
    }

    #[test]
    fn test_transform_before_fit() {
        let input = values(&["26A"], array![[1]]);
        let transformer = ColumnTransformer::new(table(), UnknownFeaturePolicy::Skip);
        assert!(matches!(
            transformer.transform(&input),
            Err(WalsError::NotFitted { .. })
        ));
    }

    #[test]
    fn test_transform_missing_fitted_feature() {
        let mut transformer = ColumnTransformer::new(table(), UnknownFeaturePolicy::Skip);
        transformer
            .fit(&values(&["26A", "82A"], array![[1, 2]]))
            .unwrap();
        let result = transformer.transform(&values(&["26A"], array![[1]]));
        assert!(matches!(result, Err(WalsError::UnknownFeature { .. })));
    }

    #[test]
    fn test_invalid_code_surfaces() {
        let mut transformer = ColumnTransformer::new(table(), UnknownFeaturePolicy::Skip);
        let result = transformer.fit_transform(&values(&["82A"], array![[5]]));
        assert!(matches!(result, Err(WalsError::InvalidCode { code: 5, .. })));
    }
}
