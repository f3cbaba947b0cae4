//! Sample assembly: the retained languages and features with their values,
//! metadata and, optionally, the encoded, scaled and imputed matrices.

use crate::config::{AnalysisConfig, ImputationConfig, ReductionConfig};
use crate::core::constants::{
    DEFAULT_FEATURES_TO_DROP, DEFAULT_LANGUAGES_TO_DROP, MISSING_CODE, REDUNDANT_FEATURES,
};
use crate::core::error::{Result, WalsError};
use crate::core::types::{Code, UnknownFeaturePolicy};
use crate::dataset::{
    CodeRecord, Language, LabeledMatrix, Parameter, PresenceMatrix, ValueMatrix, WalsData,
};
use crate::encoding::{ColumnTransformer, EncodedMatrix, TreatmentTable};
use crate::preprocessing::{drop_constant_columns, to_float, KnnImputer, MinMaxScaler};
use crate::sampling::reducer::{DensityReducer, ReductionReport};
use ndarray::Array2;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

/// How a [`Sample`] is assembled.
#[derive(Debug, Clone)]
pub struct SampleOptions {
    /// Run encoding, scaling and imputation
    pub impute: bool,
    /// Per-feature treatments used for encoding
    pub treatment: Arc<TreatmentTable>,
    /// Handling of features without a treatment
    pub unknown_features: UnknownFeaturePolicy,
    /// KNN imputer settings
    pub imputation: ImputationConfig,
}

impl SampleOptions {
    /// Options around a treatment table, without imputation.
    pub fn new(treatment: Arc<TreatmentTable>) -> Self {
        SampleOptions {
            impute: false,
            treatment,
            unknown_features: UnknownFeaturePolicy::default(),
            imputation: ImputationConfig::default(),
        }
    }

    /// Options using the built-in WALS treatment table.
    pub fn wals_default() -> Result<Self> {
        Ok(Self::new(Arc::new(TreatmentTable::wals_default()?)))
    }

    /// Options taken from an analysis configuration.
    pub fn from_config(config: &AnalysisConfig) -> Result<Self> {
        let treatment = match &config.encoding.treatment_file {
            Some(path) => TreatmentTable::load(path)?,
            None => TreatmentTable::wals_default()?,
        };
        Ok(SampleOptions {
            impute: false,
            treatment: Arc::new(treatment),
            unknown_features: config.encoding.unknown_features,
            imputation: config.imputation.clone(),
        })
    }

    /// Same options with imputation switched on or off.
    pub fn with_impute(mut self, impute: bool) -> Self {
        self.impute = impute;
        self
    }
}

/// Intermediate matrices of the imputation pipeline.
#[derive(Debug, Clone)]
pub struct ProcessedValues {
    /// Encoded values without constant columns
    pub encoded: EncodedMatrix,
    /// Encoded columns removed for having at most one distinct value
    pub dropped_columns: Vec<String>,
    /// Min-max scaled, NaN where missing
    pub scaled: LabeledMatrix<f64>,
    /// Scaled with every NaN imputed
    pub imputed: LabeledMatrix<f64>,
    /// Scaler fitted on the encoded values
    pub scaler: MinMaxScaler,
}

/// Serializable overview of a sample.
#[derive(Debug, Clone, Serialize)]
pub struct SampleSummary {
    /// Number of languages
    pub languages: usize,
    /// Retained features, in sample order
    pub features: Vec<String>,
    /// Density of the presence matrix
    pub density: f64,
    /// Reduction diagnostics when the sample came from a reduction
    pub reduction: Option<ReductionReport>,
    /// Encoded columns after constant-column removal
    pub encoded_columns: Vec<String>,
    /// Encoded columns removed as constant
    pub dropped_columns: Vec<String>,
}

/// A set of languages and features taken from the WALS tables.
#[derive(Debug, Clone)]
pub struct Sample {
    data: Arc<WalsData>,
    options: SampleOptions,
    presence: PresenceMatrix,
    languages: Vec<Language>,
    features: Vec<Parameter>,
    codes: Vec<CodeRecord>,
    values: ValueMatrix,
    processed: Option<ProcessedValues>,
    reduction: Option<ReductionReport>,
}

/// Ordering key of WALS feature identifiers: numeric prefix, then suffix.
///
/// `"9A" < "10A" < "10B"`. Identifiers without a numeric prefix sort last.
pub fn feature_sort_key(id: &str) -> (u32, &str) {
    let split = id.find(|c: char| !c.is_ascii_digit()).unwrap_or(id.len());
    let number = id[..split].parse().unwrap_or(u32::MAX);
    (number, &id[split..])
}

fn compare_features(a: &str, b: &str) -> Ordering {
    feature_sort_key(a)
        .cmp(&feature_sort_key(b))
        .then_with(|| a.cmp(b))
}

impl Sample {
    /// Assemble a sample over the languages and features of `presence`.
    pub fn new(data: Arc<WalsData>, presence: &PresenceMatrix, options: SampleOptions) -> Result<Self> {
        if presence.is_empty() {
            return Err(WalsError::insufficient_data("sample has no languages or features"));
        }

        let mut row_order: Vec<usize> = (0..presence.nrows()).collect();
        row_order.sort_by(|&a, &b| presence.row_labels()[a].cmp(&presence.row_labels()[b]));
        let mut col_order: Vec<usize> = (0..presence.ncols()).collect();
        col_order.sort_by(|&a, &b| {
            compare_features(&presence.col_labels()[a], &presence.col_labels()[b])
        });
        let presence = presence.select(&row_order, &col_order);

        let languages: Vec<Language> = presence
            .row_labels()
            .iter()
            .filter_map(|id| data.language(id).cloned())
            .collect();
        if languages.len() < presence.nrows() {
            log::warn!(
                "{} sampled language(s) have no entry in the languages table",
                presence.nrows() - languages.len()
            );
        }
        let features: Vec<Parameter> = presence
            .col_labels()
            .iter()
            .filter_map(|id| data.parameter(id).cloned())
            .collect();
        let codes: Vec<CodeRecord> = data
            .codes
            .iter()
            .filter(|c| presence.contains_column(&c.parameter_id))
            .cloned()
            .collect();

        let values = crosstab_values(&data, &presence)?;
        log::info!(
            "Assembled sample of {} languages x {} features",
            values.nrows(),
            values.ncols()
        );

        let processed = if options.impute {
            Some(process(&values, &options)?)
        } else {
            None
        };

        Ok(Sample {
            data,
            options,
            presence,
            languages,
            features,
            codes,
            values,
            processed,
            reduction: None,
        })
    }

    /// Reduce the full presence matrix to `threshold` density and assemble
    /// the surviving languages and features.
    ///
    /// Each pass drops the least-covered feature and the two least-covered
    /// languages, on the coverage-sorted matrix.
    pub fn of_density(data: Arc<WalsData>, threshold: f64, options: SampleOptions) -> Result<Self> {
        let reducer = DensityReducer::new(ReductionConfig {
            density_threshold: threshold,
            n_features_to_drop: DEFAULT_FEATURES_TO_DROP,
            n_languages_to_drop: DEFAULT_LANGUAGES_TO_DROP,
            sort_by_coverage: true,
        })?;
        Self::reduced(data, &reducer, options)
    }

    /// Reduce the full presence matrix with `reducer` and assemble the result.
    pub fn reduced(data: Arc<WalsData>, reducer: &DensityReducer, options: SampleOptions) -> Result<Self> {
        let presence = data.presence_matrix()?;
        let reduction = reducer.reduce(&presence)?;
        let mut sample = Self::new(data, &reduction.matrix, options)?;
        sample.reduction = Some(reduction.report);
        Ok(sample)
    }

    /// A new imputed sample without the redundant word-order and negation
    /// features (`95A`, `96A`, `97A`, `143E`, `143F`).
    pub fn drop_redundant(&self) -> Result<Sample> {
        let presence = self.presence.drop_columns(&REDUNDANT_FEATURES);
        let options = self.options.clone().with_impute(true);
        let mut sample = Sample::new(Arc::clone(&self.data), &presence, options)?;
        sample.reduction = self.reduction.clone();
        Ok(sample)
    }

    /// Presence matrix, rows sorted by language code
    pub fn presence(&self) -> &PresenceMatrix {
        &self.presence
    }

    /// Raw value codes, `-1` where unattested
    pub fn values(&self) -> &ValueMatrix {
        &self.values
    }

    /// Imputation intermediates, if the sample was imputed
    pub fn processed(&self) -> Option<&ProcessedValues> {
        self.processed.as_ref()
    }

    /// Reduction diagnostics, if the sample came from a reduction
    pub fn reduction(&self) -> Option<&ReductionReport> {
        self.reduction.as_ref()
    }

    /// Options the sample was built with
    pub fn options(&self) -> &SampleOptions {
        &self.options
    }

    /// Language codes in row order
    pub fn language_ids(&self) -> &[String] {
        self.presence.row_labels()
    }

    /// Feature identifiers in column order
    pub fn feature_ids(&self) -> &[String] {
        self.presence.col_labels()
    }

    /// Metadata of the sampled languages
    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    /// Metadata of the sampled features
    pub fn features(&self) -> &[Parameter] {
        &self.features
    }

    /// Value legends of the sampled features
    pub fn codes(&self) -> &[CodeRecord] {
        &self.codes
    }

    /// Language names in row order
    pub fn language_names(&self) -> Vec<&str> {
        self.languages.iter().map(|l| l.name.as_str()).collect()
    }

    /// Feature names in column order
    pub fn feature_names(&self) -> Vec<&str> {
        self.features.iter().map(|f| f.name.as_str()).collect()
    }

    /// Languages whose name contains `needle`.
    pub fn search_language(&self, needle: &str) -> Vec<&Language> {
        self.languages
            .iter()
            .filter(|l| l.name.contains(needle))
            .collect()
    }

    /// Number of sampled languages attesting `feature`.
    pub fn feature_count(&self, feature: &str) -> Option<usize> {
        self.presence
            .column(feature)
            .map(|column| column.iter().filter(|&&present| present).count())
    }

    /// `(code, name)` legend of `feature`, ordered by code.
    pub fn value_names(&self, feature: &str) -> Vec<(Code, &str)> {
        let mut names: Vec<(Code, &str)> = self
            .codes
            .iter()
            .filter(|c| c.parameter_id == feature)
            .map(|c| (c.number, c.name.as_str()))
            .collect();
        names.sort_by_key(|&(number, _)| number);
        names
    }

    /// `(latitude, longitude)` of every language, in row order.
    ///
    /// Fails when a language is unknown or has no location.
    pub fn coordinates(&self) -> Result<Vec<(f64, f64)>> {
        let by_id: HashMap<&str, &Language> =
            self.languages.iter().map(|l| (l.id.as_str(), l)).collect();
        self.presence
            .row_labels()
            .iter()
            .map(|id| {
                by_id
                    .get(id.as_str())
                    .and_then(|l| l.coordinates())
                    .ok_or_else(|| {
                        WalsError::data_loading(format!("language {} has no coordinates", id))
                    })
            })
            .collect()
    }

    /// Overview suitable for a JSON report.
    pub fn summary(&self) -> SampleSummary {
        SampleSummary {
            languages: self.presence.nrows(),
            features: self.presence.col_labels().to_vec(),
            density: self.presence.density().unwrap_or(0.0),
            reduction: self.reduction.clone(),
            encoded_columns: self
                .processed
                .as_ref()
                .map(|p| p.encoded.col_labels().to_vec())
                .unwrap_or_default(),
            dropped_columns: self
                .processed
                .as_ref()
                .map(|p| p.dropped_columns.clone())
                .unwrap_or_default(),
        }
    }
}

/// Crosstab the observations of the sampled cells; duplicates are summed.
fn crosstab_values(data: &WalsData, presence: &PresenceMatrix) -> Result<ValueMatrix> {
    let mut cells: HashMap<(usize, usize), Code> = HashMap::new();
    for record in &data.values {
        let (Some(r), Some(c)) = (
            presence.row_position(&record.language_id),
            presence.col_position(&record.parameter_id),
        ) else {
            continue;
        };
        *cells.entry((r, c)).or_insert(0) += record.value;
    }
    let body = Array2::from_shape_fn(presence.dim(), |(r, c)| {
        cells.get(&(r, c)).copied().unwrap_or(MISSING_CODE)
    });
    presence.with_values(body)
}

fn process(values: &ValueMatrix, options: &SampleOptions) -> Result<ProcessedValues> {
    let mut transformer =
        ColumnTransformer::new(Arc::clone(&options.treatment), options.unknown_features);
    let encoded = transformer.fit_transform(values)?;
    let (encoded, dropped_columns) = drop_constant_columns(&encoded);
    if encoded.ncols() == 0 {
        return Err(WalsError::insufficient_data(
            "no encoded column varies across the sample",
        ));
    }

    let floats = to_float(&encoded);
    let mut scaler = MinMaxScaler::new();
    let scaled = floats.with_values(scaler.fit_transform(&floats.values().to_owned())?)?;

    let mut imputer = KnnImputer::new(&options.imputation)?;
    let imputed = scaled.with_values(imputer.fit_transform(&scaled.values().to_owned())?)?;
    log::info!(
        "Encoded {} features into {} columns ({} constant dropped)",
        values.ncols(),
        encoded.ncols(),
        dropped_columns.len()
    );

    Ok(ProcessedValues {
        encoded,
        dropped_columns,
        scaled,
        imputed,
        scaler,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ValueRecord;
    use crate::encoding::{FeatureSpec, FeatureTreatment};

    fn language(id: &str, name: &str, lat: Option<f64>) -> Language {
        Language {
            id: id.to_string(),
            name: name.to_string(),
            latitude: lat,
            longitude: lat.map(|l| l / 2.0),
            family: Some("F".to_string()),
            genus: None,
            macroarea: None,
        }
    }

    fn value(language: &str, feature: &str, value: Code) -> ValueRecord {
        ValueRecord {
            language_id: language.to_string(),
            parameter_id: feature.to_string(),
            value,
        }
    }

    fn data() -> Arc<WalsData> {
        let languages = vec![
            language("c", "Gamma", Some(10.0)),
            language("a", "Alpha", Some(20.0)),
            language("b", "Beta", None),
        ];
        let parameters = ["10A", "9A", "95A"]
            .iter()
            .map(|id| Parameter {
                id: id.to_string(),
                name: format!("Feature {}", id),
            })
            .collect();
        let values = vec![
            value("a", "9A", 1),
            value("a", "10A", 2),
            value("b", "9A", 2),
            value("b", "10A", 1),
            value("b", "95A", 3),
            value("c", "9A", 1),
            value("c", "9A", 1),
            value("c", "95A", 1),
        ];
        let codes = vec![
            CodeRecord {
                parameter_id: "9A".to_string(),
                name: "Two".to_string(),
                number: 2,
            },
            CodeRecord {
                parameter_id: "9A".to_string(),
                name: "One".to_string(),
                number: 1,
            },
            CodeRecord {
                parameter_id: "81A".to_string(),
                name: "SOV".to_string(),
                number: 1,
            },
        ];
        Arc::new(WalsData::new(languages, parameters, values, codes))
    }

    fn options() -> SampleOptions {
        let table = TreatmentTable::new(vec![
            FeatureSpec::new("9A", FeatureTreatment::ordinal([]).unwrap()),
            FeatureSpec::new("10A", FeatureTreatment::one_hot(2, []).unwrap()),
            FeatureSpec::new("95A", FeatureTreatment::one_hot(3, []).unwrap()),
        ])
        .unwrap();
        SampleOptions::new(Arc::new(table))
    }

    #[test]
    fn test_feature_sort_key() {
        let mut ids = vec!["10B", "9A", "143A", "10A", "X"];
        ids.sort_by(|a, b| compare_features(a, b));
        assert_eq!(ids, vec!["9A", "10A", "10B", "143A", "X"]);
    }

    #[test]
    fn test_assembly_orders_and_crosstabs() {
        let data = data();
        let presence = data.presence_matrix().unwrap();
        let sample = Sample::new(data, &presence, options()).unwrap();

        assert_eq!(sample.language_ids(), &["a", "b", "c"]);
        assert_eq!(sample.feature_ids(), &["9A", "10A", "95A"]);
        assert_eq!(sample.language_names(), vec!["Alpha", "Beta", "Gamma"]);
        assert_eq!(
            sample.values().values(),
            ndarray::array![[1, 2, -1], [2, 1, 3], [2, -1, 1]]
        );
        assert!(sample.processed().is_none());
    }

    #[test]
    fn test_queries() {
        let data = data();
        let presence = data.presence_matrix().unwrap();
        let sample = Sample::new(data, &presence, options()).unwrap();

        assert_eq!(sample.feature_count("9A"), Some(3));
        assert_eq!(sample.feature_count("10A"), Some(2));
        assert_eq!(sample.feature_count("1A"), None);
        assert_eq!(sample.value_names("9A"), vec![(1, "One"), (2, "Two")]);
        assert!(sample.value_names("81A").is_empty());
        assert_eq!(sample.search_language("ta").len(), 1);
        assert!(matches!(
            sample.coordinates(),
            Err(WalsError::DataLoading { .. })
        ));
    }

    #[test]
    fn test_imputed_sample() {
        let data = data();
        let presence = data.presence_matrix().unwrap();
        let sample = Sample::new(data, &presence, options().with_impute(true)).unwrap();
        let processed = sample.processed().unwrap();

        // 95A_2 never occurs and is dropped as constant.
        assert_eq!(processed.encoded.col_labels(), &["9A", "10A_1", "10A_2", "95A_1", "95A_3"]);
        assert_eq!(processed.dropped_columns, vec!["95A_2"]);
        assert!(processed.scaled.values().iter().any(|v| v.is_nan()));
        assert!(processed.imputed.values().iter().all(|v| v.is_finite()));
        assert!(processed
            .imputed
            .values()
            .iter()
            .all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_drop_redundant() {
        let data = data();
        let presence = data.presence_matrix().unwrap();
        let sample = Sample::new(data, &presence, options()).unwrap();
        let reduced = sample.drop_redundant().unwrap();

        assert_eq!(reduced.feature_ids(), &["9A", "10A"]);
        assert!(reduced.processed().is_some());
        assert_eq!(sample.feature_ids().len(), 3);
    }
}
