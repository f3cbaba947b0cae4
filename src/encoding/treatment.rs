//! Per-feature encoding rules.
//!
//! The table is declarative data: an ordered list of `[[feature]]` entries
//! in TOML. Table order is the order in which encoded columns are emitted.
//!
//! ```toml
//! [[feature]]
//! id = "4A"
//! shortname = "voicing"
//! encoding = "one_hot"
//! domain = 4
//! redistribute = { 1 = [], 4 = [2, 3] }
//!
//! [feature.values]
//! 2 = "plosives"
//! 3 = "fricatives"
//! ```

use crate::core::constants::MISSING_CODE;
use crate::core::error::{Result, WalsError};
use crate::core::types::Code;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

const WALS_TREATMENT: &str = include_str!("../../data/feature_treatment.toml");

/// How one feature is turned into model-ready columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FeatureTreatment {
    /// Keep the integer code, optionally recoding some values.
    Ordinal {
        /// `raw → replacement`; codes not listed pass through
        recode: BTreeMap<Code, Code>,
        /// Declared domain `1..=n`, when known
        domain: Option<u32>,
    },
    /// One indicator column per code of `1..=domain`.
    OneHot {
        /// Domain size
        domain: u32,
        /// `raw → targets`: the raw code loses its own indicator and is
        /// written as ones in the target columns instead
        redistribute: BTreeMap<Code, Vec<Code>>,
    },
}

impl FeatureTreatment {
    /// Ordinal treatment with a recode table.
    pub fn ordinal<I: IntoIterator<Item = (Code, Code)>>(recode: I) -> Result<Self> {
        let treatment = FeatureTreatment::Ordinal {
            recode: recode.into_iter().collect(),
            domain: None,
        };
        treatment.validate("<ordinal>")?;
        Ok(treatment)
    }

    /// One-hot treatment with a redistribute table.
    pub fn one_hot<I: IntoIterator<Item = (Code, Vec<Code>)>>(domain: u32, redistribute: I) -> Result<Self> {
        let treatment = FeatureTreatment::OneHot {
            domain,
            redistribute: redistribute.into_iter().collect(),
        };
        treatment.validate("<one_hot>")?;
        Ok(treatment)
    }

    /// Check that recodes and redistributions stay inside the domain.
    pub fn validate(&self, feature: &str) -> Result<()> {
        match self {
            FeatureTreatment::Ordinal { recode, domain } => {
                if recode.contains_key(&MISSING_CODE) {
                    return Err(WalsError::config(format!(
                        "{}: the missing marker {} cannot be recoded",
                        feature, MISSING_CODE
                    )));
                }
                if let Some(n) = domain {
                    if let Some(code) = recode.keys().find(|&&c| !in_domain(c, *n)) {
                        return Err(WalsError::invalid_code(feature, *code, *n));
                    }
                }
            }
            FeatureTreatment::OneHot {
                domain,
                redistribute,
            } => {
                if *domain == 0 {
                    return Err(WalsError::config(format!(
                        "{}: one-hot domain must be at least 1",
                        feature
                    )));
                }
                for (key, targets) in redistribute {
                    if !in_domain(*key, *domain) {
                        return Err(WalsError::invalid_code(feature, *key, *domain));
                    }
                    if let Some(target) = targets.iter().find(|&&t| !in_domain(t, *domain)) {
                        return Err(WalsError::invalid_code(feature, *target, *domain));
                    }
                }
            }
        }
        Ok(())
    }
}

pub(crate) fn in_domain(code: Code, domain: u32) -> bool {
    code >= 1 && (code as i64) <= domain as i64
}

/// A feature with its treatment and reporting names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSpec {
    /// WALS feature identifier
    pub id: String,
    /// Short name used in reports
    pub shortname: Option<String>,
    /// Encoding rule
    pub treatment: FeatureTreatment,
    /// Short names of individual codes, used for one-hot columns
    pub value_names: BTreeMap<Code, String>,
}

impl FeatureSpec {
    /// Spec without reporting names.
    pub fn new<S: Into<String>>(id: S, treatment: FeatureTreatment) -> Self {
        FeatureSpec {
            id: id.into(),
            shortname: None,
            treatment,
            value_names: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum EncodingKind {
    Ordinal,
    OneHot,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFeature {
    id: String,
    shortname: Option<String>,
    encoding: EncodingKind,
    domain: Option<u32>,
    #[serde(default)]
    recode: BTreeMap<String, Code>,
    #[serde(default)]
    redistribute: BTreeMap<String, Vec<Code>>,
    #[serde(default)]
    values: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct RawTable {
    #[serde(default)]
    feature: Vec<RawFeature>,
}

fn parse_code(feature: &str, key: &str) -> Result<Code> {
    key.trim().parse().map_err(|_| {
        WalsError::config(format!("{}: '{}' is not an integer code", feature, key))
    })
}

impl RawFeature {
    fn into_spec(self) -> Result<FeatureSpec> {
        let id = self.id;
        let treatment = match self.encoding {
            EncodingKind::Ordinal => {
                if !self.redistribute.is_empty() {
                    return Err(WalsError::config(format!(
                        "{}: ordinal features cannot redistribute",
                        id
                    )));
                }
                let recode = self
                    .recode
                    .iter()
                    .map(|(k, &v)| Ok((parse_code(&id, k)?, v)))
                    .collect::<Result<_>>()?;
                FeatureTreatment::Ordinal {
                    recode,
                    domain: self.domain,
                }
            }
            EncodingKind::OneHot => {
                if !self.recode.is_empty() {
                    return Err(WalsError::config(format!(
                        "{}: one-hot features use redistribute, not recode",
                        id
                    )));
                }
                let domain = self.domain.ok_or_else(|| {
                    WalsError::config(format!("{}: one-hot features need a domain", id))
                })?;
                let redistribute = self
                    .redistribute
                    .iter()
                    .map(|(k, v)| Ok((parse_code(&id, k)?, v.clone())))
                    .collect::<Result<_>>()?;
                FeatureTreatment::OneHot {
                    domain,
                    redistribute,
                }
            }
        };
        treatment.validate(&id)?;
        let value_names = self
            .values
            .iter()
            .map(|(k, v)| Ok((parse_code(&id, k)?, v.clone())))
            .collect::<Result<_>>()?;
        Ok(FeatureSpec {
            id,
            shortname: self.shortname,
            treatment,
            value_names,
        })
    }
}

/// Ordered collection of feature treatments.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TreatmentTable {
    features: Vec<FeatureSpec>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl TreatmentTable {
    /// Build a table from specs in emission order.
    pub fn new(features: Vec<FeatureSpec>) -> Result<Self> {
        let mut index = HashMap::with_capacity(features.len());
        for (position, spec) in features.iter().enumerate() {
            spec.treatment.validate(&spec.id)?;
            if index.insert(spec.id.clone(), position).is_some() {
                return Err(WalsError::config(format!(
                    "feature {} is listed twice in the treatment table",
                    spec.id
                )));
            }
        }
        Ok(TreatmentTable { features, index })
    }

    /// Parse a TOML treatment table.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let raw: RawTable = toml::from_str(text)?;
        let features = raw
            .feature
            .into_iter()
            .map(RawFeature::into_spec)
            .collect::<Result<Vec<_>>>()?;
        Self::new(features)
    }

    /// Read a TOML treatment table from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            WalsError::data_loading(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let table = Self::from_toml_str(&text)?;
        log::info!("Loaded {} feature treatments from {}", table.len(), path.display());
        Ok(table)
    }

    /// The curated treatment table for WALS.
    pub fn wals_default() -> Result<Self> {
        Self::from_toml_str(WALS_TREATMENT)
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// True when no feature is configured
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Specs in emission order
    pub fn iter(&self) -> impl Iterator<Item = &FeatureSpec> {
        self.features.iter()
    }

    /// Spec of a feature
    pub fn get(&self, id: &str) -> Option<&FeatureSpec> {
        self.index.get(id).map(|&i| &self.features[i])
    }

    /// True when the feature has a treatment
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Report name of a feature (`"1A"`) or a one-hot column (`"4A_2"`).
    ///
    /// One-hot columns are named `feature__value`; any part without a
    /// configured short name falls back to its code.
    pub fn shortname(&self, code: &str) -> String {
        match code.split_once('_') {
            Some((feature, value)) => {
                let spec = self.get(feature);
                let feature_name = spec
                    .and_then(|s| s.shortname.clone())
                    .unwrap_or_else(|| feature.to_string());
                let value_name = spec
                    .zip(value.parse::<Code>().ok())
                    .and_then(|(s, v)| s.value_names.get(&v).cloned())
                    .unwrap_or_else(|| value.to_string());
                format!("{}__{}", feature_name, value_name)
            }
            None => self
                .get(code)
                .and_then(|s| s.shortname.clone())
                .unwrap_or_else(|| code.to_string()),
        }
    }
}
