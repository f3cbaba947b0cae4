//! The four WALS input tables.
//!
//! WALS is distributed as CLDF: `languages.csv`, `parameters.csv`,
//! `values.csv` and `codes.csv`. Only the columns the analysis needs are
//! deserialized; any other column is ignored.

use crate::config::DataConfig;
use crate::core::error::{Result, WalsError};
use crate::core::types::Code;
use crate::dataset::presence::PresenceMatrix;
use csv::ReaderBuilder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// A language with its classification and location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Language {
    /// WALS language code
    #[serde(rename = "ID")]
    pub id: String,
    /// Display name
    #[serde(rename = "Name")]
    pub name: String,
    /// Latitude in degrees
    #[serde(rename = "Latitude", default)]
    pub latitude: Option<f64>,
    /// Longitude in degrees
    #[serde(rename = "Longitude", default)]
    pub longitude: Option<f64>,
    /// Genealogical family
    #[serde(rename = "Family", default)]
    pub family: Option<String>,
    /// Genus within the family
    #[serde(rename = "Genus", default)]
    pub genus: Option<String>,
    /// Macroarea
    #[serde(rename = "Macroarea", default)]
    pub macroarea: Option<String>,
}

impl Language {
    /// `(latitude, longitude)` in degrees when both are known.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

/// A WALS feature (CLDF "parameter").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Feature identifier such as `81A`
    #[serde(rename = "ID")]
    pub id: String,
    /// Feature name
    #[serde(rename = "Name")]
    pub name: String,
}

/// One `(language, feature, value)` observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueRecord {
    /// Language code
    #[serde(rename = "Language_ID")]
    pub language_id: String,
    /// Feature identifier
    #[serde(rename = "Parameter_ID")]
    pub parameter_id: String,
    /// Value code
    #[serde(rename = "Value")]
    pub value: Code,
}

/// Legend entry naming one value code of a feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeRecord {
    /// Feature identifier
    #[serde(rename = "Parameter_ID")]
    pub parameter_id: String,
    /// Name of the value
    #[serde(rename = "Name")]
    pub name: String,
    /// Numeric code
    #[serde(rename = "Number")]
    pub number: Code,
}

/// All four WALS tables, read once at start-up.
#[derive(Debug, Clone, Default)]
pub struct WalsData {
    /// Languages
    pub languages: Vec<Language>,
    /// Features
    pub parameters: Vec<Parameter>,
    /// Observations
    pub values: Vec<ValueRecord>,
    /// Value-code legends
    pub codes: Vec<CodeRecord>,
}

impl WalsData {
    /// Assemble tables already in memory.
    pub fn new(
        languages: Vec<Language>,
        parameters: Vec<Parameter>,
        values: Vec<ValueRecord>,
        codes: Vec<CodeRecord>,
    ) -> Self {
        WalsData {
            languages,
            parameters,
            values,
            codes,
        }
    }

    /// Load the tables named by `config`.
    pub fn load(config: &DataConfig) -> Result<Self> {
        let dir = config.dir.as_path();
        log::info!("Loading WALS tables from {}", dir.display());
        let data = WalsData {
            languages: read_table(&dir.join(&config.languages_file))?,
            parameters: read_table(&dir.join(&config.parameters_file))?,
            values: read_table(&dir.join(&config.values_file))?,
            codes: read_table(&dir.join(&config.codes_file))?,
        };
        log::info!(
            "Loaded {} languages, {} features, {} values, {} codes",
            data.languages.len(),
            data.parameters.len(),
            data.values.len(),
            data.codes.len()
        );
        Ok(data)
    }

    /// Load the tables from a directory using the standard CLDF file names.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let config = DataConfig {
            dir: dir.as_ref().to_path_buf(),
            ..DataConfig::default()
        };
        Self::load(&config)
    }

    /// Presence matrix over every language and feature with an observation.
    pub fn presence_matrix(&self) -> Result<PresenceMatrix> {
        PresenceMatrix::from_pairs(
            self.values
                .iter()
                .map(|v| (v.language_id.as_str(), v.parameter_id.as_str())),
        )
    }

    /// Language by code
    pub fn language(&self, id: &str) -> Option<&Language> {
        self.languages.iter().find(|l| l.id == id)
    }

    /// Feature by identifier
    pub fn parameter(&self, id: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.id == id)
    }
}

fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.is_file() {
        return Err(WalsError::data_loading(format!(
            "File does not exist: {}",
            path.display()
        )));
    }
    let file = File::open(path).map_err(|e| {
        WalsError::data_loading(format!("Failed to open file {}: {}", path.display(), e))
    })?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut rows = Vec::new();
    for (line, record) in reader.deserialize().enumerate() {
        let row: T = record.map_err(|e| {
            WalsError::data_loading(format!(
                "{}: malformed record {}: {}",
                path.display(),
                line + 1,
                e
            ))
        })?;
        rows.push(row);
    }
    log::debug!("Read {} records from {}", rows.len(), path.display());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_tables(dir: &Path) {
        fs::write(
            dir.join("languages.csv"),
            "ID,Name,Macroarea,Latitude,Longitude,Glottocode,Family,Genus\n\
             eng,English,Eurasia,52.0,0.0,stan1293,Indo-European,Germanic\n\
             ain,Ainu,Eurasia,43.0,143.0,ainu1240,Ainu,Ainu\n\
             xxx,Nowhere,,,,,,\n",
        )
        .unwrap();
        fs::write(
            dir.join("parameters.csv"),
            "ID,Name,Description\n1A,Consonant Inventories,\n81A,Order of Subject Object and Verb,\n",
        )
        .unwrap();
        fs::write(
            dir.join("values.csv"),
            "ID,Language_ID,Parameter_ID,Value,Code_ID,Comment\n\
             1A-eng,eng,1A,3,1A-3,\n\
             81A-eng,eng,81A,2,81A-2,\n\
             81A-ain,ain,81A,1,81A-1,\n",
        )
        .unwrap();
        fs::write(
            dir.join("codes.csv"),
            "ID,Parameter_ID,Name,Description,Number,icon\n\
             81A-1,81A,SOV,,1,x\n\
             81A-2,81A,SVO,,2,y\n",
        )
        .unwrap();
    }

    #[test]
    fn test_load_dir() {
        let dir = TempDir::new().unwrap();
        write_tables(dir.path());
        let data = WalsData::load_dir(dir.path()).unwrap();

        assert_eq!(data.languages.len(), 3);
        assert_eq!(data.language("ain").unwrap().coordinates(), Some((43.0, 143.0)));
        assert_eq!(data.language("xxx").unwrap().coordinates(), None);
        assert_eq!(data.language("eng").unwrap().family.as_deref(), Some("Indo-European"));
        assert_eq!(data.parameters.len(), 2);
        assert_eq!(data.values[1].value, 2);
        assert_eq!(data.codes[0].name, "SOV");

        let presence = data.presence_matrix().unwrap();
        assert_eq!(presence.dim(), (2, 2));
        assert_eq!(presence.get("ain", "1A"), Some(&false));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = WalsData::load_dir(dir.path());
        assert!(matches!(result, Err(WalsError::DataLoading { .. })));
    }

    #[test]
    fn test_malformed_value() {
        let dir = TempDir::new().unwrap();
        write_tables(dir.path());
        fs::write(
            dir.path().join("values.csv"),
            "ID,Language_ID,Parameter_ID,Value\n1A-eng,eng,1A,many\n",
        )
        .unwrap();
        let err = WalsData::load_dir(dir.path()).unwrap_err();
        assert!(err.to_string().contains("malformed record 1"));
    }
}
