//! Per-feature results of origin models and their tabular reports.

use crate::core::error::{Result, WalsError};
use crate::origins::metrics::odds_shift;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::path::Path;

/// Fit summary of one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginResult {
    /// Column identifier, e.g. `81A_1`
    pub feature: String,
    /// Report name, e.g. `order__SOV`
    pub name: String,
    /// Score on the training set
    pub train_score: f64,
    /// Score on the testing set
    pub test_score: f64,
    /// Rate (or mean value) over all languages
    pub observed_rate: f64,
    /// Model prediction for a language with no family or region
    pub innate_rate: f64,
    /// Coefficient per origin category
    pub coefficients: Vec<(String, f64)>,
}

impl OriginResult {
    /// Odds of the observed rate over the odds of the innate rate
    pub fn odds_shift(&self) -> f64 {
        odds_shift(self.innate_rate, self.observed_rate)
    }

    /// Natural log of [`odds_shift`](Self::odds_shift)
    pub fn log_odds_shift(&self) -> f64 {
        self.odds_shift().ln()
    }

    /// Coefficient of an origin category
    pub fn coefficient(&self, category: &str) -> Option<f64> {
        self.coefficients
            .iter()
            .find(|(name, _)| name == category)
            .map(|&(_, value)| value)
    }
}

impl fmt::Display for OriginResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Feature {}:", self.name)?;
        writeln!(f, "    Training score: {}", significant(self.train_score))?;
        writeln!(f, "    Testing score: {}", significant(self.test_score))?;
        writeln!(f, "    Observed rate: {}", significant(self.observed_rate))?;
        writeln!(f, "    Inferred innate rate: {}", significant(self.innate_rate))?;
        write!(f, "    Coefficients:")?;
        let width = self
            .coefficients
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0);
        for (name, value) in &self.coefficients {
            write!(f, "\n        {:<width$}: {}", name, significant(*value), width = width)?;
        }
        Ok(())
    }
}

/// Three significant digits, switching to exponent form for very large or
/// very small magnitudes.
fn significant(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{}", value);
    }
    let exponent = value.abs().log10().floor() as i32;
    if !(-4..3).contains(&exponent) {
        return format!("{:.2e}", value);
    }
    let decimals = (2 - exponent).max(0) as usize;
    let text = format!("{:.*}", decimals, value);
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

/// Rows of one model family, in feature order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginReport {
    rows: Vec<OriginResult>,
}

impl OriginReport {
    /// Report over `rows`
    pub fn new(rows: Vec<OriginResult>) -> Self {
        OriginReport { rows }
    }

    /// All rows
    pub fn rows(&self) -> &[OriginResult] {
        &self.rows
    }

    /// Row of a feature column
    pub fn get(&self, feature: &str) -> Option<&OriginResult> {
        self.rows.iter().find(|r| r.feature == feature)
    }

    /// Write the report as CSV: one row per feature, one column per score,
    /// rate and origin coefficient.
    pub fn to_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        let categories: Vec<&str> = self
            .rows
            .first()
            .map(|r| r.coefficients.iter().map(|(n, _)| n.as_str()).collect())
            .unwrap_or_default();

        let mut header = vec![
            "feature",
            "training_score",
            "testing_score",
            "observed_rate",
            "innate_rate",
            "odds_shift",
            "log_odds_shift",
        ];
        header.extend(categories.iter().copied());
        csv.write_record(&header)?;

        for row in &self.rows {
            let mut record = vec![
                row.name.clone(),
                row.train_score.to_string(),
                row.test_score.to_string(),
                row.observed_rate.to_string(),
                row.innate_rate.to_string(),
                row.odds_shift().to_string(),
                row.log_odds_shift().to_string(),
            ];
            for category in &categories {
                let value = row
                    .coefficient(category)
                    .map(|v| v.to_string())
                    .unwrap_or_default();
                record.push(value);
            }
            csv.write_record(&record)?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Write the CSV report to `path`.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path.as_ref()).map_err(|e| {
            WalsError::data_loading(format!(
                "Failed to create {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        self.to_csv(file)?;
        log::info!("Wrote {} rows to {}", self.rows.len(), path.as_ref().display());
        Ok(())
    }

    /// Pretty-printed JSON of every row.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn result() -> OriginResult {
        OriginResult {
            feature: "81A_1".to_string(),
            name: "order__SOV".to_string(),
            train_score: 0.12345,
            test_score: -0.0004567,
            observed_rate: 0.75,
            innate_rate: 0.5,
            coefficients: vec![("Indo-European".to_string(), 1.5), ("Africa".to_string(), -0.25)],
        }
    }

    #[test]
    fn test_odds_shift() {
        let r = result();
        assert_abs_diff_eq!(r.odds_shift(), 3.0);
        assert_abs_diff_eq!(r.log_odds_shift(), 3f64.ln());
        assert_eq!(r.coefficient("Africa"), Some(-0.25));
        assert_eq!(r.coefficient("Europe"), None);
    }

    #[test]
    fn test_significant() {
        assert_eq!(significant(0.12345), "0.123");
        assert_eq!(significant(12.345), "12.3");
        assert_eq!(significant(0.5), "0.5");
        assert_eq!(significant(-0.0004567), "-0.000457");
        assert_eq!(significant(-0.00004567), "-4.57e-5");
        assert_eq!(significant(1234.0), "1.23e3");
        assert_eq!(significant(0.0), "0");
    }

    #[test]
    fn test_display() {
        let text = result().to_string();
        assert!(text.starts_with("Feature order__SOV:\n    Training score: 0.123\n"));
        assert!(text.contains("Inferred innate rate: 0.5"));
        assert!(text.ends_with("        Africa       : -0.25"));
    }

    #[test]
    fn test_csv() {
        let report = OriginReport::new(vec![result()]);
        let mut buffer = Vec::new();
        report.to_csv(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "feature,training_score,testing_score,observed_rate,innate_rate,odds_shift,log_odds_shift,Indo-European,Africa"
        );
        assert!(lines.next().unwrap().starts_with("order__SOV,0.12345,"));
        assert!(report.to_json().unwrap().contains("\"feature\": \"81A_1\""));
    }
}
