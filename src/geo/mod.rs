//! Geographic regions of sampled languages.
//!
//! Languages are grouped by DBSCAN over their coordinates and each cluster
//! label gets a display name.

pub mod dbscan;

pub use dbscan::{haversine, Clustering, Dbscan, NOISE};

use crate::config::ClusteringConfig;
use crate::core::error::Result;
use crate::sampling::Sample;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Display names of cluster labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionNames {
    names: BTreeMap<i32, String>,
}

impl RegionNames {
    /// Names for the given labels; others fall back to `Region {n}`.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = (i32, S)>,
        S: Into<String>,
    {
        RegionNames {
            names: names.into_iter().map(|(l, n)| (l, n.into())).collect(),
        }
    }

    /// Name of `label`.
    pub fn name(&self, label: i32) -> String {
        match self.names.get(&label) {
            Some(name) => name.clone(),
            None if label == NOISE => "Outlier".to_string(),
            None => format!("Region {}", label),
        }
    }
}

impl Default for RegionNames {
    /// Regions found by clustering the 280-language sample at 0.12 rad.
    fn default() -> Self {
        RegionNames::new([
            (NOISE, "Outlier"),
            (0, "Paraguay"),
            (1, "Caucasus"),
            (2, "USA/Canada"),
            (3, "Africa"),
            (4, "New Guinea"),
            (5, "Europe"),
            (6, "Andes/Amazon"),
            (7, "Southeast Asia"),
            (8, "Taiwan"),
            (9, "Pakistan"),
            (10, "Mexico"),
            (11, "West Russia"),
            (12, "Melanesia"),
            (13, "Australia"),
            (14, "Indonesia/Malaysia"),
        ])
    }
}

/// Region of every language of a sample.
#[derive(Debug, Clone, Serialize)]
pub struct Regions {
    /// Language codes, in sample row order
    pub language_ids: Vec<String>,
    /// Raw cluster labels
    pub clustering: Clustering,
    /// Region name per language
    pub names: Vec<String>,
}

impl Regions {
    /// Region name of a language
    pub fn region_of(&self, language: &str) -> Option<&str> {
        self.language_ids
            .iter()
            .position(|id| id == language)
            .map(|i| self.names[i].as_str())
    }
}

/// Cluster the languages of `sample` by location.
///
/// Every language needs coordinates.
pub fn cluster_sample(
    sample: &Sample,
    config: &ClusteringConfig,
    names: &RegionNames,
) -> Result<Regions> {
    let coordinates = sample.coordinates()?;
    let clustering = Dbscan::new(config)?.fit_degrees(&coordinates)?;
    let region_names = clustering.labels.iter().map(|&l| names.name(l)).collect();
    Ok(Regions {
        language_ids: sample.language_ids().to_vec(),
        clustering,
        names: region_names,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_names() {
        let names = RegionNames::default();
        assert_eq!(names.name(-1), "Outlier");
        assert_eq!(names.name(5), "Europe");
        assert_eq!(names.name(14), "Indonesia/Malaysia");
        assert_eq!(names.name(15), "Region 15");

        let custom = RegionNames::new([(0, "North")]);
        assert_eq!(custom.name(0), "North");
        assert_eq!(custom.name(-1), "Outlier");
    }
}
