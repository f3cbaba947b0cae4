//! DBSCAN over geographic coordinates.

use crate::config::ClusteringConfig;
use crate::core::error::{Result, WalsError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Label of points that belong to no cluster.
pub const NOISE: i32 = -1;

/// Great-circle angle in radians between two `(latitude, longitude)`
/// points given in radians.
pub fn haversine(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lat1, lon1) = a;
    let (lat2, lon2) = b;
    let dlat = (lat2 - lat1) / 2.0;
    let dlon = (lon2 - lon1) / 2.0;
    let h = dlat.sin().powi(2) + lat1.cos() * lat2.cos() * dlon.sin().powi(2);
    2.0 * h.sqrt().min(1.0).asin()
}

/// Cluster labels of one DBSCAN run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clustering {
    /// Label per input point, [`NOISE`] for outliers
    pub labels: Vec<i32>,
    /// Number of clusters found
    pub n_clusters: usize,
    /// Number of noise points
    pub n_noise: usize,
}

/// Density-based clustering with the haversine metric.
///
/// A point with at least `min_samples` points (itself included) within
/// `eps` radians is a core point. Clusters grow from core points and are
/// numbered in the order their first core point appears in the input.
#[derive(Debug, Clone)]
pub struct Dbscan {
    eps: f64,
    min_samples: usize,
}

impl Dbscan {
    /// Create a clusterer, validating the configuration.
    pub fn new(config: &ClusteringConfig) -> Result<Self> {
        config.validate()?;
        Ok(Dbscan {
            eps: config.eps,
            min_samples: config.min_samples,
        })
    }

    fn region_query(points: &[(f64, f64)], i: usize, eps: f64) -> Vec<usize> {
        (0..points.len())
            .filter(|&j| haversine(points[i], points[j]) <= eps)
            .collect()
    }

    /// Cluster `(latitude, longitude)` points given in degrees.
    pub fn fit_degrees(&self, points: &[(f64, f64)]) -> Result<Clustering> {
        let radians: Vec<(f64, f64)> = points
            .iter()
            .map(|&(lat, lon)| (lat.to_radians(), lon.to_radians()))
            .collect();
        self.fit(&radians)
    }

    /// Cluster `(latitude, longitude)` points given in radians.
    pub fn fit(&self, points: &[(f64, f64)]) -> Result<Clustering> {
        if let Some(bad) = points
            .iter()
            .position(|&(lat, lon)| !lat.is_finite() || !lon.is_finite())
        {
            return Err(WalsError::invalid_parameter(
                "points",
                format!("{:?}", points[bad]),
                "coordinates must be finite",
            ));
        }

        let neighbors: Vec<Vec<usize>> = (0..points.len())
            .into_par_iter()
            .map(|i| Self::region_query(points, i, self.eps))
            .collect();
        let is_core: Vec<bool> = neighbors
            .iter()
            .map(|n| n.len() >= self.min_samples)
            .collect();

        let mut labels = vec![NOISE; points.len()];
        let mut cluster: i32 = 0;
        for i in 0..points.len() {
            if labels[i] != NOISE || !is_core[i] {
                continue;
            }
            labels[i] = cluster;
            let mut queue = neighbors[i].clone();
            let mut head = 0;
            while head < queue.len() {
                let q = queue[head];
                head += 1;
                if labels[q] == NOISE {
                    labels[q] = cluster;
                }
                if !is_core[q] {
                    continue;
                }
                for &n in &neighbors[q] {
                    if labels[n] == NOISE {
                        labels[n] = cluster;
                        queue.push(n);
                    }
                }
            }
            cluster += 1;
        }

        let n_noise = labels.iter().filter(|&&l| l == NOISE).count();
        log::info!(
            "DBSCAN found {} cluster(s) and {} outlier(s) among {} points",
            cluster,
            n_noise,
            points.len()
        );
        Ok(Clustering {
            labels,
            n_clusters: cluster as usize,
            n_noise,
        })
    }
}
