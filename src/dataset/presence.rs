//! Boolean language × feature presence matrices.

use crate::core::error::Result;
use crate::dataset::table::LabeledMatrix;
use ndarray::{Array1, Array2, Axis};
use std::collections::{BTreeSet, HashSet};

/// Cell `(language, feature)` is true when the language has a recorded
/// value for the feature.
pub type PresenceMatrix = LabeledMatrix<bool>;

impl LabeledMatrix<bool> {
    /// Crosstab `(language, feature)` observation pairs.
    ///
    /// Rows and columns come out in sorted label order.
    pub fn from_pairs<I, L, F>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (L, F)>,
        L: AsRef<str>,
        F: AsRef<str>,
    {
        let mut observed: HashSet<(String, String)> = HashSet::new();
        let mut languages = BTreeSet::new();
        let mut features = BTreeSet::new();
        for (language, feature) in pairs {
            let language = language.as_ref().to_string();
            let feature = feature.as_ref().to_string();
            languages.insert(language.clone());
            features.insert(feature.clone());
            observed.insert((language, feature));
        }
        let languages: Vec<String> = languages.into_iter().collect();
        let features: Vec<String> = features.into_iter().collect();

        let mut values = Array2::from_elem((languages.len(), features.len()), false);
        for (r, language) in languages.iter().enumerate() {
            for (c, feature) in features.iter().enumerate() {
                if observed.contains(&(language.clone(), feature.clone())) {
                    values[[r, c]] = true;
                }
            }
        }
        LabeledMatrix::new(languages, features, values)
    }

    /// Number of true cells
    pub fn count_present(&self) -> usize {
        self.values().iter().filter(|&&v| v).count()
    }

    /// Fraction of true cells, `None` for an empty matrix.
    pub fn density(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        Some(self.count_present() as f64 / (self.nrows() * self.ncols()) as f64)
    }

    /// Languages attesting each feature (column sums).
    pub fn column_coverage(&self) -> Array1<usize> {
        self.values()
            .map(|&v| v as usize)
            .sum_axis(Axis(0))
    }

    /// Features attested by each language (row sums).
    pub fn row_coverage(&self) -> Array1<usize> {
        self.values()
            .map(|&v| v as usize)
            .sum_axis(Axis(1))
    }

    /// Reorder rows and columns by descending coverage.
    ///
    /// The sort is stable, so equal-coverage rows and columns keep their
    /// relative order and the result is deterministic.
    pub fn sort_by_coverage(&self) -> Self {
        let rows = descending_order(&self.row_coverage());
        let cols = descending_order(&self.column_coverage());
        self.select(&rows, &cols)
    }
}

fn descending_order(coverage: &Array1<usize>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..coverage.len()).collect();
    order.sort_by(|&a, &b| coverage[b].cmp(&coverage[a]));
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> PresenceMatrix {
        PresenceMatrix::from_pairs(vec![
            ("eng", "1A"),
            ("eng", "2A"),
            ("fre", "2A"),
            ("ger", "1A"),
            ("ger", "2A"),
            ("ger", "3A"),
            ("ger", "3A"),
        ])
        .unwrap()
    }

    #[test]
    fn test_from_pairs_sorted_and_deduplicated() {
        let m = matrix();
        assert_eq!(m.row_labels(), &["eng", "fre", "ger"]);
        assert_eq!(m.col_labels(), &["1A", "2A", "3A"]);
        assert_eq!(m.count_present(), 6);
        assert_eq!(m.get("fre", "1A"), Some(&false));
    }

    #[test]
    fn test_density() {
        let m = matrix();
        assert!((m.density().unwrap() - 6.0 / 9.0).abs() < 1e-12);

        let empty = m.select(&[], &[0, 1]);
        assert_eq!(empty.density(), None);
    }

    #[test]
    fn test_coverage() {
        let m = matrix();
        assert_eq!(m.column_coverage().to_vec(), vec![2, 3, 1]);
        assert_eq!(m.row_coverage().to_vec(), vec![2, 1, 3]);
    }

    #[test]
    fn test_sort_by_coverage_is_stable() {
        let m = PresenceMatrix::from_pairs(vec![("a", "f1"), ("b", "f2"), ("c", "f1"), ("c", "f2")]).unwrap();
        let sorted = m.sort_by_coverage();
        assert_eq!(sorted.row_labels(), &["c", "a", "b"]);
        assert_eq!(sorted.col_labels(), &["f1", "f2"]);
        assert_eq!(sorted.count_present(), m.count_present());
    }
}
