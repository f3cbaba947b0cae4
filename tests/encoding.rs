//! Encoding properties over the built-in treatment table.

use ndarray::Array2;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use wals_origins::core::types::{Code, UnknownFeaturePolicy};
use wals_origins::encoding::{FeatureSpec, FeatureTreatment};
use wals_origins::{ColumnTransformer, LabeledMatrix, TreatmentTable, ValueMatrix, MISSING_CODE};

fn one_hot_features(table: &TreatmentTable) -> Vec<(String, u32, BTreeMap<Code, Vec<Code>>)> {
    table
        .iter()
        .filter_map(|spec| match &spec.treatment {
            FeatureTreatment::OneHot {
                domain,
                redistribute,
            } => Some((spec.id.clone(), *domain, redistribute.clone())),
            FeatureTreatment::Ordinal { .. } => None,
        })
        .collect()
}

fn single_column(feature: &str, codes: &[Code]) -> ValueMatrix {
    let rows = (0..codes.len()).map(|i| format!("l{}", i)).collect();
    let values = Array2::from_shape_vec((codes.len(), 1), codes.to_vec()).unwrap();
    LabeledMatrix::new(rows, vec![feature.to_string()], values).unwrap()
}

#[test]
fn test_default_table_has_one_hot_features() {
    let table = TreatmentTable::wals_default().unwrap();
    let features = one_hot_features(&table);
    assert!(!features.is_empty());
    assert!(features.iter().any(|(_, _, redistribute)| !redistribute.is_empty()));
}

proptest! {
    #[test]
    fn one_hot_rows_sum_to_their_target_count(
        pick in any::<prop::sample::Index>(),
        raw in proptest::collection::vec(0u32..64, 1..30),
    ) {
        let table = Arc::new(TreatmentTable::wals_default().unwrap());
        let features = one_hot_features(&table);
        let (feature, domain, redistribute) = &features[pick.index(features.len())];
        let codes: Vec<Code> = raw
            .iter()
            .map(|&r| if r % 5 == 0 { MISSING_CODE } else { (r % domain) as Code + 1 })
            .collect();

        let mut transformer = ColumnTransformer::new(Arc::clone(&table), UnknownFeaturePolicy::Error);
        let encoded = transformer.fit_transform(&single_column(feature, &codes)).unwrap();

        let restored: BTreeSet<Code> = redistribute.values().flatten().copied().collect();
        let removed = redistribute.keys().filter(|k| !restored.contains(k)).count();
        prop_assert_eq!(encoded.ncols(), *domain as usize - removed);

        for (row, &code) in codes.iter().enumerate() {
            let cells = encoded.values().row(row).to_vec();
            if code == MISSING_CODE {
                prop_assert!(cells.iter().all(|&v| v == MISSING_CODE));
                continue;
            }
            prop_assert!(cells.iter().all(|&v| v == 0 || v == 1));
            let expected = match redistribute.get(&code) {
                Some(targets) => targets.iter().collect::<BTreeSet<_>>().len(),
                None => 1,
            };
            prop_assert_eq!(cells.iter().filter(|&&v| v == 1).count(), expected);
            if !redistribute.contains_key(&code) {
                let own = format!("{}_{}", feature, code);
                let c = encoded.col_position(&own).unwrap();
                prop_assert_eq!(cells[c], 1);
            }
        }
    }

    #[test]
    fn ordinal_without_recode_is_identity(
        codes in proptest::collection::vec(prop_oneof![Just(MISSING_CODE), 1..10i32], 1..30),
    ) {
        let spec = FeatureSpec::new("1A", FeatureTreatment::ordinal(Vec::new()).unwrap());
        let table = Arc::new(TreatmentTable::new(vec![spec]).unwrap());
        let mut transformer = ColumnTransformer::new(table, UnknownFeaturePolicy::Error);

        let values = single_column("1A", &codes);
        let encoded = transformer.fit_transform(&values).unwrap();
        prop_assert_eq!(encoded, values);
    }

    #[test]
    fn ordinal_recode_rewrites_only_listed_codes(
        codes in proptest::collection::vec(prop_oneof![Just(MISSING_CODE), 1..6i32], 1..30),
    ) {
        let spec = FeatureSpec::new("9A", FeatureTreatment::ordinal(vec![(1, 4), (5, 2)]).unwrap());
        let table = Arc::new(TreatmentTable::new(vec![spec]).unwrap());
        let mut transformer = ColumnTransformer::new(table, UnknownFeaturePolicy::Error);

        let encoded = transformer.fit_transform(&single_column("9A", &codes)).unwrap();
        for (row, &code) in codes.iter().enumerate() {
            let expected = match code {
                1 => 4,
                5 => 2,
                other => other,
            };
            prop_assert_eq!(encoded.values()[[row, 0]], expected);
        }
    }
}

#[test]
fn test_unknown_features_are_skipped_by_default_policy() {
    let table = Arc::new(TreatmentTable::wals_default().unwrap());
    let rows = vec!["a".to_string(), "b".to_string()];
    let values = LabeledMatrix::new(
        rows,
        vec!["1A".to_string(), "999Z".to_string()],
        ndarray::array![[1, 2], [3, -1]],
    )
    .unwrap();

    let mut transformer = ColumnTransformer::new(table, UnknownFeaturePolicy::Skip);
    let encoded = transformer.fit_transform(&values).unwrap();
    assert_eq!(encoded.col_labels(), &["1A"]);
}
