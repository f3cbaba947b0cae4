//! Common test utilities for WALS origins integration tests.

#![allow(dead_code)]

use ndarray::Array2;
use rand::prelude::*;
use serde::Serialize;
use std::path::Path;
use wals_origins::dataset::{CodeRecord, Language, Parameter, ValueRecord};
use wals_origins::{LabeledMatrix, PresenceMatrix, WalsData};

/// Number of languages in the synthetic atlas
pub const NUM_LANGUAGES: usize = 120;

/// Features attested by most languages, in column index order
pub const MAIN_FEATURES: [&str; 7] = ["1A", "2A", "81A", "82A", "83A", "95A", "143E"];

/// Rarely attested features, reduced away at any useful density
pub const SPARSE_FEATURES: [&str; 2] = ["30A", "31A"];

const FAMILIES: [&str; 3] = ["Alpha", "Beta", "Gamma"];
const CENTERS: [(f64, f64); 4] = [(10.0, 10.0), (45.0, 60.0), (-20.0, -60.0), (0.0, 120.0)];

/// Language code of the `i`-th synthetic language
pub fn language_id(i: usize) -> String {
    format!("l{:03}", i)
}

/// Whether language `i` attests main feature `j`.
pub fn attests(i: usize, j: usize) -> bool {
    (i + 2 * j) % 13 != 0
}

fn family(i: usize) -> usize {
    i % 3
}

fn center(i: usize) -> usize {
    i % 4
}

/// Value of main feature `j` for language `i`.
///
/// Word order (81A) follows the family; the rest mixes family, region and
/// position so that every encoded column varies.
pub fn feature_value(i: usize, j: usize) -> i32 {
    let order = match family(i) {
        0 if i % 5 == 0 => 2,
        0 => 1,
        1 => 2,
        _ if center(i) % 2 == 0 => 1,
        _ => 3,
    };
    match j {
        0 => 1 + ((family(i) * 2 + i % 2) % 5) as i32,
        1 => 1 + ((center(i) + i / 7) % 3) as i32,
        2 => order,
        3 => if i % 4 == 3 { 2 } else { 1 },
        4 => if order == 1 { 1 } else { 2 },
        5 => 1 + (i % 4) as i32,
        _ => 1 + (i % 2) as i32,
    }
}

/// A 120-language atlas with three families and four geographic centres.
///
/// Coordinates are jittered with a seeded RNG; everything else is a
/// deterministic function of the language index.
pub fn synthetic_data() -> WalsData {
    let mut rng = StdRng::seed_from_u64(42);

    let languages = (0..NUM_LANGUAGES)
        .map(|i| {
            let (lat, lon) = CENTERS[center(i)];
            Language {
                id: language_id(i),
                name: format!("Language {}", i),
                latitude: Some(lat + rng.gen_range(-1.5..1.5)),
                longitude: Some(lon + rng.gen_range(-1.5..1.5)),
                family: Some(FAMILIES[family(i)].to_string()),
                genus: None,
                macroarea: None,
            }
        })
        .collect();

    let parameters = MAIN_FEATURES
        .iter()
        .chain(SPARSE_FEATURES.iter())
        .map(|id| Parameter {
            id: id.to_string(),
            name: format!("Feature {}", id),
        })
        .collect();

    let mut values = Vec::new();
    for i in 0..NUM_LANGUAGES {
        for (j, feature) in MAIN_FEATURES.iter().enumerate() {
            if attests(i, j) {
                values.push(record(i, feature, feature_value(i, j)));
            }
        }
        if i % 6 == 0 {
            values.push(record(i, "30A", 1 + (i % 2) as i32));
        }
        if i % 8 == 0 {
            values.push(record(i, "31A", 1));
        }
    }

    let codes = vec![
        code("81A", "SOV", 1),
        code("81A", "SVO", 2),
        code("81A", "VSO", 3),
        code("82A", "SV", 1),
        code("82A", "VS", 2),
        code("1A", "Small", 1),
        code("1A", "Large", 5),
    ];

    WalsData::new(languages, parameters, values, codes)
}

fn record(i: usize, feature: &str, value: i32) -> ValueRecord {
    ValueRecord {
        language_id: language_id(i),
        parameter_id: feature.to_string(),
        value,
    }
}

fn code(feature: &str, name: &str, number: i32) -> CodeRecord {
    CodeRecord {
        parameter_id: feature.to_string(),
        name: name.to_string(),
        number,
    }
}

fn write_table<T: Serialize>(path: &Path, rows: &[T]) {
    let mut writer = csv::Writer::from_path(path).unwrap();
    for row in rows {
        writer.serialize(row).unwrap();
    }
    writer.flush().unwrap();
}

/// Write `data` as the four CLDF CSV files into `dir`.
pub fn write_cldf(dir: &Path, data: &WalsData) {
    write_table(&dir.join("languages.csv"), &data.languages);
    write_table(&dir.join("parameters.csv"), &data.parameters);
    write_table(&dir.join("values.csv"), &data.values);
    write_table(&dir.join("codes.csv"), &data.codes);
}

/// Presence matrix with labels `l0..` and `f0..`.
pub fn presence(values: Array2<bool>) -> PresenceMatrix {
    let rows = (0..values.nrows()).map(|i| format!("l{}", i)).collect();
    let cols = (0..values.ncols()).map(|j| format!("f{}", j)).collect();
    LabeledMatrix::new(rows, cols, values).unwrap()
}
