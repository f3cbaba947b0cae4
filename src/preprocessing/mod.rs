//! Numeric preparation of encoded samples: float conversion, constant-column
//! removal, min-max scaling and KNN imputation.

pub mod imputer;
pub mod scaler;

pub use imputer::{nan_euclidean, KnnImputer};
pub use scaler::{drop_constant_columns, to_float, MinMaxScaler};
