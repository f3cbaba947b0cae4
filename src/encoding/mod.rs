//! Feature encoding.
//!
//! - [`treatment`]: the declarative per-feature rules and their TOML form
//! - [`encoders`]: ordinal and one-hot encoders for a single feature
//! - [`column`]: the dispatcher that encodes a whole value matrix

pub mod column;
pub mod encoders;
pub mod treatment;

pub use column::{ColumnTransformer, EncodedMatrix};
pub use encoders::{FeatureEncoder, OneHotEncoder, OrdinalEncoder};
pub use treatment::{FeatureSpec, FeatureTreatment, TreatmentTable};
