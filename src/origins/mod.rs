//! How much of each feature is explained by genealogy and geography.
//!
//! Every encoded column of an imputed sample is regressed on the one-hot
//! family and region of its languages. Binary columns get a logistic model
//! scored against the base rate; ordinal columns get a joint ridge model
//! scored by R². The intercept gives the rate a language would show with
//! no family or regional pull, and [`odds_shift`] compares it with the rate
//! actually observed.

pub mod dataset;
pub mod metrics;
pub mod models;
pub mod report;

pub use dataset::{k_folds, OriginDataset, OriginTable, UNKNOWN_FAMILY};
pub use metrics::{log_loss, log_odds_vs_baseline, odds, odds_shift, r2_score};
pub use models::{LogisticRegression, RidgeRegression};
pub use report::{OriginReport, OriginResult};
