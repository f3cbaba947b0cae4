//! Input tables and the labelled matrices built from them.
//!
//! - [`tables`]: the four WALS CSV tables
//! - [`table`]: [`LabeledMatrix`], the matrix type used throughout the pipeline
//! - [`presence`]: boolean presence matrices, density and coverage

pub mod presence;
pub mod table;
pub mod tables;

pub use presence::PresenceMatrix;
pub use table::LabeledMatrix;
pub use tables::{CodeRecord, Language, Parameter, ValueRecord, WalsData};

use crate::core::types::Code;

/// Integer-coded language × feature values, `-1` where unattested.
pub type ValueMatrix = LabeledMatrix<Code>;
