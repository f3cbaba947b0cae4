//! Core infrastructure: error types, constants and shared enumerations.
//!
//! - [`types`]: fundamental types and enumerations
//! - [`constants`]: the missing marker and configuration defaults
//! - [`error`]: error handling and error types

pub mod constants;
pub mod error;
pub mod types;

pub use constants::*;
pub use error::{Result, WalsError};
pub use types::*;

/// Initialize the logging subsystem at the given verbosity.
///
/// `RUST_LOG` takes precedence when set. Calling this more than once is
/// harmless: later calls leave the installed logger untouched.
pub fn init_logging(verbosity: VerbosityLevel) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(verbosity.level_filter());
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }
    let _ = builder.try_init();
}
