//! Error handling and error types for the WALS origins toolkit.

use std::io;
use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum WalsError {
    /// Reduction or modelling cannot proceed without exhausting the data
    #[error("Insufficient data: {message}")]
    InsufficientData { message: String },

    /// A transformer was used before it was fitted
    #[error("Not fitted: {component} must be fitted before transform")]
    NotFitted { component: String },

    /// A raw value lies outside a feature's declared domain
    #[error("Invalid code {code} for feature {feature} (expected -1 or 1..={domain})")]
    InvalidCode {
        feature: String,
        code: i32,
        domain: u32,
    },

    /// A feature has no configured treatment
    #[error("Unknown feature: {feature}")]
    UnknownFeature { feature: String },

    /// A binary target carries a single class
    #[error("Degenerate target {feature}: {reason}")]
    DegenerateTarget { feature: String, reason: String },

    /// Configuration and validation errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}, {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },

    /// Data loading and parsing errors
    #[error("Data loading error: {message}")]
    DataLoading { message: String },

    /// Row or column labels of a matrix are not unique
    #[error("Duplicate {axis} label: {label}")]
    DuplicateLabel { axis: &'static str, label: String },

    /// Dimension mismatch errors
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    /// Numerical computation errors (singular systems, NaN)
    #[error("Numerical error: {message}")]
    Numerical { message: String },

    /// File I/O errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// CSV parsing errors
    #[error("CSV parsing error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },

    /// JSON serialization errors
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// TOML parsing errors
    #[error("TOML error: {source}")]
    Toml {
        #[from]
        source: toml::de::Error,
    },
}

/// Type alias for Results using WalsError
pub type Result<T> = std::result::Result<T, WalsError>;

impl WalsError {
    /// Create an insufficient data error
    pub fn insufficient_data<S: Into<String>>(message: S) -> Self {
        WalsError::InsufficientData {
            message: message.into(),
        }
    }

    /// Create a not fitted error
    pub fn not_fitted<S: Into<String>>(component: S) -> Self {
        WalsError::NotFitted {
            component: component.into(),
        }
    }

    /// Create an invalid code error
    pub fn invalid_code<S: Into<String>>(feature: S, code: i32, domain: u32) -> Self {
        WalsError::InvalidCode {
            feature: feature.into(),
            code,
            domain,
        }
    }

    /// Create an unknown feature error
    pub fn unknown_feature<S: Into<String>>(feature: S) -> Self {
        WalsError::UnknownFeature {
            feature: feature.into(),
        }
    }

    /// Create a degenerate target error
    pub fn degenerate_target<F: Into<String>, R: Into<String>>(feature: F, reason: R) -> Self {
        WalsError::DegenerateTarget {
            feature: feature.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        WalsError::Config {
            message: message.into(),
        }
    }

    /// Create a data loading error
    pub fn data_loading<S: Into<String>>(message: S) -> Self {
        WalsError::DataLoading {
            message: message.into(),
        }
    }

    /// Create a numerical error
    pub fn numerical<S: Into<String>>(message: S) -> Self {
        WalsError::Numerical {
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter<P, V, R>(parameter: P, value: V, reason: R) -> Self
    where
        P: Into<String>,
        V: Into<String>,
        R: Into<String>,
    {
        WalsError::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch<E, A>(expected: E, actual: A) -> Self
    where
        E: Into<String>,
        A: Into<String>,
    {
        WalsError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Check if this error is recoverable by skipping the offending item.
    ///
    /// Batch loops such as the per-feature origin models use this to decide
    /// whether to log and continue or to abort.
    pub fn is_recoverable(&self) -> bool {
        match self {
            WalsError::DegenerateTarget { .. } => true,
            WalsError::UnknownFeature { .. } => true,
            WalsError::Numerical { .. } => true,
            WalsError::InsufficientData { .. }
            | WalsError::NotFitted { .. }
            | WalsError::InvalidCode { .. }
            | WalsError::Config { .. }
            | WalsError::InvalidParameter { .. }
            | WalsError::DataLoading { .. }
            | WalsError::DuplicateLabel { .. }
            | WalsError::DimensionMismatch { .. }
            | WalsError::Io { .. }
            | WalsError::Csv { .. }
            | WalsError::Json { .. }
            | WalsError::Toml { .. } => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            WalsError::InsufficientData { .. } => "insufficient_data",
            WalsError::NotFitted { .. } => "not_fitted",
            WalsError::InvalidCode { .. } => "invalid_code",
            WalsError::UnknownFeature { .. } => "unknown_feature",
            WalsError::DegenerateTarget { .. } => "degenerate_target",
            WalsError::Config { .. } => "config",
            WalsError::InvalidParameter { .. } => "invalid_parameter",
            WalsError::DataLoading { .. } => "data_loading",
            WalsError::DuplicateLabel { .. } => "duplicate_label",
            WalsError::DimensionMismatch { .. } => "dimension_mismatch",
            WalsError::Numerical { .. } => "numerical",
            WalsError::Io { .. } => "io",
            WalsError::Csv { .. } => "csv",
            WalsError::Json { .. } => "json",
            WalsError::Toml { .. } => "toml",
        }
    }
}

/// Convenience macros for error creation
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::core::error::WalsError::config($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::error::WalsError::config(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err.into());
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = WalsError::config("bad threshold");
        assert_eq!(err.category(), "config");
        assert!(!err.is_recoverable());

        let err = WalsError::degenerate_target("81A_1", "single class");
        assert_eq!(err.category(), "degenerate_target");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_error_display() {
        let err = WalsError::invalid_code("4A", 7, 4);
        assert_eq!(
            err.to_string(),
            "Invalid code 7 for feature 4A (expected -1 or 1..=4)"
        );

        let err = WalsError::not_fitted("OneHotEncoder(4A)");
        assert!(err.to_string().contains("OneHotEncoder(4A)"));
    }

    #[test]
    fn test_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.csv");
        let err: WalsError = io_error.into();
        assert_eq!(err.category(), "io");
    }

    #[test]
    fn test_macros() {
        fn check(value: usize) -> Result<()> {
            ensure!(value > 0, config_error!("value must be positive, got {}", value));
            Ok(())
        }

        assert!(check(1).is_ok());
        assert!(matches!(check(0), Err(WalsError::Config { .. })));
    }
}
