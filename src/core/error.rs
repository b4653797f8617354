//! Error handling and error types for greedy-logit.
//!
//! Every fallible operation in the library returns [`Result`], so a failure
//! anywhere in a run propagates up and aborts that run.

use std::io;
use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum GreedyLogitError {
    /// Configuration and validation errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Dataset-related errors
    #[error("Dataset error: {message}")]
    Dataset {
        /// Error message
        message: String,
    },

    /// Data loading and parsing errors
    #[error("Data loading error: {message}")]
    DataLoading {
        /// Error message
        message: String,
    },

    /// Model fitting errors
    #[error("Training error: {message}")]
    Training {
        /// Error message
        message: String,
    },

    /// Prediction errors
    #[error("Prediction error: {message}")]
    Prediction {
        /// Error message
        message: String,
    },

    /// Numerical computation errors (overflow, NaN, degenerate folds)
    #[error("Numerical error: {message}")]
    Numerical {
        /// Error message
        message: String,
    },

    /// Worker pool errors
    #[error("Threading error: {message}")]
    Threading {
        /// Error message
        message: String,
    },

    /// File I/O errors
    #[error("I/O error: {source}")]
    IO {
        /// Underlying error
        #[from]
        source: io::Error,
    },

    /// CSV parsing errors
    #[error("CSV parsing error: {source}")]
    Csv {
        /// Underlying error
        #[from]
        source: csv::Error,
    },

    /// JSON configuration errors
    #[error("JSON error: {source}")]
    Json {
        /// Underlying error
        #[from]
        source: serde_json::Error,
    },

    /// TOML configuration errors
    #[error("TOML error: {source}")]
    Toml {
        /// Underlying error
        #[from]
        source: toml::de::Error,
    },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}, {reason}")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Rejected value
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// Dimension mismatch errors
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected shape
        expected: String,
        /// Shape found
        actual: String,
    },
}

/// Type alias for Results using GreedyLogitError
pub type Result<T> = std::result::Result<T, GreedyLogitError>;

impl GreedyLogitError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        GreedyLogitError::Config {
            message: message.into(),
        }
    }

    /// Create a dataset error
    pub fn dataset<S: Into<String>>(message: S) -> Self {
        GreedyLogitError::Dataset {
            message: message.into(),
        }
    }

    /// Create a data loading error
    pub fn data_loading<S: Into<String>>(message: S) -> Self {
        GreedyLogitError::DataLoading {
            message: message.into(),
        }
    }

    /// Create a training error
    pub fn training<S: Into<String>>(message: S) -> Self {
        GreedyLogitError::Training {
            message: message.into(),
        }
    }

    /// Create a prediction error
    pub fn prediction<S: Into<String>>(message: S) -> Self {
        GreedyLogitError::Prediction {
            message: message.into(),
        }
    }

    /// Create a numerical error
    pub fn numerical<S: Into<String>>(message: S) -> Self {
        GreedyLogitError::Numerical {
            message: message.into(),
        }
    }

    /// Create a threading error
    pub fn threading<S: Into<String>>(message: S) -> Self {
        GreedyLogitError::Threading {
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
        GreedyLogitError::InvalidParameter {
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
        GreedyLogitError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            GreedyLogitError::Config { .. } => "config",
            GreedyLogitError::Dataset { .. } => "dataset",
            GreedyLogitError::DataLoading { .. } => "data_loading",
            GreedyLogitError::Training { .. } => "training",
            GreedyLogitError::Prediction { .. } => "prediction",
            GreedyLogitError::Numerical { .. } => "numerical",
            GreedyLogitError::Threading { .. } => "threading",
            GreedyLogitError::IO { .. } => "io",
            GreedyLogitError::Csv { .. } => "csv",
            GreedyLogitError::Json { .. } => "json",
            GreedyLogitError::Toml { .. } => "toml",
            GreedyLogitError::InvalidParameter { .. } => "invalid_parameter",
            GreedyLogitError::DimensionMismatch { .. } => "dimension_mismatch",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = GreedyLogitError::config("bad grid");
        assert_eq!(err.category(), "config");

        let err = GreedyLogitError::training("diverged");
        assert_eq!(err.category(), "training");
    }

    #[test]
    fn test_parameter_errors() {
        let err = GreedyLogitError::invalid_parameter("c", "-1", "must be positive");
        assert_eq!(err.category(), "invalid_parameter");
        let message = err.to_string();
        assert!(message.contains("c = -1"));
        assert!(message.contains("must be positive"));
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = GreedyLogitError::dimension_mismatch("10 rows", "9 rows");
        assert_eq!(err.category(), "dimension_mismatch");
        assert_eq!(
            err.to_string(),
            "Dimension mismatch: expected 10 rows, got 9 rows"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: GreedyLogitError = io_err.into();
        assert!(matches!(err, GreedyLogitError::IO { .. }));
        assert_eq!(err.category(), "io");
    }

    #[test]
    fn test_variant_fields() {
        match GreedyLogitError::invalid_parameter("tol", "0", "must be positive") {
            GreedyLogitError::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                assert_eq!(parameter, "tol");
                assert_eq!(value, "0");
                assert_eq!(reason, "must be positive");
            }
            other => panic!("unexpected error: {}", other),
        }
        match GreedyLogitError::numerical("nan loss") {
            GreedyLogitError::Numerical { message } => assert_eq!(message, "nan loss"),
            other => panic!("unexpected error: {}", other),
        }
    }
}
