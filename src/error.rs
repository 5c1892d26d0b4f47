//! Error types for model comparison

use thiserror::Error;

/// Result type alias for comparison operations
pub type Result<T> = std::result::Result<T, CompareError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum CompareError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Model '{0}' has not been cross-validated yet")]
    NotCrossValidated(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Plot error: {0}")]
    PlotError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<polars::error::PolarsError> for CompareError {
    fn from(err: polars::error::PolarsError) -> Self {
        CompareError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for CompareError {
    fn from(err: serde_json::Error) -> Self {
        CompareError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for CompareError {
    fn from(err: ndarray::ShapeError) -> Self {
        CompareError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CompareError::NotCrossValidated("forest".to_string());
        assert_eq!(err.to_string(), "Model 'forest' has not been cross-validated yet");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CompareError = io_err.into();
        assert!(matches!(err, CompareError::IoError(_)));
    }

    #[test]
    fn test_shape_error_display() {
        let err = CompareError::ShapeError {
            expected: "20 labels".to_string(),
            actual: "19 labels".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid shape: expected 20 labels, got 19 labels");
    }
}
