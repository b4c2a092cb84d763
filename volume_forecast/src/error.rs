//! Error types for the volume_forecast crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the volume_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// A required input (history window, oracle output, actuals) is empty or unavailable
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// A produced curve or horizon broke one of its ordering guarantees
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error reading or parsing configuration
    #[error("Config error: {0}")]
    ConfigError(String),

    /// Error from trend calculations
    #[error("Math error: {0}")]
    MathError(#[from] trend_math::MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error serializing run output
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<toml::de::Error> for ForecastError {
    fn from(err: toml::de::Error) -> Self {
        ForecastError::ConfigError(err.to_string())
    }
}
