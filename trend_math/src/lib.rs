//! # Trend Math
//!
//! Mathematical building blocks for historical volume analysis.
//! This crate provides the moving averages, smoothing state and trend
//! scoring used to compare recent activity against a longer baseline.

use thiserror::Error;

pub mod moving_averages;
pub mod smoothing;
pub mod trend;

pub use moving_averages::{recent_mean, SimpleMovingAverage};
pub use smoothing::ExponentialSmoothing;
pub use trend::{TrendDirection, TrendStats, NEW_ACTIVITY_SENTINEL};

/// Errors that can occur in trend calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for trend math operations
pub type Result<T> = std::result::Result<T, MathError>;

/// Round a value to the given number of decimal places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(12.3456, 2), 12.35);
        assert_eq!(round_to(-0.004, 2), -0.0);
        assert_eq!(round_to(7.0, 0), 7.0);
    }
}
