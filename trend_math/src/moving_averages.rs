//! Moving average calculations over occurrence histories
//!
//! Contains:
//! - Simple Moving Average (SMA) over a sliding window of the latest values
//! - `recent_mean`, the mean of the most recent K occurrences of a series
//!   ordered newest first

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Simple Moving Average (SMA) implementation
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    period: usize,
    values: VecDeque<f64>,
    sum: f64,
}

impl SimpleMovingAverage {
    /// Create a new Simple Moving Average with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            values: VecDeque::new(),
            sum: 0.0,
        })
    }

    /// Update the SMA with a new value
    pub fn update(&mut self, value: f64) {
        self.values.push_back(value);
        self.sum += value;

        if self.values.len() > self.period {
            if let Some(old_value) = self.values.pop_front() {
                self.sum -= old_value;
            }
        }
    }

    /// Get the SMA value once a full window has been seen
    pub fn value(&self) -> Result<f64> {
        if self.values.len() < self.period {
            return Err(MathError::InsufficientData(format!(
                "Rolling window of {} values holds only {}",
                self.period,
                self.values.len()
            )));
        }

        Ok(self.sum / self.period as f64)
    }

    /// Get the mean of whatever the window currently holds.
    ///
    /// Mirrors a rolling mean with a minimum of one period: a window holding
    /// fewer than `period` values averages the values it has. Returns 0.0
    /// when nothing has been seen.
    pub fn partial_value(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.sum / self.values.len() as f64
    }

    /// Number of values currently in the window
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the window is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Mean of the first `count` values of a newest-first series.
///
/// Uses fewer values when the series is shorter than `count`; an empty
/// series or a zero count yields 0.0.
pub fn recent_mean(newest_first: &[f64], count: usize) -> f64 {
    let taken = &newest_first[..count.min(newest_first.len())];
    if taken.is_empty() {
        return 0.0;
    }
    taken.iter().sum::<f64>() / taken.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_calculation() {
        let mut sma = SimpleMovingAverage::new(3).unwrap();

        assert!(sma.value().is_err());

        sma.update(2.0);
        sma.update(4.0);
        assert!(sma.value().is_err());

        sma.update(6.0);
        assert_eq!(sma.value().unwrap(), 4.0);

        // The window slides, dropping the oldest value
        sma.update(8.0);
        assert_eq!(sma.value().unwrap(), 6.0);
    }

    #[test]
    fn test_partial_value_uses_available_values() {
        let mut sma = SimpleMovingAverage::new(7).unwrap();
        assert_eq!(sma.partial_value(), 0.0);

        sma.update(10.0);
        sma.update(20.0);
        assert_eq!(sma.len(), 2);
        assert_eq!(sma.partial_value(), 15.0);
    }

    #[test]
    fn test_zero_period_rejected() {
        assert!(matches!(
            SimpleMovingAverage::new(0),
            Err(MathError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_recent_mean() {
        let newest_first = [30.0, 20.0, 10.0, 0.0];
        assert_eq!(recent_mean(&newest_first, 2), 25.0);
        assert_eq!(recent_mean(&newest_first, 10), 15.0);
        assert_eq!(recent_mean(&newest_first, 0), 0.0);
        assert_eq!(recent_mean(&[], 3), 0.0);
    }
}
