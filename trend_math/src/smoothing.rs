//! Single exponential smoothing state

use crate::{MathError, Result};

/// Exponential Smoothing implementation
#[derive(Debug, Clone)]
pub struct ExponentialSmoothing {
    alpha: f64,
    level: Option<f64>,
    values_seen: usize,
}

impl ExponentialSmoothing {
    /// Create a new Exponential Smoothing with the specified alpha (smoothing factor)
    pub fn new(alpha: f64) -> Result<Self> {
        if alpha <= 0.0 || alpha >= 1.0 {
            return Err(MathError::InvalidInput(
                "Alpha must be between 0 and 1 (exclusive)".to_string(),
            ));
        }

        Ok(Self {
            alpha,
            level: None,
            values_seen: 0,
        })
    }

    /// Update the smoothed level with a new observation
    pub fn update(&mut self, value: f64) {
        self.values_seen += 1;
        self.level = Some(match self.level {
            None => value,
            Some(level) => self.alpha * value + (1.0 - self.alpha) * level,
        });
    }

    /// Get the current smoothed level
    pub fn value(&self) -> Result<f64> {
        self.level.ok_or_else(|| {
            MathError::InsufficientData("No data available for exponential smoothing".to_string())
        })
    }

    /// Number of observations folded into the level
    pub fn values_seen(&self) -> usize {
        self.values_seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_smoothing() {
        let mut es = ExponentialSmoothing::new(0.3).unwrap();
        assert!(es.value().is_err());

        es.update(10.0); // Initial level = 10
        assert!((es.value().unwrap() - 10.0).abs() < 0.001);

        es.update(20.0); // New level = 0.3*20 + 0.7*10 = 13
        assert!((es.value().unwrap() - 13.0).abs() < 0.001);
        assert_eq!(es.values_seen(), 2);
    }

    #[test]
    fn test_alpha_bounds() {
        assert!(ExponentialSmoothing::new(0.0).is_err());
        assert!(ExponentialSmoothing::new(1.0).is_err());
        assert!(ExponentialSmoothing::new(0.5).is_ok());
    }
}
