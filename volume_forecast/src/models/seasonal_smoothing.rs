//! Seasonal exponential smoothing rate model

use super::{slot_of, RateModel, RateOracle};
use crate::data::{IncrementSeries, HOURS_PER_DAY};
use crate::error::{ForecastError, Result};
use chrono::NaiveDateTime;
use trend_math::ExponentialSmoothing;

/// Single exponential smoothing of each (weekday, hour) slot across weeks
#[derive(Debug, Clone)]
pub struct SeasonalSmoothing {
    /// Name of the model
    name: String,
    /// Smoothing parameter
    alpha: f64,
}

/// Trained seasonal smoothing model
#[derive(Debug, Clone)]
pub struct TrainedSeasonalSmoothing {
    /// Name of the model
    name: String,
    /// Smoothed level indexed by [weekday from Monday][hour]
    levels: Vec<Vec<ExponentialSmoothing>>,
}

impl SeasonalSmoothing {
    /// Create a new seasonal smoothing model
    pub fn new(alpha: f64) -> Result<Self> {
        ExponentialSmoothing::new(alpha)?;

        Ok(Self {
            name: format!("Seasonal Smoothing (alpha={})", alpha),
            alpha,
        })
    }
}

impl RateModel for SeasonalSmoothing {
    type Trained = TrainedSeasonalSmoothing;

    fn train(&self, history: &IncrementSeries) -> Result<Self::Trained> {
        if history.is_empty() {
            return Err(ForecastError::DataError(
                "Empty increment history".to_string(),
            ));
        }

        let slot = ExponentialSmoothing::new(self.alpha)?;
        let mut levels = vec![vec![slot; HOURS_PER_DAY]; 7];

        // History is in timestamp order, so each slot sees its weeks oldest first
        for point in history.iter() {
            let (day, hour) = slot_of(&point.timestamp);
            levels[day][hour].update(point.increment);
        }

        Ok(TrainedSeasonalSmoothing {
            name: self.name.clone(),
            levels,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedSeasonalSmoothing {
    /// Number of increments folded into the slot levels
    pub fn samples(&self) -> usize {
        self.levels
            .iter()
            .flatten()
            .map(ExponentialSmoothing::values_seen)
            .sum()
    }
}

impl RateOracle for TrainedSeasonalSmoothing {
    fn forecast(&self, timestamps: &[NaiveDateTime]) -> Result<Vec<f64>> {
        Ok(timestamps
            .iter()
            .map(|ts| {
                let (day, hour) = slot_of(ts);
                self.levels[day][hour].value().unwrap_or(0.0)
            })
            .collect())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
