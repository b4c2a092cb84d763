//! Seasonal average rate model

use super::{slot_of, RateModel, RateOracle};
use crate::data::{IncrementSeries, HOURS_PER_DAY, MAX_HISTORY_DAYS};
use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Mean increment per (weekday, hour) slot over the most recent days of history
#[derive(Debug, Clone)]
pub struct SeasonalAverage {
    /// Name of the model
    name: String,
    /// Days of history to average over
    window_days: i64,
}

/// Trained seasonal average
#[derive(Debug, Clone)]
pub struct TrainedSeasonalAverage {
    /// Name of the model
    name: String,
    /// Mean increment indexed by [weekday from Monday][hour]
    profile: [[f64; HOURS_PER_DAY]; 7],
    /// Number of increments that went into the profile
    samples: usize,
}

impl SeasonalAverage {
    /// Create a new seasonal average model
    pub fn new(window_days: u32) -> Result<Self> {
        if window_days == 0 {
            return Err(ForecastError::InvalidParameter(
                "Window must cover at least one day".to_string(),
            ));
        }
        if window_days > MAX_HISTORY_DAYS {
            return Err(ForecastError::InvalidParameter(format!(
                "Window of {} days exceeds the {} day limit",
                window_days, MAX_HISTORY_DAYS
            )));
        }

        Ok(Self {
            name: format!("Seasonal Average (window={} days)", window_days),
            window_days: window_days as i64,
        })
    }
}

impl RateModel for SeasonalAverage {
    type Trained = TrainedSeasonalAverage;

    fn train(&self, history: &IncrementSeries) -> Result<Self::Trained> {
        let last = history.points().last().ok_or_else(|| {
            ForecastError::DataError("Empty increment history".to_string())
        })?;
        let first_date = last
            .timestamp
            .date()
            .checked_sub_signed(Duration::days(self.window_days - 1))
            .unwrap_or(NaiveDate::MIN);

        let mut sums = [[0.0; HOURS_PER_DAY]; 7];
        let mut counts = [[0usize; HOURS_PER_DAY]; 7];
        let mut samples = 0;

        for point in history.iter().filter(|p| p.timestamp.date() >= first_date) {
            let (day, hour) = slot_of(&point.timestamp);
            sums[day][hour] += point.increment;
            counts[day][hour] += 1;
            samples += 1;
        }

        let mut profile = [[0.0; HOURS_PER_DAY]; 7];
        for day in 0..7 {
            for hour in 0..HOURS_PER_DAY {
                if counts[day][hour] > 0 {
                    profile[day][hour] = sums[day][hour] / counts[day][hour] as f64;
                }
            }
        }

        Ok(TrainedSeasonalAverage {
            name: self.name.clone(),
            profile,
            samples,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedSeasonalAverage {
    /// Number of increments that went into the profile
    pub fn samples(&self) -> usize {
        self.samples
    }
}

impl RateOracle for TrainedSeasonalAverage {
    fn forecast(&self, timestamps: &[NaiveDateTime]) -> Result<Vec<f64>> {
        Ok(timestamps
            .iter()
            .map(|ts| {
                let (day, hour) = slot_of(ts);
                self.profile[day][hour]
            })
            .collect())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
