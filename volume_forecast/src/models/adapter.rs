//! Post-processing of raw oracle output for one operating day

use super::RateOracle;
use crate::data::HOURS_PER_DAY;
use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Valid hourly rates for one day: every rate is non-negative and hour 0 is 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRates {
    pub date: NaiveDate,
    pub rates: [f64; HOURS_PER_DAY],
}

impl DayRates {
    /// Clamp raw rates into valid day rates
    pub fn from_raw(date: NaiveDate, raw: &[f64]) -> Result<Self> {
        if raw.len() != HOURS_PER_DAY {
            return Err(ForecastError::DataError(format!(
                "Expected {} hourly rates for {}, got {}",
                HOURS_PER_DAY,
                date,
                raw.len()
            )));
        }

        let mut rates = [0.0; HOURS_PER_DAY];
        for (slot, value) in rates.iter_mut().zip(raw) {
            // NaN collapses to 0 as well
            *slot = value.max(0.0);
        }
        rates[0] = 0.0;

        Ok(Self { date, rates })
    }

    /// Sum of the day's rates
    pub fn total(&self) -> f64 {
        self.rates.iter().sum()
    }
}

/// The 24 hour-aligned timestamps of a calendar day
pub fn day_timestamps(date: NaiveDate) -> Vec<NaiveDateTime> {
    let midnight = date.and_time(NaiveTime::default());
    (0..HOURS_PER_DAY as i64)
        .map(|hour| midnight + Duration::hours(hour))
        .collect()
}

/// Ask the oracle for one day and clamp its answer.
///
/// Fails with `MissingInput` when the oracle errors or returns nothing.
pub fn day_rates(oracle: &dyn RateOracle, date: NaiveDate) -> Result<DayRates> {
    let timestamps = day_timestamps(date);
    let raw = oracle.forecast(&timestamps).map_err(|e| {
        ForecastError::MissingInput(format!("oracle '{}' failed for {}: {}", oracle.name(), date, e))
    })?;

    if raw.is_empty() {
        return Err(ForecastError::MissingInput(format!(
            "oracle '{}' returned no rates for {}",
            oracle.name(),
            date
        )));
    }

    let rates = DayRates::from_raw(date, &raw)?;
    debug!(%date, oracle = oracle.name(), total = rates.total(), "clamped oracle rates");
    Ok(rates)
}
