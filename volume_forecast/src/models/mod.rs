//! Hourly rate forecasting oracles
//!
//! The reconciler treats a rate oracle as an injected, already-trained
//! capability: given hourly timestamps it returns one raw rate estimate per
//! timestamp. Raw estimates may be negative or non-monotonic; the
//! [`adapter`] turns them into valid per-hour rates for one day.

use crate::data::IncrementSeries;
use crate::error::Result;
use chrono::NaiveDateTime;
use std::fmt::Debug;

/// Trained rate forecaster
pub trait RateOracle: Debug {
    /// Raw rate estimates, one per timestamp.
    ///
    /// An empty result means the oracle has nothing to offer (for example it
    /// was never trained).
    fn forecast(&self, timestamps: &[NaiveDateTime]) -> Result<Vec<f64>>;

    /// Name of the oracle
    fn name(&self) -> &str;
}

/// Rate model that can be trained on historical increments
pub trait RateModel: Debug + Clone {
    /// The type of trained oracle produced
    type Trained: RateOracle;

    /// Train the model on an increment history
    fn train(&self, history: &IncrementSeries) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod adapter;
pub mod profile;
pub mod seasonal_average;
pub mod seasonal_smoothing;

pub use adapter::{day_rates, day_timestamps, DayRates};
pub use profile::ProfileOracle;
pub use seasonal_average::{SeasonalAverage, TrainedSeasonalAverage};
pub use seasonal_smoothing::{SeasonalSmoothing, TrainedSeasonalSmoothing};

/// Index of a (weekday, hour) slot in a 7 x 24 profile
pub(crate) fn slot_of(timestamp: &NaiveDateTime) -> (usize, usize) {
    use chrono::{Datelike, Timelike};
    (
        timestamp.weekday().num_days_from_monday() as usize,
        timestamp.hour() as usize,
    )
}
