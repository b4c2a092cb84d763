//! Daily cumulative forecast reconciliation
//!
//! A day's curve combines clamped oracle rates, the actual cumulative
//! readings already observed for the day, and an external daily target.
//! Known hours take the actual reading verbatim; every later hour adds the
//! oracle rate for that hour multiplied by a single daily scale.

use crate::config::ReconcileSettings;
use crate::data::{ObservationPoint, HOURS_PER_DAY};
use crate::error::{ForecastError, Result};
use crate::models::{day_rates, day_timestamps, DayRates, RateOracle};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One hourly point of a cumulative forecast
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub timestamp: NaiveDateTime,
    pub cumulative_predicted_value: f64,
}

/// How a curve's magnitude was set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReconcileDetails {
    pub oracle_daily_total: f64,
    pub final_daily_target: f64,
    pub scale: f64,
    pub last_known_hour: Option<usize>,
}

/// Cumulative forecast for one calendar day.
///
/// A reconciled curve has exactly 24 non-decreasing points. An unavailable
/// day is represented by an empty curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecastCurve {
    pub date: NaiveDate,
    points: Vec<CurvePoint>,
    details: Option<ReconcileDetails>,
}

impl DailyForecastCurve {
    /// Empty curve for a day that could not be forecast
    pub fn unavailable(date: NaiveDate) -> Self {
        Self {
            date,
            points: Vec::new(),
            details: None,
        }
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    pub fn details(&self) -> Option<&ReconcileDetails> {
        self.details.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Cumulative values without timestamps
    pub fn values(&self) -> Vec<f64> {
        self.points
            .iter()
            .map(|p| p.cumulative_predicted_value)
            .collect()
    }

    /// Predicted end-of-day total
    pub fn final_value(&self) -> Option<f64> {
        self.points.last().map(|p| p.cumulative_predicted_value)
    }

    /// Predicted growth from the first to the last hour
    pub fn expected_increase(&self) -> Option<f64> {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => {
                Some(last.cumulative_predicted_value - first.cumulative_predicted_value)
            }
            _ => None,
        }
    }

    /// Predicted value at a timestamp
    pub fn value_at(&self, timestamp: NaiveDateTime) -> Option<f64> {
        self.points
            .iter()
            .find(|p| p.timestamp == timestamp)
            .map(|p| p.cumulative_predicted_value)
    }

    /// Check the shape guarantees of a reconciled curve
    pub fn validate(&self) -> Result<()> {
        if self.points.len() != HOURS_PER_DAY {
            return Err(ForecastError::InvariantViolation(format!(
                "curve for {} has {} points, expected {}",
                self.date,
                self.points.len(),
                HOURS_PER_DAY
            )));
        }

        for (point, expected) in self.points.iter().zip(day_timestamps(self.date)) {
            if point.timestamp != expected {
                return Err(ForecastError::InvariantViolation(format!(
                    "curve for {} has point {} where {} was expected",
                    self.date, point.timestamp, expected
                )));
            }
        }

        for pair in self.points.windows(2) {
            if pair[1].cumulative_predicted_value < pair[0].cumulative_predicted_value {
                return Err(ForecastError::InvariantViolation(format!(
                    "curve for {} decreases from {} at {} to {} at {}",
                    self.date,
                    pair[0].cumulative_predicted_value,
                    pair[0].timestamp,
                    pair[1].cumulative_predicted_value,
                    pair[1].timestamp
                )));
            }
        }

        Ok(())
    }
}

/// Actual cumulative readings for the earliest hours of a day.
///
/// Covers hours `0..=last_known_hour`; an hour inside that range with no
/// reading carries the previous cumulative value forward.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActualPrefix {
    values: Vec<Option<f64>>,
}

impl ActualPrefix {
    /// No known hours
    pub fn none() -> Self {
        Self::default()
    }

    /// Readings for hours 0, 1, 2, ... in order
    pub fn from_values(values: &[f64]) -> Self {
        Self {
            values: values.iter().copied().map(Some).collect(),
        }
    }

    /// Prefix from the observations of `date`; readings of other dates are ignored
    pub fn from_observations(date: NaiveDate, points: &[ObservationPoint]) -> Self {
        let same_day = points.iter().filter(|p| p.date() == date);
        let last_known = match same_day.clone().map(|p| p.hour() as usize).max() {
            Some(hour) => hour,
            None => return Self::none(),
        };

        let mut values = vec![None; last_known + 1];
        for point in same_day {
            values[point.hour() as usize] = Some(point.cumulative_value);
        }

        Self { values }
    }

    /// Last hour covered by actuals
    pub fn last_known_hour(&self) -> Option<usize> {
        self.values.len().checked_sub(1)
    }

    /// Whether `hour` lies inside the known prefix
    pub fn covers(&self, hour: usize) -> bool {
        hour < self.values.len()
    }

    /// Reading for `hour`, if one was observed
    pub fn get(&self, hour: usize) -> Option<f64> {
        self.values.get(hour).copied().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Target magnitude for a day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DayTarget {
    /// The day in progress: scale the oracle to the external target directly
    Current { external_target: f64 },
    /// A day without actuals: blend the oracle's own total with the guided external target
    Future {
        external_target: f64,
        next_day_scaling: f64,
    },
}

/// Weights for the future-day target blend
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendPolicy {
    pub oracle_weight: f64,
    pub external_weight: f64,
}

impl Default for BlendPolicy {
    fn default() -> Self {
        Self {
            oracle_weight: 0.7,
            external_weight: 0.3,
        }
    }
}

impl From<&ReconcileSettings> for BlendPolicy {
    fn from(settings: &ReconcileSettings) -> Self {
        Self {
            oracle_weight: settings.oracle_weight,
            external_weight: settings.external_weight,
        }
    }
}

impl BlendPolicy {
    /// Final daily target for the given oracle total
    pub fn final_target(&self, oracle_daily_total: f64, target: DayTarget) -> f64 {
        let blended = match target {
            DayTarget::Current { external_target } => external_target,
            DayTarget::Future {
                external_target,
                next_day_scaling,
            } => {
                self.oracle_weight * oracle_daily_total
                    + self.external_weight * external_target * next_day_scaling
            }
        };
        blended.max(0.0)
    }
}

/// Builds one [`DailyForecastCurve`] per call
#[derive(Debug, Clone, Default)]
pub struct DailyReconciler {
    policy: BlendPolicy,
}

impl DailyReconciler {
    pub fn new(policy: BlendPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &BlendPolicy {
        &self.policy
    }

    /// Query the oracle for `date` and reconcile.
    ///
    /// Returns an empty curve when the oracle has no rates for the day.
    pub fn reconcile(
        &self,
        oracle: &dyn RateOracle,
        date: NaiveDate,
        target: DayTarget,
        prefix: &ActualPrefix,
    ) -> Result<DailyForecastCurve> {
        match day_rates(oracle, date) {
            Ok(rates) => self.reconcile_rates(&rates, target, prefix),
            Err(ForecastError::MissingInput(reason)) => {
                warn!(%date, %reason, "day is unforecastable");
                Ok(DailyForecastCurve::unavailable(date))
            }
            Err(e) => Err(e),
        }
    }

    /// Reconcile already-clamped rates
    pub fn reconcile_rates(
        &self,
        rates: &DayRates,
        target: DayTarget,
        prefix: &ActualPrefix,
    ) -> Result<DailyForecastCurve> {
        let oracle_daily_total = rates.total();
        let final_daily_target = self.policy.final_target(oracle_daily_total, target);
        let scale = if oracle_daily_total > 0.0 {
            final_daily_target / oracle_daily_total
        } else {
            1.0
        };

        let mut points = Vec::with_capacity(HOURS_PER_DAY);
        let mut running = 0.0;

        for (hour, timestamp) in day_timestamps(rates.date).into_iter().enumerate() {
            if prefix.covers(hour) {
                running = prefix.get(hour).unwrap_or(running);
            } else if hour > 0 {
                running += rates.rates[hour] * scale;
            }

            points.push(CurvePoint {
                timestamp,
                cumulative_predicted_value: running.max(0.0).round(),
            });
        }

        debug!(
            date = %rates.date,
            oracle_daily_total,
            final_daily_target,
            scale,
            last_known_hour = ?prefix.last_known_hour(),
            "reconciled day"
        );

        let curve = DailyForecastCurve {
            date: rates.date,
            points,
            details: Some(ReconcileDetails {
                oracle_daily_total,
                final_daily_target,
                scale,
                last_known_hour: prefix.last_known_hour(),
            }),
        };
        curve.validate()?;
        Ok(curve)
    }
}
