//! Rolling multi-day horizon
//!
//! The horizon starts at the current hour and concatenates the current
//! day's remaining hours, the next day, and as much of the day after as is
//! needed to reach the configured length.

use crate::data::{truncate_to_hour, IncrementPoint};
use crate::error::{ForecastError, Result};
use crate::reconcile::{CurvePoint, DailyForecastCurve};
use chrono::{Duration, NaiveDateTime, NaiveTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Start hour of the day shift
pub const DAY_SHIFT_START: u32 = 6;
/// Start hour of the night shift
pub const NIGHT_SHIFT_START: u32 = 18;
/// Length of a shift in hours
pub const SHIFT_HOURS: i64 = 12;

/// Ordered, gap-free hourly forecast starting at the current hour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingHorizon {
    start: NaiveDateTime,
    points: Vec<CurvePoint>,
    /// Same-day cumulative value of the hour before `start`
    #[serde(default)]
    preceding_value: Option<f64>,
}

/// Builds a [`RollingHorizon`] of a fixed number of hours
#[derive(Debug, Clone)]
pub struct HorizonStitcher {
    hours: usize,
}

impl HorizonStitcher {
    pub fn new(hours: usize) -> Self {
        Self { hours }
    }

    /// Number of hours requested
    pub fn hours(&self) -> usize {
        self.hours
    }

    /// Stitch the three daily curves into one horizon starting at `now`'s hour.
    ///
    /// The current-day curve must be available. Duplicate timestamps keep
    /// the earliest contribution. A missing hour anywhere inside the horizon
    /// is reported as an invariant violation.
    pub fn stitch(
        &self,
        now: NaiveDateTime,
        current_day: &DailyForecastCurve,
        next_day: &DailyForecastCurve,
        day_after: &DailyForecastCurve,
    ) -> Result<RollingHorizon> {
        let start = truncate_to_hour(now);

        if current_day.is_empty() {
            return Err(ForecastError::MissingInput(format!(
                "current day curve for {} is unavailable",
                current_day.date
            )));
        }

        let mut points: Vec<CurvePoint> = current_day
            .points()
            .iter()
            .filter(|p| p.timestamp >= start)
            .copied()
            .collect();
        points.extend_from_slice(next_day.points());

        let needed = self.hours.saturating_sub(points.len());
        points.extend(day_after.points().iter().take(needed).copied());

        points.sort_by_key(|p| p.timestamp);
        points.dedup_by_key(|p| p.timestamp);
        points.truncate(self.hours);

        let preceding_value = if start.time() == NaiveTime::default() {
            None
        } else {
            current_day.value_at(start - Duration::hours(1))
        };

        let horizon = RollingHorizon {
            start,
            points,
            preceding_value,
        };
        horizon.validate()?;

        if horizon.len() < self.hours {
            warn!(
                hours = horizon.len(),
                requested = self.hours,
                "horizon shorter than requested"
            );
        }
        debug!(start = %start, hours = horizon.len(), "stitched horizon");

        Ok(horizon)
    }
}

impl RollingHorizon {
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Cumulative value of the hour before the horizon, when it falls on the same day
    pub fn preceding_value(&self) -> Option<f64> {
        self.preceding_value
    }

    /// Timestamp of the last point
    pub fn end(&self) -> Option<NaiveDateTime> {
        self.points.last().map(|p| p.timestamp)
    }

    /// Check the horizon starts at its start hour and advances one hour per point
    pub fn validate(&self) -> Result<()> {
        match self.points.first() {
            None => {
                return Err(ForecastError::InvariantViolation(
                    "horizon is empty".to_string(),
                ))
            }
            Some(first) if first.timestamp != self.start => {
                return Err(ForecastError::InvariantViolation(format!(
                    "horizon starts at {} instead of {}",
                    first.timestamp, self.start
                )))
            }
            Some(_) => {}
        }

        for pair in self.points.windows(2) {
            if pair[1].timestamp - pair[0].timestamp != Duration::hours(1) {
                return Err(ForecastError::InvariantViolation(format!(
                    "horizon jumps from {} to {}",
                    pair[0].timestamp, pair[1].timestamp
                )));
            }
        }

        Ok(())
    }

    /// Hourly increments implied by the cumulative values.
    ///
    /// The first hour of a new calendar day contributes its own cumulative
    /// value. The very first point is measured against the preceding hour's
    /// value; without one it contributes nothing unless it is midnight.
    pub fn hourly_increments(&self) -> Vec<IncrementPoint> {
        let mut increments = Vec::with_capacity(self.points.len());
        let mut previous: Option<&CurvePoint> = None;

        for point in &self.points {
            let value = point.cumulative_predicted_value;
            let increment = match previous {
                None if point.timestamp.time() == NaiveTime::default() => value,
                None => self.preceding_value.map_or(0.0, |prior| value - prior),
                Some(prev) if prev.timestamp.date() != point.timestamp.date() => value,
                Some(prev) => value - prev.cumulative_predicted_value,
            };
            increments.push(IncrementPoint {
                timestamp: point.timestamp,
                increment: increment.max(0.0),
            });
            previous = Some(point);
        }

        increments
    }

    /// Predicted volume for hours in `start..end`
    pub fn volume_between(&self, start: NaiveDateTime, end: NaiveDateTime) -> f64 {
        self.hourly_increments()
            .iter()
            .filter(|p| p.timestamp >= start && p.timestamp < end)
            .map(|p| p.increment)
            .sum()
    }

    /// Volumes of the next `count` shifts starting at or after `now`
    pub fn upcoming_shift_volumes(&self, now: NaiveDateTime, count: usize) -> Vec<ShiftVolume> {
        let increments = self.hourly_increments();

        upcoming_shifts(now, count)
            .into_iter()
            .map(|(kind, start)| {
                let end = start + Duration::hours(SHIFT_HOURS);
                let in_shift = increments
                    .iter()
                    .filter(|p| p.timestamp >= start && p.timestamp < end);
                ShiftVolume {
                    kind,
                    start,
                    end,
                    covered_hours: in_shift.clone().count(),
                    volume: in_shift.map(|p| p.increment).sum(),
                }
            })
            .collect()
    }

    /// Export as a two-column DataFrame (`time`, `predicted_workable`)
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let times: Vec<String> = self
            .points
            .iter()
            .map(|p| p.timestamp.format("%Y-%m-%dT%H:00").to_string())
            .collect();
        let values: Vec<f64> = self
            .points
            .iter()
            .map(|p| p.cumulative_predicted_value)
            .collect();

        let df = DataFrame::new(vec![
            Series::new("time", times),
            Series::new("predicted_workable", values),
        ])?;
        Ok(df)
    }
}

/// Day or night shift
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftKind {
    Day,
    Night,
}

/// Predicted volume of one shift
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShiftVolume {
    pub kind: ShiftKind,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Hours of the shift that fall inside the horizon
    pub covered_hours: usize,
    pub volume: f64,
}

/// Start times of the next `count` shifts starting at or after `now`'s hour, within three days
pub fn upcoming_shifts(now: NaiveDateTime, count: usize) -> Vec<(ShiftKind, NaiveDateTime)> {
    let now = truncate_to_hour(now);
    let today = now.date();
    let mut starts = Vec::new();

    for offset in 0..3 {
        let date = today + Duration::days(offset);
        for (kind, hour) in [
            (ShiftKind::Day, DAY_SHIFT_START),
            (ShiftKind::Night, NIGHT_SHIFT_START),
        ] {
            if let Some(start) = date.and_hms_opt(hour, 0, 0) {
                if start >= now {
                    starts.push((kind, start));
                }
            }
        }
    }

    starts.truncate(count);
    starts
}
