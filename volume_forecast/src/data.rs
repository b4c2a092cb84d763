//! Observation data handling
//!
//! Historical observations are hourly readings of a cumulative counter that
//! restarts near zero at the start of each calendar day.

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use tracing::{debug, warn};

/// Number of hourly points in one operating day
pub const HOURS_PER_DAY: usize = 24;

/// Longest history window, in days, any setting may request
pub const MAX_HISTORY_DAYS: u32 = 3660;

const TIMESTAMP_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// One hourly reading of the cumulative counter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservationPoint {
    /// Hour-aligned timestamp of the reading
    pub timestamp: NaiveDateTime,
    /// Running total since the start of the day
    pub cumulative_value: f64,
}

impl ObservationPoint {
    /// Create a new observation
    pub fn new(timestamp: NaiveDateTime, cumulative_value: f64) -> Self {
        Self {
            timestamp,
            cumulative_value,
        }
    }

    /// Calendar date of the reading
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Hour of day of the reading
    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }
}

/// Per-hour addition to the cumulative counter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncrementPoint {
    pub timestamp: NaiveDateTime,
    pub increment: f64,
}

/// Ordered sequence of hourly increments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncrementSeries {
    points: Vec<IncrementPoint>,
}

impl IncrementSeries {
    /// Wrap already-computed increments
    pub fn new(points: Vec<IncrementPoint>) -> Self {
        Self { points }
    }

    /// The increments in timestamp order
    pub fn points(&self) -> &[IncrementPoint] {
        &self.points
    }

    /// Iterate over the increments
    pub fn iter(&self) -> std::slice::Iter<'_, IncrementPoint> {
        self.points.iter()
    }

    /// Increment values without timestamps
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.increment).collect()
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get the length of the series
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Sum of all increments
    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.increment).sum()
    }
}

/// Historical observation table, sorted by timestamp with unique timestamps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationTable {
    points: Vec<ObservationPoint>,
}

impl ObservationTable {
    /// Build a table from unordered observations.
    ///
    /// Points are sorted by timestamp; when a timestamp repeats, the last
    /// row for it wins.
    pub fn new(mut points: Vec<ObservationPoint>) -> Self {
        points.sort_by_key(|p| p.timestamp);

        let mut unique: Vec<ObservationPoint> = Vec::with_capacity(points.len());
        for point in points {
            match unique.last_mut() {
                Some(last) if last.timestamp == point.timestamp => *last = point,
                _ => unique.push(point),
            }
        }

        Self { points: unique }
    }

    /// All observations in timestamp order
    pub fn points(&self) -> &[ObservationPoint] {
        &self.points
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get the number of observations
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Earliest and latest timestamps, if any
    pub fn time_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => Some((first.timestamp, last.timestamp)),
            _ => None,
        }
    }

    /// Observations whose calendar date lies in `start..=end`
    pub fn window(&self, start: NaiveDate, end: NaiveDate) -> &[ObservationPoint] {
        if start > end {
            return &[];
        }
        let lo = self.points.partition_point(|p| p.date() < start);
        let hi = self.points.partition_point(|p| p.date() <= end);
        &self.points[lo..hi]
    }

    /// Observations of one calendar day
    pub fn day(&self, date: NaiveDate) -> &[ObservationPoint] {
        self.window(date, date)
    }

    /// Observations of the day containing `now`, up to and including `now`
    pub fn actuals_until(&self, now: NaiveDateTime) -> &[ObservationPoint] {
        let day = self.day(now.date());
        let end = day.partition_point(|p| p.timestamp <= now);
        &day[..end]
    }

    /// Observations for the same calendar day one year before `date`.
    ///
    /// Empty when that day does not exist (Feb 29 in a non-leap year).
    pub fn same_day_previous_year(&self, date: NaiveDate) -> &[ObservationPoint] {
        match date.with_year(date.year() - 1) {
            Some(previous) => self.day(previous),
            None => &[],
        }
    }
}

/// Drop minutes, seconds and sub-seconds from a timestamp
pub fn truncate_to_hour(timestamp: NaiveDateTime) -> NaiveDateTime {
    timestamp
        .date()
        .and_hms_opt(timestamp.hour(), 0, 0)
        .unwrap_or(timestamp)
}

/// Split timestamp-ordered observations into per-date runs
pub fn split_by_date(points: &[ObservationPoint]) -> Vec<(NaiveDate, &[ObservationPoint])> {
    let mut days = Vec::new();
    let mut start = 0;

    for i in 1..=points.len() {
        if i == points.len() || points[i].date() != points[start].date() {
            days.push((points[start].date(), &points[start..i]));
            start = i;
        }
    }

    days
}

/// Data loader for historical observation tables
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load observations from a CSV file whose first two columns are time and cumulative value
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<ObservationTable> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(&df)
    }

    /// Convert an existing DataFrame; columns beyond the first two are ignored
    pub fn from_dataframe(df: &DataFrame) -> Result<ObservationTable> {
        let columns = df.get_columns();
        if columns.len() < 2 {
            return Err(ForecastError::DataError(format!(
                "Expected a time column and a value column, found {} column(s)",
                columns.len()
            )));
        }

        let times = Self::time_values(&columns[0])?;
        let values = columns[1].cast(&DataType::Float64)?;
        let values = values.f64()?;

        let points: Vec<ObservationPoint> = times
            .into_iter()
            .zip(values.into_iter())
            .filter_map(|(time, value)| match (time, value) {
                (Some(time), Some(value)) if value.is_finite() => {
                    Some(ObservationPoint::new(time, value))
                }
                _ => None,
            })
            .collect();

        let dropped = df.height() - points.len();
        if dropped > 0 {
            warn!(dropped, "dropped rows with a missing time or value");
        }

        let table = ObservationTable::new(points);
        if let Some((first, last)) = table.time_range() {
            debug!(rows = table.len(), %first, %last, "loaded observation table");
        }
        Ok(table)
    }

    /// Read the time column as naive timestamps
    fn time_values(series: &Series) -> Result<Vec<Option<NaiveDateTime>>> {
        match series.dtype() {
            DataType::Utf8 => Ok(series
                .utf8()?
                .into_iter()
                .map(|value| value.and_then(parse_timestamp))
                .collect()),
            DataType::Datetime(unit, _) => {
                let unit = *unit;
                Ok(series
                    .datetime()?
                    .into_iter()
                    .map(|value| value.and_then(|raw| from_epoch(raw, unit)))
                    .collect())
            }
            other => Err(ForecastError::DataError(format!(
                "Column '{}' cannot be read as time (type {:?})",
                series.name(),
                other
            ))),
        }
    }
}

/// Parse a timestamp in one of the common layouts; a bare date means midnight
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn from_epoch(raw: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let nanos_per_unit: i128 = match unit {
        TimeUnit::Nanoseconds => 1,
        TimeUnit::Microseconds => 1_000,
        TimeUnit::Milliseconds => 1_000_000,
    };
    let nanos = raw as i128 * nanos_per_unit;
    let secs = nanos.div_euclid(1_000_000_000) as i64;
    let subsec = nanos.rem_euclid(1_000_000_000) as u32;

    DateTime::from_timestamp(secs, subsec).map(|dt| dt.naive_utc())
}
