//! Conversion of cumulative readings into hourly increments
//!
//! Every calendar day starts at an increment of 0; later hours take the
//! difference to the previous reading of the same day, floored at 0 since a
//! drop in the counter is a correction rather than a real decrease.

use crate::data::{split_by_date, IncrementPoint, IncrementSeries, ObservationPoint};

/// Normalize the readings of a single day, sorted by timestamp
pub fn normalize_day(points: &[ObservationPoint]) -> Vec<IncrementPoint> {
    let mut increments = Vec::with_capacity(points.len());
    let mut previous: Option<f64> = None;

    for point in points {
        let increment = match previous {
            None => 0.0,
            Some(prev) => (point.cumulative_value - prev).max(0.0),
        };
        increments.push(IncrementPoint {
            timestamp: point.timestamp,
            increment,
        });
        previous = Some(point.cumulative_value);
    }

    increments
}

/// Normalize a multi-day window sorted by timestamp.
///
/// The reset rule applies at the first reading of every calendar date,
/// not only at the first record of the window.
pub fn normalize_window(points: &[ObservationPoint]) -> IncrementSeries {
    let increments = split_by_date(points)
        .into_iter()
        .flat_map(|(_, day)| normalize_day(day))
        .collect();

    IncrementSeries::new(increments)
}
