//! Short-window vs. long-window trend scoring
//!
//! A trend compares the average of the most recent few occurrences of a
//! quantity (the short window) with the average over a longer run of
//! occurrences (the long window).

use crate::moving_averages::recent_mean;
use crate::round_to;
use serde::{Deserialize, Serialize};

/// Value reported for [`TrendDirection::NewActivity`] by [`TrendDirection::as_pct`]
pub const NEW_ACTIVITY_SENTINEL: f64 = 9999.0;

/// Direction and magnitude of a trend
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TrendDirection {
    /// Percent change of the short-window average against the long-window average
    Percent(f64),
    /// The long-window baseline is zero while the short window is positive.
    /// The magnitude is undefined but new activity appeared.
    NewActivity,
}

impl TrendDirection {
    /// Score a short-window average against a long-window average
    pub fn from_averages(short_avg: f64, long_avg: f64) -> Self {
        if long_avg != 0.0 {
            TrendDirection::Percent((short_avg - long_avg) / long_avg * 100.0)
        } else if short_avg > 0.0 {
            TrendDirection::NewActivity
        } else {
            TrendDirection::Percent(0.0)
        }
    }

    /// Flatten to a single number, reporting new activity as 9999.0
    pub fn as_pct(&self) -> f64 {
        match self {
            TrendDirection::Percent(pct) => *pct,
            TrendDirection::NewActivity => NEW_ACTIVITY_SENTINEL,
        }
    }

    /// Whether this trend flags activity appearing from a zero baseline
    pub fn is_new_activity(&self) -> bool {
        matches!(self, TrendDirection::NewActivity)
    }

    fn rounded(self) -> Self {
        match self {
            TrendDirection::Percent(pct) => TrendDirection::Percent(round_to(pct, 2)),
            other => other,
        }
    }
}

impl Default for TrendDirection {
    fn default() -> Self {
        TrendDirection::Percent(0.0)
    }
}

/// Aggregate statistics for one trend key
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendStats {
    /// Mean over the long window of occurrences
    pub long_window_average: f64,
    /// Mean over the short window of occurrences
    pub short_window_average: f64,
    /// Raw value of the most recent occurrence
    pub last_occurrence_value: f64,
    /// Short vs. long trend
    pub trend: TrendDirection,
    /// Number of occurrences available for this key
    pub occurrences: usize,
}

impl TrendStats {
    /// Statistics for a key with no qualifying occurrences
    pub fn zeroed() -> Self {
        Self::default()
    }

    /// Compute statistics from occurrence values ordered newest first.
    ///
    /// Averages, the last value and the percent change are rounded to two
    /// decimals; the trend itself is scored on the unrounded averages.
    pub fn from_occurrences(newest_first: &[f64], long_window: usize, short_window: usize) -> Self {
        if newest_first.is_empty() {
            return Self::zeroed();
        }

        let long_avg = recent_mean(newest_first, long_window);
        let short_avg = recent_mean(newest_first, short_window);

        Self {
            long_window_average: round_to(long_avg, 2),
            short_window_average: round_to(short_avg, 2),
            last_occurrence_value: round_to(newest_first[0], 2),
            trend: TrendDirection::from_averages(short_avg, long_avg).rounded(),
            occurrences: newest_first.len(),
        }
    }

    /// Percent change as a plain number (9999.0 for new activity)
    pub fn trend_pct_change(&self) -> f64 {
        self.trend.as_pct()
    }
}
