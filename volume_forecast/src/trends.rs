//! Historical trend aggregation
//!
//! Scans a window of historical observations ending the day before a target
//! date and summarises it per weekday: hourly shape profiles, 3-hour block
//! trends and daily total trends. Every key is present in the output; keys
//! without qualifying history carry zeroed statistics.

use crate::config::TrendSettings;
use crate::data::{split_by_date, ObservationPoint, ObservationTable, HOURS_PER_DAY};
use crate::error::Result;
use crate::normalizer::normalize_window;
use chrono::{Datelike, Duration, NaiveDate, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use trend_math::{round_to, SimpleMovingAverage, TrendStats};

/// Weekdays in reporting order
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// A fixed 3-hour slice of the day, `start_hour..end_hour`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrendBlockSpan {
    pub start_hour: u32,
    pub end_hour: u32,
}

/// The eight blocks covering a day
pub const TREND_BLOCKS: [TrendBlockSpan; 8] = [
    TrendBlockSpan { start_hour: 0, end_hour: 3 },
    TrendBlockSpan { start_hour: 3, end_hour: 6 },
    TrendBlockSpan { start_hour: 6, end_hour: 9 },
    TrendBlockSpan { start_hour: 9, end_hour: 12 },
    TrendBlockSpan { start_hour: 12, end_hour: 15 },
    TrendBlockSpan { start_hour: 15, end_hour: 18 },
    TrendBlockSpan { start_hour: 18, end_hour: 21 },
    TrendBlockSpan { start_hour: 21, end_hour: 24 },
];

impl TrendBlockSpan {
    /// Label such as `0300_0600`; the last block ends at `0000`
    pub fn label(&self) -> String {
        format!("{:02}00_{:02}00", self.start_hour, self.end_hour % 24)
    }
}

/// Full English weekday name, as used in trend keys
pub fn day_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Key of a block trend, e.g. `Monday_0000_0300`
pub fn block_key(weekday: Weekday, block: &TrendBlockSpan) -> String {
    format!("{}_{}", day_name(weekday), block.label())
}

/// Volume of each 3-hour block for one day of readings sorted by timestamp.
///
/// A block's start value is the last reading before its start hour (0 for
/// the first block) and its end value the last reading before its end hour.
/// Missing rows fall back to the nearest earlier reading of the day.
pub fn block_volumes(day: &[ObservationPoint]) -> [f64; 8] {
    let last_before = |hour: u32| {
        day.iter()
            .take_while(|p| p.timestamp.hour() < hour)
            .last()
            .map(|p| p.cumulative_value)
    };

    let mut volumes = [0.0; 8];
    for (slot, block) in TREND_BLOCKS.iter().enumerate() {
        let start_value = if block.start_hour == 0 {
            0.0
        } else {
            last_before(block.start_hour).unwrap_or(0.0)
        };
        let end_value = last_before(block.end_hour).unwrap_or(start_value);
        volumes[slot] = (end_value - start_value).max(0.0);
    }
    volumes
}

/// Window-wide daily volume averages
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OverallSummary {
    /// Mean daily total across every observed day in the window
    pub average_daily_volume: f64,
    /// Mean of the most recent daily totals, over at most `rolling_window` days
    pub rolling_average_daily_volume: f64,
    pub rolling_window: usize,
}

/// Block, daily and overall trends for one reference date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalTrends {
    pub reference_date: NaiveDate,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub long_window: usize,
    pub short_window: usize,
    /// Days in the window with at least one reading
    pub days_observed: usize,
    /// Keyed by `{Weekday}_{HHMM}_{HHMM}`
    pub block_trends: BTreeMap<String, TrendStats>,
    /// Keyed by weekday name
    pub daily_trends: BTreeMap<String, TrendStats>,
    pub overall: OverallSummary,
}

impl HistoricalTrends {
    /// Statistics for one weekday and block
    pub fn block(&self, weekday: Weekday, block: &TrendBlockSpan) -> Option<&TrendStats> {
        self.block_trends.get(&block_key(weekday, block))
    }

    /// Daily total statistics for one weekday
    pub fn daily(&self, weekday: Weekday) -> Option<&TrendStats> {
        self.daily_trends.get(day_name(weekday))
    }

    /// Whether the window held any history at all
    pub fn has_history(&self) -> bool {
        self.days_observed > 0
    }
}

/// Mean hourly increments for one weekday
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayShape {
    pub day: Weekday,
    pub hourly_mean_increment: [f64; HOURS_PER_DAY],
}

/// Hourly shapes for every weekday, Monday first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyShapeProfile {
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub shapes: Vec<WeekdayShape>,
}

impl HourlyShapeProfile {
    /// Shape for one weekday
    pub fn for_day(&self, weekday: Weekday) -> Option<&WeekdayShape> {
        self.shapes.iter().find(|s| s.day == weekday)
    }

    /// Mean increment for one weekday and hour, 0.0 when out of range
    pub fn mean_increment(&self, weekday: Weekday, hour: usize) -> f64 {
        self.for_day(weekday)
            .and_then(|s| s.hourly_mean_increment.get(hour).copied())
            .unwrap_or(0.0)
    }
}

/// Aggregates historical observations into trend statistics
#[derive(Debug, Clone, Default)]
pub struct HistoricalTrendAggregator {
    settings: TrendSettings,
}

impl HistoricalTrendAggregator {
    pub fn new(settings: TrendSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &TrendSettings {
        &self.settings
    }

    /// Compute block, daily and overall trends for `target_date`.
    ///
    /// The window spans `days_prior` days ending the day before the target.
    pub fn aggregate(&self, table: &ObservationTable, target_date: NaiveDate) -> Result<HistoricalTrends> {
        let (window_start, window_end) = window_bounds(target_date, self.settings.days_prior);
        let window = table.window(window_start, window_end);
        let days = split_by_date(window);

        if days.is_empty() {
            warn!(
                start = %window_start,
                end = %window_end,
                "no historical data in trend window, zero-filling trends"
            );
        }

        // Per-key occurrences, oldest first; reversed when scored
        let mut block_history: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        let mut daily_history: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        let mut daily_totals = Vec::with_capacity(days.len());

        for (date, readings) in &days {
            let weekday = date.weekday();
            let volumes = block_volumes(readings);
            for (block, volume) in TREND_BLOCKS.iter().zip(volumes) {
                block_history
                    .entry(block_key(weekday, block))
                    .or_default()
                    .push(volume);
            }
            let total: f64 = volumes.iter().sum();
            daily_history
                .entry(day_name(weekday).to_string())
                .or_default()
                .push(total);
            daily_totals.push(total);
        }

        let score = |history: Option<&Vec<f64>>| match history {
            Some(values) => {
                let newest_first: Vec<f64> = values.iter().rev().copied().collect();
                TrendStats::from_occurrences(
                    &newest_first,
                    self.settings.long_window,
                    self.settings.short_window,
                )
            }
            None => TrendStats::zeroed(),
        };

        let mut block_trends = BTreeMap::new();
        let mut daily_trends = BTreeMap::new();
        for weekday in WEEKDAYS {
            for block in &TREND_BLOCKS {
                let key = block_key(weekday, block);
                let stats = score(block_history.get(&key));
                block_trends.insert(key, stats);
            }
            let name = day_name(weekday).to_string();
            let stats = score(daily_history.get(&name));
            daily_trends.insert(name, stats);
        }

        let overall = self.overall_summary(&daily_totals)?;

        info!(
            reference = %target_date,
            days = days.len(),
            average_daily_volume = overall.average_daily_volume,
            "historical trends computed"
        );

        Ok(HistoricalTrends {
            reference_date: target_date,
            window_start,
            window_end,
            long_window: self.settings.long_window,
            short_window: self.settings.short_window,
            days_observed: days.len(),
            block_trends,
            daily_trends,
            overall,
        })
    }

    fn overall_summary(&self, daily_totals: &[f64]) -> Result<OverallSummary> {
        let mut rolling = SimpleMovingAverage::new(self.settings.rolling_window)?;
        for total in daily_totals {
            rolling.update(*total);
        }

        Ok(OverallSummary {
            average_daily_volume: round_to(mean_or_zero(daily_totals), 2),
            rolling_average_daily_volume: round_to(rolling.partial_value(), 2),
            rolling_window: self.settings.rolling_window,
        })
    }

    /// Mean hourly increment per weekday over the last `shape_days` days before `target_date`
    pub fn hourly_shapes(&self, table: &ObservationTable, target_date: NaiveDate) -> HourlyShapeProfile {
        let (window_start, window_end) = window_bounds(target_date, self.settings.shape_days);
        let increments = normalize_window(table.window(window_start, window_end));

        let mut samples: Vec<Vec<Vec<f64>>> = vec![vec![Vec::new(); HOURS_PER_DAY]; 7];
        for point in increments.iter() {
            let day = point.timestamp.weekday().num_days_from_monday() as usize;
            let hour = point.timestamp.hour() as usize;
            samples[day][hour].push(point.increment);
        }

        let shapes = WEEKDAYS
            .iter()
            .map(|weekday| {
                let by_hour = &samples[weekday.num_days_from_monday() as usize];
                let mut hourly_mean_increment = [0.0; HOURS_PER_DAY];
                for (hour, values) in by_hour.iter().enumerate() {
                    hourly_mean_increment[hour] = round_to(mean_or_zero(values), 2);
                }
                WeekdayShape {
                    day: *weekday,
                    hourly_mean_increment,
                }
            })
            .collect();

        debug!(
            start = %window_start,
            end = %window_end,
            samples = increments.len(),
            "hourly shapes computed"
        );

        HourlyShapeProfile {
            window_start,
            window_end,
            shapes,
        }
    }
}

/// First and last date of a `days`-long window ending the day before `target_date`
fn window_bounds(target_date: NaiveDate, days: u32) -> (NaiveDate, NaiveDate) {
    let end = target_date.pred_opt().unwrap_or(NaiveDate::MIN);
    let start = end
        .checked_sub_signed(Duration::days(i64::from(days.max(1)) - 1))
        .unwrap_or(NaiveDate::MIN);
    (start, end)
}

fn mean_or_zero(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        statrs::statistics::Statistics::mean(values.iter())
    }
}
