use assert_approx_eq::assert_approx_eq;
use chrono::{Duration, NaiveDate, Weekday};
use pretty_assertions::assert_eq;
use trend_math::TrendDirection;
use volume_forecast::config::TrendSettings;
use volume_forecast::data::{ObservationPoint, ObservationTable};
use volume_forecast::trends::{
    block_key, block_volumes, day_name, HistoricalTrendAggregator, TREND_BLOCKS,
};

/// A Monday
fn target() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, 29).unwrap()
}

fn day_readings(date: NaiveDate, step: f64) -> Vec<ObservationPoint> {
    (0..24)
        .map(|h| ObservationPoint::new(date.and_hms_opt(h, 0, 0).unwrap(), step * h as f64))
        .collect()
}

/// Four weeks before the target: two quiet weeks, then two busy ones
fn create_table() -> ObservationTable {
    let mut points = Vec::new();
    for offset in 1..=28 {
        let date = target() - Duration::days(offset);
        let step = if offset <= 14 { 20.0 } else { 10.0 };
        points.extend(day_readings(date, step));
    }
    // Readings on the target date itself must be ignored
    points.extend(day_readings(target(), 1000.0));
    ObservationTable::new(points)
}

fn aggregator() -> HistoricalTrendAggregator {
    HistoricalTrendAggregator::new(TrendSettings {
        days_prior: 28,
        ..TrendSettings::default()
    })
}

#[test]
fn test_block_labels_and_keys() {
    assert_eq!(TREND_BLOCKS[0].label(), "0000_0300");
    assert_eq!(TREND_BLOCKS[3].label(), "0900_1200");
    assert_eq!(TREND_BLOCKS[7].label(), "2100_0000");
    assert_eq!(block_key(Weekday::Mon, &TREND_BLOCKS[0]), "Monday_0000_0300");
    assert_eq!(day_name(Weekday::Sun), "Sunday");
}

#[test]
fn test_block_volumes() {
    let volumes = block_volumes(&day_readings(target(), 10.0));

    assert_eq!(volumes, [20.0, 30.0, 30.0, 30.0, 30.0, 30.0, 30.0, 30.0]);
    assert_eq!(volumes.iter().sum::<f64>(), 230.0);
}

#[test]
fn test_block_volumes_with_missing_rows() {
    let readings: Vec<ObservationPoint> = day_readings(target(), 10.0).into_iter().take(5).collect();
    let volumes = block_volumes(&readings);

    // Hours 0-4 only: the block ending at 06:00 sees 40 - 20
    assert_eq!(volumes[0], 20.0);
    assert_eq!(volumes[1], 20.0);
    assert!(volumes[2..].iter().all(|v| *v == 0.0));
}

#[test]
fn test_block_volumes_floor_drops() {
    let date = target();
    let readings = vec![
        ObservationPoint::new(date.and_hms_opt(2, 0, 0).unwrap(), 50.0),
        ObservationPoint::new(date.and_hms_opt(5, 0, 0).unwrap(), 30.0),
    ];
    let volumes = block_volumes(&readings);

    assert_eq!(volumes[0], 50.0);
    assert_eq!(volumes[1], 0.0);
}

#[test]
fn test_aggregate_daily_trends() {
    let trends = aggregator().aggregate(&create_table(), target()).unwrap();

    assert_eq!(trends.window_end, target() - Duration::days(1));
    assert_eq!(trends.window_start, target() - Duration::days(28));
    assert_eq!(trends.days_observed, 28);
    assert_eq!(trends.daily_trends.len(), 7);

    // Newest first: 460, 460, 230, 230
    let monday = trends.daily(Weekday::Mon).unwrap();
    assert_eq!(monday.occurrences, 4);
    assert_eq!(monday.long_window_average, 345.0);
    assert_eq!(monday.short_window_average, 383.33);
    assert_eq!(monday.last_occurrence_value, 460.0);
    assert_eq!(monday.trend, TrendDirection::Percent(11.11));
}

#[test]
fn test_aggregate_block_trends() {
    let trends = aggregator().aggregate(&create_table(), target()).unwrap();

    assert_eq!(trends.block_trends.len(), 56);

    let first_block = trends.block(Weekday::Fri, &TREND_BLOCKS[0]).unwrap();
    assert_eq!(first_block.long_window_average, 30.0);
    assert_eq!(first_block.short_window_average, 33.33);
    assert_eq!(first_block.last_occurrence_value, 40.0);
    assert_approx_eq!(first_block.trend_pct_change(), 11.11);

    let evening = &trends.block_trends["Friday_1800_2100"];
    assert_eq!(evening.long_window_average, 45.0);
}

#[test]
fn test_aggregate_overall_summary() {
    let trends = aggregator().aggregate(&create_table(), target()).unwrap();

    assert_eq!(trends.overall.average_daily_volume, 345.0);
    assert_eq!(trends.overall.rolling_average_daily_volume, 460.0);
    assert_eq!(trends.overall.rolling_window, 7);
}

#[test]
fn test_aggregate_without_history_is_zero_filled() {
    let trends = aggregator()
        .aggregate(&ObservationTable::default(), target())
        .unwrap();

    assert!(!trends.has_history());
    assert_eq!(trends.block_trends.len(), 56);
    assert_eq!(trends.daily_trends.len(), 7);
    for stats in trends.block_trends.values().chain(trends.daily_trends.values()) {
        assert_eq!(stats.long_window_average, 0.0);
        assert_eq!(stats.trend_pct_change(), 0.0);
    }
    assert_eq!(trends.overall.average_daily_volume, 0.0);
}

#[test]
fn test_oversized_windows_cover_all_history() {
    let aggregator = HistoricalTrendAggregator::new(TrendSettings {
        days_prior: 4_000_000_000,
        shape_days: u32::MAX,
        rolling_window: 9_000_000_000_000_000_000,
        ..TrendSettings::default()
    });

    let trends = aggregator.aggregate(&create_table(), target()).unwrap();
    assert_eq!(trends.days_observed, 28);
    assert_eq!(trends.window_end, target() - Duration::days(1));
    assert_eq!(trends.window_start, NaiveDate::MIN);

    let shapes = aggregator.hourly_shapes(&create_table(), target());
    assert_eq!(shapes.window_start, NaiveDate::MIN);
}

#[test]
fn test_new_activity_sentinel() {
    // Long-window occurrences at 0, short-window average 10
    let trend = TrendDirection::from_averages(10.0, 0.0);

    assert!(trend.is_new_activity());
    assert_eq!(trend.as_pct(), 9999.0);
    assert!(trend.as_pct().is_finite());
}

#[test]
fn test_hourly_shapes() {
    let shapes = aggregator().hourly_shapes(&create_table(), target());

    assert_eq!(shapes.window_end, target() - Duration::days(1));
    assert_eq!(shapes.window_start, target() - Duration::days(21));
    assert_eq!(shapes.shapes.len(), 7);
    assert_eq!(shapes.shapes[0].day, Weekday::Mon);
    assert_eq!(shapes.shapes[6].day, Weekday::Sun);

    // Mondays in the window step by 10, 20 and 20
    assert_eq!(shapes.mean_increment(Weekday::Mon, 0), 0.0);
    assert_eq!(shapes.mean_increment(Weekday::Mon, 5), 16.67);
    assert_eq!(shapes.mean_increment(Weekday::Mon, 24), 0.0);
}

#[test]
fn test_hourly_shapes_missing_weekday_is_zero() {
    let date = NaiveDate::from_ymd_opt(2024, 7, 24).unwrap();
    let table = ObservationTable::new(day_readings(date, 10.0));
    let shapes = aggregator().hourly_shapes(&table, target());

    assert_eq!(shapes.mean_increment(Weekday::Wed, 3), 10.0);
    let monday = shapes.for_day(Weekday::Mon).unwrap();
    assert!(monday.hourly_mean_increment.iter().all(|v| *v == 0.0));
}
