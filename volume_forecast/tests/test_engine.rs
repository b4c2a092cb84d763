use assert_approx_eq::assert_approx_eq;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use volume_forecast::config::EngineConfig;
use volume_forecast::data::{ObservationPoint, ObservationTable};
use volume_forecast::error::ForecastError;
use volume_forecast::guidance::GuidanceSignals;
use volume_forecast::horizon::ShiftKind;
use volume_forecast::models::ProfileOracle;
use volume_forecast::ForecastEngine;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 18).unwrap()
}

fn at(offset: i64, hour: u32) -> NaiveDateTime {
    (today() + Duration::days(offset))
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn create_table() -> ObservationTable {
    let mut points = Vec::new();
    // Four weeks of history rising by 10 per hour
    for offset in -28..0 {
        for hour in 0..24 {
            points.push(ObservationPoint::new(at(offset, hour), hour as f64 * 10.0));
        }
    }
    // Today up to 07:00
    for hour in 0..=7 {
        points.push(ObservationPoint::new(at(0, hour), hour as f64 * 10.0));
    }
    // Same day last year
    let last_year = NaiveDate::from_ymd_opt(2023, 9, 18).unwrap();
    for hour in 0..24 {
        let timestamp = last_year.and_hms_opt(hour, 0, 0).unwrap();
        points.push(ObservationPoint::new(timestamp, hour as f64 * 200.0 / 23.0));
    }
    ObservationTable::new(points)
}

fn oracle() -> ProfileOracle {
    let mut rates = vec![10.0; 24];
    rates[0] = 0.0;
    ProfileOracle::new(rates).unwrap()
}

fn now() -> NaiveDateTime {
    at(0, 6) + Duration::minutes(30)
}

#[test]
fn test_full_run() {
    let engine = ForecastEngine::new(EngineConfig::default()).unwrap();
    let run = engine.run(
        &create_table(),
        &oracle(),
        now(),
        &GuidanceSignals::network_only(460.0),
    );

    assert_eq!(run.current_date, today());
    assert_eq!(run.next_date, today() + Duration::days(1));
    assert!(run.guidance.fallback);

    // Actuals through 06:00, then 10 per hour scaled by 460 / 230
    let current = run.current_day.as_option().unwrap();
    assert_eq!(current.value_at(at(0, 6)), Some(60.0));
    assert_eq!(current.value_at(at(0, 7)), Some(80.0));
    assert_eq!(current.final_value(), Some(400.0));
    assert_eq!(run.current_day_actuals.len(), 7);

    let baseline = run.baseline_current_day.as_option().unwrap();
    assert_eq!(baseline.final_value(), Some(460.0));

    // 0.7 * 230 + 0.3 * 460 with neutral guidance
    let next = run.next_day.as_option().unwrap();
    assert_approx_eq!(next.final_value().unwrap(), 299.0);

    let horizon = run.horizon.as_option().unwrap();
    assert_eq!(horizon.len(), 48);
    assert_eq!(horizon.start(), at(0, 6));
    assert_eq!(horizon.end(), Some(at(2, 5)));

    assert_eq!(run.upcoming_shifts.len(), 2);
    assert_eq!(run.upcoming_shifts[0].kind, ShiftKind::Day);
    assert_eq!(run.upcoming_shifts[0].start, at(0, 6));
    // 06:00 adds 10 over the 05:00 actual, then 20 per hour
    assert_eq!(run.upcoming_shifts[0].volume, 10.0 + 11.0 * 20.0);
    assert_eq!(run.upcoming_shifts[1].kind, ShiftKind::Night);
    assert_approx_eq!(run.upcoming_shifts[1].volume, 6.0 * 20.0 + 5.0 * 13.0);

    assert_eq!(run.previous_year_current_day.len(), 24);
    assert!(run.previous_year_next_day.is_empty());

    let trends = run.trends.as_option().unwrap();
    assert_eq!(trends.days_observed, 28);
    assert_eq!(run.hourly_shapes.shapes.len(), 7);
}

#[test]
fn test_run_summary() {
    let engine = ForecastEngine::new(EngineConfig::default()).unwrap();
    let run = engine.run(
        &create_table(),
        &oracle(),
        now(),
        &GuidanceSignals::network_only(460.0),
    );
    let summary = run.summary;

    assert_eq!(summary.network_target, 460.0);
    assert_eq!(summary.current_day_final_total, Some(400.0));
    assert_approx_eq!(summary.next_day_final_total.unwrap(), 299.0);
    assert_approx_eq!(summary.next_day_expected_increase.unwrap(), 299.0);
    assert_eq!(summary.model_vs_network_pct, Some(-13.04));
    // 60 observed at 06:00 against 120 from the model alone
    assert_eq!(summary.tracking_vs_model_pct, Some(-50.0));
    assert_approx_eq!(summary.previous_year_final_total.unwrap(), 200.0);
    assert_approx_eq!(summary.year_over_year_pct.unwrap(), 100.0);
}

#[test]
fn test_untrained_oracle_isolates_failures() {
    let engine = ForecastEngine::new(EngineConfig::default()).unwrap();
    let run = engine.run(
        &create_table(),
        &ProfileOracle::untrained(),
        now(),
        &GuidanceSignals::network_only(460.0),
    );

    assert!(!run.current_day.is_available());
    assert!(!run.next_day.is_available());
    assert!(!run.horizon.is_available());
    assert!(run.upcoming_shifts.is_empty());
    assert_eq!(run.summary.current_day_final_total, None);
    assert_eq!(run.summary.tracking_vs_model_pct, None);

    // History does not depend on the oracle
    assert!(run.trends.is_available());
    assert_eq!(run.current_day_actuals.len(), 7);
}

#[test]
fn test_run_without_history() {
    let engine = ForecastEngine::new(EngineConfig::default()).unwrap();
    let run = engine.run(
        &ObservationTable::default(),
        &oracle(),
        now(),
        &GuidanceSignals::network_only(460.0),
    );

    assert_eq!(run.current_day.as_option().unwrap().final_value(), Some(460.0));
    assert!(run.horizon.is_available());
    let trends = run.trends.as_option().unwrap();
    assert!(!trends.has_history());
}

#[test]
fn test_run_is_deterministic() {
    let engine = ForecastEngine::new(EngineConfig::default()).unwrap();
    let table = create_table();
    let signals = GuidanceSignals::network_only(460.0);

    let first = engine.run(&table, &oracle(), now(), &signals);
    let second = engine.run(&table, &oracle(), now(), &signals);

    assert_eq!(first, second);
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}

#[test]
fn test_run_json() {
    let engine = ForecastEngine::new(EngineConfig::default()).unwrap();
    let run = engine.run(
        &create_table(),
        &ProfileOracle::untrained(),
        now(),
        &GuidanceSignals::network_only(460.0),
    );
    let json: serde_json::Value = serde_json::from_str(&run.to_json().unwrap()).unwrap();

    assert_eq!(json["current_day"]["status"], "unavailable");
    assert!(json["current_day"]["value"]["reason"].is_string());
    assert_eq!(json["trends"]["status"], "available");
    assert_eq!(json["current_date"], "2024-09-18");
    assert!(json["trends"]["value"]["block_trends"]["Wednesday_0000_0300"].is_object());
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = EngineConfig::default();
    config.horizon.hours = 0;

    assert!(matches!(
        ForecastEngine::new(config),
        Err(ForecastError::InvalidParameter(_))
    ));
}
