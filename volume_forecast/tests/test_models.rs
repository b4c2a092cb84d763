use assert_approx_eq::assert_approx_eq;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use volume_forecast::data::{IncrementPoint, IncrementSeries, MAX_HISTORY_DAYS};
use volume_forecast::error::ForecastError;
use volume_forecast::models::{
    day_rates, day_timestamps, DayRates, ProfileOracle, RateModel, RateOracle, SeasonalAverage,
    SeasonalSmoothing,
};

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, day).unwrap()
}

/// Two weeks of hourly increments equal to the hour of day
fn create_history() -> IncrementSeries {
    let start: NaiveDateTime = date(1).and_hms_opt(0, 0, 0).unwrap();
    let points = (0..14 * 24)
        .map(|h| {
            let timestamp = start + Duration::hours(h);
            IncrementPoint {
                timestamp,
                increment: (h % 24) as f64,
            }
        })
        .collect();
    IncrementSeries::new(points)
}

#[test]
fn test_day_rates_clamp_and_reset() {
    let mut raw = vec![10.0; 24];
    raw[0] = 7.0;
    raw[3] = -4.0;
    raw[5] = f64::NAN;

    let rates = DayRates::from_raw(date(2), &raw).unwrap();

    assert_eq!(rates.rates[0], 0.0);
    assert_eq!(rates.rates[3], 0.0);
    assert_eq!(rates.rates[5], 0.0);
    assert_eq!(rates.total(), 200.0);
}

#[test]
fn test_day_rates_wrong_length() {
    let result = DayRates::from_raw(date(2), &[1.0; 12]);
    assert!(matches!(result, Err(ForecastError::DataError(_))));
}

#[test]
fn test_day_timestamps() {
    let timestamps = day_timestamps(date(2));

    assert_eq!(timestamps.len(), 24);
    assert_eq!(timestamps[0], date(2).and_hms_opt(0, 0, 0).unwrap());
    assert_eq!(timestamps[23], date(2).and_hms_opt(23, 0, 0).unwrap());
}

#[test]
fn test_untrained_oracle_is_missing_input() {
    let oracle = ProfileOracle::untrained();
    let result = day_rates(&oracle, date(2));

    assert!(matches!(result, Err(ForecastError::MissingInput(_))));
}

#[test]
fn test_profile_oracle() {
    let mut rates = vec![5.0; 24];
    rates[0] = 3.0;
    let oracle = ProfileOracle::new(rates).unwrap();

    let day = day_rates(&oracle, date(9)).unwrap();
    assert_eq!(day.rates[0], 0.0);
    assert_eq!(day.total(), 115.0);

    assert!(ProfileOracle::new(vec![1.0; 23]).is_err());
}

#[test]
fn test_seasonal_average() {
    let model = SeasonalAverage::new(7).unwrap();
    let trained = model.train(&create_history()).unwrap();

    assert_eq!(trained.samples(), 7 * 24);

    let forecast = trained.forecast(&day_timestamps(date(20))).unwrap();
    assert_eq!(forecast.len(), 24);
    for (hour, value) in forecast.iter().enumerate() {
        assert_approx_eq!(*value, hour as f64);
    }
}

#[test]
fn test_seasonal_average_invalid() {
    assert!(SeasonalAverage::new(0).is_err());
    assert!(matches!(
        SeasonalAverage::new(4_000_000_000),
        Err(ForecastError::InvalidParameter(_))
    ));
    assert!(SeasonalAverage::new(MAX_HISTORY_DAYS).is_ok());

    let model = SeasonalAverage::new(7).unwrap();
    let result = model.train(&IncrementSeries::default());
    assert!(matches!(result, Err(ForecastError::DataError(_))));
}

#[test]
fn test_seasonal_smoothing() {
    let model = SeasonalSmoothing::new(0.5).unwrap();
    let trained = model.train(&create_history()).unwrap();

    let forecast = trained.forecast(&day_timestamps(date(20))).unwrap();
    assert_eq!(forecast.len(), 24);
    // A constant slot history smooths to the constant
    assert_approx_eq!(forecast[12], 12.0);
    assert!(trained.name().contains("0.5"));
    assert_eq!(trained.samples(), 14 * 24);
}

#[test]
fn test_seasonal_smoothing_invalid_alpha() {
    assert!(matches!(
        SeasonalSmoothing::new(1.5),
        Err(ForecastError::MathError(_))
    ));
    assert!(SeasonalSmoothing::new(0.0).is_err());
}
