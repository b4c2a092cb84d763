//! # Workable Forecast
//!
//! Umbrella crate for the workable volume forecasting workspace.
//!
//! - [`volume_forecast`]: normalization, oracles, daily reconciliation,
//!   rolling horizon, historical trends and scaling guidance
//! - [`trend_math`]: moving averages, smoothing and trend scoring
//!
//! ## Example
//!
//! ```
//! use workable_forecast_workspace::trend_math::TrendDirection;
//! use workable_forecast_workspace::volume_forecast::guidance::GuidanceCalculator;
//!
//! let (base, next) = GuidanceCalculator::default().scalings(2.0);
//! assert_eq!(base, 1.5);
//! assert_eq!(next, 1.3);
//!
//! assert_eq!(TrendDirection::from_averages(10.0, 0.0).as_pct(), 9999.0);
//! ```

pub use trend_math;
pub use volume_forecast;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crates_are_linked() {
        assert_eq!(volume_forecast::NAME, "volume_forecast");
        assert_eq!(volume_forecast::data::HOURS_PER_DAY, 24);
        assert_eq!(trend_math::round_to(2.345, 1), 2.3);
    }
}
