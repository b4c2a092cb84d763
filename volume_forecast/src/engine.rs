//! End-to-end forecast run
//!
//! A run is a pure function of the observation table, a trained oracle, the
//! current time and the external signals. Each produced piece is isolated:
//! one that cannot be computed is reported as [`Availability::Unavailable`]
//! while the rest of the run goes ahead.

use crate::config::EngineConfig;
use crate::data::{ObservationPoint, ObservationTable};
use crate::error::Result;
use crate::guidance::{GuidanceCalculator, GuidanceFactors, GuidanceSignals};
use crate::horizon::{HorizonStitcher, RollingHorizon, ShiftVolume};
use crate::models::RateOracle;
use crate::reconcile::{ActualPrefix, BlendPolicy, DailyForecastCurve, DailyReconciler, DayTarget};
use crate::trends::{HistoricalTrendAggregator, HistoricalTrends, HourlyShapeProfile};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// A run output that is either present or explicitly missing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Availability<T> {
    Available(T),
    Unavailable { reason: String },
}

impl<T> Availability<T> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Availability::Unavailable {
            reason: reason.into(),
        }
    }

    /// Wrap a fallible computation, keeping the error text as the reason
    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(value) => Availability::Available(value),
            Err(e) => Availability::unavailable(e.to_string()),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available(_))
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Availability::Available(value) => Some(value),
            Availability::Unavailable { .. } => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Availability::Available(value) => Some(value),
            Availability::Unavailable { .. } => None,
        }
    }

    /// Reason the value is missing, if it is
    pub fn reason(&self) -> Option<&str> {
        match self {
            Availability::Available(_) => None,
            Availability::Unavailable { reason } => Some(reason),
        }
    }
}

/// Headline numbers of a run
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub network_target: f64,
    pub current_day_final_total: Option<f64>,
    pub next_day_final_total: Option<f64>,
    /// Next day's last point minus its first point
    pub next_day_expected_increase: Option<f64>,
    /// Current-day forecast total against the network target, in percent
    pub model_vs_network_pct: Option<f64>,
    /// Last known actual against the model-only curve at the same hour, in percent
    pub tracking_vs_model_pct: Option<f64>,
    pub previous_year_final_total: Option<f64>,
    /// Current-day forecast total against the previous year's final total, in percent
    pub year_over_year_pct: Option<f64>,
}

/// Everything produced by one [`ForecastEngine::run`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRun {
    pub generated_at: NaiveDateTime,
    pub current_date: NaiveDate,
    pub next_date: NaiveDate,
    pub guidance: GuidanceFactors,
    /// Current day anchored to actuals up to now
    pub current_day: Availability<DailyForecastCurve>,
    /// Current day reconciled without any actuals
    pub baseline_current_day: Availability<DailyForecastCurve>,
    pub next_day: Availability<DailyForecastCurve>,
    pub horizon: Availability<RollingHorizon>,
    pub upcoming_shifts: Vec<ShiftVolume>,
    pub current_day_actuals: Vec<ObservationPoint>,
    pub previous_year_current_day: Vec<ObservationPoint>,
    pub previous_year_next_day: Vec<ObservationPoint>,
    pub trends: Availability<HistoricalTrends>,
    pub hourly_shapes: HourlyShapeProfile,
    pub summary: RunSummary,
}

impl ForecastRun {
    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Runs the reconciliation pipeline and the historical aggregation
#[derive(Debug, Clone)]
pub struct ForecastEngine {
    config: EngineConfig,
    reconciler: DailyReconciler,
    stitcher: HorizonStitcher,
    guidance: GuidanceCalculator,
    aggregator: HistoricalTrendAggregator,
}

impl ForecastEngine {
    /// Create an engine; fails when the configuration is invalid
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            reconciler: DailyReconciler::new(BlendPolicy::from(&config.reconcile)),
            stitcher: HorizonStitcher::new(config.horizon.hours),
            guidance: GuidanceCalculator::new(config.guidance.clone()),
            aggregator: HistoricalTrendAggregator::new(config.trends.clone()),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Produce a full run for `now`.
    ///
    /// Days are reconciled in calendar order (current, next, day after)
    /// before the horizon is stitched.
    pub fn run(
        &self,
        table: &ObservationTable,
        oracle: &dyn RateOracle,
        now: NaiveDateTime,
        signals: &GuidanceSignals,
    ) -> ForecastRun {
        let current_date = now.date();
        let next_date = current_date + Duration::days(1);
        let day_after_date = current_date + Duration::days(2);

        info!(
            now = %now,
            oracle = oracle.name(),
            observations = table.len(),
            "starting forecast run"
        );

        let guidance = self.guidance.compute(signals);

        let actuals = table.actuals_until(now);
        let prefix = ActualPrefix::from_observations(current_date, actuals);
        let current_target = DayTarget::Current {
            external_target: signals.network_target,
        };
        let future_target = DayTarget::Future {
            external_target: signals.network_target,
            next_day_scaling: guidance.next_day_scaling,
        };

        let current_day = self.reconcile_day(oracle, current_date, current_target, &prefix);
        let baseline_current_day =
            self.reconcile_day(oracle, current_date, current_target, &ActualPrefix::none());
        let next_day = self.reconcile_day(oracle, next_date, future_target, &ActualPrefix::none());
        let day_after =
            self.reconcile_day(oracle, day_after_date, future_target, &ActualPrefix::none());

        let horizon = self.stitch(now, &current_day, &next_day, &day_after);
        let upcoming_shifts = horizon
            .as_option()
            .map(|h| h.upcoming_shift_volumes(now, self.config.horizon.upcoming_shifts))
            .unwrap_or_default();

        let previous_year_current_day = table.same_day_previous_year(current_date).to_vec();
        let previous_year_next_day = table.same_day_previous_year(next_date).to_vec();

        let trends = Availability::from_result(self.aggregator.aggregate(table, current_date));
        if let Some(reason) = trends.reason() {
            error!(%reason, "historical trends unavailable");
        }
        let hourly_shapes = self.aggregator.hourly_shapes(table, current_date);

        let summary = summarize(
            signals.network_target,
            &current_day,
            &baseline_current_day,
            &next_day,
            actuals,
            &previous_year_current_day,
        );

        info!(
            current_total = ?summary.current_day_final_total,
            next_total = ?summary.next_day_final_total,
            horizon_available = horizon.is_available(),
            "forecast run complete"
        );

        ForecastRun {
            generated_at: now,
            current_date,
            next_date,
            guidance,
            current_day,
            baseline_current_day,
            next_day,
            horizon,
            upcoming_shifts,
            current_day_actuals: actuals.to_vec(),
            previous_year_current_day,
            previous_year_next_day,
            trends,
            hourly_shapes,
            summary,
        }
    }

    fn reconcile_day(
        &self,
        oracle: &dyn RateOracle,
        date: NaiveDate,
        target: DayTarget,
        prefix: &ActualPrefix,
    ) -> Availability<DailyForecastCurve> {
        match self.reconciler.reconcile(oracle, date, target, prefix) {
            Ok(curve) if curve.is_empty() => {
                Availability::unavailable(format!("no oracle rates for {}", date))
            }
            Ok(curve) => Availability::Available(curve),
            Err(e) => {
                error!(%date, error = %e, "reconciliation failed");
                Availability::unavailable(e.to_string())
            }
        }
    }

    fn stitch(
        &self,
        now: NaiveDateTime,
        current_day: &Availability<DailyForecastCurve>,
        next_day: &Availability<DailyForecastCurve>,
        day_after: &Availability<DailyForecastCurve>,
    ) -> Availability<RollingHorizon> {
        let date = now.date();
        let current_fallback = DailyForecastCurve::unavailable(date);
        let next_fallback = DailyForecastCurve::unavailable(date + Duration::days(1));
        let after_fallback = DailyForecastCurve::unavailable(date + Duration::days(2));

        let result = self.stitcher.stitch(
            now,
            current_day.as_option().unwrap_or(&current_fallback),
            next_day.as_option().unwrap_or(&next_fallback),
            day_after.as_option().unwrap_or(&after_fallback),
        );
        if let Err(e) = &result {
            warn!(error = %e, "horizon unavailable");
        }
        Availability::from_result(result)
    }
}

fn pct_change(value: f64, reference: f64) -> Option<f64> {
    if reference != 0.0 {
        Some(trend_math::round_to((value - reference) / reference * 100.0, 2))
    } else {
        None
    }
}

fn summarize(
    network_target: f64,
    current_day: &Availability<DailyForecastCurve>,
    baseline_current_day: &Availability<DailyForecastCurve>,
    next_day: &Availability<DailyForecastCurve>,
    actuals: &[ObservationPoint],
    previous_year: &[ObservationPoint],
) -> RunSummary {
    let current_day_final_total = current_day.as_option().and_then(|c| c.final_value());
    let next_day_final_total = next_day.as_option().and_then(|c| c.final_value());
    let previous_year_final_total = previous_year.last().map(|p| p.cumulative_value);

    let tracking_vs_model_pct = actuals.last().and_then(|last| {
        baseline_current_day
            .as_option()
            .and_then(|curve| curve.value_at(crate::data::truncate_to_hour(last.timestamp)))
            .and_then(|model| pct_change(last.cumulative_value, model))
    });

    RunSummary {
        network_target,
        current_day_final_total,
        next_day_final_total,
        next_day_expected_increase: next_day.as_option().and_then(|c| c.expected_increase()),
        model_vs_network_pct: current_day_final_total
            .and_then(|total| pct_change(total, network_target)),
        tracking_vs_model_pct,
        previous_year_final_total,
        year_over_year_pct: current_day_final_total
            .zip(previous_year_final_total)
            .and_then(|(total, previous)| pct_change(total, previous)),
    }
}
