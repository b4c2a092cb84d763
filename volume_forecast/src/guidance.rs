//! Scaling guidance from external signals
//!
//! Guidance factors are soft multipliers: they nudge the magnitude of a
//! next-day forecast towards the external signals and are always bounded.

use crate::config::GuidanceSettings;
use crate::data::HOURS_PER_DAY;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Secondary independent estimate, split by shift
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShiftEstimate {
    pub day_shift: f64,
    pub night_shift: f64,
}

impl ShiftEstimate {
    /// Combined estimate for the day
    pub fn total(&self) -> f64 {
        self.day_shift + self.night_shift
    }
}

/// External signals available for one run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuidanceSignals {
    /// Network-wide daily target, the baseline the other signals are compared to
    pub network_target: f64,
    /// Short-term external forecast (e.g. a three-day outlook)
    pub short_term_target: f64,
    /// Secondary estimate; `None` when that source is unavailable
    pub secondary_estimate: Option<ShiftEstimate>,
}

impl GuidanceSignals {
    /// Signals with only a network target; the guidance will be neutral
    pub fn network_only(network_target: f64) -> Self {
        Self {
            network_target,
            short_term_target: network_target,
            secondary_estimate: None,
        }
    }
}

/// Trend ratios behind a set of guidance factors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuidanceMetrics {
    pub network_target: f64,
    pub short_term_target: f64,
    pub secondary_total: Option<f64>,
    pub short_term_trend: f64,
    pub secondary_trend: f64,
    pub weighted_trend: f64,
    /// Mean of the per-hour multipliers
    pub average_multiplier: f64,
}

/// Bounded soft multipliers derived from the external signals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuidanceFactors {
    pub base_scaling: f64,
    pub next_day_scaling: f64,
    pub hourly_multipliers: [f64; HOURS_PER_DAY],
    pub metrics: GuidanceMetrics,
    /// True when the secondary source was missing and neutral guidance was used
    pub fallback: bool,
}

impl GuidanceFactors {
    /// Guidance that leaves every forecast unchanged in magnitude
    pub fn neutral(network_target: f64) -> Self {
        let hourly_multipliers = time_of_day_multipliers(1.0);
        Self {
            base_scaling: 1.0,
            next_day_scaling: 1.0,
            metrics: GuidanceMetrics {
                network_target,
                short_term_target: network_target,
                secondary_total: None,
                short_term_trend: 1.0,
                secondary_trend: 1.0,
                weighted_trend: 1.0,
                average_multiplier: mean(&hourly_multipliers),
            },
            hourly_multipliers,
            fallback: true,
        }
    }
}

/// Computes [`GuidanceFactors`] from [`GuidanceSignals`]
#[derive(Debug, Clone, Default)]
pub struct GuidanceCalculator {
    settings: GuidanceSettings,
}

impl GuidanceCalculator {
    pub fn new(settings: GuidanceSettings) -> Self {
        Self { settings }
    }

    /// Derive guidance; falls back to neutral guidance without a secondary estimate
    pub fn compute(&self, signals: &GuidanceSignals) -> GuidanceFactors {
        let secondary = match signals.secondary_estimate {
            Some(estimate) => estimate.total(),
            None => {
                warn!("secondary estimate unavailable, using neutral guidance");
                return GuidanceFactors::neutral(signals.network_target);
            }
        };

        let baseline = signals.network_target;
        let ratio = |value: f64| if baseline != 0.0 { value / baseline } else { 1.0 };
        let short_term_trend = ratio(signals.short_term_target);
        let secondary_trend = ratio(secondary);

        let s = &self.settings;
        let weighted_trend = short_term_trend * s.short_term_weight
            + secondary_trend * s.secondary_weight
            + s.anchor_weight;

        let (base_scaling, next_day_scaling) = self.scalings(weighted_trend);
        let hourly_multipliers = time_of_day_multipliers(next_day_scaling);
        let average_multiplier = mean(&hourly_multipliers);

        info!(
            short_term_trend,
            secondary_trend,
            weighted_trend,
            base_scaling,
            next_day_scaling,
            "computed scaling guidance"
        );

        GuidanceFactors {
            base_scaling,
            next_day_scaling,
            hourly_multipliers,
            metrics: GuidanceMetrics {
                network_target: baseline,
                short_term_target: signals.short_term_target,
                secondary_total: Some(secondary),
                short_term_trend,
                secondary_trend,
                weighted_trend,
                average_multiplier,
            },
            fallback: false,
        }
    }

    /// Dampened base scaling and its bounded next-day counterpart
    pub fn scalings(&self, weighted_trend: f64) -> (f64, f64) {
        let s = &self.settings;
        if weighted_trend > 1.0 {
            let base = 1.0 + (weighted_trend - 1.0) * s.dampening;
            (base, base.min(s.max_scaling))
        } else {
            let base = 1.0 - (1.0 - weighted_trend) * s.dampening;
            (base, base.max(s.min_scaling))
        }
    }
}

/// Fixed time-of-day shape multiplied by a scaling
pub fn time_of_day_multipliers(scaling: f64) -> [f64; HOURS_PER_DAY] {
    let mut multipliers = [0.0; HOURS_PER_DAY];
    for (hour, slot) in multipliers.iter_mut().enumerate() {
        let tod = match hour {
            0..=5 => 0.99,
            6..=11 => 1.05,
            _ => 1.03,
        };
        *slot = scaling * tod;
    }
    multipliers
}

fn mean(values: &[f64]) -> f64 {
    statrs::statistics::Statistics::mean(values.iter())
}
