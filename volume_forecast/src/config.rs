//! Engine configuration
//!
//! Every setting has a default, so an empty TOML document (or a document
//! holding only the sections a caller wants to change) is a valid config.

use crate::data::MAX_HISTORY_DAYS;
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub reconcile: ReconcileSettings,
    #[serde(default)]
    pub horizon: HorizonSettings,
    #[serde(default)]
    pub trends: TrendSettings,
    #[serde(default)]
    pub guidance: GuidanceSettings,
}

/// Blend weights for future-day targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcileSettings {
    /// Weight of the oracle's natural daily total
    #[serde(default = "default_oracle_weight")]
    pub oracle_weight: f64,
    /// Weight of the guided external target
    #[serde(default = "default_external_weight")]
    pub external_weight: f64,
}

/// Rolling horizon length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonSettings {
    #[serde(default = "default_horizon_hours")]
    pub hours: usize,
    /// Number of upcoming shifts summarised from the horizon
    #[serde(default = "default_upcoming_shifts")]
    pub upcoming_shifts: usize,
}

/// Historical trend windows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSettings {
    /// Days of history scanned for block and daily trends
    #[serde(default = "default_days_prior")]
    pub days_prior: u32,
    /// Occurrences in the long moving average
    #[serde(default = "default_long_window")]
    pub long_window: usize,
    /// Occurrences in the short moving average
    #[serde(default = "default_short_window")]
    pub short_window: usize,
    /// Days in the overall rolling average of daily totals
    #[serde(default = "default_rolling_window")]
    pub rolling_window: usize,
    /// Days of history used for hourly shape profiles
    #[serde(default = "default_shape_days")]
    pub shape_days: u32,
}

/// Scaling guidance weights and bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuidanceSettings {
    #[serde(default = "default_signal_weight")]
    pub short_term_weight: f64,
    #[serde(default = "default_signal_weight")]
    pub secondary_weight: f64,
    /// Weight of the neutral 1.0 anchor
    #[serde(default = "default_anchor_weight")]
    pub anchor_weight: f64,
    /// Fraction of the trend deviation passed through to the scaling
    #[serde(default = "default_dampening")]
    pub dampening: f64,
    #[serde(default = "default_max_scaling")]
    pub max_scaling: f64,
    #[serde(default = "default_min_scaling")]
    pub min_scaling: f64,
}

fn default_oracle_weight() -> f64 {
    0.7
}

fn default_external_weight() -> f64 {
    0.3
}

fn default_horizon_hours() -> usize {
    48
}

fn default_days_prior() -> u32 {
    45
}

fn default_long_window() -> usize {
    6
}

fn default_upcoming_shifts() -> usize {
    2
}

fn default_short_window() -> usize {
    3
}

fn default_rolling_window() -> usize {
    7
}

fn default_shape_days() -> u32 {
    21
}

fn default_signal_weight() -> f64 {
    0.35
}

fn default_anchor_weight() -> f64 {
    0.30
}

fn default_dampening() -> f64 {
    0.5
}

fn default_max_scaling() -> f64 {
    1.3
}

fn default_min_scaling() -> f64 {
    0.8
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            oracle_weight: default_oracle_weight(),
            external_weight: default_external_weight(),
        }
    }
}

impl Default for HorizonSettings {
    fn default() -> Self {
        Self {
            hours: default_horizon_hours(),
            upcoming_shifts: default_upcoming_shifts(),
        }
    }
}

impl Default for TrendSettings {
    fn default() -> Self {
        Self {
            days_prior: default_days_prior(),
            long_window: default_long_window(),
            short_window: default_short_window(),
            rolling_window: default_rolling_window(),
            shape_days: default_shape_days(),
        }
    }
}

impl Default for GuidanceSettings {
    fn default() -> Self {
        Self {
            short_term_weight: default_signal_weight(),
            secondary_weight: default_signal_weight(),
            anchor_weight: default_anchor_weight(),
            dampening: default_dampening(),
            max_scaling: default_max_scaling(),
            min_scaling: default_min_scaling(),
        }
    }
}

impl EngineConfig {
    /// Load and validate a configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            ForecastError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse and validate a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that windows are non-empty and bounded, weights non-negative and scaling bounds ordered
    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("reconcile.oracle_weight", self.reconcile.oracle_weight),
            ("reconcile.external_weight", self.reconcile.external_weight),
            ("guidance.short_term_weight", self.guidance.short_term_weight),
            ("guidance.secondary_weight", self.guidance.secondary_weight),
            ("guidance.anchor_weight", self.guidance.anchor_weight),
            ("guidance.dampening", self.guidance.dampening),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(ForecastError::InvalidParameter(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        if self.horizon.hours == 0 {
            return Err(ForecastError::InvalidParameter(
                "horizon.hours must be positive".to_string(),
            ));
        }

        let trends = &self.trends;
        if trends.days_prior == 0
            || trends.shape_days == 0
            || trends.long_window == 0
            || trends.short_window == 0
            || trends.rolling_window == 0
        {
            return Err(ForecastError::InvalidParameter(
                "trend windows must be positive".to_string(),
            ));
        }

        let windows = [
            ("trends.days_prior", trends.days_prior as usize),
            ("trends.shape_days", trends.shape_days as usize),
            ("trends.long_window", trends.long_window),
            ("trends.short_window", trends.short_window),
            ("trends.rolling_window", trends.rolling_window),
        ];
        for (name, value) in windows {
            if value > MAX_HISTORY_DAYS as usize {
                return Err(ForecastError::InvalidParameter(format!(
                    "{} must be at most {}, got {}",
                    name, MAX_HISTORY_DAYS, value
                )));
            }
        }

        if self.guidance.min_scaling > self.guidance.max_scaling {
            return Err(ForecastError::InvalidParameter(format!(
                "guidance.min_scaling ({}) exceeds guidance.max_scaling ({})",
                self.guidance.min_scaling, self.guidance.max_scaling
            )));
        }

        Ok(())
    }
}
