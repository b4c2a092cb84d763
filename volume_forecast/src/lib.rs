//! # Volume Forecast
//!
//! Forecasting of a facility's cumulative hourly workable volume for the
//! current and next operating day.
//!
//! ## Features
//!
//! - Normalization of cumulative readings into hourly increments with a daily reset
//! - Rate oracles (seasonal average, seasonal smoothing, fixed profile)
//! - Daily reconciliation of oracle rates with actuals and external targets
//! - Rolling multi-day horizon with shift volumes
//! - Historical 3-hour block, daily and hourly shape trends
//! - Bounded scaling guidance from external signals
//!
//! ## Quick Start
//!
//! ```no_run
//! use volume_forecast::data::DataLoader;
//! use volume_forecast::models::{RateModel, SeasonalAverage};
//! use volume_forecast::normalizer::normalize_window;
//! use volume_forecast::{EngineConfig, ForecastEngine, GuidanceSignals};
//!
//! # fn main() -> Result<(), volume_forecast::ForecastError> {
//! // Load hourly cumulative readings
//! let table = DataLoader::from_csv("history.csv")?;
//!
//! // Train an oracle on the normalized history
//! let oracle = SeasonalAverage::new(28)?.train(&normalize_window(table.points()))?;
//!
//! // Run the engine for the current hour
//! let engine = ForecastEngine::new(EngineConfig::default())?;
//! let now = chrono::Local::now().naive_local();
//! let run = engine.run(&table, &oracle, now, &GuidanceSignals::network_only(12000.0));
//!
//! println!("{}", run.to_json()?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod guidance;
pub mod horizon;
pub mod models;
pub mod normalizer;
pub mod reconcile;
pub mod trends;

// Re-export commonly used types
pub use crate::config::EngineConfig;
pub use crate::data::{DataLoader, ObservationPoint, ObservationTable};
pub use crate::engine::{Availability, ForecastEngine, ForecastRun, RunSummary};
pub use crate::error::{ForecastError, Result};
pub use crate::guidance::{GuidanceCalculator, GuidanceFactors, GuidanceSignals, ShiftEstimate};
pub use crate::horizon::{HorizonStitcher, RollingHorizon};
pub use crate::models::{RateModel, RateOracle};
pub use crate::reconcile::{DailyForecastCurve, DailyReconciler};
pub use crate::trends::{HistoricalTrendAggregator, HistoricalTrends};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
