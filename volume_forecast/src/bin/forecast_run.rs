//! Forecast run binary
//!
//! Loads an hourly history CSV, trains a seasonal average oracle and prints
//! one forecast run as JSON on stdout.
//!
//! # Usage
//!
//! ```bash
//! forecast_run <history.csv> <network_target> <short_term_target> [<day_shift> <night_shift>]
//! ```
//!
//! # Environment Variables
//!
//! - `FORECAST_CONFIG`: path to a TOML engine configuration (defaults apply otherwise)
//! - `FORECAST_ORACLE_DAYS`: days of history the oracle averages over (default: 28)
//! - `RUST_LOG`: Log filter directives (default: info)

use std::env;

use tracing::{info, warn};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::FmtSubscriber;

use volume_forecast::data::DataLoader;
use volume_forecast::models::{ProfileOracle, RateModel, RateOracle, SeasonalAverage};
use volume_forecast::normalizer::normalize_window;
use volume_forecast::{
    EngineConfig, ForecastEngine, ForecastError, GuidanceSignals, Result, ShiftEstimate,
};

const DEFAULT_ORACLE_DAYS: u32 = 28;
const USAGE: &str =
    "usage: forecast_run <history.csv> <network_target> <short_term_target> [<day_shift> <night_shift>]";

fn parse_number(args: &[String], index: usize, name: &str) -> Result<f64> {
    let raw = args.get(index).ok_or_else(|| {
        ForecastError::InvalidParameter(format!("missing argument <{}>", name))
    })?;
    raw.parse::<f64>().map_err(|e| {
        ForecastError::InvalidParameter(format!("<{}> is not a number ({}): {}", name, raw, e))
    })
}

/// Day and night shift estimates come as a pair or not at all
fn parse_secondary_estimate(args: &[String]) -> Result<Option<ShiftEstimate>> {
    match args.len() {
        4 => Ok(None),
        6 => Ok(Some(ShiftEstimate {
            day_shift: parse_number(args, 4, "day_shift")?,
            night_shift: parse_number(args, 5, "night_shift")?,
        })),
        _ => Err(ForecastError::InvalidParameter(USAGE.to_string())),
    }
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only the JSON run
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let history_path = args
        .get(1)
        .ok_or_else(|| ForecastError::InvalidParameter(USAGE.to_string()))?;
    let network_target = parse_number(&args, 2, "network_target")?;
    let short_term_target = parse_number(&args, 3, "short_term_target")?;
    let secondary_estimate = parse_secondary_estimate(&args)?;

    let config = match env::var("FORECAST_CONFIG") {
        Ok(path) => {
            info!(%path, "loading configuration");
            EngineConfig::from_file(path)?
        }
        Err(_) => EngineConfig::default(),
    };
    let oracle_days = env::var("FORECAST_ORACLE_DAYS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_ORACLE_DAYS);

    let table = DataLoader::from_csv(history_path)?;
    info!(rows = table.len(), path = %history_path, "history loaded");

    let oracle: Box<dyn RateOracle> =
        match SeasonalAverage::new(oracle_days)?.train(&normalize_window(table.points())) {
            Ok(trained) => Box::new(trained),
            Err(e) => {
                warn!(error = %e, "oracle training failed, continuing without rates");
                Box::new(ProfileOracle::untrained())
            }
        };

    let signals = GuidanceSignals {
        network_target,
        short_term_target,
        secondary_estimate,
    };

    let engine = ForecastEngine::new(config)?;
    let now = chrono::Local::now().naive_local();
    let run = engine.run(&table, oracle.as_ref(), now, &signals);

    println!("{}", run.to_json()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_secondary_estimate_is_optional() {
        let parsed = parse_secondary_estimate(&args(&["forecast_run", "h.csv", "900", "950"]));
        assert_eq!(parsed.unwrap(), None);
    }

    #[test]
    fn test_secondary_estimate_pair() {
        let parsed = parse_secondary_estimate(&args(&[
            "forecast_run", "h.csv", "900", "950", "400", "500",
        ]))
        .unwrap()
        .unwrap();
        assert_eq!(parsed.day_shift, 400.0);
        assert_eq!(parsed.night_shift, 500.0);
    }

    #[test]
    fn test_lone_day_shift_is_rejected() {
        let parsed = parse_secondary_estimate(&args(&["forecast_run", "h.csv", "900", "950", "400"]));
        assert!(matches!(parsed, Err(ForecastError::InvalidParameter(_))));

        let parsed = parse_secondary_estimate(&args(&[
            "forecast_run", "h.csv", "900", "950", "400", "500", "extra",
        ]));
        assert!(matches!(parsed, Err(ForecastError::InvalidParameter(_))));
    }
}
