//! Fixed daily rate profile

use super::RateOracle;
use crate::data::HOURS_PER_DAY;
use crate::error::{ForecastError, Result};
use chrono::{NaiveDateTime, Timelike};

/// Oracle answering every day with the same 24 hourly rates.
///
/// Useful for injecting rates produced by an external model, and, through
/// [`ProfileOracle::untrained`], for an oracle that has nothing to offer.
#[derive(Debug, Clone)]
pub struct ProfileOracle {
    name: String,
    rates: Option<Vec<f64>>,
}

impl ProfileOracle {
    /// Create an oracle from 24 raw hourly rates
    pub fn new(rates: Vec<f64>) -> Result<Self> {
        if rates.len() != HOURS_PER_DAY {
            return Err(ForecastError::InvalidParameter(format!(
                "A daily profile needs {} rates, got {}",
                HOURS_PER_DAY,
                rates.len()
            )));
        }

        Ok(Self {
            name: "Fixed Profile".to_string(),
            rates: Some(rates),
        })
    }

    /// An oracle that returns no rates
    pub fn untrained() -> Self {
        Self {
            name: "Untrained".to_string(),
            rates: None,
        }
    }
}

impl RateOracle for ProfileOracle {
    fn forecast(&self, timestamps: &[NaiveDateTime]) -> Result<Vec<f64>> {
        Ok(match &self.rates {
            Some(rates) => timestamps
                .iter()
                .map(|ts| rates[ts.hour() as usize])
                .collect(),
            None => Vec::new(),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
