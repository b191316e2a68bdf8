use serde::{Deserialize, Serialize};

use crate::error::{ProcessingError, Result};
use crate::utils::constants::HEAT_INDEX_PRECISION;
use crate::utils::coordinates::round_to;

/// Twelve-month climatology of daily maximum and minimum 2 m temperature (°C)
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureClimatology {
    pub monthly_max: Vec<f64>,
    pub monthly_min: Vec<f64>,
}

impl TemperatureClimatology {
    pub fn new(monthly_max: Vec<f64>, monthly_min: Vec<f64>) -> Self {
        Self {
            monthly_max,
            monthly_min,
        }
    }

    /// Annual heat index: mean of the combined max and min monthly series,
    /// rounded to 2 decimals
    pub fn annual_heat_index(&self) -> Result<f64> {
        if self.monthly_max.is_empty() || self.monthly_min.is_empty() {
            return Err(ProcessingError::MissingColumn {
                column: "T2M_MAX/T2M_MIN".to_string(),
                file: "climatology response".to_string(),
            });
        }

        let count = (self.monthly_max.len() + self.monthly_min.len()) as f64;
        let total: f64 = self.monthly_max.iter().chain(&self.monthly_min).sum();
        Ok(round_to(total / count, HEAT_INDEX_PRECISION))
    }
}

/// Durable climate cache value, one file per rounded coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClimateCacheEntry {
    pub latitude: f64,
    pub longitude: f64,
    pub heat_index: f64,
}
