use serde::Deserialize;
use std::path::Path;

use crate::error::{ProcessingError, Result};
use crate::models::RainfallRow;
use crate::utils::constants::MONTH_COLUMNS;
use crate::utils::encoding::read_input;

/// One line of the subdivision rainfall table. Columns besides these
/// (annual and seasonal totals) are ignored.
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawRainfallRow {
    SUBDIVISION: String,
    #[serde(deserialize_with = "csv::invalid_option")]
    YEAR: Option<i32>,
    #[serde(deserialize_with = "csv::invalid_option")]
    JAN: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    FEB: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    MAR: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    APR: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    MAY: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    JUN: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    JUL: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    AUG: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    SEP: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    OCT: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    NOV: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    DEC: Option<f64>,
}

impl TryFrom<RawRainfallRow> for RainfallRow {
    type Error = ProcessingError;

    /// Rainfall is a depth, so a negative cell is a corrupt row
    fn try_from(raw: RawRainfallRow) -> Result<Self> {
        let monthly = [
            raw.JAN, raw.FEB, raw.MAR, raw.APR, raw.MAY, raw.JUN, raw.JUL, raw.AUG, raw.SEP,
            raw.OCT, raw.NOV, raw.DEC,
        ];

        if let Some(i) = monthly.iter().position(|v| matches!(v, Some(v) if *v < 0.0)) {
            return Err(ProcessingError::InvalidFormat(format!(
                "Negative {} rainfall for {} ({})",
                MONTH_COLUMNS[i],
                raw.SUBDIVISION.trim(),
                raw.YEAR.map(|y| y.to_string()).unwrap_or_else(|| "no year".to_string())
            )));
        }

        Ok(RainfallRow::new(raw.SUBDIVISION.trim(), raw.YEAR, monthly))
    }
}

#[derive(Debug, Default)]
pub struct RainfallReader;

impl RainfallReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_rainfall(&self, path: &Path) -> Result<Vec<RainfallRow>> {
        let content = read_input(path)?;
        let rows = self.parse_rainfall(&content)?;
        tracing::debug!("Read {} rainfall rows from {}", rows.len(), path.display());
        Ok(rows)
    }

    pub fn parse_rainfall(&self, content: &str) -> Result<Vec<RainfallRow>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        reader
            .deserialize::<RawRainfallRow>()
            .map(|row| RainfallRow::try_from(row?))
            .collect()
    }
}
