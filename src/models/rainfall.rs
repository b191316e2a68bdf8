use serde::{Deserialize, Serialize};

use crate::models::Month;

/// One year of monthly rainfall (mm) for a subdivision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RainfallRow {
    pub subdivision: String,
    pub year: Option<i32>,
    pub monthly: [Option<f64>; 12],
}

impl RainfallRow {
    pub fn new(subdivision: impl Into<String>, year: Option<i32>, monthly: [Option<f64>; 12]) -> Self {
        Self {
            subdivision: subdivision.into(),
            year,
            monthly,
        }
    }

    pub fn value(&self, month: Month) -> Option<f64> {
        self.monthly[month.index()]
    }
}

/// Long-term rainfall climatology for one canonical subdivision
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RainfallStats {
    /// Mean of the twelve multi-year monthly means
    pub mean_rainfall: Option<f64>,
    /// Month with the lowest multi-year mean rainfall
    pub driest_month: Option<Month>,
}
