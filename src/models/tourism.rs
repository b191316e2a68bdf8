use serde::{Deserialize, Serialize};

/// Tourist arrivals for one region in the reference year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourismRow {
    pub region: String,
    pub arrivals: f64,
}

impl TourismRow {
    pub fn new(region: impl Into<String>, arrivals: f64) -> Self {
        Self {
            region: region.into(),
            arrivals,
        }
    }
}
