use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::models::{Month, TrailRecord};

/// The final, denormalized output row.
///
/// Coordinates are always present; every other derived field is `None` when
/// its join or lookup had no match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct EnrichedRecord {
    #[validate(length(min = 1))]
    pub trail_name: String,

    pub state: Option<String>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub lon: f64,

    #[validate(range(min = 0.0))]
    pub distance_km: Option<f64>,

    #[validate(range(min = 0.0))]
    pub distance_mi: Option<f64>,

    pub difficulty: Option<String>,
    pub average_rating: Option<f64>,
    pub number_of_reviews: Option<u32>,

    #[validate(range(min = 0.0))]
    pub rain_longterm: Option<f64>,

    #[validate(range(min = 0.0, max = 1.0))]
    pub crowd_score: Option<f64>,

    pub heat_index: Option<f64>,
    pub best_month: Option<Month>,
}

impl EnrichedRecord {
    pub fn has_rainfall(&self) -> bool {
        self.rain_longterm.is_some()
    }

    pub fn has_crowd_score(&self) -> bool {
        self.crowd_score.is_some()
    }
}

impl TryFrom<TrailRecord> for EnrichedRecord {
    type Error = ProcessingError;

    fn try_from(trail: TrailRecord) -> Result<Self> {
        let (lat, lon) = trail.coordinates().ok_or_else(|| {
            ProcessingError::InvalidInput(format!(
                "Trail '{}' has no coordinates and cannot be projected",
                trail.trail_name
            ))
        })?;

        let record = EnrichedRecord {
            trail_name: trail.trail_name,
            state: trail.region,
            lat,
            lon,
            distance_km: trail.distance_km,
            distance_mi: trail.distance_mi,
            difficulty: trail.difficulty,
            average_rating: trail.average_rating,
            number_of_reviews: trail.number_of_reviews,
            rain_longterm: trail.rain_longterm,
            crowd_score: trail.crowd_score,
            heat_index: trail.heat_index,
            best_month: trail.best_month,
        };

        record.validate()?;
        Ok(record)
    }
}
