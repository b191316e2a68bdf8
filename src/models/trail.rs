use serde::{Deserialize, Serialize};

use crate::models::Month;
use crate::utils::text::parse_length;

/// A trail as read from the raw table, plus the fields the pipeline attaches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailRecord {
    pub trail_name: String,
    pub location: Option<String>,
    pub distance_km: Option<f64>,
    pub distance_mi: Option<f64>,
    pub difficulty: Option<String>,
    pub average_rating: Option<f64>,
    pub number_of_reviews: Option<u32>,

    // Derived fields, written only by the enrichment pipeline
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub region: Option<String>,
    pub rain_longterm: Option<f64>,
    pub best_month: Option<Month>,
    pub crowd_score: Option<f64>,
    pub heat_index: Option<f64>,
}

impl TrailRecord {
    pub fn new(trail_name: impl Into<String>) -> Self {
        Self {
            trail_name: trail_name.into(),
            location: None,
            distance_km: None,
            distance_mi: None,
            difficulty: None,
            average_rating: None,
            number_of_reviews: None,
            latitude: None,
            longitude: None,
            region: None,
            rain_longterm: None,
            best_month: None,
            crowd_score: None,
            heat_index: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        let location = location.into();
        let trimmed = location.trim();
        self.location = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }

    pub fn with_length(mut self, length_text: &str) -> Self {
        let (km, mi) = parse_length(length_text);
        self.distance_km = km;
        self.distance_mi = mi;
        self
    }

    pub fn with_difficulty(mut self, difficulty: Option<String>) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_rating(mut self, average_rating: Option<f64>, number_of_reviews: Option<u32>) -> Self {
        self.average_rating = average_rating;
        self.number_of_reviews = number_of_reviews;
        self
    }

    /// Geocoder query for this trail: "<location>, <country>"
    pub fn search_query(&self, country: &str) -> Option<String> {
        self.location
            .as_ref()
            .map(|location| format!("{}, {}", location, country))
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    pub fn has_coordinates(&self) -> bool {
        self.coordinates().is_some()
    }

    /// True when the region is missing or only names the country itself
    pub fn needs_region_fallback(&self, country: &str) -> bool {
        match self.region.as_deref() {
            None => true,
            Some(region) => {
                let region = region.trim();
                region.is_empty() || region.eq_ignore_ascii_case(country)
            }
        }
    }
}
