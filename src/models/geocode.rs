use serde::{Deserialize, Serialize};

/// A place returned by forward geocoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Raw administrative region (state) reported by the service
    pub region: Option<String>,
}

/// Durable geocode cache value.
///
/// Null coordinates are the explicit "unresolved" marker. The field names
/// match the cache file layout: `{"lat": .., "lon": .., "state": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeCacheEntry {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub state: Option<String>,
}

impl GeocodeCacheEntry {
    pub fn unresolved() -> Self {
        Self {
            lat: None,
            lon: None,
            state: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.lat.is_some() && self.lon.is_some()
    }

    pub fn to_outcome(&self) -> GeocodeOutcome {
        match (self.lat, self.lon) {
            (Some(latitude), Some(longitude)) => GeocodeOutcome::Resolved(GeoPoint {
                latitude,
                longitude,
                region: self.state.clone(),
            }),
            _ => GeocodeOutcome::Unresolved,
        }
    }
}

impl From<&GeoPoint> for GeocodeCacheEntry {
    fn from(point: &GeoPoint) -> Self {
        Self {
            lat: Some(point.latitude),
            lon: Some(point.longitude),
            state: point.region.clone(),
        }
    }
}

/// Result of a forward geocode
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeOutcome {
    Resolved(GeoPoint),
    Unresolved,
}

impl GeocodeOutcome {
    pub fn point(&self) -> Option<&GeoPoint> {
        match self {
            GeocodeOutcome::Resolved(point) => Some(point),
            GeocodeOutcome::Unresolved => None,
        }
    }
}

/// Result of a reverse geocode, keeping "no match" apart from service failure
#[derive(Debug, Clone, PartialEq)]
pub enum ReverseOutcome {
    Region(String),
    NoMatch,
    ServiceFailure(String),
}

impl ReverseOutcome {
    pub fn region(&self) -> Option<&str> {
        match self {
            ReverseOutcome::Region(region) => Some(region),
            _ => None,
        }
    }
}
