//! Clients for the upstream lookup services.
//!
//! The pipeline talks to these only through [`GeocodingService`] and
//! [`ClimatologyService`], so tests can substitute in-process fakes.
//! Clients do no caching and no pacing; the processors own both.

pub mod nasa_power;
pub mod nominatim;

pub use nasa_power::NasaPowerClient;
pub use nominatim::NominatimClient;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{GeoPoint, TemperatureClimatology};

#[async_trait]
pub trait GeocodingService: Send + Sync {
    /// Free-text search. `Ok(None)` means the service found no match.
    async fn search(&self, query: &str) -> Result<Option<GeoPoint>>;

    /// Coordinates to administrative region name. `Ok(None)` means no match.
    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Option<String>>;
}

#[async_trait]
pub trait ClimatologyService: Send + Sync {
    /// Monthly max/min temperature climatology at a point
    async fn temperature_climatology(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<TemperatureClimatology>;
}
