use std::collections::HashMap;

use tracing::debug;

use crate::cache::{DirectoryCache, PersistentCache};
use crate::config::ClimateSettings;
use crate::error::{ProcessingError, Result};
use crate::models::ClimateCacheEntry;
use crate::processors::RateLimiter;
use crate::services::ClimatologyService;
use crate::utils::constants::CLIMATE_KEY_PRECISION;
use crate::utils::coordinates::{climate_cache_key, round_to};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClimateStats {
    pub cache_hits: usize,
    pub fetched: usize,
    pub failed: usize,
    pub failures_reused: usize,
}

/// Annual heat index per coordinate, cached on disk by rounded coordinate.
///
/// Failed keys are remembered in memory until [`ClimateFetcher::begin_run`],
/// so a coordinate is requested at most once per run.
pub struct ClimateFetcher<S, C = DirectoryCache<ClimateCacheEntry>> {
    service: S,
    cache: C,
    limiter: RateLimiter,
    failed: HashMap<String, String>,
    stats: ClimateStats,
}

impl<S, C> ClimateFetcher<S, C>
where
    S: ClimatologyService,
    C: PersistentCache<ClimateCacheEntry>,
{
    pub fn new(service: S, cache: C, settings: &ClimateSettings) -> Self {
        Self {
            service,
            cache,
            limiter: RateLimiter::new(settings.min_delay()),
            failed: HashMap::new(),
            stats: ClimateStats::default(),
        }
    }

    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn begin_run(&mut self) {
        self.failed.clear();
        self.stats = ClimateStats::default();
    }

    pub fn stats(&self) -> &ClimateStats {
        &self.stats
    }

    pub fn reset_cache(&mut self) -> Result<()> {
        self.failed.clear();
        self.cache.reset()
    }

    /// Heat index at a coordinate, or `None` when either component is missing.
    ///
    /// Coordinates are rounded to 3 decimals for both the cache key and the
    /// request. A failed lookup is a `ClimateFetch` error; nothing is cached on
    /// disk, and the same key fails again without a request for the rest of
    /// the run.
    pub async fn annual_heat_index(
        &mut self,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<Option<f64>> {
        let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
            return Ok(None);
        };

        let latitude = round_to(latitude, CLIMATE_KEY_PRECISION as i32);
        let longitude = round_to(longitude, CLIMATE_KEY_PRECISION as i32);
        let key = climate_cache_key(latitude, longitude);

        if let Some(entry) = self.cache.get(&key)? {
            self.stats.cache_hits += 1;
            return Ok(Some(entry.heat_index));
        }

        let fetch_error = |message: String| ProcessingError::ClimateFetch {
            latitude,
            longitude,
            message,
        };

        if let Some(message) = self.failed.get(&key) {
            self.stats.failures_reused += 1;
            return Err(fetch_error(message.clone()));
        }

        self.limiter.wait().await;

        let fetched = match self.service.temperature_climatology(latitude, longitude).await {
            Ok(climatology) => climatology.annual_heat_index(),
            Err(e) => Err(e),
        };
        let heat_index = match fetched {
            Ok(heat_index) => heat_index,
            Err(e) => {
                let message = e.to_string();
                self.stats.failed += 1;
                self.failed.insert(key, message.clone());
                return Err(fetch_error(message));
            }
        };

        self.cache.put(
            &key,
            ClimateCacheEntry {
                latitude,
                longitude,
                heat_index,
            },
        )?;
        self.stats.fetched += 1;
        debug!("Heat index at {} = {:.2}", key, heat_index);

        Ok(Some(heat_index))
    }
}
