//! Run settings, loaded from an optional TOML file through the `config` crate.
//!
//! Every field has a default, so a missing file runs the stock pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use validator::Validate;

use crate::error::Result;
use crate::utils::constants::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Settings {
    #[validate(nested)]
    pub paths: PathSettings,

    #[validate(nested)]
    pub geocoder: GeocoderSettings,

    #[validate(nested)]
    pub climate: ClimateSettings,

    #[validate(nested)]
    pub tourism: TourismSettings,

    pub output: OutputSettings,
}

impl Settings {
    /// Load settings from `path`. When `required` is false a missing file
    /// yields the defaults.
    pub fn load(path: &Path, required: bool) -> Result<Self> {
        let settings: Settings = config::Config::builder()
            .add_source(config::File::from(path).required(required))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PathSettings {
    pub data_dir: PathBuf,
    pub trails_file: PathBuf,
    pub rainfall_file: PathBuf,
    pub tourism_file: PathBuf,
    pub geocode_cache: PathBuf,
    pub climate_cache_dir: PathBuf,
    pub output: PathBuf,
}

impl PathSettings {
    pub fn trails_path(&self) -> PathBuf {
        self.data_dir.join(&self.trails_file)
    }

    pub fn rainfall_path(&self) -> PathBuf {
        self.data_dir.join(&self.rainfall_file)
    }

    pub fn tourism_path(&self) -> PathBuf {
        self.data_dir.join(&self.tourism_file)
    }
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            trails_file: PathBuf::from(DEFAULT_TRAILS_FILE),
            rainfall_file: PathBuf::from(DEFAULT_RAINFALL_FILE),
            tourism_file: PathBuf::from(DEFAULT_TOURISM_FILE),
            geocode_cache: PathBuf::from(DEFAULT_GEOCODE_CACHE),
            climate_cache_dir: PathBuf::from(DEFAULT_CLIMATE_CACHE_DIR),
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct GeocoderSettings {
    #[validate(url)]
    pub base_url: String,

    #[validate(length(min = 1))]
    pub user_agent: String,

    /// Country appended to every query; a region equal to it counts as too coarse
    #[validate(length(min = 1))]
    pub country: String,

    // Public Nominatim policy: one request per second at most
    #[validate(range(min = 1000))]
    pub min_delay_ms: u64,

    pub forward_timeout_secs: u64,
    pub reverse_timeout_secs: u64,

    /// Re-query entries cached as unresolved instead of trusting them
    pub retry_unresolved: bool,
}

impl GeocoderSettings {
    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }
}

impl Default for GeocoderSettings {
    fn default() -> Self {
        Self {
            base_url: NOMINATIM_BASE_URL.to_string(),
            user_agent: NOMINATIM_USER_AGENT.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            min_delay_ms: MIN_GEOCODE_DELAY_MS,
            forward_timeout_secs: FORWARD_TIMEOUT_SECS,
            reverse_timeout_secs: REVERSE_TIMEOUT_SECS,
            retry_unresolved: false,
        }
    }
}

/// What to do when a climatology lookup fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClimateFailurePolicy {
    /// Fail the whole run, naming the coordinate
    #[default]
    Abort,
    /// Leave the heat index empty and keep going
    Skip,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ClimateSettings {
    #[validate(url)]
    pub base_url: String,

    #[validate(length(min = 1))]
    pub community: String,

    pub min_delay_ms: u64,
    pub timeout_secs: u64,
    pub failure_policy: ClimateFailurePolicy,
}

impl ClimateSettings {
    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }
}

impl Default for ClimateSettings {
    fn default() -> Self {
        Self {
            base_url: NASA_POWER_CLIMATOLOGY_URL.to_string(),
            community: NASA_POWER_COMMUNITY.to_string(),
            min_delay_ms: DEFAULT_CLIMATE_DELAY_MS,
            timeout_secs: CLIMATE_TIMEOUT_SECS,
            failure_policy: ClimateFailurePolicy::Abort,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TourismSettings {
    #[validate(length(min = 1))]
    pub region_column: String,

    #[validate(length(min = 1))]
    pub arrivals_column: String,
}

impl Default for TourismSettings {
    fn default() -> Self {
        Self {
            region_column: DEFAULT_TOURISM_REGION_COLUMN.to_string(),
            arrivals_column: DEFAULT_TOURISM_ARRIVALS_COLUMN.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub compression: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            compression: COMPRESSION_SNAPPY.to_string(),
        }
    }
}
