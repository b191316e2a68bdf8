pub mod climate_fetcher;
pub mod geocoder;
pub mod normalizer;
pub mod pipeline;
pub mod rainfall_aggregator;
pub mod rate_limiter;
pub mod tourism_scorer;

pub use climate_fetcher::{ClimateFetcher, ClimateStats};
pub use geocoder::{GeocodeStats, Geocoder};
pub use normalizer::{normalize_region, RegionNormalizer, SUBDIVISION_ALIASES};
pub use pipeline::{EnrichmentPipeline, PipelineInputs, PipelineOptions, RunReport};
pub use rainfall_aggregator::RainfallAggregator;
pub use rate_limiter::RateLimiter;
pub use tourism_scorer::TourismScorer;
