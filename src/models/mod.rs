pub mod climate;
pub mod enriched;
pub mod geocode;
pub mod month;
pub mod rainfall;
pub mod tourism;
pub mod trail;

pub use climate::{ClimateCacheEntry, TemperatureClimatology};
pub use enriched::EnrichedRecord;
pub use geocode::{GeoPoint, GeocodeCacheEntry, GeocodeOutcome, ReverseOutcome};
pub use month::Month;
pub use rainfall::{RainfallRow, RainfallStats};
pub use tourism::TourismRow;
pub use trail::TrailRecord;
