pub mod rainfall_reader;
pub mod tourism_reader;
pub mod trail_reader;

pub use rainfall_reader::RainfallReader;
pub use tourism_reader::TourismReader;
pub use trail_reader::TrailReader;
