pub mod constants;
pub mod coordinates;
pub mod encoding;
pub mod progress;
pub mod text;

pub use constants::*;
pub use coordinates::{climate_cache_key, reverse_geocode_key, round_to, validate_coordinates};
pub use encoding::{decode_input, read_input};
pub use progress::ProgressReporter;
pub use text::{non_blank, parse_length, parse_number, title_case};
