/// Month column names used by the rainfall table, in calendar order
pub const MONTH_COLUMNS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// Coordinate rounding precision (decimal places)
pub const REVERSE_KEY_PRECISION: usize = 5;
pub const CLIMATE_KEY_PRECISION: usize = 3;
pub const HEAT_INDEX_PRECISION: i32 = 2;

/// Length unit conversion factors
pub const KM_PER_MILE: f64 = 1.60934;
pub const MILES_PER_KM: f64 = 0.621371;

/// Default file locations
pub const DEFAULT_CONFIG_FILE: &str = "trailiq.toml";
pub const DEFAULT_DATA_DIR: &str = "data/raw";
pub const DEFAULT_TRAILS_FILE: &str = "Trails_data.csv";
pub const DEFAULT_RAINFALL_FILE: &str = "rainfall in india 1901-2015.csv";
pub const DEFAULT_TOURISM_FILE: &str = "Tourism_In_India_Statistics_2018-Table_5.1.2_1.csv";
pub const DEFAULT_GEOCODE_CACHE: &str = "data/raw/geocode_cache.json";
pub const DEFAULT_CLIMATE_CACHE_DIR: &str = "data/raw/climate_json";
pub const DEFAULT_OUTPUT_FILE: &str = "data/clean_trails.parquet";

/// Upstream services
pub const NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";
pub const NOMINATIM_USER_AGENT: &str = "trailiq_in";
pub const NASA_POWER_CLIMATOLOGY_URL: &str =
    "https://power.larc.nasa.gov/api/temporal/climatology/point";
pub const NASA_POWER_COMMUNITY: &str = "RE";
pub const DEFAULT_COUNTRY: &str = "India";

/// Request pacing and timeouts
pub const MIN_GEOCODE_DELAY_MS: u64 = 1000;
pub const DEFAULT_CLIMATE_DELAY_MS: u64 = 1000;
pub const FORWARD_TIMEOUT_SECS: u64 = 10;
pub const REVERSE_TIMEOUT_SECS: u64 = 8;
pub const CLIMATE_TIMEOUT_SECS: u64 = 12;

/// NASA POWER marks missing climatology with large negative fill values
pub const POWER_FILL_VALUE: f64 = -999.0;

/// Tourism table defaults
pub const DEFAULT_TOURISM_REGION_COLUMN: &str = "State/UT";
pub const DEFAULT_TOURISM_ARRIVALS_COLUMN: &str = "2017 - Domestic";

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
