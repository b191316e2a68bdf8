use crate::error::{ProcessingError, Result};
use crate::utils::constants::{CLIMATE_KEY_PRECISION, REVERSE_KEY_PRECISION};

/// Round a value to a fixed number of decimal places
///
/// # Examples
/// ```
/// use trailiq_etl::utils::round_to;
///
/// assert_eq!(round_to(30.72849, 3), 30.728);
/// assert_eq!(round_to(23.456, 2), 23.46);
/// ```
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Key for the per-run reverse geocode memo: "lat,lon" at 5 decimal places
pub fn reverse_geocode_key(latitude: f64, longitude: f64) -> String {
    format!(
        "{:.prec$},{:.prec$}",
        latitude,
        longitude,
        prec = REVERSE_KEY_PRECISION
    )
}

/// Key for the climate cache: "lat_lon" at 3 decimal places
pub fn climate_cache_key(latitude: f64, longitude: f64) -> String {
    format!(
        "{:.prec$}_{:.prec$}",
        latitude,
        longitude,
        prec = CLIMATE_KEY_PRECISION
    )
}

/// Reject coordinates outside the WGS84 range
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(ProcessingError::InvalidFormat(format!(
            "Latitude {} is outside [-90, 90]",
            latitude
        )));
    }

    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(ProcessingError::InvalidFormat(format!(
            "Longitude {} is outside [-180, 180]",
            longitude
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(30.72849, 3), 30.728);
        assert_eq!(round_to(-0.12751, 3), -0.128);
        assert_eq!(round_to(23.455001, 2), 23.46);
    }

    #[test]
    fn test_reverse_geocode_key() {
        assert_eq!(reverse_geocode_key(30.7284912, 79.6050123), "30.72849,79.60501");
        assert_eq!(reverse_geocode_key(8.0, 77.5), "8.00000,77.50000");
    }

    #[test]
    fn test_climate_cache_key() {
        assert_eq!(climate_cache_key(30.7284912, 79.6050123), "30.728_79.605");
        assert_eq!(climate_cache_key(-1.5, 36.25), "-1.500_36.250");
    }

    #[test]
    fn test_coordinate_validation() {
        assert!(validate_coordinates(30.72, 79.60).is_ok());
        assert!(validate_coordinates(91.0, 0.0).is_err());
        assert!(validate_coordinates(0.0, -181.0).is_err());
        assert!(validate_coordinates(f64::NAN, 0.0).is_err());
    }
}
