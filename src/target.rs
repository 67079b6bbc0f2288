//! Turning user-entered text into a validated target coordinate
//!
//! The engine trusts the targets it is given; this is where they get checked.

use crate::error::{NavigationError, Result};
use crate::types::GeoPoint;

/// Parse latitude and longitude text fields into a target point
///
/// Surrounding whitespace is ignored. Latitude must lie in (-90, 90) and
/// longitude in (-180, 180), both bounds exclusive.
///
/// # Example
/// ```
/// use compass_tracker::{NavigationError, target::parse_target};
///
/// let target = parse_target(" 52.2297", "21.0122 ").unwrap();
/// assert_eq!(target.latitude, 52.2297);
///
/// assert_eq!(parse_target("", "21.0"), Err(NavigationError::EmptyCoordinate));
/// assert_eq!(parse_target("95", "21.0"), Err(NavigationError::LatitudeOutOfRange(95.0)));
/// ```
pub fn parse_target(latitude: &str, longitude: &str) -> Result<GeoPoint> {
    let latitude = latitude.trim();
    let longitude = longitude.trim();
    if latitude.is_empty() || longitude.is_empty() {
        return Err(NavigationError::EmptyCoordinate);
    }

    GeoPoint::try_new(parse_degrees(latitude)?, parse_degrees(longitude)?)
}

fn parse_degrees(text: &str) -> Result<f64> {
    text.parse::<f64>()
        .map_err(|_| NavigationError::InvalidNumber(text.to_string()))
}
