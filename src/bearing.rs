//! Great-circle bearing between two geographic points

use crate::math::wrap_degrees;
use crate::types::GeoPoint;

/// Calculate the initial great-circle bearing from `from` to `to`
///
/// Uses the spherical formula
/// `θ = atan2(sin Δλ · cos φ2, cos φ1 · sin φ2 − sin φ1 · cos φ2 · cos Δλ)`.
/// Altitude is ignored.
///
/// # Returns
/// Bearing in degrees within [0, 360), clockwise from true north. Identical
/// points have no defined direction and return 0°.
///
/// # Example
/// ```
/// use compass_tracker::{GeoPoint, bearing::initial_bearing};
///
/// let origin = GeoPoint::new(0.0, 0.0);
/// let east = GeoPoint::new(0.0, 90.0);
/// assert!((initial_bearing(&origin, &east) - 90.0).abs() < 1e-9);
/// ```
pub fn initial_bearing(from: &GeoPoint, to: &GeoPoint) -> f64 {
    if from.latitude == to.latitude && from.longitude == to.longitude {
        return 0.0;
    }

    let phi1 = from.latitude.to_radians();
    let phi2 = to.latitude.to_radians();
    let delta_lambda = (to.longitude - from.longitude).to_radians();

    let y = delta_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    wrap_degrees(y.atan2(x).to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_cardinal_bearings_from_equator() {
        let origin = GeoPoint::new(0.0, 0.0);
        assert!((initial_bearing(&origin, &GeoPoint::new(10.0, 0.0)) - 0.0).abs() < EPSILON);
        assert!((initial_bearing(&origin, &GeoPoint::new(0.0, 90.0)) - 90.0).abs() < EPSILON);
        assert!((initial_bearing(&origin, &GeoPoint::new(-10.0, 0.0)) - 180.0).abs() < EPSILON);
        assert!((initial_bearing(&origin, &GeoPoint::new(0.0, -90.0)) - 270.0).abs() < EPSILON);
    }

    #[test]
    fn test_identical_points() {
        for point in [
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(52.2297, 21.0122),
            GeoPoint::new(-89.9, 179.9),
        ] {
            assert_eq!(initial_bearing(&point, &point), 0.0);
        }
    }

    #[test]
    fn test_altitude_ignored() {
        let from = GeoPoint::new(48.8566, 2.3522);
        let to = GeoPoint::new(51.5074, -0.1278);
        let high = to.with_altitude(10_000.0);
        assert_eq!(initial_bearing(&from, &to), initial_bearing(&from, &high));
    }

    #[test]
    fn test_known_route() {
        // Paris to London heads roughly north-west
        let paris = GeoPoint::new(48.8566, 2.3522);
        let london = GeoPoint::new(51.5074, -0.1278);
        let bearing = initial_bearing(&paris, &london);
        assert!((bearing - 330.0).abs() < 2.0, "got {}", bearing);
    }

    #[test]
    fn test_range_over_grid() {
        for from_lat in (-80..=80).step_by(20) {
            for from_lon in (-170..=170).step_by(34) {
                for to_lat in (-85..=85).step_by(17) {
                    for to_lon in (-175..=175).step_by(35) {
                        let from = GeoPoint::new(from_lat as f64, from_lon as f64);
                        let to = GeoPoint::new(to_lat as f64, to_lon as f64);
                        let bearing = initial_bearing(&from, &to);
                        assert!(
                            (0.0..360.0).contains(&bearing),
                            "bearing {} out of range for {:?} -> {:?}",
                            bearing,
                            from,
                            to
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_antimeridian_crossing() {
        let west_of_line = GeoPoint::new(0.0, 179.0);
        let east_of_line = GeoPoint::new(0.0, -179.0);
        assert!((initial_bearing(&west_of_line, &east_of_line) - 90.0).abs() < 1e-6);
    }
}
