//! Tilt-compensated heading from gravity and geomagnetic vectors

use nalgebra::{Matrix3, RowVector3, Vector3};

use crate::math::wrap_degrees_f32;

/// Standard gravity in m/s²
pub const STANDARD_GRAVITY: f32 = 9.80665;

/// Accelerations below 10% of gravity are treated as free fall
const FREE_FALL_GRAVITY_SQUARED: f32 = 0.01 * STANDARD_GRAVITY * STANDARD_GRAVITY;

/// Below this magnitude of `E × A` the field is too close to vertical (or the
/// device is close to a magnetic pole) for a usable east reference
const MIN_HORIZONTAL_FIELD: f32 = 0.1;

/// Device orientation angles in radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceOrientation {
    /// Rotation about the vertical axis, 0 when the device's Y axis points to
    /// magnetic north, positive towards east, range (-π, π]
    pub azimuth: f32,
    /// Rotation about the X axis, range [-π/2, π/2]
    pub pitch: f32,
    /// Rotation about the Y axis, range (-π, π]
    pub roll: f32,
}

impl DeviceOrientation {
    /// Azimuth in degrees within [0, 360)
    pub fn azimuth_degrees(&self) -> f32 {
        wrap_degrees_f32(self.azimuth.to_degrees() + 360.0)
    }
}

/// Build the rotation matrix from the device frame to the world frame
///
/// The rows are, in device coordinates, the world's east axis
/// `H = normalize(E × A)`, north axis `M = A × H` and up axis
/// `A = normalize(gravity)`. Multiplying a device-frame vector by the matrix
/// expresses it in East-North-Up coordinates.
///
/// Returns `None` while the device is in free fall or when the magnetic field
/// is (nearly) parallel to gravity.
///
/// # Arguments
/// * `gravity` - Accelerometer reading in m/s² (points up when at rest)
/// * `geomagnetic` - Magnetometer reading in µT
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use compass_tracker::compass::rotation_matrix;
///
/// let level = Vector3::new(0.0, 0.0, 9.81);
/// let north = Vector3::new(0.0, 22.0, -40.0); // Y axis points north
/// let r = rotation_matrix(level, north).unwrap();
/// assert!((r[(0, 0)] - 1.0).abs() < 1e-6); // East is +X
/// assert!((r[(1, 1)] - 1.0).abs() < 1e-6); // North is +Y
/// ```
pub fn rotation_matrix(gravity: Vector3<f32>, geomagnetic: Vector3<f32>) -> Option<Matrix3<f32>> {
    let gravity_squared = gravity.magnitude_squared();
    if gravity_squared < FREE_FALL_GRAVITY_SQUARED {
        return None;
    }

    let east = geomagnetic.cross(&gravity);
    let east_norm = east.magnitude();
    if east_norm < MIN_HORIZONTAL_FIELD {
        return None;
    }

    let east = east / east_norm;
    let up = gravity / gravity_squared.sqrt();
    let north = up.cross(&east);

    Some(Matrix3::from_rows(&[
        RowVector3::new(east.x, east.y, east.z),
        RowVector3::new(north.x, north.y, north.z),
        RowVector3::new(up.x, up.y, up.z),
    ]))
}

/// Extract azimuth, pitch and roll from a rotation matrix built by
/// [`rotation_matrix`]
pub fn orientation(rotation: &Matrix3<f32>) -> DeviceOrientation {
    DeviceOrientation {
        azimuth: rotation[(0, 1)].atan2(rotation[(1, 1)]),
        pitch: (-rotation[(2, 1)]).asin(),
        roll: (-rotation[(2, 0)]).atan2(rotation[(2, 2)]),
    }
}

/// Calculate the magnetic azimuth in degrees, within [0, 360)
///
/// Returns `None` when [`rotation_matrix`] rejects the inputs.
pub fn azimuth_degrees(gravity: Vector3<f32>, geomagnetic: Vector3<f32>) -> Option<f32> {
    rotation_matrix(gravity, geomagnetic).map(|r| orientation(&r).azimuth_degrees())
}

/// Screen rotation for the compass dial that keeps its north mark pointing
/// at magnetic north
///
/// The dial turns opposite to the device, so an azimuth of 30° becomes 330°.
pub fn dial_rotation(azimuth_degrees: f32) -> f32 {
    wrap_degrees_f32(-azimuth_degrees)
}
