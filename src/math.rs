//! Angle helpers shared by the heading, bearing and arrow calculations

/// Wrap an angle in degrees into [0, 360)
///
/// Values that round up to exactly 360 after wrapping come back as 0.
pub fn wrap_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Single-precision counterpart of [`wrap_degrees`]
pub fn wrap_degrees_f32(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_degrees() {
        assert_eq!(wrap_degrees(0.0), 0.0);
        assert_eq!(wrap_degrees(360.0), 0.0);
        assert_eq!(wrap_degrees(-90.0), 270.0);
        assert_eq!(wrap_degrees(725.0), 5.0);
        assert_eq!(wrap_degrees_f32(-30.0), 330.0);
    }

    #[test]
    fn test_wrap_degrees_tiny_negative() {
        // rem_euclid rounds -1e-14 up to 360.0
        let wrapped = wrap_degrees(-1e-14);
        assert!((0.0..360.0).contains(&wrapped));
        let wrapped = wrap_degrees_f32(-1e-7);
        assert!((0.0..360.0).contains(&wrapped));
    }

    #[test]
    fn test_wrap_degrees_nan_propagates() {
        assert!(wrap_degrees(f64::NAN).is_nan());
    }
}
