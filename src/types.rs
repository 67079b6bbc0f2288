//! Core types and settings for the compass tracker

use core::time::Duration;

use chrono::{DateTime, Utc};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{NavigationError, Result};

/// Default exponential smoothing constant applied to raw sensor samples
pub const DEFAULT_SMOOTHING_FACTOR: f32 = 0.15;

/// Default duration of a rotation animation in milliseconds
pub const DEFAULT_ANIMATION_DURATION_MS: u64 = 250;

/// A geographic position in degrees, with altitude in meters
///
/// `GeoPoint::new` does not check ranges; the engine assumes its inputs were
/// validated at the boundary. Use [`GeoPoint::try_new`] (or
/// [`crate::target::parse_target`]) when the values come from a user.
///
/// # Example
/// ```
/// use compass_tracker::GeoPoint;
///
/// let summit = GeoPoint::new(45.8326, 6.8652).with_altitude(4808.0);
/// assert_eq!(summit.altitude, 4808.0);
///
/// assert!(GeoPoint::try_new(91.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, within (-90, 90)
    pub latitude: f64,
    /// Longitude in degrees, within (-180, 180)
    pub longitude: f64,
    /// Altitude above sea level in meters
    #[serde(default)]
    pub altitude: f64,
}

impl GeoPoint {
    /// Create a point at sea level without range checks
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: 0.0,
        }
    }

    /// Create a point, rejecting latitudes outside (-90, 90) and longitudes
    /// outside (-180, 180)
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(latitude > -90.0 && latitude < 90.0) {
            return Err(NavigationError::LatitudeOutOfRange(latitude));
        }
        if !(longitude > -180.0 && longitude < 180.0) {
            return Err(NavigationError::LongitudeOutOfRange(longitude));
        }
        Ok(Self::new(latitude, longitude))
    }

    /// Return a copy of this point at the given altitude
    pub const fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = altitude;
        self
    }
}

/// Origin of a location fix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FixSource {
    /// Satellite positioning
    Gps,
    /// Cell tower / Wi-Fi positioning
    Network,
}

/// A single position estimate reported by a location source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub point: GeoPoint,
    /// When the fix was captured
    pub time: DateTime<Utc>,
    pub source: FixSource,
}

impl LocationFix {
    pub const fn new(point: GeoPoint, time: DateTime<Utc>, source: FixSource) -> Self {
        Self {
            point,
            time,
            source,
        }
    }
}

/// A raw sample delivered by the platform's sensor callback
///
/// Accelerometer values are in m/s², magnetometer values in µT, both in the
/// device frame (X to the right, Y towards the top of the screen, Z out of
/// the screen).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorReading {
    Accelerometer(Vector3<f32>),
    Magnetometer(Vector3<f32>),
}

/// Angles the UI was last told to rotate to
///
/// Owned by [`crate::HeadingEngine`]; both start at 0°.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrientationState {
    /// Rotation of the compass dial, kept within [0, 360)
    pub compass_degree: f32,
    /// Rotation of the target arrow; may fall outside [0, 360)
    pub arrow_degree: f32,
}

/// Instruction to animate a view from one rotation to another
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationEvent {
    pub from: f32,
    pub to: f32,
    pub duration: Duration,
}

/// Everything one engine tick produced
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NavigationUpdate {
    /// Dial rotation; absent only when the sensor geometry was degenerate
    pub compass: Option<RotationEvent>,
    /// Target arrow rotation; absent without a target or a location fix
    pub arrow: Option<RotationEvent>,
    /// True when neither the GPS nor the network provider is enabled
    pub location_unavailable: bool,
}

/// Engine settings
///
/// # Example
/// ```
/// use compass_tracker::EngineSettings;
///
/// let settings = EngineSettings {
///     smoothing_factor: 0.3, // Less smoothing, faster response
///     ..Default::default()
/// };
/// assert!(settings.validate().is_ok());
///
/// let loaded = EngineSettings::from_json(r#"{ "animation_duration_ms": 100 }"#).unwrap();
/// assert_eq!(loaded.smoothing_factor, 0.15);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Low-pass filter constant α, 0 < α ≤ 1
    ///
    /// Smaller values smooth more heavily and react more slowly.
    pub smoothing_factor: f32,
    /// Duration attached to every emitted rotation event
    pub animation_duration_ms: u64,
}

impl EngineSettings {
    /// Parse settings from JSON, filling missing fields with defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)
            .map_err(|e| NavigationError::InvalidSettings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check that the settings describe a usable filter
    pub fn validate(&self) -> Result<()> {
        if !(self.smoothing_factor > 0.0 && self.smoothing_factor <= 1.0) {
            return Err(NavigationError::InvalidSettings(format!(
                "smoothing factor {} is outside (0, 1]",
                self.smoothing_factor
            )));
        }
        Ok(())
    }

    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration_ms)
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            smoothing_factor: DEFAULT_SMOOTHING_FACTOR,
            animation_duration_ms: DEFAULT_ANIMATION_DURATION_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_new_rejects_out_of_range() {
        assert!(GeoPoint::try_new(45.0, 90.0).is_ok());
        assert_eq!(
            GeoPoint::try_new(90.0, 0.0),
            Err(NavigationError::LatitudeOutOfRange(90.0))
        );
        assert_eq!(
            GeoPoint::try_new(0.0, -180.0),
            Err(NavigationError::LongitudeOutOfRange(-180.0))
        );
        assert!(GeoPoint::try_new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_default_settings() {
        let settings = EngineSettings::default();
        assert_eq!(settings.smoothing_factor, 0.15);
        assert_eq!(settings.animation_duration(), Duration::from_millis(250));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_validation() {
        let too_large = EngineSettings {
            smoothing_factor: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            too_large.validate(),
            Err(NavigationError::InvalidSettings(_))
        ));

        let zero = EngineSettings {
            smoothing_factor: 0.0,
            ..Default::default()
        };
        assert!(zero.validate().is_err());

        let unfiltered = EngineSettings {
            smoothing_factor: 1.0,
            ..Default::default()
        };
        assert!(unfiltered.validate().is_ok());
    }

    #[test]
    fn test_settings_from_json() {
        let settings = EngineSettings::from_json(r#"{ "smoothing_factor": 0.5 }"#).unwrap();
        assert_eq!(settings.smoothing_factor, 0.5);
        assert_eq!(settings.animation_duration_ms, 250);

        assert!(EngineSettings::from_json(r#"{ "smoothing_factor": -1.0 }"#).is_err());
        assert!(EngineSettings::from_json("not json").is_err());
    }

    #[test]
    fn test_geo_point_altitude_defaults_to_sea_level() {
        let point: GeoPoint =
            serde_json::from_str(r#"{ "latitude": 10.0, "longitude": 20.0 }"#).unwrap();
        assert_eq!(point, GeoPoint::new(10.0, 20.0));
        assert_eq!(point.altitude, 0.0);
    }
}
