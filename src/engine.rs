//! Heading engine: turns raw sensor samples into dial and arrow rotations

use chrono::{DateTime, Utc};
use log::{debug, info, trace, warn};
use nalgebra::Vector3;

use crate::bearing::initial_bearing;
use crate::compass;
use crate::error::{NavigationError, Result};
use crate::geomagnetic::{DeclinationModel, GeomagneticModel};
use crate::location::{self, LocationProvider, ProviderStatus};
use crate::smoothing::{SmootherState, VectorSmoother};
use crate::types::{
    EngineSettings, GeoPoint, NavigationUpdate, OrientationState, RotationEvent, SensorReading,
};

/// Compass and target-arrow orchestrator
///
/// Every sensor sample is smoothed into its channel. Once both the
/// accelerometer and the magnetometer have reported, each sample produces a
/// [`NavigationUpdate`]: a rotation for the compass dial and, when a target is
/// set and a location fix is known, a rotation for the arrow pointing at the
/// target.
///
/// The engine is single-threaded and does no locking; `update` takes
/// `&mut self`, so concurrent sensor callbacks must be serialized by the host.
///
/// # Example
/// ```
/// use chrono::Utc;
/// use nalgebra::Vector3;
/// use compass_tracker::{
///     FixSource, GeoPoint, HeadingEngine, LocationFix, LocationProvider, SensorReading,
/// };
///
/// struct Gps(LocationFix);
///
/// impl LocationProvider for Gps {
///     fn is_enabled(&self, source: FixSource) -> bool {
///         source == FixSource::Gps
///     }
///     fn last_known_fix(&self, source: FixSource) -> Option<LocationFix> {
///         (source == FixSource::Gps).then_some(self.0)
///     }
/// }
///
/// let here = LocationFix::new(GeoPoint::new(52.2297, 21.0122), Utc::now(), FixSource::Gps);
/// let gps = Gps(here);
///
/// let mut engine = HeadingEngine::new();
/// engine.set_target(GeoPoint::new(50.0647, 19.9450));
///
/// // Nothing happens until both channels have a sample
/// let accel = SensorReading::Accelerometer(Vector3::new(0.0, 0.0, 9.81));
/// assert!(engine.update(accel, &gps).is_none());
///
/// let mag = SensorReading::Magnetometer(Vector3::new(0.0, 22.0, -40.0));
/// let update = engine.update(mag, &gps).unwrap();
/// assert!(update.compass.is_some());
/// assert!(update.arrow.is_some());
/// assert!(!update.location_unavailable);
/// ```
#[derive(Debug, Clone)]
pub struct HeadingEngine<M = GeomagneticModel> {
    settings: EngineSettings,
    smoother: VectorSmoother,
    sensors: SmootherState,
    model: M,
    orientation: OrientationState,
    target: Option<GeoPoint>,
    providers: ProviderStatus,
}

impl HeadingEngine {
    /// Create an engine with default settings and the built-in field model
    pub fn new() -> Self {
        Self::with_settings(EngineSettings::default())
    }

    /// Create an engine with the given settings and the built-in field model
    pub fn with_settings(settings: EngineSettings) -> Self {
        Self::with_model(settings, GeomagneticModel::new())
    }
}

impl Default for HeadingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: DeclinationModel> HeadingEngine<M> {
    /// Create an engine that takes declination from `model`
    pub fn with_model(settings: EngineSettings, model: M) -> Self {
        Self {
            settings,
            smoother: VectorSmoother::new(settings.smoothing_factor),
            sensors: SmootherState::default(),
            model,
            orientation: OrientationState::default(),
            target: None,
            providers: ProviderStatus::default(),
        }
    }

    pub fn settings(&self) -> EngineSettings {
        self.settings
    }

    /// Angles the UI was last told to rotate to
    pub fn orientation(&self) -> OrientationState {
        self.orientation
    }

    pub fn target(&self) -> Option<GeoPoint> {
        self.target
    }

    /// Smoothed accelerometer and magnetometer vectors
    pub fn sensor_state(&self) -> SmootherState {
        self.sensors
    }

    /// Provider availability seen on the most recent tick
    pub fn provider_status(&self) -> ProviderStatus {
        self.providers
    }

    /// Point the arrow at `target`, replacing any previous target
    ///
    /// The coordinate is trusted; validate user input with
    /// [`crate::target::parse_target`] first.
    pub fn set_target(&mut self, target: GeoPoint) {
        info!(
            "Target set to ({:.5}, {:.5})",
            target.latitude, target.longitude
        );
        self.target = Some(target);
    }

    /// Set the target only if a location provider was enabled on the last
    /// tick
    ///
    /// Without a provider the arrow could never be drawn, so the target is
    /// refused with [`NavigationError::LocationUnavailable`] and the previous
    /// target (if any) is kept.
    pub fn submit_target(&mut self, target: GeoPoint) -> Result<()> {
        if !self.providers.any_enabled() {
            warn!("Target refused: no location provider is enabled");
            return Err(NavigationError::LocationUnavailable);
        }
        self.set_target(target);
        Ok(())
    }

    /// Process one sensor sample, evaluating declination at the current time
    ///
    /// Returns `None` until both sensor channels have delivered a sample.
    pub fn update<P: LocationProvider + ?Sized>(
        &mut self,
        reading: SensorReading,
        locations: &P,
    ) -> Option<NavigationUpdate> {
        self.update_at(reading, locations, Utc::now())
    }

    /// Process one sensor sample, evaluating declination at `now`
    pub fn update_at<P: LocationProvider + ?Sized>(
        &mut self,
        reading: SensorReading,
        locations: &P,
        now: DateTime<Utc>,
    ) -> Option<NavigationUpdate> {
        self.sensors.update(&self.smoother, reading);
        let Some((acceleration, magnetic_field)) = self.sensors.warm() else {
            trace!("Waiting for both sensor channels");
            return None;
        };

        let compass = self.rotate_compass(acceleration, magnetic_field);

        let providers = ProviderStatus::query(locations);
        self.providers = providers;

        let arrow = self.target.and_then(|target| {
            let fix = location::last_best_fix(locations, providers)?;
            Some(self.rotate_arrow(&fix.point, &target, now))
        });

        Some(NavigationUpdate {
            compass,
            arrow,
            location_unavailable: !providers.any_enabled(),
        })
    }

    fn rotate_compass(
        &mut self,
        acceleration: Vector3<f32>,
        magnetic_field: Vector3<f32>,
    ) -> Option<RotationEvent> {
        let Some(azimuth) = compass::azimuth_degrees(acceleration, magnetic_field) else {
            debug!("Rotation matrix rejected: free fall or field parallel to gravity");
            return None;
        };

        let new_degree = compass::dial_rotation(azimuth);
        let event = self.rotation(self.orientation.compass_degree, new_degree);
        self.orientation.compass_degree = new_degree;
        trace!("Compass {:.2}° -> {:.2}°", event.from, event.to);
        Some(event)
    }

    /// Arrow rotation relative to the current dial rotation
    fn rotate_arrow(
        &mut self,
        position: &GeoPoint,
        target: &GeoPoint,
        now: DateTime<Utc>,
    ) -> RotationEvent {
        let declination = self.model.declination(position, now) as f32;
        let bearing = initial_bearing(position, target) as f32;
        let direction = declination - bearing;

        // Relative to the dial's current rotation, offset by one full turn
        let new_degree = -direction - 360.0 + self.orientation.compass_degree % 360.0;

        let event = self.rotation(self.orientation.arrow_degree, new_degree);
        self.orientation.arrow_degree = new_degree;
        trace!(
            "Arrow {:.2}° -> {:.2}° (bearing {:.2}°, declination {:.2}°)",
            event.from, event.to, bearing, declination
        );
        event
    }

    fn rotation(&self, from: f32, to: f32) -> RotationEvent {
        RotationEvent {
            from,
            to,
            duration: self.settings.animation_duration(),
        }
    }
}
