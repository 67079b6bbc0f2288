//! Compass Tracker - an orientation and navigation engine for handheld compass displays
//!
//! The engine takes raw accelerometer and magnetometer samples, smooths them,
//! derives a tilt-compensated magnetic heading and, given a target coordinate
//! and the device's last known position, the direction of an arrow pointing at
//! the target. Its output is a pair of rotation events per sensor sample that
//! a UI animates.
//!
//! # Features
//!
//! - Exponential low-pass smoothing of both sensor channels
//! - Tilt-compensated azimuth, pitch and roll from gravity and the magnetic field
//! - Freshest-fix selection between GPS and network location sources
//! - Great-circle initial bearing
//! - Magnetic declination from the World Magnetic Model (WMM2020)
//! - Validation helpers for user-entered target coordinates
//!
//! # Quick Start
//!
//! ```rust
//! use nalgebra::Vector3;
//! use compass_tracker::{
//!     FixSource, HeadingEngine, LocationFix, LocationProvider, SensorReading,
//! };
//!
//! // A platform without any location provider
//! struct NoLocation;
//!
//! impl LocationProvider for NoLocation {
//!     fn is_enabled(&self, _source: FixSource) -> bool {
//!         false
//!     }
//!     fn last_known_fix(&self, _source: FixSource) -> Option<LocationFix> {
//!         None
//!     }
//! }
//!
//! let mut engine = HeadingEngine::new();
//!
//! // Sensor readings: gravity in m/s², magnetic field in µT
//! let accelerometer = SensorReading::Accelerometer(Vector3::new(0.0, 0.0, 9.81));
//! let magnetometer = SensorReading::Magnetometer(Vector3::new(-11.0, 19.05, -40.0));
//!
//! engine.update(accelerometer, &NoLocation);
//! let update = engine.update(magnetometer, &NoLocation).unwrap();
//!
//! // Device faces 30° east of magnetic north, so the dial turns to 330°
//! let compass = update.compass.unwrap();
//! assert!((compass.to - 330.0).abs() < 0.1);
//! assert!(update.location_unavailable);
//! ```

pub mod bearing;
pub mod compass;
mod engine;
mod error;
pub mod geomagnetic;
pub mod location;
mod math;
pub mod smoothing;
pub mod target;
mod types;

// Re-export the main types
pub use engine::HeadingEngine;
pub use error::{NavigationError, Result};
pub use geomagnetic::{DeclinationModel, GeomagneticModel, MagneticField};
pub use location::{LocationProvider, ProviderStatus};
pub use math::{wrap_degrees, wrap_degrees_f32};
pub use smoothing::{SmootherState, VectorSmoother};
pub use types::*;
