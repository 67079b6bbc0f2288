//! Error types for the compass tracker

use thiserror::Error;

/// Errors raised at the boundary of the navigation engine
///
/// The per-tick update path never fails; these errors come from turning user
/// input into a target, from submitting a target while no location provider is
/// enabled, and from loading settings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NavigationError {
    #[error("target coordinate is empty")]
    EmptyCoordinate,

    #[error("cannot parse `{0}` as a coordinate")]
    InvalidNumber(String),

    #[error("latitude {0} is outside (-90, 90)")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside (-180, 180)")]
    LongitudeOutOfRange(f64),

    #[error("no location provider is enabled")]
    LocationUnavailable,

    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

/// Result type for boundary operations
pub type Result<T> = core::result::Result<T, NavigationError>;
