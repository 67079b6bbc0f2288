//! Exponential low-pass filtering of raw sensor vectors

use nalgebra::Vector3;

use crate::types::{DEFAULT_SMOOTHING_FACTOR, SensorReading};

/// Single-pole exponential low-pass filter
///
/// Each component moves a fraction `alpha` of the way from the previous
/// output towards the new sample:
///
/// `output = previous + alpha * (sample - previous)`
///
/// The filter seeds itself: without a previous output the sample is returned
/// unchanged. Non-finite samples are not sanitized and propagate to the output.
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use compass_tracker::VectorSmoother;
///
/// let smoother = VectorSmoother::default(); // alpha = 0.15
/// let first = smoother.smooth(Vector3::new(0.0, 0.0, 10.0), None);
/// assert_eq!(first, Vector3::new(0.0, 0.0, 10.0));
///
/// let second = smoother.smooth(Vector3::new(0.0, 0.0, 20.0), Some(first));
/// assert!((second.z - 11.5).abs() < 1e-5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorSmoother {
    alpha: f32,
}

impl VectorSmoother {
    /// Create a filter with the given smoothing constant (0 < alpha <= 1)
    pub const fn new(alpha: f32) -> Self {
        Self { alpha }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Filter one sample against the previous filtered value
    pub fn smooth(&self, sample: Vector3<f32>, previous: Option<Vector3<f32>>) -> Vector3<f32> {
        match previous {
            Some(previous) => previous + (sample - previous) * self.alpha,
            None => sample,
        }
    }
}

impl Default for VectorSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING_FACTOR)
    }
}

/// Last smoothed vector for each sensor channel
///
/// A channel stays `None` until its first sample arrives.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SmootherState {
    acceleration: Option<Vector3<f32>>,
    magnetic_field: Option<Vector3<f32>>,
}

impl SmootherState {
    /// Feed a raw reading through `smoother` and store the result as the new
    /// previous value for its channel
    ///
    /// Returns the smoothed vector.
    pub fn update(&mut self, smoother: &VectorSmoother, reading: SensorReading) -> Vector3<f32> {
        let (slot, sample) = match reading {
            SensorReading::Accelerometer(sample) => (&mut self.acceleration, sample),
            SensorReading::Magnetometer(sample) => (&mut self.magnetic_field, sample),
        };
        let smoothed = smoother.smooth(sample, *slot);
        *slot = Some(smoothed);
        smoothed
    }

    pub fn acceleration(&self) -> Option<Vector3<f32>> {
        self.acceleration
    }

    pub fn magnetic_field(&self) -> Option<Vector3<f32>> {
        self.magnetic_field
    }

    /// Both smoothed vectors, once each channel has seen a sample
    pub fn warm(&self) -> Option<(Vector3<f32>, Vector3<f32>)> {
        Some((self.acceleration?, self.magnetic_field?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_returns_sample() {
        let smoother = VectorSmoother::default();
        let sample = Vector3::new(1.0, -2.0, 9.81);
        assert_eq!(smoother.smooth(sample, None), sample);
    }

    #[test]
    fn test_fixed_point() {
        let smoother = VectorSmoother::default();
        let previous = Vector3::new(0.3, -12.5, 48.0);
        assert_eq!(smoother.smooth(previous, Some(previous)), previous);
    }

    #[test]
    fn test_moves_alpha_fraction_towards_sample() {
        let smoother = VectorSmoother::new(0.15);
        let previous = Vector3::new(0.0, 10.0, -10.0);
        let sample = Vector3::new(10.0, 0.0, 10.0);
        let output = smoother.smooth(sample, Some(previous));

        assert!((output.x - 1.5).abs() < 1e-6);
        assert!((output.y - 8.5).abs() < 1e-6);
        assert!((output.z - (-7.0)).abs() < 1e-6);
    }

    #[test]
    fn test_converges_to_constant_input() {
        let smoother = VectorSmoother::default();
        let target = Vector3::new(0.0, 0.0, 9.81);
        let mut output = Some(Vector3::zeros());
        for _ in 0..200 {
            output = Some(smoother.smooth(target, output));
        }
        let output = output.unwrap();
        assert!((output - target).magnitude() < 1e-4);
    }

    #[test]
    fn test_non_finite_propagates() {
        let smoother = VectorSmoother::default();
        let previous = Vector3::new(1.0, 1.0, 1.0);
        let output = smoother.smooth(Vector3::new(f32::NAN, 1.0, f32::INFINITY), Some(previous));
        assert!(output.x.is_nan());
        assert_eq!(output.y, 1.0);
        assert!(output.z.is_infinite());
    }

    #[test]
    fn test_state_warms_per_channel() {
        let smoother = VectorSmoother::default();
        let mut state = SmootherState::default();
        assert!(state.warm().is_none());

        state.update(&smoother, SensorReading::Accelerometer(Vector3::new(0.0, 0.0, 9.81)));
        assert!(state.acceleration().is_some());
        assert!(state.magnetic_field().is_none());
        assert!(state.warm().is_none());

        state.update(&smoother, SensorReading::Magnetometer(Vector3::new(0.0, 20.0, -40.0)));
        let (acceleration, magnetic_field) = state.warm().unwrap();
        assert_eq!(acceleration, Vector3::new(0.0, 0.0, 9.81));
        assert_eq!(magnetic_field, Vector3::new(0.0, 20.0, -40.0));
    }

    #[test]
    fn test_state_channels_are_independent() {
        let smoother = VectorSmoother::new(0.5);
        let mut state = SmootherState::default();
        state.update(&smoother, SensorReading::Magnetometer(Vector3::new(10.0, 0.0, 0.0)));
        state.update(&smoother, SensorReading::Accelerometer(Vector3::new(0.0, 0.0, 10.0)));
        let smoothed =
            state.update(&smoother, SensorReading::Magnetometer(Vector3::new(20.0, 0.0, 0.0)));

        assert_eq!(smoothed, Vector3::new(15.0, 0.0, 0.0));
        assert_eq!(state.acceleration(), Some(Vector3::new(0.0, 0.0, 10.0)));
    }
}
