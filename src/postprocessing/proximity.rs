//! Opacity of the cold overlay, driven by how close the camera is to the
//! focus object.

use crate::math::{clamp, Vec3};

/// Time-integrated overlay opacity.
///
/// Fades in while the camera is closer than the threshold and out otherwise,
/// at a constant rate. There is no hysteresis; the rate limit alone keeps
/// the transition smooth.
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityOpacity {
    opacity: f32,
    /// Opacity units per second.
    rate: f32,
}

impl Default for ProximityOpacity {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl ProximityOpacity {
    /// Start fully transparent.
    pub fn new(rate: f32) -> Self {
        Self { opacity: 0.0, rate }
    }

    /// Current opacity.
    #[inline]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Advance by `delta` seconds and return the new opacity, always within
    /// `[0, max_opacity]`.
    pub fn update(&mut self, delta: f32, camera_position: Vec3, focus_position: Vec3, threshold: f32, max_opacity: f32) -> f32 {
        let step = if delta.is_finite() { delta.max(0.0) * self.rate } else { 0.0 };
        if camera_position.distance(focus_position) < threshold {
            self.opacity += step;
        } else {
            self.opacity -= step;
        }
        self.opacity = clamp(self.opacity, 0.0, max_opacity.max(0.0));
        self.opacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const FOCUS: Vec3 = Vec3::new(0.0, 0.11, 0.0);
    const INSIDE: Vec3 = Vec3::new(0.0, 0.15, 0.05);
    const OUTSIDE: Vec3 = Vec3::new(0.0, 0.18, 0.25);

    fn run(p: &mut ProximityOpacity, camera: Vec3, seconds: f32, step: f32) -> f32 {
        let frames = (seconds / step).round() as usize;
        let mut value = p.opacity();
        for _ in 0..frames {
            value = p.update(step, camera, FOCUS, 0.11, 0.5);
        }
        value
    }

    #[test]
    fn test_ramps_up_linearly() {
        let mut p = ProximityOpacity::default();
        assert_abs_diff_eq!(run(&mut p, INSIDE, 0.3, 0.01), 0.3, epsilon = 1e-4);
    }

    #[test]
    fn test_saturates_at_max() {
        let mut p = ProximityOpacity::default();
        for _ in 0..200 {
            let value = p.update(1.0 / 60.0, INSIDE, FOCUS, 0.11, 0.5);
            assert!(value <= 0.5);
        }
        assert_eq!(p.opacity(), 0.5);
    }

    #[test]
    fn test_returns_exactly_to_zero() {
        let mut p = ProximityOpacity::default();
        run(&mut p, INSIDE, 0.25, 1.0 / 60.0);
        let level = p.opacity();
        assert!(level > 0.0);
        run(&mut p, OUTSIDE, level + 0.1, 1.0 / 60.0);
        assert_eq!(p.opacity(), 0.0);
        assert_eq!(p.update(1.0, OUTSIDE, FOCUS, 0.11, 0.5), 0.0);
    }

    #[test]
    fn test_bad_delta_changes_nothing() {
        let mut p = ProximityOpacity::default();
        p.update(0.2, INSIDE, FOCUS, 0.11, 0.5);
        assert_eq!(p.update(f32::NAN, INSIDE, FOCUS, 0.11, 0.5), 0.2);
        assert_eq!(p.update(-1.0, OUTSIDE, FOCUS, 0.11, 0.5), 0.2);
    }
}
