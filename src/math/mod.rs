//! # Math Module
//!
//! Vector and matrix types come straight from `glam`; this module adds the
//! colour type and the handful of scalar helpers the runtime needs.

mod color;

pub use color::Color;
pub use glam::{EulerRot, Mat3, Mat4, Quat, Vec2, Vec3, Vec4};

/// Common math constants and utilities.
pub mod consts {
    /// Pi constant.
    pub const PI: f32 = std::f32::consts::PI;
    /// Two times Pi.
    pub const TWO_PI: f32 = PI * 2.0;
    /// Half of Pi.
    pub const HALF_PI: f32 = PI / 2.0;
    /// Degrees to radians conversion factor.
    pub const DEG2RAD: f32 = PI / 180.0;
    /// Small epsilon for floating point comparisons.
    pub const EPSILON: f32 = 1e-6;
}

/// Convert degrees to radians.
#[inline]
pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees * consts::DEG2RAD
}

/// Clamp a value between min and max.
///
/// Unlike `f32::clamp` this never panics when `min > max`; `min` wins.
#[inline]
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.min(max).max(min)
}

/// Wrap an angle into `(-2π, 2π)`, keeping the sign of the input.
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    angle % consts::TWO_PI
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_inverted_bounds() {
        assert_eq!(clamp(5.0, 1.0, 0.0), 1.0);
        assert_eq!(clamp(-1.0, 0.0, 0.5), 0.0);
        assert_eq!(clamp(0.7, 0.0, 0.5), 0.5);
    }

    #[test]
    fn test_wrap_angle_keeps_sign() {
        let a = wrap_angle(-7.0);
        assert!(a < 0.0);
        assert!((a - (-7.0 + consts::TWO_PI)).abs() < 1e-5);
    }
}
