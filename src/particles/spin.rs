//! Slow rotation of particle groups.

use crate::math::{wrap_angle, Vec3};

/// Angular rates of one particle group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSpin {
    /// Radians per second around X, Y and Z.
    pub rates: Vec3,
}

impl ParticleSpin {
    /// Create from per-axis rates.
    pub fn new(rates: [f32; 3]) -> Self {
        Self {
            rates: Vec3::from_array(rates),
        }
    }

    /// XYZ Euler angles at `time` seconds.
    ///
    /// Angles are a pure function of time, so pauses and dropped frames never
    /// accumulate drift.
    pub fn angles_at(&self, time: f32) -> Vec3 {
        let raw = self.rates * time;
        Vec3::new(wrap_angle(raw.x), wrap_angle(raw.y), wrap_angle(raw.z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::consts::TWO_PI;

    #[test]
    fn test_angles_follow_time() {
        let spin = ParticleSpin::new([1.0 / 9.0, 1.0 / 5.0, 1.0 / 10.0]);
        let angles = spin.angles_at(4.5);
        assert!(angles.abs_diff_eq(Vec3::new(0.5, 0.9, 0.45), 1e-6));
    }

    #[test]
    fn test_angles_wrap_and_keep_sign() {
        let spin = ParticleSpin::new([-1.0 / 6.0, -1.0 / 3.0, 1.0 / 7.0]);
        let angles = spin.angles_at(1000.0);
        assert!(angles.x <= 0.0 && angles.x > -TWO_PI);
        assert!(angles.y <= 0.0 && angles.y > -TWO_PI);
        assert!(angles.z >= 0.0 && angles.z < TWO_PI);
    }
}
