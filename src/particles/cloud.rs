//! Point clouds.

use crate::math::Vec3;
use rand::Rng;

/// A set of points drawn with a fixed screen size.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    /// Point positions in node space.
    pub positions: Vec<Vec3>,
    /// Point size in world units.
    pub size: f32,
}

impl PointCloud {
    /// Fill a ball of `radius` with `count` uniformly distributed points.
    pub fn in_sphere<R: Rng + ?Sized>(count: usize, radius: f32, size: f32, rng: &mut R) -> Self {
        Self {
            positions: generate_positions_in_sphere(count, radius, rng),
            size,
        }
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the cloud has no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Uniform points inside a ball, by rejection sampling the enclosing cube.
pub fn generate_positions_in_sphere<R: Rng + ?Sized>(count: usize, radius: f32, rng: &mut R) -> Vec<Vec3> {
    let mut positions = Vec::with_capacity(count);
    while positions.len() < count {
        let p = Vec3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        );
        if p.length_squared() <= 1.0 {
            positions.push(p * radius);
        }
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_count_and_bounds() {
        let mut rng = SmallRng::seed_from_u64(7);
        let cloud = PointCloud::in_sphere(700, 0.09, 0.0015, &mut rng);
        assert_eq!(cloud.len(), 700);
        assert!(cloud.positions.iter().all(|p| p.length() <= 0.09 + 1e-6));
    }

    #[test]
    fn test_seeded_clouds_repeat() {
        let a = generate_positions_in_sphere(50, 1.0, &mut SmallRng::seed_from_u64(3));
        let b = generate_positions_in_sphere(50, 1.0, &mut SmallRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_roughly_centered() {
        let points = generate_positions_in_sphere(4000, 1.0, &mut SmallRng::seed_from_u64(11));
        let mean = points.iter().copied().sum::<Vec3>() / points.len() as f32;
        assert!(mean.length() < 0.05, "mean {mean}");
    }
}
