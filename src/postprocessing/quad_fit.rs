//! Fits the effect quad to the effect camera's near plane.

use crate::camera::PerspectiveCamera;
use crate::geometry::EffectQuad;

/// Rebuilds the effect quad positions from a camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectQuadUpdater {
    /// Corners are scaled by `1 + near * near_push_factor` so the quad sits
    /// just behind the near plane instead of on it.
    pub near_push_factor: f32,
}

impl Default for EffectQuadUpdater {
    fn default() -> Self {
        Self { near_push_factor: 0.01 }
    }
}

impl EffectQuadUpdater {
    /// Create an updater with the given push factor.
    pub fn new(near_push_factor: f32) -> Self {
        Self { near_push_factor }
    }

    /// Recompute all six positions of `quad` in world space. The result only
    /// depends on the camera, so calling this again without camera changes
    /// writes identical data.
    pub fn recompute(&self, quad: &mut EffectQuad, camera: &PerspectiveCamera) {
        let push = 1.0 + camera.near * self.near_push_factor;
        let world = camera.world_matrix();
        let corners = camera
            .near_plane_corners()
            .map(|corner| world.transform_point3(corner * push));
        quad.set_corners(&corners);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Vec3, Vec4};

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::new(70.0, 1.0, 0.01, 100.0)
    }

    #[test]
    fn test_recompute_is_byte_identical() {
        let updater = EffectQuadUpdater::default();
        let camera = camera();
        let mut quad = EffectQuad::new();

        updater.recompute(&mut quad, &camera);
        let first: Vec<u8> = bytemuck::cast_slice(&quad.vertices()).to_vec();
        updater.recompute(&mut quad, &camera);
        let second: Vec<u8> = bytemuck::cast_slice(&quad.vertices()).to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn test_quad_lies_just_past_near_plane() {
        let camera = camera();
        let mut quad = EffectQuad::new();
        EffectQuadUpdater::default().recompute(&mut quad, &camera);
        for p in quad.positions() {
            assert!((p.z - -0.01 * (1.0 + 0.01 * 0.01)).abs() < 1e-8);
        }
    }

    #[test]
    fn test_quad_covers_viewport() {
        let mut camera = PerspectiveCamera::new(70.0, 16.0 / 9.0, 0.01, 100.0);
        camera.set_position(Vec3::new(0.3, 0.2, 0.5));
        camera.look_at(Vec3::new(0.0, 0.11, 0.0));
        let mut quad = EffectQuad::new();
        EffectQuadUpdater::default().recompute(&mut quad, &camera);

        let view_proj = camera.view_projection_matrix();
        for corner in quad.corners() {
            let clip = view_proj * Vec4::from((corner, 1.0));
            let ndc = clip.truncate() / clip.w;
            // scaling along the view ray keeps the corners on the frustum edges
            assert!((ndc.x.abs() - 1.0).abs() < 1e-3, "{ndc}");
            assert!((ndc.y.abs() - 1.0).abs() < 1e-3, "{ndc}");
            assert!(ndc.z >= 0.0 && ndc.z < 1e-3, "{ndc}");
        }
    }

    #[test]
    fn test_follows_camera_pose() {
        let updater = EffectQuadUpdater::default();
        let mut camera = camera();
        let mut quad = EffectQuad::new();
        updater.recompute(&mut quad, &camera);
        let before = quad.corners();

        camera.set_position(Vec3::new(0.0, 1.0, 0.0));
        updater.recompute(&mut quad, &camera);
        for (a, b) in before.iter().zip(quad.corners()) {
            assert!((b - *a).abs_diff_eq(Vec3::Y, 1e-6));
        }
    }
}
