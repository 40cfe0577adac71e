//! Perspective camera.

use crate::math::{deg_to_rad, Mat4, Quat, Vec3};
use crate::scene::rotation_facing;

/// A perspective projection camera looking down its local -Z axis.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees.
    pub fov: f32,
    /// Aspect ratio (width / height).
    pub aspect: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Camera position.
    position: Vec3,
    /// Camera orientation.
    rotation: Quat,
    /// Up vector used by `look_at`.
    pub up: Vec3,
    /// Projection matrix.
    projection_matrix: Mat4,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(60.0, 16.0 / 9.0, 0.1, 1000.0)
    }
}

impl PerspectiveCamera {
    /// Create a new perspective camera at the origin looking down -Z.
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            fov,
            aspect,
            near,
            far,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            up: Vec3::Y,
            projection_matrix: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    /// Camera position.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Camera orientation.
    #[inline]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Set the camera position.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Set the camera orientation.
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }

    /// Turn the camera so it looks at `target`.
    pub fn look_at(&mut self, target: Vec3) {
        self.rotation = rotation_facing(self.position - target, self.up);
    }

    /// Copy position and orientation from another camera, leaving the
    /// projection untouched.
    pub fn copy_pose(&mut self, other: &PerspectiveCamera) {
        self.position = other.position;
        self.rotation = other.rotation;
    }

    /// Set the aspect ratio and rebuild the projection.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection_matrix();
    }

    /// Rebuild the projection matrix from fov/aspect/near/far.
    pub fn update_projection_matrix(&mut self) {
        self.projection_matrix = Mat4::perspective_rh(deg_to_rad(self.fov), self.aspect, self.near, self.far);
    }

    /// Get the projection matrix.
    #[inline]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    /// Camera-to-world transform.
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    /// World-to-camera transform.
    pub fn view_matrix(&self) -> Mat4 {
        self.world_matrix().inverse()
    }

    /// Combined view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix()
    }

    /// Viewing direction in world space.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Corners of the near clipping plane in camera space, ordered
    /// bottom-left, bottom-right, top-left, top-right.
    pub fn near_plane_corners(&self) -> [Vec3; 4] {
        let half_h = self.near * (deg_to_rad(self.fov) * 0.5).tan();
        let half_w = half_h * self.aspect;
        let z = -self.near;
        [
            Vec3::new(-half_w, -half_h, z),
            Vec3::new(half_w, -half_h, z),
            Vec3::new(-half_w, half_h, z),
            Vec3::new(half_w, half_h, z),
        ]
    }
}
