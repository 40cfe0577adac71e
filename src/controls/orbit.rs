//! Orbit controls for rotating camera around a target.

use crate::camera::PerspectiveCamera;
use crate::config::CameraConfig;
use crate::math::consts::{PI, TWO_PI};
use crate::math::Vec3;

/// Orbit controls allowing camera rotation around a target point.
///
/// Input is delivered as accumulated deltas by the host; `update` folds them
/// into the camera once per frame.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    /// Target point to orbit around.
    pub target: Vec3,
    /// Minimum distance from target.
    pub min_distance: f32,
    /// Maximum distance from target.
    pub max_distance: f32,
    /// Minimum polar angle (radians, 0 = top).
    pub min_polar_angle: f32,
    /// Maximum polar angle (radians, PI = bottom).
    pub max_polar_angle: f32,
    /// Enable rotation.
    pub enable_rotate: bool,
    /// Enable zooming.
    pub enable_zoom: bool,
    /// Rotation speed multiplier.
    pub rotate_speed: f32,
    /// Zoom speed multiplier.
    pub zoom_speed: f32,
    /// Rotate around the target on its own.
    pub auto_rotate: bool,
    /// 1.0 is one full turn per minute.
    pub auto_rotate_speed: f32,
    // Pending input
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            enable_rotate: true,
            enable_zoom: true,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            auto_rotate: false,
            auto_rotate_speed: 2.0,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
        }
    }
}

impl OrbitControls {
    /// Create orbit controls with a target.
    pub fn with_target(target: Vec3) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    /// Create controls from configuration, orbiting `focus` shifted by the
    /// configured target offset.
    pub fn from_config(config: &CameraConfig, focus: Vec3) -> Self {
        Self {
            target: focus + Vec3::new(0.0, config.target_offset_y, 0.0),
            min_polar_angle: config.min_polar_angle,
            max_polar_angle: config.max_polar_angle,
            auto_rotate: true,
            auto_rotate_speed: config.auto_rotate_speed,
            ..Self::default()
        }
    }

    /// Rotate the camera by delta angles (in radians).
    pub fn rotate(&mut self, delta_theta: f32, delta_phi: f32) {
        if self.enable_rotate {
            self.delta_theta -= delta_theta * self.rotate_speed;
            self.delta_phi -= delta_phi * self.rotate_speed;
        }
    }

    /// Rotate based on pointer movement in pixels.
    pub fn rotate_by_pixels(&mut self, delta_x: f32, delta_y: f32, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        self.rotate(TWO_PI * delta_x / viewport_height, TWO_PI * delta_y / viewport_height);
    }

    /// Zoom in (positive) or out (negative).
    pub fn zoom(&mut self, delta: f32) {
        if self.enable_zoom {
            let factor = 0.95_f32.powf(self.zoom_speed * delta.abs());
            if delta > 0.0 {
                self.scale *= factor;
            } else {
                self.scale /= factor;
            }
        }
    }

    /// Fold pending input and auto-rotation into the camera.
    ///
    /// Returns `true` when the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera, delta: f32) -> bool {
        let offset = camera.position() - self.target;
        let radius = offset.length();

        let mut theta = offset.x.atan2(offset.z);
        let mut phi = if radius > 0.0 {
            (offset.y / radius).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        };

        if self.auto_rotate {
            self.delta_theta -= TWO_PI / 60.0 * self.auto_rotate_speed * delta;
        }

        theta += self.delta_theta;
        phi += self.delta_phi;
        self.delta_theta = 0.0;
        self.delta_phi = 0.0;

        let phi = phi
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(1e-6, PI - 1e-6);
        let new_radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);
        self.scale = 1.0;

        let new_offset = Vec3::new(
            new_radius * phi.sin() * theta.sin(),
            new_radius * phi.cos(),
            new_radius * phi.sin() * theta.cos(),
        );
        let previous = camera.position();
        camera.set_position(self.target + new_offset);
        camera.look_at(self.target);

        !previous.abs_diff_eq(camera.position(), 1e-6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_at(position: Vec3) -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::new(70.0, 1.0, 0.01, 100.0);
        camera.set_position(position);
        camera
    }

    #[test]
    fn test_update_without_input_keeps_position() {
        let mut controls = OrbitControls::with_target(Vec3::new(0.0, 0.085, 0.0));
        let mut camera = camera_at(Vec3::new(0.0, 0.18, 0.25));
        controls.update(&mut camera, 0.016);
        assert!(camera.position().abs_diff_eq(Vec3::new(0.0, 0.18, 0.25), 1e-5));
        let expected = (controls.target - camera.position()).normalize();
        assert!(camera.forward().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn test_polar_limits_clamp() {
        let mut controls = OrbitControls::with_target(Vec3::ZERO);
        controls.min_polar_angle = PI * 0.28;
        controls.max_polar_angle = PI * 0.6;
        let mut camera = camera_at(Vec3::new(0.0, 1.0, 0.01));
        controls.update(&mut camera, 0.0);
        let offset = camera.position() - controls.target;
        let phi = (offset.y / offset.length()).acos();
        assert!((phi - PI * 0.28).abs() < 1e-4);
    }

    #[test]
    fn test_rotation_preserves_distance() {
        let mut controls = OrbitControls::with_target(Vec3::ZERO);
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 2.0));
        controls.rotate(0.5, 0.1);
        assert!(controls.update(&mut camera, 0.016));
        assert!((camera.position().length() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_zero_speed_auto_rotate_is_still() {
        let mut controls = OrbitControls::from_config(&CameraConfig::default(), Vec3::new(0.0, 0.11, 0.0));
        let mut camera = camera_at(Vec3::new(0.0, 0.18, 0.25));
        controls.update(&mut camera, 0.016);
        let before = camera.position();
        assert!(!controls.update(&mut camera, 0.016));
        assert!(camera.position().abs_diff_eq(before, 1e-6));
    }

    #[test]
    fn test_zoom_in_moves_closer() {
        let mut controls = OrbitControls::with_target(Vec3::ZERO);
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 2.0));
        controls.zoom(1.0);
        controls.update(&mut camera, 0.0);
        assert!(camera.position().length() < 2.0);
    }
}
