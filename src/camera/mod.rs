//! Cameras and the primary/effect camera pair.

mod perspective;

pub use perspective::PerspectiveCamera;

use crate::config::{CameraConfig, EffectCameraMode};
use crate::math::Vec3;

/// The scene camera plus the camera the post-process quad is derived from.
///
/// Both always share fov, near, far and aspect. Their poses are independent;
/// [`EffectCameraMode`] decides whether a resize copies the primary pose.
#[derive(Debug, Clone)]
pub struct CameraRig {
    /// Camera the main scene is rendered from.
    pub primary: PerspectiveCamera,
    /// Camera the effect quad is built for and rendered from.
    pub effect: PerspectiveCamera,
    mode: EffectCameraMode,
}

impl CameraRig {
    /// Build both cameras from configuration with a provisional aspect.
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        let mut primary = PerspectiveCamera::new(config.fov, aspect, config.near, config.far);
        primary.set_position(Vec3::from_array(config.start_position));
        let effect = PerspectiveCamera::new(config.fov, aspect, config.near, config.far);
        Self {
            primary,
            effect,
            mode: config.effect_camera,
        }
    }

    /// Effect camera pose policy.
    #[inline]
    pub fn mode(&self) -> EffectCameraMode {
        self.mode
    }

    /// Apply a logical window resize to both cameras.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.primary.set_aspect(aspect);
        self.effect.set_aspect(aspect);
        if self.mode == EffectCameraMode::MirrorPrimaryOnResize {
            self.effect.copy_pose(&self.primary);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_shared() {
        let mut rig = CameraRig::new(&CameraConfig::default(), 1.0);
        rig.set_aspect(16.0 / 9.0);
        assert_eq!(rig.primary.aspect, rig.effect.aspect);
        assert_eq!(rig.primary.fov, rig.effect.fov);
        assert_eq!(rig.primary.near, rig.effect.near);
        assert!(rig.primary.projection_matrix().abs_diff_eq(rig.effect.projection_matrix(), 1e-6));
    }

    #[test]
    fn test_stationary_effect_camera_stays_home() {
        let mut rig = CameraRig::new(&CameraConfig::default(), 1.0);
        rig.primary.look_at(Vec3::new(0.0, 0.1, 0.0));
        rig.set_aspect(2.0);
        assert_eq!(rig.effect.position(), Vec3::ZERO);
    }

    #[test]
    fn test_mirror_mode_copies_pose_on_resize() {
        let config = CameraConfig {
            effect_camera: EffectCameraMode::MirrorPrimaryOnResize,
            ..CameraConfig::default()
        };
        let mut rig = CameraRig::new(&config, 1.0);
        rig.primary.look_at(Vec3::new(0.0, 0.1, 0.0));
        rig.set_aspect(2.0);
        assert_eq!(rig.effect.position(), rig.primary.position());
        assert_eq!(rig.effect.rotation(), rig.primary.rotation());
    }
}
