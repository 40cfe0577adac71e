//! Runtime configuration.
//!
//! Every tunable of the frame loop lives here. `Default` reproduces the
//! constants the scene was authored against; a TOML file can override any
//! subset of them.

use crate::core::RenderConfig;
use crate::math::consts::PI;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is outside the range the runtime can work with.
    #[error("Invalid value for `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Human readable reason.
        reason: String,
    },
}

/// Top-level configuration for the snow globe runtime.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    /// Camera projection, start pose and orbit limits.
    pub camera: CameraConfig,
    /// Adaptive resolution controller.
    pub resolution: ResolutionConfig,
    /// Proximity-driven effect opacity.
    pub proximity: ProximityConfig,
    /// Cold post-process effect.
    pub effect: EffectConfig,
    /// Ambient animations (light flicker, particle spin).
    pub animation: AnimationConfig,
    /// GPU surface and clearing.
    pub render: RenderConfig,
}

impl GlobeConfig {
    /// Parse a configuration from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Reject configurations that would produce a malformed frustum or an
    /// empty resolution range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let cam = &self.camera;
        if !(cam.fov > 0.0 && cam.fov < 180.0) {
            return Err(ConfigError::Invalid {
                field: "camera.fov",
                reason: format!("{} is not in (0, 180) degrees", cam.fov),
            });
        }
        if !(cam.near > 0.0 && cam.near < cam.far) {
            return Err(ConfigError::Invalid {
                field: "camera.near",
                reason: format!("need 0 < near < far, got near={} far={}", cam.near, cam.far),
            });
        }
        if !(0.0..=PI).contains(&cam.min_polar_angle) || cam.min_polar_angle > cam.max_polar_angle {
            return Err(ConfigError::Invalid {
                field: "camera.min_polar_angle",
                reason: format!(
                    "need 0 <= min <= max <= pi, got {} and {}",
                    cam.min_polar_angle, cam.max_polar_angle
                ),
            });
        }
        let res = &self.resolution;
        if !(res.min_scale > 0.0 && res.min_scale <= res.target_scale && res.target_scale <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "resolution.min_scale",
                reason: format!(
                    "need 0 < min_scale <= target_scale <= 1, got {} and {}",
                    res.min_scale, res.target_scale
                ),
            });
        }
        if res.window_frames == 0 {
            return Err(ConfigError::Invalid {
                field: "resolution.window_frames",
                reason: "window must contain at least one frame".into(),
            });
        }
        Ok(())
    }
}

/// Camera projection and orbit parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Initial primary camera position.
    pub start_position: [f32; 3],
    /// Orbit target is the focus position shifted by this much along Y.
    pub target_offset_y: f32,
    /// Minimum polar angle (radians, 0 = straight down from above).
    pub min_polar_angle: f32,
    /// Maximum polar angle.
    pub max_polar_angle: f32,
    /// Auto-rotation speed (full turns per minute at 1.0, 0 disables).
    pub auto_rotate_speed: f32,
    /// How the effect camera is posed relative to the primary camera.
    pub effect_camera: EffectCameraMode,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 70.0,
            near: 0.01,
            far: 100.0,
            start_position: [0.0, 0.18, 0.25],
            target_offset_y: -0.025,
            min_polar_angle: PI * 0.28,
            max_polar_angle: PI * 0.6,
            auto_rotate_speed: 0.0,
            effect_camera: EffectCameraMode::Stationary,
        }
    }
}

/// Pose policy for the effect camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectCameraMode {
    /// Stays at the origin looking down -Z; the quad is built and drawn in
    /// its own space so it always covers the screen.
    #[default]
    Stationary,
    /// Copies the primary camera's pose whenever the window is resized.
    MirrorPrimaryOnResize,
}

/// Adaptive resolution parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Lowest allowed scale.
    pub min_scale: f32,
    /// Scale the controller recovers towards.
    pub target_scale: f32,
    /// Increment applied after a full window of good frames.
    pub step_up: f32,
    /// Factor applied on a bad frame.
    pub step_down_factor: f32,
    /// Frames per evaluation window.
    pub window_frames: u32,
    /// Frames faster than this count as good (seconds).
    pub good_frame_time: f32,
    /// Frames slower than this trigger an immediate step down (seconds).
    pub bad_frame_time: f32,
    /// Step-downs are suppressed for this long after any resize (seconds).
    pub resize_cooldown: f32,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.2,
            target_scale: 1.0,
            step_up: 0.05,
            step_down_factor: 0.9,
            window_frames: 150,
            good_frame_time: 1.0 / 55.0,
            bad_frame_time: 1.0 / 30.0,
            resize_cooldown: 1.0,
        }
    }
}

/// Proximity opacity parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    /// Camera closer than this to the focus counts as inside.
    pub threshold: f32,
    /// Opacity ceiling.
    pub max_opacity: f32,
    /// Opacity change per second.
    pub rate: f32,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            threshold: 0.11,
            max_opacity: 0.5,
            rate: 1.0,
        }
    }
}

/// Cold post-process parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    /// Tint colour as 0xRRGGBB.
    pub tint: u32,
    /// Near-plane corners are pushed away from the camera by
    /// `near * near_push_factor` of their own length.
    pub near_push_factor: f32,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            tint: 0xaaddff,
            near_push_factor: 0.01,
        }
    }
}

/// Ambient animation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Peak scale of the house light flicker.
    pub flicker_base: f32,
    /// Per-group Euler angular rates (rad/s) for the snow particle groups.
    pub particle_spin_rates: Vec<[f32; 3]>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            flicker_base: 0.6,
            particle_spin_rates: vec![
                [1.0 / 9.0, 1.0 / 5.0, 1.0 / 10.0],
                [-1.0 / 6.0, -1.0 / 3.0, -1.0 / 6.0],
                [-1.0 / 6.0, 1.0 / 4.0, 1.0 / 7.0],
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(GlobeConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = GlobeConfig::from_toml_str(
            r#"
            [resolution]
            window_frames = 60

            [camera]
            effect_camera = "mirror_primary_on_resize"
            "#,
        )
        .unwrap();
        assert_eq!(config.resolution.window_frames, 60);
        assert_eq!(config.resolution.min_scale, 0.2);
        assert_eq!(config.camera.effect_camera, EffectCameraMode::MirrorPrimaryOnResize);
        assert_eq!(config.camera.fov, 70.0);
    }

    #[test]
    fn test_rejects_inverted_clip_planes() {
        let err = GlobeConfig::from_toml_str("[camera]\nnear = 10.0\nfar = 1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "camera.near", .. }));
    }

    #[test]
    fn test_rejects_crossed_polar_limits() {
        let err = GlobeConfig::from_toml_str("[camera]\nmin_polar_angle = 2.0\nmax_polar_angle = 1.0\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "camera.min_polar_angle", .. }));
    }

    #[test]
    fn test_render_section_parses() {
        let config = GlobeConfig::from_toml_str("[render]\nvsync = false\nclear_color = 0x102030\n").unwrap();
        assert!(!config.render.vsync);
        assert_eq!(config.render.clear_color, 0x102030);
        assert!(!config.render.auto_clear);
    }

    #[test]
    fn test_rejects_bad_toml() {
        assert!(matches!(
            GlobeConfig::from_toml_str("[camera\n"),
            Err(ConfigError::Parse(_))
        ));
    }
}
