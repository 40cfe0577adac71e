//! Lights carried by the scene store.

mod flicker;

pub use flicker::flicker_intensity;

use crate::math::{Color, Mat4, Vec3};
use crate::texture::ImageData;
use std::sync::Arc;

/// Light type and its type-specific parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum LightKind {
    /// Parallel light shining from the node position towards the origin.
    Directional,
    /// Cone light.
    Spot {
        /// Outer cone angle in radians.
        angle: f32,
        /// Range (0 = infinite).
        distance: f32,
        /// World-space point the cone is aimed at.
        target: Vec3,
    },
    /// Omni-directional light.
    Point {
        /// Range (0 = infinite).
        distance: f32,
    },
    /// Sky/ground gradient.
    Hemisphere {
        /// Color for surfaces facing down.
        ground_color: Color,
    },
}

/// A light attached to a scene node. Position comes from the node transform.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    /// Type and type-specific parameters.
    pub kind: LightKind,
    /// Light color (sky color for hemisphere lights).
    pub color: Color,
    /// Light intensity.
    pub intensity: f32,
    /// Pattern projected by spot lights; `None` until loaded.
    pub map: Option<Arc<ImageData>>,
}

impl Light {
    fn with_kind(kind: LightKind, color: u32, intensity: f32) -> Self {
        Self {
            kind,
            color: Color::from_hex(color),
            intensity,
            map: None,
        }
    }

    /// Directional light.
    pub fn directional(color: u32, intensity: f32) -> Self {
        Self::with_kind(LightKind::Directional, color, intensity)
    }

    /// Spot light aimed at `target`.
    pub fn spot(color: u32, intensity: f32, distance: f32, angle: f32, target: Vec3) -> Self {
        Self::with_kind(LightKind::Spot { angle, distance, target }, color, intensity)
    }

    /// Point light.
    pub fn point(color: u32, intensity: f32, distance: f32) -> Self {
        Self::with_kind(LightKind::Point { distance }, color, intensity)
    }

    /// Hemisphere light.
    pub fn hemisphere(sky: u32, ground: u32, intensity: f32) -> Self {
        Self::with_kind(
            LightKind::Hemisphere {
                ground_color: Color::from_hex(ground),
            },
            sky,
            intensity,
        )
    }

    /// Image this light projects, if it is a spot light with one loaded.
    pub fn pattern(&self) -> Option<&Arc<ImageData>> {
        match self.kind {
            LightKind::Spot { .. } => self.map.as_ref(),
            _ => None,
        }
    }

    /// View-projection of a spot light's cone, for projecting its pattern.
    /// The cone fills the square NDC range; `None` for other light kinds.
    pub fn cone_projection(&self, position: Vec3) -> Option<Mat4> {
        let LightKind::Spot { angle, distance, target } = self.kind else {
            return None;
        };
        let forward = (target - position).normalize_or(Vec3::NEG_Z);
        let up = if forward.y.abs() > 0.999 { Vec3::Z } else { Vec3::Y };
        let far = if distance > 0.0 { distance } else { SPOT_FAR };
        let projection = Mat4::perspective_rh(angle * 2.0, 1.0, SPOT_NEAR, far);
        Some(projection * Mat4::look_at_rh(position, position + forward, up))
    }
}

const SPOT_NEAR: f32 = 0.001;
const SPOT_FAR: f32 = 100.0;
