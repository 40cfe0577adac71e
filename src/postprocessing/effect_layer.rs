//! The overlay scene: one quad and its material.

use crate::geometry::EffectQuad;
use crate::material::ColdEffectMaterial;

/// Everything drawn in the overlay pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectLayer {
    /// Quad covering the effect camera's near plane.
    pub quad: EffectQuad,
    /// Overlay shader parameters.
    pub material: ColdEffectMaterial,
}

impl EffectLayer {
    /// Create a layer with a collapsed quad and the given material.
    pub fn new(material: ColdEffectMaterial) -> Self {
        Self {
            quad: EffectQuad::new(),
            material,
        }
    }

    /// Whether the overlay would contribute anything.
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.material.opacity > 0.0
    }
}
