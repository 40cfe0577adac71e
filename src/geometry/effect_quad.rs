//! Fixed-topology quad used for the screen-space effect.

use super::EffectVertex;
use crate::math::Vec3;

/// Texture coordinates of the six vertices; never change after construction.
pub const EFFECT_QUAD_UVS: [[f32; 2]; 6] = [
    // first triangle
    [0.0, 0.0],
    [1.0, 0.0],
    [0.0, 1.0],
    // second triangle
    [0.0, 1.0],
    [1.0, 0.0],
    [1.0, 1.0],
];

/// Vertex slots per corner: triangle 1 is (c0, c1, c2), triangle 2 is
/// (c2, c1, c3). Both wind counter-clockwise seen from the camera.
const CORNER_SLOTS: [usize; 6] = [0, 1, 2, 2, 1, 3];

/// Two triangles sharing the c1–c2 diagonal. Only the positions are ever
/// rewritten.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectQuad {
    positions: [Vec3; 6],
    /// Whether the position buffer must be uploaded again.
    needs_update: bool,
}

impl Default for EffectQuad {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectQuad {
    /// Number of vertices.
    pub const VERTEX_COUNT: u32 = 6;

    /// Create a collapsed quad; every position sits at the origin until the
    /// first recompute.
    pub fn new() -> Self {
        Self {
            positions: [Vec3::ZERO; 6],
            needs_update: true,
        }
    }

    /// Write the four logical corners into the six vertex slots.
    ///
    /// Corner order is bottom-left, bottom-right, top-left, top-right.
    pub fn set_corners(&mut self, corners: &[Vec3; 4]) {
        for (slot, &corner) in self.positions.iter_mut().zip(CORNER_SLOTS.iter()) {
            *slot = corners[corner];
        }
        self.needs_update = true;
    }

    /// The four logical corners.
    pub fn corners(&self) -> [Vec3; 4] {
        [self.positions[0], self.positions[1], self.positions[2], self.positions[5]]
    }

    /// Vertex positions in slot order.
    #[inline]
    pub fn positions(&self) -> &[Vec3; 6] {
        &self.positions
    }

    /// Interleaved vertices ready for upload.
    pub fn vertices(&self) -> [EffectVertex; 6] {
        let mut out = [EffectVertex::new([0.0; 3], [0.0; 2]); 6];
        for (i, vertex) in out.iter_mut().enumerate() {
            *vertex = EffectVertex::new(self.positions[i].to_array(), EFFECT_QUAD_UVS[i]);
        }
        out
    }

    /// Check if the position buffer needs uploading.
    #[inline]
    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    /// Clear the needs update flag after an upload.
    pub fn clear_needs_update(&mut self) {
        self.needs_update = false;
    }
}
