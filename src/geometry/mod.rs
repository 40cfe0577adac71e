//! Geometry owned by the runtime and the scene store.

mod effect_quad;
mod mesh;
mod vertex;

pub use effect_quad::{EffectQuad, EFFECT_QUAD_UVS};
pub use mesh::MeshData;
pub use vertex::{EffectVertex, SurfaceVertex};
