//! Materials: CPU-side parameters plus the wgpu pipelines that consume them.

mod background;
mod cold_effect;
mod surface;

pub use background::{equirect_uv, BackgroundPipeline, BackgroundUniform};
pub use cold_effect::{ColdEffectMaterial, ColdEffectPipeline, ColdEffectUniform};
pub use surface::{
    projected_pattern, LightSlot, ModelUniform, SceneUniform, SurfacePipeline, MAX_LIGHTS, NO_PATTERN,
};
