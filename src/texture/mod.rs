//! Texture module for images and samplers.

mod image_data;
mod sampler;
mod texture2d;

pub use image_data::ImageData;
pub use sampler::{FilterMode, SamplerSettings, WrapMode};
pub use texture2d::Texture2D;
