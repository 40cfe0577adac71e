//! Decoded images kept on the CPU until a GPU backend uploads them.

use crate::loaders::LoadError;
use super::SamplerSettings;

/// An RGBA8 image plus how it should be sampled.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Tightly packed RGBA8 rows.
    pub rgba: Vec<u8>,
    /// Sampling state used when the image is bound.
    pub sampler: SamplerSettings,
}

impl ImageData {
    /// Wrap raw RGBA8 pixels.
    pub fn from_rgba8(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, LoadError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected || expected == 0 {
            return Err(LoadError::InvalidData(format!(
                "expected {} bytes for {}x{} RGBA8, got {}",
                expected,
                width,
                height,
                rgba.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba,
            sampler: SamplerSettings::default(),
        })
    }

    /// Decode encoded image bytes (PNG, JPEG).
    pub fn decode(bytes: &[u8]) -> Result<Self, LoadError> {
        let img = image::load_from_memory(bytes)?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba8(width, height, rgba.into_raw())
    }

    /// Replace the sampler settings.
    pub fn with_sampler(mut self, sampler: SamplerSettings) -> Self {
        self.sampler = sampler;
        self
    }

    /// Solid 1x1 image.
    pub fn solid(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: vec![r, g, b, a],
            sampler: SamplerSettings::default(),
        }
    }
}
