//! Linear RGB colour.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// RGB color with values in 0.0-1.0 range.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct Color {
    /// Red component (0.0 to 1.0).
    pub r: f32,
    /// Green component (0.0 to 1.0).
    pub g: f32,
    /// Blue component (0.0 to 1.0).
    pub b: f32,
}

impl Color {
    /// Black (0, 0, 0).
    pub const BLACK: Self = Self { r: 0.0, g: 0.0, b: 0.0 };
    /// White (1, 1, 1).
    pub const WHITE: Self = Self { r: 1.0, g: 1.0, b: 1.0 };

    /// Create a new color from RGB values (0.0-1.0).
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create from a hex integer (0xRRGGBB).
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
        }
    }

    /// Convert to hex integer.
    pub fn to_hex(&self) -> u32 {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    /// Convert to an array.
    #[inline]
    pub const fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// Convert to a wgpu clear color with opaque alpha.
    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: 1.0,
        }
    }
}
