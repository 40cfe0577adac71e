//! Logical and physical output size.

use crate::math::clamp;

/// Window size as reported by the host plus the render scale applied to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    /// Logical width in pixels.
    pub logical_width: u32,
    /// Logical height in pixels.
    pub logical_height: u32,
    /// Render scale in `(0, 1]`.
    pub scale: f32,
}

impl SurfaceSize {
    /// Create a size at full scale. Zero dimensions are raised to one.
    pub fn new(logical_width: u32, logical_height: u32) -> Self {
        Self {
            logical_width: logical_width.max(1),
            logical_height: logical_height.max(1),
            scale: 1.0,
        }
    }

    /// Same logical size with another scale.
    pub fn with_scale(self, scale: f32) -> Self {
        Self {
            scale: clamp(scale, f32::MIN_POSITIVE, 1.0),
            ..self
        }
    }

    /// Backing buffer size: logical size times scale, rounded down, never
    /// zero.
    pub fn physical(&self) -> (u32, u32) {
        let scaled = |v: u32| ((v as f32 * self.scale).floor() as u32).max(1);
        (scaled(self.logical_width), scaled(self.logical_height))
    }

    /// Camera aspect ratio; tracks the logical size only.
    #[inline]
    pub fn aspect(&self) -> f32 {
        self.logical_width as f32 / self.logical_height as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_scales_logical() {
        let size = SurfaceSize::new(1920, 1080).with_scale(0.5);
        assert_eq!(size.physical(), (960, 540));
        assert!((size.aspect() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_scale_keeps_aspect() {
        let full = SurfaceSize::new(1000, 700);
        assert_eq!(full.aspect(), full.with_scale(0.2).aspect());
    }

    #[test]
    fn test_never_zero() {
        assert_eq!(SurfaceSize::new(3, 2).with_scale(0.2).physical(), (1, 1));
        assert_eq!(SurfaceSize::new(0, 0).physical(), (1, 1));
    }
}
