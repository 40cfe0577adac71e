//! # Core Module
//!
//! GPU context management, the wgpu frame target, frame timing and logging.

mod clock;
mod context;
mod logging;
mod renderer;

pub use clock::{FrameClock, FrameState};
pub use context::{Context, ContextError};
pub use logging::{init_logging, LoggingConfig};
pub use renderer::{RenderInfo, Renderer};

use crate::math::Color;
use serde::{Deserialize, Serialize};

/// Render configuration options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Prefer a discrete GPU.
    pub high_performance: bool,
    /// Wait for vertical blank when presenting.
    pub vsync: bool,
    /// Clear color as 0xRRGGBB.
    pub clear_color: u32,
    /// Clear color and depth at the start of every pass. The frame loop
    /// issues its own clears, so this stays off.
    pub auto_clear: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            high_performance: true,
            vsync: true,
            clear_color: 0x000000,
            auto_clear: false,
        }
    }
}

impl RenderConfig {
    /// Power preference for GPU selection.
    pub fn power_preference(&self) -> wgpu::PowerPreference {
        if self.high_performance {
            wgpu::PowerPreference::HighPerformance
        } else {
            wgpu::PowerPreference::LowPower
        }
    }

    /// Present mode.
    pub fn present_mode(&self) -> wgpu::PresentMode {
        if self.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        }
    }

    /// Clear color.
    #[inline]
    pub fn clear_color(&self) -> Color {
        Color::from_hex(self.clear_color)
    }
}
