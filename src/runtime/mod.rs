//! # Runtime Module
//!
//! The per-frame loop: adaptive resolution, output sizing and the
//! [`SnowGlobe`] context that drives every controller in order.

mod globe;
mod resolution;
mod surface;

pub use globe::SnowGlobe;
pub use resolution::AdaptiveResolution;
pub use surface::SurfaceSize;
