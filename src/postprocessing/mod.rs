//! # Post-processing
//!
//! The cold overlay: a quad glued to the effect camera's near plane, an
//! opacity that follows the camera's distance to the globe, and the
//! compositor that draws it over the scene.

mod compositor;
mod effect_layer;
mod proximity;
mod quad_fit;

pub use compositor::{ClearFlags, DualPassCompositor, FrameTarget, Layer};
pub use effect_layer::EffectLayer;
pub use proximity::ProximityOpacity;
pub use quad_fit::EffectQuadUpdater;
