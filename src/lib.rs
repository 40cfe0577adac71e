//! # Snowglobe - a wgpu snow globe scene
//!
//! A small decorative scene (a glass sphere with trees, falling snow and a
//! flickering light) plus the runtime that keeps it smooth: an adaptive
//! render scale, auto-rotating orbit controls and a cold overlay that fades
//! in when the camera moves inside the globe.
//!
//! ## Features
//!
//! - **Runtime**: [`runtime::SnowGlobe`] owns all per-frame state
//! - **Postprocessing**: the overlay quad pinned to the near plane and the
//!   two-pass compositor that keeps it above the scene
//! - **Core**: wgpu context and frame target, frame clock, logging
//! - **Loaders**: asynchronous asset slots and a minimal OBJ parser
//!
//! ## Example
//!
//! ```ignore
//! use snowglobe::prelude::*;
//!
//! let mut globe = SnowGlobe::new(GlobeConfig::default(), SnowGlobeAssembly::default(), 1280, 720)?;
//! globe.load_assets_from(".");
//!
//! // once per display refresh
//! globe.advance(timestamp_ms);
//! if let Some((w, h)) = globe.take_surface_resize() {
//!     ctx.resize(w, h);
//!     renderer.resize(&ctx);
//! }
//! let mut frame = renderer.begin(&ctx)?;
//! globe.render(&mut frame);
//! frame.present();
//! ```

#![warn(missing_docs)]

pub mod camera;
pub mod config;
pub mod controls;
pub mod core;
pub mod geometry;
pub mod light;
pub mod loaders;
pub mod material;
pub mod math;
pub mod particles;
pub mod postprocessing;
pub mod runtime;
pub mod scene;
pub mod texture;

#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub mod web;

// Re-export commonly used types
pub mod prelude {
    //! Convenient re-exports of commonly used types.

    pub use crate::camera::*;
    pub use crate::config::*;
    pub use crate::controls::*;
    pub use crate::core::*;
    pub use crate::loaders::*;
    pub use crate::math::*;
    pub use crate::postprocessing::*;
    pub use crate::runtime::*;
    pub use crate::scene::*;
}

pub use crate::core::{init_logging, LoggingConfig};

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = "Snowglobe";
