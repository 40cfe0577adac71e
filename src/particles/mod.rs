//! Ambient snow particles.
//!
//! The clouds are static point sets; all motion comes from rotating whole
//! groups at slow, per-axis rates.

mod cloud;
mod spin;

pub use cloud::{generate_positions_in_sphere, PointCloud};
pub use spin::ParticleSpin;
