//! # Scene Module
//!
//! Flat scene store addressed through slot-map keys, plus the assembly that
//! fills it.

mod assembly;
mod store;
mod transform;

pub use assembly::{SceneAssembly, SceneHandles, SnowGlobeAssembly, GLOBE_CENTER};
pub use store::{Environment, MeshNode, NodeKey, NodeKind, SceneNode, SceneStore, Surface};
pub use transform::Transform;
pub(crate) use transform::rotation_facing;
