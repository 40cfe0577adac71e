//! Slot-map backed store for everything the scene assembly creates.

use super::Transform;
use crate::geometry::MeshData;
use crate::light::Light;
use crate::math::Color;
use crate::particles::PointCloud;
use crate::texture::ImageData;
use slotmap::SlotMap;
use std::sync::Arc;

slotmap::new_key_type! {
    /// Stable handle to a scene node. Stays valid until the node is removed;
    /// the runtime never removes nodes.
    pub struct NodeKey;
}

/// Surface appearance of a mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    /// Base color.
    pub color: Color,
    /// Opacity (1.0 = opaque).
    pub opacity: f32,
}

impl Surface {
    /// Opaque surface of a hex color.
    pub fn opaque(color: u32) -> Self {
        Self::translucent(color, 1.0)
    }

    /// Blended surface of a hex color.
    pub fn translucent(color: u32, opacity: f32) -> Self {
        Self {
            color: Color::from_hex(color),
            opacity,
        }
    }

    /// Whether the surface blends with what is behind it.
    #[inline]
    pub fn is_translucent(&self) -> bool {
        self.opacity < 1.0
    }
}

/// A mesh with its surface.
#[derive(Debug, Clone)]
pub struct MeshNode {
    /// Shared geometry; instances of one model point at the same data.
    pub mesh: Arc<MeshData>,
    /// Surface appearance.
    pub surface: Surface,
}

/// What a node contributes to the frame.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Transform only.
    Group,
    /// Triangle mesh.
    Mesh(MeshNode),
    /// Light source.
    Light(Light),
    /// Point sprites.
    Points(PointCloud),
}

/// A named node.
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Debug name.
    pub name: String,
    /// Local transform (all nodes are children of the root).
    pub transform: Transform,
    /// Node payload.
    pub kind: NodeKind,
    /// Whether the node is drawn.
    pub visible: bool,
}

impl SceneNode {
    /// Create a visible node at the origin.
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            transform: Transform::new(),
            kind,
            visible: true,
        }
    }

    /// Set the node transform.
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Whether the node is a blended mesh.
    pub fn is_translucent(&self) -> bool {
        matches!(&self.kind, NodeKind::Mesh(mesh) if mesh.surface.is_translucent())
    }

    fn is_drawable(&self) -> bool {
        self.visible && matches!(self.kind, NodeKind::Mesh(_) | NodeKind::Points(_))
    }
}

/// Image used as background and image-based lighting.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Equirectangular image.
    pub image: Arc<ImageData>,
    /// Background blurriness (0 = sharp).
    pub blur: f32,
    /// Background intensity.
    pub intensity: f32,
}

/// Owner of all scene nodes.
///
/// The runtime mutates nodes only through the keys it is handed, and only
/// their transforms and light fields.
#[derive(Debug, Default)]
pub struct SceneStore {
    nodes: SlotMap<NodeKey, SceneNode>,
    environment: Option<Environment>,
    /// Shadow maps are static and re-rendered only on request.
    shadow_needs_update: bool,
}

impl SceneStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node.
    pub fn insert(&mut self, node: SceneNode) -> NodeKey {
        self.nodes.insert(node)
    }

    /// Look up a node.
    #[inline]
    pub fn get(&self, key: NodeKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    /// Look up a node mutably.
    #[inline]
    pub fn get_mut(&mut self, key: NodeKey) -> Option<&mut SceneNode> {
        self.nodes.get_mut(key)
    }

    /// Transform of a node.
    pub fn transform_mut(&mut self, key: NodeKey) -> Option<&mut Transform> {
        self.nodes.get_mut(key).map(|node| &mut node.transform)
    }

    /// Light of a node, if the node is a light.
    pub fn light_mut(&mut self, key: NodeKey) -> Option<&mut Light> {
        match self.nodes.get_mut(key).map(|node| &mut node.kind) {
            Some(NodeKind::Light(light)) => Some(light),
            _ => None,
        }
    }

    /// Iterate over all nodes.
    pub fn iter(&self) -> impl Iterator<Item = (NodeKey, &SceneNode)> {
        self.nodes.iter()
    }

    /// Visible meshes and point clouds in draw order: opaque nodes first,
    /// then translucent ones, each in insertion order.
    ///
    /// Translucent nodes do not write depth, so drawing them last keeps
    /// everything behind them visible.
    pub fn draw_order(&self) -> Vec<(NodeKey, &SceneNode)> {
        let (mut order, translucent): (Vec<_>, Vec<_>) = self
            .nodes
            .iter()
            .filter(|(_, node)| node.is_drawable())
            .partition(|(_, node)| !node.is_translucent());
        order.extend(translucent);
        order
    }

    /// Number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the store has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Set the background/environment image.
    pub fn set_environment(&mut self, environment: Environment) {
        self.environment = Some(environment);
    }

    /// Background/environment image, if loaded.
    #[inline]
    pub fn environment(&self) -> Option<&Environment> {
        self.environment.as_ref()
    }

    /// Ask for the shadow maps to be rendered again on the next frame.
    pub fn request_shadow_update(&mut self) {
        self.shadow_needs_update = true;
    }

    /// Whether a shadow refresh is pending.
    #[inline]
    pub fn shadow_needs_update(&self) -> bool {
        self.shadow_needs_update
    }

    /// Consume a pending shadow refresh.
    pub fn take_shadow_update(&mut self) -> bool {
        std::mem::take(&mut self.shadow_needs_update)
    }
}
