//! Scene assembly: the collaborator that builds the static scene and tells
//! the runtime which nodes it animates.

use super::{MeshNode, NodeKey, NodeKind, SceneNode, SceneStore, Surface, Transform};
use crate::geometry::MeshData;
use crate::light::Light;
use crate::math::consts::PI;
use crate::math::Vec3;
use crate::particles::PointCloud;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::sync::Arc;

/// Nodes the frame loop mutates every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneHandles {
    /// The glass sphere: orbit target, proximity focus and billboard.
    pub focus: NodeKey,
    /// Light whose intensity flickers and which projects the light pattern.
    pub flicker_light: NodeKey,
    /// Snow particle groups, spun at the configured rates in order.
    pub particle_groups: Vec<NodeKey>,
}

/// Builds the scene into a store.
pub trait SceneAssembly {
    /// Populate `store` and return the animated nodes.
    fn assemble(&mut self, store: &mut SceneStore) -> SceneHandles;

    /// Place a late-arriving model. Returns `true` when nodes were added.
    fn attach_mesh(&mut self, _store: &mut SceneStore, _mesh: Arc<MeshData>) -> bool {
        false
    }
}

/// Sphere center; everything inside the globe is positioned around it.
pub const GLOBE_CENTER: Vec3 = Vec3::new(0.0, 0.11, 0.0);

const SNOW_COLOR: u32 = 0xccccff;

/// Clear glass: mostly see-through, with a faint sheen.
const GLASS_OPACITY: f32 = 0.12;
const GLASS_RADIUS: f32 = 0.1;

/// Tree placements: (uniform scale, height factor, yaw in units of PI, position).
const TREES: [(f32, f32, f32, [f32; 3]); 8] = [
    (0.024, 0.8, -0.32, [-0.02, 0.075, -0.02]),
    (0.02, 0.8, 0.9, [-0.04, 0.075, 0.0]),
    (0.01, 0.7, 0.0, [-0.05, 0.074, 0.02]),
    (0.018, 0.9, 0.0, [0.03, 0.075, -0.02]),
    (0.016, 0.8, 0.5, [0.01, 0.075, -0.03]),
    (0.018, 0.6, -0.4, [0.04, 0.075, 0.01]),
    (0.01, 0.8, 0.0, [0.07, 0.074, -0.01]),
    (0.008, 0.7, -0.8, [0.02, 0.074, 0.05]),
];

/// The snow globe: glass sphere, light rig, snow particles and trees.
pub struct SnowGlobeAssembly {
    rng: SmallRng,
    trees_placed: bool,
}

impl SnowGlobeAssembly {
    /// Create an assembly whose particle clouds derive from `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            trees_placed: false,
        }
    }

    fn lights(store: &mut SceneStore) -> NodeKey {
        let mut add = |name: &str, light: Light, position: Vec3| {
            store.insert(SceneNode::new(name, NodeKind::Light(light)).with_transform(Transform::from_position(position)))
        };
        let house_spot = add(
            "house spot light",
            Light::spot(0xff9900, 0.2, 0.07, 0.2 * PI, Vec3::new(-0.3, -0.3, 1.0)),
            Vec3::new(-0.0025, 0.08, 0.008),
        );
        add("key light", Light::directional(0xffffff, 1.0), Vec3::new(1.8, 1.6, 0.4));
        add("fill light", Light::directional(0xffffff, 0.5), Vec3::new(-0.3, 2.0, -0.8));
        add("sky light", Light::hemisphere(0xffffbb, 0x080820, 1.0), Vec3::ZERO);
        add("house light", Light::point(0xff5500, 1.0, 0.01), Vec3::new(-0.003, 0.075, 0.01));
        house_spot
    }

    fn globe(store: &mut SceneStore) -> NodeKey {
        let glass = Surface::translucent(0xcccccc, GLASS_OPACITY);
        let outside = store.insert(
            SceneNode::new(
                "glass sphere",
                NodeKind::Mesh(MeshNode {
                    mesh: Arc::new(MeshData::sphere(GLASS_RADIUS, 40, 10)),
                    surface: glass,
                }),
            )
            .with_transform(Transform::from_position(GLOBE_CENTER)),
        );
        let tint = Surface::translucent(0x000000, 0.3);
        store.insert(
            SceneNode::new(
                "glass tint",
                NodeKind::Mesh(MeshNode {
                    mesh: Arc::new(MeshData::sphere(0.099, 20, 8)),
                    surface: tint,
                }),
            )
            .with_transform(Transform::from_position(GLOBE_CENTER)),
        );
        outside
    }

    fn particles(&mut self, store: &mut SceneStore) -> Vec<NodeKey> {
        (0..3)
            .map(|i| {
                let cloud = PointCloud::in_sphere(600 + i * 100, 0.09, 0.0015, &mut self.rng);
                store.insert(
                    SceneNode::new(format!("snow particles {}", i), NodeKind::Points(cloud))
                        .with_transform(Transform::from_position(GLOBE_CENTER)),
                )
            })
            .collect()
    }
}

impl Default for SnowGlobeAssembly {
    fn default() -> Self {
        Self::new(0x5eed)
    }
}

impl SceneAssembly for SnowGlobeAssembly {
    fn assemble(&mut self, store: &mut SceneStore) -> SceneHandles {
        let flicker_light = Self::lights(store);
        let focus = Self::globe(store);
        let particle_groups = self.particles(store);
        store.request_shadow_update();
        SceneHandles {
            focus,
            flicker_light,
            particle_groups,
        }
    }

    fn attach_mesh(&mut self, store: &mut SceneStore, mesh: Arc<MeshData>) -> bool {
        if self.trees_placed {
            return false;
        }
        let surface = Surface::opaque(SNOW_COLOR);
        for (i, (scale, height, yaw, position)) in TREES.iter().enumerate() {
            let mut transform = Transform::from_position(Vec3::from_array(*position));
            transform.set_scale(Vec3::new(*scale, scale * height, *scale));
            transform.set_rotation_euler(0.0, yaw * PI, 0.0);
            store.insert(
                SceneNode::new(
                    format!("tree {}", i),
                    NodeKind::Mesh(MeshNode {
                        mesh: Arc::clone(&mesh),
                        surface: surface.clone(),
                    }),
                )
                .with_transform(transform),
            );
        }
        self.trees_placed = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_point_at_expected_nodes() {
        let mut store = SceneStore::new();
        let handles = SnowGlobeAssembly::default().assemble(&mut store);

        assert!(matches!(store.get(handles.focus).unwrap().kind, NodeKind::Mesh(_)));
        assert_eq!(store.get(handles.focus).unwrap().transform.position, GLOBE_CENTER);
        assert!(store.light_mut(handles.flicker_light).is_some());
        let counts: Vec<usize> = handles
            .particle_groups
            .iter()
            .map(|key| match &store.get(*key).unwrap().kind {
                NodeKind::Points(cloud) => cloud.len(),
                _ => 0,
            })
            .collect();
        assert_eq!(counts, vec![600, 700, 800]);
        assert!(store.shadow_needs_update());
    }

    #[test]
    fn test_trees_share_one_mesh_and_attach_once() {
        let mut store = SceneStore::new();
        let mut assembly = SnowGlobeAssembly::default();
        assembly.assemble(&mut store);
        let before = store.len();

        let mesh = Arc::new(MeshData::sphere(1.0, 4, 3));
        assert!(assembly.attach_mesh(&mut store, Arc::clone(&mesh)));
        assert_eq!(store.len(), before + TREES.len());
        // the caller's handle plus one per tree
        assert_eq!(Arc::strong_count(&mesh), 1 + TREES.len());
        assert!(!assembly.attach_mesh(&mut store, mesh));
    }

    #[test]
    fn test_glass_shows_what_is_inside() {
        let mut store = SceneStore::new();
        let handles = SnowGlobeAssembly::default().assemble(&mut store);

        let glass = store.get(handles.focus).unwrap();
        assert!(glass.is_translucent());

        let order: Vec<NodeKey> = store.draw_order().into_iter().map(|(key, _)| key).collect();
        let glass_at = order.iter().position(|key| *key == handles.focus).unwrap();
        for group in &handles.particle_groups {
            let node = store.get(*group).unwrap();
            assert!(node.transform.position.distance(GLOBE_CENTER) < GLASS_RADIUS);
            assert!(order.iter().position(|key| key == group).unwrap() < glass_at);
        }
    }
}
