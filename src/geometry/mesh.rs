//! CPU-side triangle meshes handed to the scene store.

use super::SurfaceVertex;
use crate::math::consts::{PI, TWO_PI};
use crate::math::Vec3;

/// Indexed triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions.
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals, empty when the source had none.
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices.
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Build a UV sphere centered at the origin.
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);
        let mut mesh = Self::default();

        for iy in 0..=height_segments {
            let theta = iy as f32 / height_segments as f32 * PI;
            for ix in 0..=width_segments {
                let phi = ix as f32 / width_segments as f32 * TWO_PI;
                let normal = Vec3::new(-theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
                mesh.positions.push((normal * radius).to_array());
                mesh.normals.push(normal.to_array());
            }
        }

        let row = width_segments + 1;
        for iy in 0..height_segments {
            for ix in 0..width_segments {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;
                // degenerate triangles at the poles are skipped
                if iy != 0 {
                    mesh.indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height_segments - 1 {
                    mesh.indices.extend_from_slice(&[b, c, d]);
                }
            }
        }
        mesh
    }

    /// Number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Whether the mesh has no drawable triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Interleave positions and normals. Meshes without normals get flat
    /// upward normals.
    pub fn surface_vertices(&self) -> Vec<SurfaceVertex> {
        self.positions
            .iter()
            .enumerate()
            .map(|(i, p)| SurfaceVertex::new(*p, self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0])))
            .collect()
    }

    /// Largest distance of any vertex from the local origin.
    pub fn bounding_radius(&self) -> f32 {
        self.positions
            .iter()
            .map(|p| Vec3::from_array(*p).length())
            .fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_vertices_on_surface() {
        let mesh = MeshData::sphere(0.1, 40, 10);
        assert_eq!(mesh.positions.len(), 41 * 11);
        for p in &mesh.positions {
            assert!((Vec3::from_array(*p).length() - 0.1).abs() < 1e-6);
        }
        assert!((mesh.bounding_radius() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_sphere_indices_in_range() {
        let mesh = MeshData::sphere(1.0, 8, 6);
        // two caps of single triangles plus full quads in between
        assert_eq!(mesh.triangle_count(), 8 * 2 + 8 * 4 * 2);
        let count = mesh.positions.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < count));
    }
}
