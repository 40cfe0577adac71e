//! Vertex types and layouts.

use bytemuck::{Pod, Zeroable};

/// Vertex of the effect quad: world-space position and screen UV.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct EffectVertex {
    /// Position in world space.
    pub position: [f32; 3],
    /// Texture coordinates.
    pub uv: [f32; 2],
}

impl EffectVertex {
    /// Create a new vertex.
    pub const fn new(position: [f32; 3], uv: [f32; 2]) -> Self {
        Self { position, uv }
    }

    /// Get the vertex buffer layout for this vertex type.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    /// Vertex attributes.
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] = [
        // position
        wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        },
        // uv
        wgpu::VertexAttribute {
            offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x2,
        },
    ];
}

/// Vertex of scene meshes and point clouds.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct SurfaceVertex {
    /// Position in node space.
    pub position: [f32; 3],
    /// Normal in node space.
    pub normal: [f32; 3],
}

impl SurfaceVertex {
    /// Create a new vertex.
    pub const fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }

    /// Get the vertex buffer layout for this vertex type.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_stride_matches_struct() {
        assert_eq!(std::mem::size_of::<EffectVertex>(), 20);
        assert_eq!(EffectVertex::layout().array_stride, 20);
        assert_eq!(SurfaceVertex::layout().array_stride, 24);
    }
}
