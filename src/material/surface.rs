//! Lit surface material for scene meshes and point clouds.

use crate::camera::PerspectiveCamera;
use crate::geometry::SurfaceVertex;
use crate::light::{Light, LightKind};
use crate::math::{Mat4, Vec3};
use crate::scene::{NodeKind, SceneStore, Surface};
use crate::texture::ImageData;
use bytemuck::{Pod, Zeroable};
use std::sync::Arc;

/// Maximum number of direct lights evaluated per fragment.
pub const MAX_LIGHTS: usize = 6;

/// `pattern_slot` value when no light projects a pattern.
pub const NO_PATTERN: u32 = u32::MAX;

/// One direct light in the scene uniform.
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct LightSlot {
    /// xyz = direction towards the light (w = 0) or position (w = 1).
    pub position: [f32; 4],
    /// rgb = color * intensity, w = range (0 = infinite).
    pub color: [f32; 4],
}

/// Per-frame scene data: camera and lights.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct SceneUniform {
    /// Combined view-projection matrix.
    pub view_proj: [[f32; 4]; 4],
    /// Cone projection of the light in `pattern_slot`.
    pub pattern_view_proj: [[f32; 4]; 4],
    /// Hemisphere sky color * intensity.
    pub sky: [f32; 4],
    /// Hemisphere ground color * intensity.
    pub ground: [f32; 4],
    /// Direct lights.
    pub lights: [LightSlot; MAX_LIGHTS],
    /// Number of used light slots.
    pub light_count: u32,
    /// Light slot modulated by the pattern texture, or [`NO_PATTERN`].
    pub pattern_slot: u32,
    /// Padding.
    pub _padding: [u32; 2],
}

impl SceneUniform {
    /// Gather camera and lights from the store. The first spot light with a
    /// loaded pattern projects it.
    pub fn gather(store: &SceneStore, camera: &PerspectiveCamera) -> Self {
        let mut uniform = Self {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            pattern_view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            sky: [0.0; 4],
            ground: [0.0; 4],
            lights: [LightSlot::default(); MAX_LIGHTS],
            light_count: 0,
            pattern_slot: NO_PATTERN,
            _padding: [0; 2],
        };
        let mut count = 0;
        for (_, node) in store.iter() {
            let NodeKind::Light(light) = &node.kind else { continue };
            let position = node.transform.position;
            if let LightKind::Hemisphere { ground_color } = &light.kind {
                uniform.sky = scaled(light.color.to_array(), light.intensity);
                uniform.ground = scaled(ground_color.to_array(), light.intensity);
                continue;
            }
            if count == MAX_LIGHTS {
                log::debug!("light '{}' exceeds {} direct lights, skipped", node.name, MAX_LIGHTS);
                continue;
            }
            uniform.lights[count] = light_slot(light, position);
            if uniform.pattern_slot == NO_PATTERN && light.pattern().is_some() {
                if let Some(cone) = light.cone_projection(position) {
                    uniform.pattern_slot = count as u32;
                    uniform.pattern_view_proj = cone.to_cols_array_2d();
                }
            }
            count += 1;
        }
        uniform.light_count = count as u32;
        uniform
    }
}

fn scaled(rgb: [f32; 3], intensity: f32) -> [f32; 4] {
    [rgb[0] * intensity, rgb[1] * intensity, rgb[2] * intensity, 1.0]
}

fn light_slot(light: &Light, position: Vec3) -> LightSlot {
    let mut color = scaled(light.color.to_array(), light.intensity);
    let position = match light.kind {
        LightKind::Directional => {
            color[3] = 0.0;
            position.normalize_or_zero().extend(0.0).to_array()
        }
        LightKind::Spot { distance, .. } | LightKind::Point { distance } => {
            color[3] = distance;
            position.extend(1.0).to_array()
        }
        LightKind::Hemisphere { .. } => [0.0; 4],
    };
    LightSlot { position, color }
}

/// Per-node data.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct ModelUniform {
    /// Model matrix.
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of the model matrix.
    pub normal: [[f32; 4]; 4],
    /// rgb = base color, a = opacity.
    pub color: [f32; 4],
}

impl ModelUniform {
    /// Pack a node transform and surface.
    pub fn new(model: Mat4, surface: &Surface) -> Self {
        let c = surface.color;
        Self {
            model: model.to_cols_array_2d(),
            normal: model.inverse().transpose().to_cols_array_2d(),
            color: [c.r, c.g, c.b, surface.opacity],
        }
    }
}

/// The pattern image projected by the scene's lights, if any.
pub fn projected_pattern(store: &SceneStore) -> Option<&Arc<ImageData>> {
    store.iter().find_map(|(_, node)| match &node.kind {
        NodeKind::Light(light) => light.pattern(),
        _ => None,
    })
}

/// Pipelines for opaque triangles, blended triangles and points sharing one
/// shader.
pub struct SurfacePipeline {
    triangles: wgpu::RenderPipeline,
    translucent: wgpu::RenderPipeline,
    points: wgpu::RenderPipeline,
    scene_layout: wgpu::BindGroupLayout,
    model_layout: wgpu::BindGroupLayout,
}

impl SurfacePipeline {
    /// Shader source.
    const SHADER_SOURCE: &'static str = include_str!("../shaders/surface.wgsl");

    /// Build both render pipelines.
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat, depth_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Surface Shader"),
            source: wgpu::ShaderSource::Wgsl(Self::SHADER_SOURCE.into()),
        });

        let uniform_entry = wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let scene_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Bind Group Layout"),
            entries: &[
                uniform_entry,
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let model_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Model Bind Group Layout"),
            entries: &[uniform_entry],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Surface Pipeline Layout"),
            bind_group_layouts: &[&scene_layout, &model_layout],
            push_constant_ranges: &[],
        });

        let build = |label: &str, topology: wgpu::PrimitiveTopology, cull_mode: Option<wgpu::Face>, depth_write: bool| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[SurfaceVertex::layout()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode,
                    unclipped_depth: false,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: depth_format,
                    depth_write_enabled: depth_write,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState {
                    count: 1,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview: None,
                cache: None,
            })
        };

        Self {
            triangles: build("Surface Triangle Pipeline", wgpu::PrimitiveTopology::TriangleList, Some(wgpu::Face::Back), true),
            translucent: build(
                "Surface Translucent Pipeline",
                wgpu::PrimitiveTopology::TriangleList,
                Some(wgpu::Face::Back),
                false,
            ),
            points: build("Surface Point Pipeline", wgpu::PrimitiveTopology::PointList, None, true),
            scene_layout,
            model_layout,
        }
    }

    /// Pipeline for meshes.
    #[inline]
    pub fn triangles(&self) -> &wgpu::RenderPipeline {
        &self.triangles
    }

    /// Pipeline for blended meshes; tests depth but does not write it.
    #[inline]
    pub fn translucent(&self) -> &wgpu::RenderPipeline {
        &self.translucent
    }

    /// Pipeline for point clouds.
    #[inline]
    pub fn points(&self) -> &wgpu::RenderPipeline {
        &self.points
    }

    /// Create the scene bind group with the projected pattern texture.
    pub fn create_scene_bind_group(
        &self,
        device: &wgpu::Device,
        buffer: &wgpu::Buffer,
        pattern_view: &wgpu::TextureView,
        pattern_sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &self.scene_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(pattern_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(pattern_sampler),
                },
            ],
        })
    }

    /// Create a model bind group.
    pub fn create_model_bind_group(&self, device: &wgpu::Device, buffer: &wgpu::Buffer) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Model Bind Group"),
            layout: &self.model_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{SceneAssembly, SnowGlobeAssembly};

    #[test]
    fn test_uniform_sizes_are_aligned() {
        assert_eq!(std::mem::size_of::<SceneUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<ModelUniform>() % 16, 0);
    }

    #[test]
    fn test_gather_splits_hemisphere_from_direct_lights() {
        let mut store = SceneStore::new();
        let handles = SnowGlobeAssembly::default().assemble(&mut store);
        store.light_mut(handles.flicker_light).unwrap().intensity = 0.5;

        let camera = PerspectiveCamera::default();
        let uniform = SceneUniform::gather(&store, &camera);
        // spot, two directional, point
        assert_eq!(uniform.light_count, 4);
        assert_eq!(uniform.sky[3], 1.0);
        let spot = uniform.lights.iter().find(|slot| slot.position[3] == 1.0 && slot.color[3] == 0.07).unwrap();
        let expected = crate::math::Color::from_hex(0xff9900).r * 0.5;
        assert!((spot.color[0] - expected).abs() < 1e-6);
        assert_eq!(uniform.pattern_slot, NO_PATTERN);
        assert!(projected_pattern(&store).is_none());
    }

    #[test]
    fn test_loaded_pattern_selects_the_spot_slot() {
        let mut store = SceneStore::new();
        let handles = SnowGlobeAssembly::default().assemble(&mut store);
        store.light_mut(handles.flicker_light).unwrap().map = Some(Arc::new(ImageData::solid(255, 0, 0, 255)));

        let uniform = SceneUniform::gather(&store, &PerspectiveCamera::default());
        assert_ne!(uniform.pattern_slot, NO_PATTERN);
        let slot = uniform.lights[uniform.pattern_slot as usize];
        // the spot light: positional with a 0.07 range
        assert_eq!(slot.position[3], 1.0);
        assert_eq!(slot.color[3], 0.07);
        assert_ne!(uniform.pattern_view_proj, Mat4::IDENTITY.to_cols_array_2d());
        assert!(projected_pattern(&store).is_some());
    }
}
