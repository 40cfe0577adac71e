//! Cold overlay material drawn on the effect quad.

use crate::geometry::EffectVertex;
use crate::math::Color;
use crate::texture::ImageData;
use bytemuck::{Pod, Zeroable};
use std::sync::Arc;

/// Uniform block of the cold effect shader.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct ColdEffectUniform {
    /// Effect camera view-projection matrix.
    pub view_proj: [[f32; 4]; 4],
    /// Tint color.
    pub tint_color: [f32; 3],
    /// Overall opacity.
    pub opacity: f32,
    /// Logical width / height.
    pub aspect_ratio: f32,
    /// 1 when a snow texture is bound, 0 for the white placeholder.
    pub has_snow_texture: u32,
    /// Padding to 16-byte alignment.
    pub _padding: [f32; 2],
}

/// Parameters the frame loop writes for the overlay shader.
#[derive(Debug, Clone, PartialEq)]
pub struct ColdEffectMaterial {
    /// Overlay opacity, written every frame before the overlay pass.
    pub opacity: f32,
    /// Tint color.
    pub tint_color: Color,
    /// Snow texture; the overlay renders without it until it loads.
    snow_texture: Option<Arc<ImageData>>,
    /// Logical width / height, written on resize.
    pub aspect_ratio: f32,
    /// Bumped whenever the texture changes so GPU copies know to rebind.
    texture_version: u32,
}

impl ColdEffectMaterial {
    /// Create a transparent material with a tint.
    pub fn new(tint_color: Color) -> Self {
        Self {
            opacity: 0.0,
            tint_color,
            snow_texture: None,
            aspect_ratio: 1.0,
            texture_version: 0,
        }
    }

    /// Snow texture, if loaded.
    #[inline]
    pub fn snow_texture(&self) -> Option<&Arc<ImageData>> {
        self.snow_texture.as_ref()
    }

    /// Assign the snow texture in one step.
    pub fn set_snow_texture(&mut self, texture: Arc<ImageData>) {
        self.snow_texture = Some(texture);
        self.texture_version = self.texture_version.wrapping_add(1);
    }

    /// Changes whenever the snow texture is replaced.
    #[inline]
    pub fn texture_version(&self) -> u32 {
        self.texture_version
    }

    /// Pack the uniform block for a camera.
    pub fn uniform(&self, view_proj: [[f32; 4]; 4]) -> ColdEffectUniform {
        ColdEffectUniform {
            view_proj,
            tint_color: self.tint_color.to_array(),
            opacity: self.opacity,
            aspect_ratio: self.aspect_ratio,
            has_snow_texture: self.snow_texture.is_some() as u32,
            _padding: [0.0; 2],
        }
    }
}

impl Default for ColdEffectMaterial {
    fn default() -> Self {
        Self::new(Color::from_hex(0xaaddff))
    }
}

/// GPU pipeline for the overlay.
pub struct ColdEffectPipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl ColdEffectPipeline {
    /// Shader source.
    const SHADER_SOURCE: &'static str = include_str!("../shaders/cold_effect.wgsl");

    /// Build the render pipeline.
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat, depth_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Cold Effect Shader"),
            source: wgpu::ShaderSource::Wgsl(Self::SHADER_SOURCE.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Cold Effect Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
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

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Cold Effect Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Cold Effect Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[EffectVertex::layout()],
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
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            // regular depth test; the compositor clears depth before this pass
            depth_stencil: Some(wgpu::DepthStencilState {
                format: depth_format,
                depth_write_enabled: true,
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
        });

        Self {
            pipeline,
            bind_group_layout,
        }
    }

    /// Get the render pipeline.
    #[inline]
    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    /// Create the bind group for a uniform buffer and texture.
    pub fn create_bind_group(
        &self,
        device: &wgpu::Device,
        uniform: &wgpu::Buffer,
        view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Cold Effect Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }
}
