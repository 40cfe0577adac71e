//! Environment background: an equirectangular image behind the scene.

use crate::camera::PerspectiveCamera;
use crate::math::consts::{PI, TWO_PI};
use crate::math::{Mat4, Vec2, Vec3, Vec4};
use crate::scene::Environment;
use bytemuck::{Pod, Zeroable};

/// Uniform block of the background pass.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct BackgroundUniform {
    /// Maps NDC to world directions (camera rotation only).
    pub inv_view_proj: [[f32; 4]; 4],
    /// Blur radius factor, 0 = sharp.
    pub blur: f32,
    /// Color multiplier.
    pub intensity: f32,
    /// Padding.
    pub _padding: [f32; 2],
}

impl BackgroundUniform {
    /// Pack the environment settings for a camera.
    pub fn new(camera: &PerspectiveCamera, environment: &Environment) -> Self {
        let view = Mat4::from_quat(camera.rotation()).inverse();
        Self {
            inv_view_proj: (camera.projection_matrix() * view).inverse().to_cols_array_2d(),
            blur: environment.blur,
            intensity: environment.intensity,
            _padding: [0.0; 2],
        }
    }

    /// World direction seen through an NDC position.
    pub fn view_direction(&self, ndc: Vec2) -> Vec3 {
        let far = Mat4::from_cols_array_2d(&self.inv_view_proj) * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        (far.truncate() / far.w).normalize_or_zero()
    }
}

/// Texture coordinates of a world direction in an equirectangular image
/// whose first row is straight up.
pub fn equirect_uv(direction: Vec3) -> Vec2 {
    let d = direction.normalize_or(Vec3::NEG_Z);
    Vec2::new(
        d.z.atan2(d.x) / TWO_PI + 0.5,
        0.5 - d.y.clamp(-1.0, 1.0).asin() / PI,
    )
}

/// Fullscreen pipeline that draws the environment first in the scene pass.
pub struct BackgroundPipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl BackgroundPipeline {
    const SHADER_SOURCE: &'static str = include_str!("../shaders/background.wgsl");

    /// Build the render pipeline. It neither tests nor writes depth.
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat, depth_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Background Shader"),
            source: wgpu::ShaderSource::Wgsl(Self::SHADER_SOURCE.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Background Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
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
            label: Some("Background Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Background Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: depth_format,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
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

    /// Bind the uniform buffer and the environment image.
    pub fn create_bind_group(
        &self,
        device: &wgpu::Device,
        uniform: &wgpu::Buffer,
        view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Background Bind Group"),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::ImageData;
    use approx::assert_abs_diff_eq;
    use std::sync::Arc;

    fn environment() -> Environment {
        Environment {
            image: Arc::new(ImageData::solid(10, 20, 30, 255)),
            blur: 0.5,
            intensity: 0.5,
        }
    }

    #[test]
    fn test_uniform_size_is_aligned() {
        assert_eq!(std::mem::size_of::<BackgroundUniform>() % 16, 0);
    }

    #[test]
    fn test_screen_center_looks_forward() {
        let mut camera = PerspectiveCamera::new(70.0, 1.5, 0.01, 100.0);
        camera.set_position(Vec3::new(0.0, 0.18, 0.25));
        camera.look_at(Vec3::new(0.0, 0.085, 0.0));
        let uniform = BackgroundUniform::new(&camera, &environment());
        assert!(uniform.view_direction(Vec2::ZERO).abs_diff_eq(camera.forward(), 1e-4));
        assert_eq!(uniform.blur, 0.5);
        assert_eq!(uniform.intensity, 0.5);
    }

    #[test]
    fn test_background_ignores_camera_position() {
        let mut near = PerspectiveCamera::default();
        near.set_position(Vec3::new(0.0, 0.1, 0.2));
        let far = PerspectiveCamera::default();
        let a = BackgroundUniform::new(&near, &environment());
        let b = BackgroundUniform::new(&far, &environment());
        assert!(a.view_direction(Vec2::new(0.5, -0.3)).abs_diff_eq(b.view_direction(Vec2::new(0.5, -0.3)), 1e-5));
    }

    #[test]
    fn test_equirect_rows_follow_elevation() {
        assert_abs_diff_eq!(equirect_uv(Vec3::Y).y, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(equirect_uv(Vec3::NEG_Y).y, 1.0, epsilon = 1e-6);
        let horizon = equirect_uv(Vec3::X);
        assert_abs_diff_eq!(horizon.y, 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(horizon.x, 0.5, epsilon = 1e-6);
    }
}
