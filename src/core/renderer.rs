//! wgpu frame target.
//!
//! [`Renderer`] owns the pipelines and every GPU copy of scene data.
//! [`Renderer::begin`] acquires the surface texture and returns a
//! [`RenderFrame`], which the compositor drives through [`FrameTarget`].
//! Clears are deferred and folded into the load ops of the next render pass,
//! so a frame is one command buffer with two passes. The scene pass draws the
//! environment background first, then opaque nodes, then translucent ones.

use super::{Context, RenderConfig};
use crate::camera::PerspectiveCamera;
use crate::geometry::{EffectQuad, EffectVertex, SurfaceVertex};
use crate::material::{
    projected_pattern, BackgroundPipeline, BackgroundUniform, ColdEffectPipeline, ColdEffectUniform, ModelUniform,
    SceneUniform, SurfacePipeline,
};
use crate::math::{Color, Vec3};
use crate::postprocessing::{ClearFlags, EffectLayer, FrameTarget, Layer};
use crate::scene::{NodeKey, NodeKind, SceneStore, Surface};
use crate::texture::Texture2D;
use slotmap::SecondaryMap;
use std::sync::Arc;
use wgpu::util::DeviceExt;

/// Render statistics.
#[derive(Debug, Clone, Default)]
pub struct RenderInfo {
    /// Number of draw calls this frame.
    pub draw_calls: u32,
    /// Number of triangles rendered this frame.
    pub triangles: u32,
    /// Number of points rendered this frame.
    pub points: u32,
    /// Frames presented.
    pub frame: u64,
    /// Shadow refreshes consumed since startup.
    pub shadow_refreshes: u64,
}

impl RenderInfo {
    /// Reset the per-frame counters.
    pub fn reset(&mut self) {
        self.draw_calls = 0;
        self.triangles = 0;
        self.points = 0;
    }
}

/// Load operations for the next pass given the pending clears.
pub(crate) fn load_ops(pending: ClearFlags, clear_color: Color) -> (wgpu::LoadOp<wgpu::Color>, wgpu::LoadOp<f32>) {
    let color = if pending.contains(ClearFlags::COLOR) {
        wgpu::LoadOp::Clear(clear_color.to_wgpu())
    } else {
        wgpu::LoadOp::Load
    };
    let depth = if pending.contains(ClearFlags::DEPTH) {
        wgpu::LoadOp::Clear(1.0)
    } else {
        wgpu::LoadOp::Load
    };
    (color, depth)
}

fn begin_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    label: &str,
    color_view: &wgpu::TextureView,
    depth_view: &wgpu::TextureView,
    pending: ClearFlags,
    clear_color: Color,
) -> wgpu::RenderPass<'e> {
    let (color_load, depth_load) = load_ops(pending, clear_color);
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: color_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: color_load,
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: depth_view,
            depth_ops: Some(wgpu::Operations {
                load: depth_load,
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
    })
}

/// GPU copy of one scene node.
struct NodeBuffers {
    /// Identity of the CPU data the buffers were built from.
    source: usize,
    vertex_buffer: wgpu::Buffer,
    index_buffer: Option<wgpu::Buffer>,
    element_count: u32,
    topology: wgpu::PrimitiveTopology,
    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
}

/// An uploaded image and the bind group sampling it.
struct BoundImage {
    /// Identity of the CPU image.
    source: usize,
    _texture: Texture2D,
    bind_group: wgpu::BindGroup,
}

/// GPU copy of the overlay.
struct EffectBuffers {
    vertex_buffer: wgpu::Buffer,
    uploaded: Option<[Vec3; 6]>,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    /// Material texture version the bind group was built for; `None` while
    /// the placeholder is bound.
    texture_version: Option<u32>,
    snow: Option<Texture2D>,
}

/// The wgpu renderer.
pub struct Renderer {
    clear_color: Color,
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    surface_pipeline: SurfacePipeline,
    effect_pipeline: ColdEffectPipeline,
    background_pipeline: BackgroundPipeline,
    scene_buffer: wgpu::Buffer,
    /// Scene uniform plus the light pattern (or the placeholder).
    scene_bind_group: wgpu::BindGroup,
    pattern: Option<(usize, Texture2D)>,
    background_buffer: wgpu::Buffer,
    environment: Option<BoundImage>,
    nodes: SecondaryMap<NodeKey, NodeBuffers>,
    /// Bound wherever an optional image has not arrived.
    placeholder: Texture2D,
    effect: EffectBuffers,
    info: RenderInfo,
}

impl Renderer {
    /// Create pipelines and frame resources.
    pub fn new(ctx: &Context, config: &RenderConfig) -> Self {
        let device = &ctx.device;
        let depth_texture = ctx.create_depth_texture();
        let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let surface_pipeline = SurfacePipeline::new(device, ctx.surface_format, ctx.depth_format);
        let effect_pipeline = ColdEffectPipeline::new(device, ctx.surface_format, ctx.depth_format);
        let background_pipeline = BackgroundPipeline::new(device, ctx.surface_format, ctx.depth_format);

        let scene_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Uniform Buffer"),
            size: std::mem::size_of::<SceneUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let placeholder = Texture2D::white(device, &ctx.queue);
        let scene_bind_group =
            surface_pipeline.create_scene_bind_group(device, &scene_buffer, placeholder.view(), placeholder.sampler());
        let background_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Background Uniform Buffer"),
            size: std::mem::size_of::<BackgroundUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Effect Quad Vertex Buffer"),
            size: (std::mem::size_of::<EffectVertex>() * EffectQuad::VERTEX_COUNT as usize)
                as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Effect Uniform Buffer"),
            size: std::mem::size_of::<ColdEffectUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group =
            effect_pipeline.create_bind_group(device, &uniform_buffer, placeholder.view(), placeholder.sampler());

        Self {
            clear_color: config.clear_color(),
            depth_texture,
            depth_view,
            surface_pipeline,
            effect_pipeline,
            background_pipeline,
            scene_buffer,
            scene_bind_group,
            pattern: None,
            background_buffer,
            environment: None,
            nodes: SecondaryMap::new(),
            placeholder,
            effect: EffectBuffers {
                vertex_buffer,
                uploaded: None,
                uniform_buffer,
                bind_group,
                texture_version: None,
                snow: None,
            },
            info: RenderInfo::default(),
        }
    }

    /// Get render info.
    #[inline]
    pub fn info(&self) -> &RenderInfo {
        &self.info
    }

    /// Set the clear color.
    #[inline]
    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    /// Recreate the depth buffer after the context was resized.
    pub fn resize(&mut self, ctx: &Context) {
        self.depth_texture = ctx.create_depth_texture();
        self.depth_view = self.depth_texture.create_view(&wgpu::TextureViewDescriptor::default());
    }

    /// Acquire the next surface texture and start a frame.
    pub fn begin<'a>(&'a mut self, ctx: &'a Context) -> Result<RenderFrame<'a>, wgpu::SurfaceError> {
        let output = ctx.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.info.reset();
        Ok(RenderFrame {
            encoder: ctx.create_command_encoder(),
            renderer: self,
            ctx,
            output,
            view,
            pending: ClearFlags::empty(),
        })
    }

    fn sync_nodes(&mut self, ctx: &Context, store: &SceneStore) {
        for (key, node) in store.iter() {
            let (source, surface) = match &node.kind {
                NodeKind::Mesh(mesh) => (Arc::as_ptr(&mesh.mesh) as usize, mesh.surface.clone()),
                NodeKind::Points(cloud) => (cloud.positions.as_ptr() as usize, Surface::opaque(0xffffff)),
                NodeKind::Group | NodeKind::Light(_) => continue,
            };
            let stale = self.nodes.get(key).map_or(true, |buffers| buffers.source != source);
            if stale {
                if let Some(buffers) = self.build_node(ctx, &node.kind, source, &node.name) {
                    self.nodes.insert(key, buffers);
                }
            }
            if let Some(buffers) = self.nodes.get(key) {
                let uniform = ModelUniform::new(node.transform.compose(), &surface);
                ctx.queue.write_buffer(&buffers.model_buffer, 0, bytemuck::bytes_of(&uniform));
            }
        }
    }

    fn sync_pattern(&mut self, ctx: &Context, store: &SceneStore) {
        let image = projected_pattern(store);
        let source = image.map(|image| Arc::as_ptr(image) as usize);
        if source == self.pattern.as_ref().map(|(source, _)| *source) {
            return;
        }
        self.pattern = image
            .zip(source)
            .map(|(image, source)| (source, Texture2D::upload(&ctx.device, &ctx.queue, image, Some("Light Pattern"))));
        let bound = self.pattern.as_ref().map_or(&self.placeholder, |(_, texture)| texture);
        self.scene_bind_group =
            self.surface_pipeline
                .create_scene_bind_group(&ctx.device, &self.scene_buffer, bound.view(), bound.sampler());
        log::debug!("light pattern {}", if self.pattern.is_some() { "bound" } else { "cleared" });
    }

    fn sync_environment(&mut self, ctx: &Context, store: &SceneStore, camera: &PerspectiveCamera) {
        let Some(environment) = store.environment() else {
            self.environment = None;
            return;
        };
        let source = Arc::as_ptr(&environment.image) as usize;
        if self.environment.as_ref().map(|bound| bound.source) != Some(source) {
            let texture = Texture2D::upload(&ctx.device, &ctx.queue, &environment.image, Some("Environment"));
            let bind_group =
                self.background_pipeline
                    .create_bind_group(&ctx.device, &self.background_buffer, texture.view(), texture.sampler());
            log::debug!("environment uploaded ({}x{})", texture.width(), texture.height());
            self.environment = Some(BoundImage {
                source,
                _texture: texture,
                bind_group,
            });
        }
        let uniform = BackgroundUniform::new(camera, environment);
        ctx.queue.write_buffer(&self.background_buffer, 0, bytemuck::bytes_of(&uniform));
    }

    fn build_node(&self, ctx: &Context, kind: &NodeKind, source: usize, name: &str) -> Option<NodeBuffers> {
        let device = &ctx.device;
        let (vertices, indices, topology) = match kind {
            NodeKind::Mesh(mesh) => (
                mesh.mesh.surface_vertices(),
                mesh.mesh.indices.clone(),
                wgpu::PrimitiveTopology::TriangleList,
            ),
            NodeKind::Points(cloud) => (
                cloud
                    .positions
                    .iter()
                    .map(|p| SurfaceVertex::new(p.to_array(), Vec3::Y.to_array()))
                    .collect(),
                Vec::new(),
                wgpu::PrimitiveTopology::PointList,
            ),
            NodeKind::Group | NodeKind::Light(_) => return None,
        };
        if vertices.is_empty() {
            log::debug!("node '{}' has no vertices, not uploaded", name);
            return None;
        }

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(name),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = (!indices.is_empty()).then(|| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(name),
                contents: bytemuck::cast_slice(&indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        });
        let element_count = if indices.is_empty() { vertices.len() } else { indices.len() } as u32;
        let model_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Model Uniform Buffer"),
            size: std::mem::size_of::<ModelUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let model_bind_group = self.surface_pipeline.create_model_bind_group(device, &model_buffer);
        log::debug!("uploaded node '{}' ({} elements)", name, element_count);

        Some(NodeBuffers {
            source,
            vertex_buffer,
            index_buffer,
            element_count,
            topology,
            model_buffer,
            model_bind_group,
        })
    }

    fn sync_effect(&mut self, ctx: &Context, effect: &EffectLayer, camera: &PerspectiveCamera) {
        let gpu = &mut self.effect;
        if effect.quad.needs_update() || gpu.uploaded.as_ref() != Some(effect.quad.positions()) {
            ctx.queue
                .write_buffer(&gpu.vertex_buffer, 0, bytemuck::cast_slice(&effect.quad.vertices()));
            gpu.uploaded = Some(*effect.quad.positions());
        }

        let material = &effect.material;
        if let Some(image) = material.snow_texture() {
            if gpu.texture_version != Some(material.texture_version()) {
                let texture = Texture2D::upload(&ctx.device, &ctx.queue, image, Some("Snow Texture"));
                gpu.bind_group = self.effect_pipeline.create_bind_group(
                    &ctx.device,
                    &gpu.uniform_buffer,
                    texture.view(),
                    texture.sampler(),
                );
                gpu.snow = Some(texture);
                gpu.texture_version = Some(material.texture_version());
            }
        }

        let uniform = material.uniform(camera.view_projection_matrix().to_cols_array_2d());
        ctx.queue.write_buffer(&gpu.uniform_buffer, 0, bytemuck::bytes_of(&uniform));
    }
}

/// One frame in flight. Dropping it without [`RenderFrame::present`]
/// discards the recorded work.
pub struct RenderFrame<'a> {
    renderer: &'a mut Renderer,
    ctx: &'a Context,
    output: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
    pending: ClearFlags,
}

impl RenderFrame<'_> {
    fn draw_scene(&mut self, store: &SceneStore, camera: &PerspectiveCamera) {
        if store.shadow_needs_update() {
            self.renderer.info.shadow_refreshes += 1;
            log::debug!("shadow refresh consumed");
        }
        let uniform = SceneUniform::gather(store, camera);
        self.ctx
            .queue
            .write_buffer(&self.renderer.scene_buffer, 0, bytemuck::bytes_of(&uniform));
        self.renderer.sync_nodes(self.ctx, store);
        self.renderer.sync_pattern(self.ctx, store);
        self.renderer.sync_environment(self.ctx, store, camera);

        let pending = std::mem::replace(&mut self.pending, ClearFlags::empty());
        let renderer = &*self.renderer;
        let (mut draw_calls, mut triangles, mut points) = (0, 0, 0);
        {
            let mut pass = begin_pass(
                &mut self.encoder,
                "Scene Pass",
                &self.view,
                &renderer.depth_view,
                pending,
                renderer.clear_color,
            );
            if let Some(environment) = &renderer.environment {
                pass.set_pipeline(renderer.background_pipeline.pipeline());
                pass.set_bind_group(0, &environment.bind_group, &[]);
                pass.draw(0..3, 0..1);
                draw_calls += 1;
            }
            pass.set_bind_group(0, &renderer.scene_bind_group, &[]);
            for (key, node) in store.draw_order() {
                let Some(buffers) = renderer.nodes.get(key) else { continue };
                let surface = &renderer.surface_pipeline;
                match buffers.topology {
                    wgpu::PrimitiveTopology::PointList => {
                        pass.set_pipeline(surface.points());
                        points += buffers.element_count;
                    }
                    _ if node.is_translucent() => {
                        pass.set_pipeline(surface.translucent());
                        triangles += buffers.element_count / 3;
                    }
                    _ => {
                        pass.set_pipeline(surface.triangles());
                        triangles += buffers.element_count / 3;
                    }
                }
                pass.set_bind_group(1, &buffers.model_bind_group, &[]);
                pass.set_vertex_buffer(0, buffers.vertex_buffer.slice(..));
                match &buffers.index_buffer {
                    Some(index_buffer) => {
                        pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                        pass.draw_indexed(0..buffers.element_count, 0, 0..1);
                    }
                    None => pass.draw(0..buffers.element_count, 0..1),
                }
                draw_calls += 1;
            }
        }
        let info = &mut self.renderer.info;
        info.draw_calls += draw_calls;
        info.triangles += triangles;
        info.points += points;
    }

    fn draw_effect(&mut self, effect: &EffectLayer, camera: &PerspectiveCamera) {
        self.renderer.sync_effect(self.ctx, effect, camera);
        if !effect.is_visible() {
            // clears stay pending for the next pass or present
            return;
        }

        let pending = std::mem::replace(&mut self.pending, ClearFlags::empty());
        let renderer = &*self.renderer;
        {
            let mut pass = begin_pass(
                &mut self.encoder,
                "Effect Pass",
                &self.view,
                &renderer.depth_view,
                pending,
                renderer.clear_color,
            );
            pass.set_pipeline(renderer.effect_pipeline.pipeline());
            pass.set_bind_group(0, &renderer.effect.bind_group, &[]);
            pass.set_vertex_buffer(0, renderer.effect.vertex_buffer.slice(..));
            pass.draw(0..EffectQuad::VERTEX_COUNT, 0..1);
        }
        self.renderer.info.draw_calls += 1;
        self.renderer.info.triangles += 2;
    }

    /// Submit the recorded passes and present.
    pub fn present(mut self) {
        if !self.pending.is_empty() {
            let renderer = &*self.renderer;
            begin_pass(
                &mut self.encoder,
                "Clear Pass",
                &self.view,
                &renderer.depth_view,
                self.pending,
                renderer.clear_color,
            );
        }
        self.ctx.queue.submit(std::iter::once(self.encoder.finish()));
        self.output.present();
        self.renderer.info.frame += 1;
    }
}

impl FrameTarget for RenderFrame<'_> {
    fn clear(&mut self, flags: ClearFlags) {
        self.pending |= flags;
    }

    fn draw(&mut self, layer: Layer<'_>, camera: &PerspectiveCamera) {
        match layer {
            Layer::Scene(store) => self.draw_scene(store, camera),
            Layer::Effect(effect) => self.draw_effect(effect, camera),
        }
    }
}
