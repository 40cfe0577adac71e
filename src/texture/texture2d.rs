//! GPU-resident 2D texture.

use super::ImageData;
use wgpu::util::DeviceExt;

/// An uploaded image with its view and sampler.
pub struct Texture2D {
    /// Texture width.
    width: u32,
    /// Texture height.
    height: u32,
    /// Owns the GPU memory behind `view`.
    _texture: wgpu::Texture,
    /// Texture view.
    view: wgpu::TextureView,
    /// Sampler built from the image's settings.
    sampler: wgpu::Sampler,
}

impl Texture2D {
    /// Upload an image.
    /// `create_texture_with_data` handles row alignment.
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, image: &ImageData, label: Option<&str>) -> Self {
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label,
                size: wgpu::Extent3d {
                    width: image.width,
                    height: image.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &image.rgba,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = image.sampler.create(device);

        Self {
            width: image.width,
            height: image.height,
            _texture: texture,
            view,
            sampler,
        }
    }

    /// Placeholder bound while an optional texture has not arrived.
    pub fn white(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::upload(device, queue, &ImageData::solid(255, 255, 255, 255), Some("White Texture"))
    }

    /// Get texture width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get texture height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the texture view.
    #[inline]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Get the sampler.
    #[inline]
    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }
}
