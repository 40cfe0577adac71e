//! Texture sampler configuration.

/// Texture addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    /// Clamp to edge pixel.
    #[default]
    ClampToEdge,
    /// Repeat the texture.
    Repeat,
}

impl From<WrapMode> for wgpu::AddressMode {
    fn from(mode: WrapMode) -> Self {
        match mode {
            WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
            WrapMode::Repeat => wgpu::AddressMode::Repeat,
        }
    }
}

/// Texture filtering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// Nearest neighbor (pixelated).
    Nearest,
    /// Linear interpolation (smooth).
    #[default]
    Linear,
}

impl From<FilterMode> for wgpu::FilterMode {
    fn from(mode: FilterMode) -> Self {
        match mode {
            FilterMode::Nearest => wgpu::FilterMode::Nearest,
            FilterMode::Linear => wgpu::FilterMode::Linear,
        }
    }
}

/// Sampling state shared by both texture axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SamplerSettings {
    /// Wrap mode for U and V.
    pub wrap: WrapMode,
    /// Magnification and minification filter.
    pub filter: FilterMode,
}

impl SamplerSettings {
    /// Repeating, linearly filtered sampling used for tiled overlays.
    pub fn repeating() -> Self {
        Self {
            wrap: WrapMode::Repeat,
            filter: FilterMode::Linear,
        }
    }

    /// Create the GPU sampler.
    pub fn create(&self, device: &wgpu::Device) -> wgpu::Sampler {
        device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Texture Sampler"),
            address_mode_u: self.wrap.into(),
            address_mode_v: self.wrap.into(),
            address_mode_w: self.wrap.into(),
            mag_filter: self.filter.into(),
            min_filter: self.filter.into(),
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        })
    }
}
