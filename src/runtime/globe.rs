//! The snow globe runtime: all per-frame state in one owning struct.

use super::{AdaptiveResolution, SurfaceSize};
use crate::camera::CameraRig;
use crate::config::{ConfigError, GlobeConfig};
use crate::controls::OrbitControls;
use crate::core::{FrameClock, FrameState};
use crate::light::flicker_intensity;
use crate::loaders::{AssetKind, AssetPayload, LoadingManager};
use crate::material::ColdEffectMaterial;
use crate::math::consts::HALF_PI;
use crate::math::{Color, Vec3};
use crate::particles::ParticleSpin;
use crate::postprocessing::{DualPassCompositor, EffectLayer, EffectQuadUpdater, FrameTarget, ProximityOpacity};
use crate::scene::{Environment, SceneAssembly, SceneHandles, SceneStore};

/// Background blurriness and intensity of the environment image.
const ENVIRONMENT_BLUR: f32 = 0.5;
const ENVIRONMENT_INTENSITY: f32 = 0.5;

/// Owns the scene, cameras and every controller of the frame loop.
///
/// The host calls [`SnowGlobe::resize`] on window size changes,
/// [`SnowGlobe::advance`] once per display refresh and then
/// [`SnowGlobe::render`]. Nothing here blocks or schedules frames.
pub struct SnowGlobe {
    config: GlobeConfig,
    clock: FrameClock,
    resolution: AdaptiveResolution,
    size: SurfaceSize,
    /// Physical size changed since the host last asked.
    surface_changed: bool,
    cameras: CameraRig,
    controls: OrbitControls,
    store: SceneStore,
    handles: SceneHandles,
    assembly: Box<dyn SceneAssembly>,
    effect: EffectLayer,
    quad_updater: EffectQuadUpdater,
    proximity: ProximityOpacity,
    spins: Vec<ParticleSpin>,
    loader: LoadingManager,
    compositor: DualPassCompositor,
}

impl SnowGlobe {
    /// Assemble the scene and size everything for a `width` x `height`
    /// window.
    pub fn new(
        mut config: GlobeConfig,
        mut assembly: impl SceneAssembly + 'static,
        width: u32,
        height: u32,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if config.render.auto_clear {
            log::warn!("render.auto_clear is ignored; frames clear explicitly");
            config.render.auto_clear = false;
        }

        let mut store = SceneStore::new();
        let handles = assembly.assemble(&mut store);
        let focus = store
            .get(handles.focus)
            .map(|node| node.transform.position)
            .unwrap_or(Vec3::ZERO);

        let size = SurfaceSize::new(width, height);
        let cameras = CameraRig::new(&config.camera, size.aspect());
        let controls = OrbitControls::from_config(&config.camera, focus);
        let rates = &config.animation.particle_spin_rates;
        if rates.len() < handles.particle_groups.len() {
            log::debug!(
                "{} particle groups but {} spin rates; extra groups stay still",
                handles.particle_groups.len(),
                rates.len()
            );
        }
        let spins = rates.iter().copied().map(ParticleSpin::new).collect();

        let mut globe = Self {
            resolution: AdaptiveResolution::new(config.resolution.clone()),
            clock: FrameClock::new(),
            size,
            surface_changed: true,
            cameras,
            controls,
            store,
            handles,
            assembly: Box::new(assembly),
            effect: EffectLayer::new(ColdEffectMaterial::new(Color::from_hex(config.effect.tint))),
            quad_updater: EffectQuadUpdater::new(config.effect.near_push_factor),
            proximity: ProximityOpacity::new(config.proximity.rate),
            spins,
            loader: LoadingManager::new(),
            compositor: DualPassCompositor,
            config,
        };
        globe.apply_logical_size(size.logical_width, size.logical_height);
        Ok(globe)
    }

    /// Handle a window resize. Everything derived from the window size is
    /// recomputed from scratch, so repeated calls with the same size are
    /// harmless. Zero-sized windows (minimized) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::debug!("ignoring resize to {}x{}", width, height);
            return;
        }
        self.apply_logical_size(width, height);
    }

    fn apply_logical_size(&mut self, width: u32, height: u32) {
        self.size = SurfaceSize {
            logical_width: width,
            logical_height: height,
            ..self.size
        };
        let aspect = self.size.aspect();
        self.cameras.set_aspect(aspect);
        self.effect.material.aspect_ratio = aspect;
        self.quad_updater.recompute(&mut self.effect.quad, &self.cameras.effect);
        self.clock.mark_resized();
        self.surface_changed = true;
        log::debug!("resized to {}x{} (physical {:?})", width, height, self.size.physical());
    }

    /// Run one frame of simulation for the host's animation timestamp
    /// (milliseconds, monotonic).
    pub fn advance(&mut self, timestamp_ms: f64) -> FrameState {
        let frame = self.clock.tick(timestamp_ms);

        if let Some(scale) = self.resolution.update(frame.delta, frame.time_since_resize()) {
            self.size = self.size.with_scale(scale);
            self.clock.mark_resized();
            self.surface_changed = true;
        }

        for (kind, payload) in self.loader.poll() {
            self.apply_asset(kind, payload);
        }

        self.controls.update(&mut self.cameras.primary, frame.delta);
        self.face_focus_to_camera();
        self.animate(frame.time as f32);

        let focus = self.focus_position();
        let proximity = &self.config.proximity;
        self.effect.material.opacity = self.proximity.update(
            frame.delta,
            self.cameras.primary.position(),
            focus,
            proximity.threshold,
            proximity.max_opacity,
        );

        self.clock.state()
    }

    /// Draw the current state.
    ///
    /// One-shot requests (quad upload, shadow refresh) are visible to the
    /// target during this call and consumed afterwards.
    pub fn render<T: FrameTarget + ?Sized>(&mut self, target: &mut T) {
        self.compositor.render_frame(
            target,
            &self.store,
            &self.cameras.primary,
            &self.effect,
            &self.cameras.effect,
        );
        self.effect.quad.clear_needs_update();
        if self.store.take_shadow_update() {
            log::debug!("shadow refresh handed to the renderer");
        }
    }

    /// Keep the same side of the glass sphere towards the viewer, so its
    /// low-detail back never shows.
    fn face_focus_to_camera(&mut self) {
        let eye = self.cameras.primary.position();
        if let Some(transform) = self.store.transform_mut(self.handles.focus) {
            transform.look_at(eye, Vec3::Y);
            transform.rotate_x(HALF_PI);
        }
    }

    fn animate(&mut self, time: f32) {
        let intensity = flicker_intensity(time, self.config.animation.flicker_base);
        if let Some(light) = self.store.light_mut(self.handles.flicker_light) {
            light.intensity = intensity;
        }
        for (key, spin) in self.handles.particle_groups.iter().zip(&self.spins) {
            if let Some(transform) = self.store.transform_mut(*key) {
                let angles = spin.angles_at(time);
                transform.set_rotation_euler(angles.x, angles.y, angles.z);
            }
        }
    }

    fn focus_position(&self) -> Vec3 {
        self.store
            .get(self.handles.focus)
            .map(|node| node.transform.position)
            .unwrap_or(self.controls.target)
    }

    fn apply_asset(&mut self, kind: AssetKind, payload: AssetPayload) {
        match (kind, payload) {
            (AssetKind::Environment, AssetPayload::Image(image)) => {
                self.store.set_environment(Environment {
                    image,
                    blur: ENVIRONMENT_BLUR,
                    intensity: ENVIRONMENT_INTENSITY,
                });
            }
            (AssetKind::LightPattern, AssetPayload::Image(image)) => {
                if let Some(light) = self.store.light_mut(self.handles.flicker_light) {
                    light.map = Some(image);
                }
            }
            (AssetKind::SnowTexture, AssetPayload::Image(image)) => {
                self.effect.material.set_snow_texture(image);
            }
            (AssetKind::TreeMesh, AssetPayload::Mesh(mesh)) => {
                if self.assembly.attach_mesh(&mut self.store, mesh) {
                    self.store.request_shadow_update();
                }
            }
            (kind, _) => log::warn!("{} arrived with an unexpected payload, ignored", kind),
        }
    }

    /// Start loading every asset from files under `root`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_assets_from(&mut self, root: impl AsRef<std::path::Path>) {
        let root = root.as_ref();
        for kind in AssetKind::ALL {
            self.loader.load_file(kind, root.join(kind.default_path()));
        }
    }

    /// Return the new physical size if it changed since the last call. The
    /// host must then reconfigure its surface.
    pub fn take_surface_resize(&mut self) -> Option<(u32, u32)> {
        std::mem::take(&mut self.surface_changed).then(|| self.size.physical())
    }

    /// Current output size.
    #[inline]
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Latest frame timing.
    #[inline]
    pub fn frame_state(&self) -> FrameState {
        self.clock.state()
    }

    /// Current render scale.
    #[inline]
    pub fn render_scale(&self) -> f32 {
        self.resolution.scale()
    }

    /// Runtime configuration.
    #[inline]
    pub fn config(&self) -> &GlobeConfig {
        &self.config
    }

    /// Primary and effect cameras.
    #[inline]
    pub fn cameras(&self) -> &CameraRig {
        &self.cameras
    }

    /// Orbit controls, for feeding pointer input.
    #[inline]
    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.controls
    }

    /// Scene nodes.
    #[inline]
    pub fn store(&self) -> &SceneStore {
        &self.store
    }

    /// Scene nodes, mutably (for backends consuming refresh flags).
    #[inline]
    pub fn store_mut(&mut self) -> &mut SceneStore {
        &mut self.store
    }

    /// Animated node handles.
    #[inline]
    pub fn handles(&self) -> &SceneHandles {
        &self.handles
    }

    /// Overlay quad and material.
    #[inline]
    pub fn effect(&self) -> &EffectLayer {
        &self.effect
    }

    /// Asset slots.
    #[inline]
    pub fn loader(&self) -> &LoadingManager {
        &self.loader
    }

    /// Asset slots, for hosts that fetch bytes themselves.
    #[inline]
    pub fn loader_mut(&mut self) -> &mut LoadingManager {
        &mut self.loader
    }
}
