//! Web bindings for the snow globe.
//!
//! [`SnowGlobeApp::start`] drives frames from `requestAnimationFrame` and
//! follows window resizes. Asset bytes are fetched on the JS side and handed
//! over with [`SnowGlobeApp::provide_asset`], which stays callable while the
//! loop runs.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{window, HtmlCanvasElement};

use crate::config::GlobeConfig;
use crate::core::{init_logging, Context, LoggingConfig, Renderer};
use crate::loaders::{AssetKind, LoadError};
use crate::runtime::SnowGlobe;
use crate::scene::SnowGlobeAssembly;

/// Render statistics exposed to JavaScript.
#[wasm_bindgen]
pub struct RenderStats {
    /// Number of draw calls.
    pub draw_calls: u32,
    /// Number of triangles rendered.
    pub triangles: u32,
    /// Current frame number.
    pub frame: u64,
    /// Current render scale.
    pub render_scale: f32,
}

struct AppState {
    canvas: HtmlCanvasElement,
    ctx: Context,
    renderer: Renderer,
    globe: SnowGlobe,
}

impl AppState {
    /// Canvas size in CSS pixels.
    fn logical_size(&self) -> (u32, u32) {
        (
            self.canvas.client_width().max(1) as u32,
            self.canvas.client_height().max(1) as u32,
        )
    }

    fn frame(&mut self, timestamp_ms: f64) -> Result<(), JsValue> {
        self.globe.advance(timestamp_ms);

        if let Some((width, height)) = self.globe.take_surface_resize() {
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            self.ctx.resize(width, height);
            self.renderer.resize(&self.ctx);
        }

        let mut frame = match self.renderer.begin(&self.ctx) {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost, reconfiguring");
                self.ctx.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("surface timeout, frame skipped");
                return Ok(());
            }
            Err(err) => return Err(to_js(err)),
        };
        self.globe.render(&mut frame);
        frame.present();
        Ok(())
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn request_frame(callback: &FrameCallback) {
    let Some(window) = window() else { return };
    if let Some(closure) = callback.borrow().as_ref() {
        if let Err(err) = window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            log::error!("requestAnimationFrame failed: {:?}", err);
        }
    }
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn asset_kind(name: &str) -> Result<AssetKind, JsValue> {
    AssetKind::from_name(name).ok_or_else(|| JsValue::from_str(&format!("Unknown asset '{}'", name)))
}

/// The snow globe attached to a canvas element.
#[wasm_bindgen]
pub struct SnowGlobeApp {
    state: Rc<RefCell<AppState>>,
}

#[wasm_bindgen]
impl SnowGlobeApp {
    /// Create the app on a canvas. `config_toml` overrides the defaults.
    #[wasm_bindgen]
    pub async fn new(canvas_id: &str, config_toml: Option<String>) -> Result<SnowGlobeApp, JsValue> {
        init_logging(LoggingConfig::default());

        let window = window().ok_or_else(|| JsValue::from_str("No window object"))?;
        let document = window.document().ok_or_else(|| JsValue::from_str("No document"))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("Canvas '{}' not found", canvas_id)))?
            .dyn_into()
            .map_err(|_| JsValue::from_str("Element is not a canvas"))?;

        let config = match config_toml {
            Some(text) => GlobeConfig::from_toml_str(&text).map_err(to_js)?,
            None => GlobeConfig::default(),
        };

        let width = canvas.client_width().max(1) as u32;
        let height = canvas.client_height().max(1) as u32;
        let mut globe = SnowGlobe::new(config, SnowGlobeAssembly::default(), width, height).map_err(to_js)?;

        let (physical_width, physical_height) = globe.size().physical();
        canvas.set_width(physical_width);
        canvas.set_height(physical_height);

        let ctx = Context::new(
            wgpu::SurfaceTarget::Canvas(canvas.clone()),
            physical_width,
            physical_height,
            &globe.config().render,
        )
        .await
        .map_err(to_js)?;
        let renderer = Renderer::new(&ctx, &globe.config().render);
        // the context was created at this size already
        globe.take_surface_resize();

        Ok(SnowGlobeApp {
            state: Rc::new(RefCell::new(AppState {
                canvas,
                ctx,
                renderer,
                globe,
            })),
        })
    }

    /// Start the animation loop and the window resize listener.
    #[wasm_bindgen]
    pub fn start(&self) -> Result<(), JsValue> {
        let window = window().ok_or_else(|| JsValue::from_str("No window object"))?;

        let on_resize = {
            let state = self.state.clone();
            Closure::wrap(Box::new(move || {
                let mut state = state.borrow_mut();
                let (width, height) = state.logical_size();
                state.globe.resize(width, height);
            }) as Box<dyn FnMut()>)
        };
        window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
        on_resize.forget();

        // the closure reschedules itself through its own slot
        let callback: FrameCallback = Rc::new(RefCell::new(None));
        let next = callback.clone();
        let state = self.state.clone();
        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
            if let Err(err) = state.borrow_mut().frame(timestamp) {
                log::error!("frame failed, stopping: {:?}", err);
                return;
            }
            request_frame(&next);
        }) as Box<dyn FnMut(f64)>));
        request_frame(&callback);
        Ok(())
    }

    /// Advance and draw a single frame, for hosts running their own loop.
    #[wasm_bindgen]
    pub fn frame(&self, timestamp_ms: f64) -> Result<(), JsValue> {
        self.state.borrow_mut().frame(timestamp_ms)
    }

    /// Handle a canvas resize, in CSS pixels.
    #[wasm_bindgen]
    pub fn resize(&self, width: u32, height: u32) {
        self.state.borrow_mut().globe.resize(width, height);
    }

    /// Hand over fetched asset bytes. `kind` is one of `environment`,
    /// `light_pattern`, `snow_texture` or `tree_mesh`.
    #[wasm_bindgen]
    pub fn provide_asset(&self, kind: &str, bytes: Vec<u8>) -> Result<(), JsValue> {
        let kind = asset_kind(kind)?;
        self.state.borrow_mut().globe.loader_mut().provide(kind, bytes);
        Ok(())
    }

    /// Report a failed fetch. The scene keeps rendering without the asset.
    #[wasm_bindgen]
    pub fn fail_asset(&self, kind: &str, message: &str) -> Result<(), JsValue> {
        let kind = asset_kind(kind)?;
        self.state
            .borrow_mut()
            .globe
            .loader_mut()
            .fail(kind, LoadError::InvalidData(message.to_string()));
        Ok(())
    }

    /// Relative path each asset is expected at.
    #[wasm_bindgen]
    pub fn asset_path(kind: &str) -> Result<String, JsValue> {
        Ok(asset_kind(kind)?.default_path().to_string())
    }

    /// Fraction of assets that are no longer pending.
    #[wasm_bindgen]
    pub fn load_progress(&self) -> f32 {
        self.state.borrow().globe.loader().fraction()
    }

    /// Handle pointer drag, in CSS pixels.
    #[wasm_bindgen]
    pub fn on_mouse_drag(&self, delta_x: f32, delta_y: f32) {
        let mut state = self.state.borrow_mut();
        let height = state.globe.size().logical_height as f32;
        state.globe.controls_mut().rotate_by_pixels(delta_x, delta_y, height);
    }

    /// Handle mouse wheel.
    #[wasm_bindgen]
    pub fn on_mouse_wheel(&self, delta: f32) {
        self.state.borrow_mut().globe.controls_mut().zoom(-delta.signum());
    }

    /// Get render statistics.
    #[wasm_bindgen]
    pub fn stats(&self) -> RenderStats {
        let state = self.state.borrow();
        let info = state.renderer.info();
        RenderStats {
            draw_calls: info.draw_calls,
            triangles: info.triangles,
            frame: info.frame,
            render_scale: state.globe.render_scale(),
        }
    }
}
