//! Late and failed assets flowing through `SnowGlobe::advance`.

use snowglobe::camera::PerspectiveCamera;
use snowglobe::config::GlobeConfig;
use snowglobe::loaders::{AssetKind, LoadState};
use snowglobe::material::{BackgroundUniform, SceneUniform, NO_PATTERN};
use snowglobe::postprocessing::{ClearFlags, FrameTarget, Layer};
use snowglobe::runtime::SnowGlobe;
use snowglobe::scene::{NodeKind, SnowGlobeAssembly};
use std::io::Cursor;
use std::time::Duration;

fn png_bytes() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(8, 8, image::Rgba([240, 240, 255, 255]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png).unwrap();
    bytes
}

const TREE_OBJ: &[u8] = b"o tree\nv 0 0 0\nv 1 0 0\nv 0 1 0\nv 0 0 1\nf 1 2 3\nf 1 3 4\n";

/// Target that records whether the store still asked for a shadow refresh.
#[derive(Default)]
struct RefreshCounter {
    saw_refresh: bool,
}

impl FrameTarget for RefreshCounter {
    fn clear(&mut self, _flags: ClearFlags) {}

    fn draw(&mut self, layer: Layer<'_>, _camera: &PerspectiveCamera) {
        if let Layer::Scene(store) = layer {
            self.saw_refresh |= store.shadow_needs_update();
        }
    }
}

fn globe() -> SnowGlobe {
    SnowGlobe::new(GlobeConfig::default(), SnowGlobeAssembly::default(), 640, 480).unwrap()
}

fn flicker_map_loaded(globe: &SnowGlobe) -> bool {
    match &globe.store().get(globe.handles().flicker_light).unwrap().kind {
        NodeKind::Light(light) => light.map.is_some(),
        _ => false,
    }
}

#[test]
fn frames_run_with_no_assets_at_all() {
    let mut globe = globe();
    for i in 0..30 {
        globe.advance(i as f64 * 16.0);
    }
    assert!(globe.effect().material.snow_texture().is_none());
    assert!(globe.store().environment().is_none());
    assert!(!flicker_map_loaded(&globe));
}

#[test]
fn images_land_in_their_slots() {
    let mut globe = globe();
    globe.advance(0.0);
    globe.loader_mut().provide(AssetKind::SnowTexture, png_bytes());
    globe.loader_mut().provide(AssetKind::LightPattern, png_bytes());
    globe.loader_mut().provide(AssetKind::Environment, png_bytes());
    globe.advance(16.0);

    assert!(globe.effect().material.snow_texture().is_some());
    assert!(flicker_map_loaded(&globe));
    let environment = globe.store().environment().unwrap();
    assert_eq!(environment.blur, 0.5);
    assert_eq!(environment.intensity, 0.5);
    assert_eq!(globe.loader().fraction(), 1.0);

    // both images reach the shading inputs
    let camera = &globe.cameras().primary;
    assert_ne!(SceneUniform::gather(globe.store(), camera).pattern_slot, NO_PATTERN);
    let background = BackgroundUniform::new(camera, environment);
    assert_eq!(background.blur, 0.5);
    assert_eq!(background.intensity, 0.5);
}

#[test]
fn no_pattern_until_it_loads() {
    let mut globe = globe();
    globe.advance(0.0);
    let uniform = SceneUniform::gather(globe.store(), &globe.cameras().primary);
    assert_eq!(uniform.pattern_slot, NO_PATTERN);
}

#[test]
fn broken_snow_texture_stays_missing() {
    let mut globe = globe();
    globe.loader_mut().provide(AssetKind::SnowTexture, b"definitely not a png".to_vec());
    globe.advance(0.0);
    assert_eq!(globe.loader().state(AssetKind::SnowTexture), LoadState::Failed);

    // no retry, even with good bytes
    globe.loader_mut().provide(AssetKind::SnowTexture, png_bytes());
    globe.advance(16.0);
    assert!(globe.effect().material.snow_texture().is_none());
}

#[test]
fn tree_mesh_adds_trees_and_refreshes_shadows() {
    let mut globe = globe();
    globe.advance(0.0);
    // the refresh requested by assembly is consumed by the first render
    globe.render(&mut RefreshCounter::default());
    assert!(!globe.store().shadow_needs_update());

    let before = globe.store().len();
    globe.loader_mut().provide(AssetKind::TreeMesh, TREE_OBJ.to_vec());
    globe.advance(16.0);
    assert_eq!(globe.store().len(), before + 8);
    assert!(globe.store().shadow_needs_update());

    let mut target = RefreshCounter::default();
    globe.render(&mut target);
    assert!(target.saw_refresh);
    assert!(!globe.store().shadow_needs_update());
}

#[test]
fn missing_files_fail_without_stalling_frames() {
    let mut globe = globe();
    globe.load_assets_from("/nonexistent/snowglobe-assets");
    let mut t = 0.0;
    for _ in 0..200 {
        globe.advance(t);
        t += 16.0;
        if globe.loader().pending() == 0 {
            break;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    for kind in AssetKind::ALL {
        assert_eq!(globe.loader().state(kind), LoadState::Failed, "{}", kind);
    }
    assert!(globe.effect().material.snow_texture().is_none());
}
