//! Full `SnowGlobe` frame loop against a software depth-buffer target.

use approx::assert_abs_diff_eq;
use snowglobe::camera::PerspectiveCamera;
use snowglobe::config::GlobeConfig;
use snowglobe::math::{Mat4, Vec3};
use snowglobe::postprocessing::{ClearFlags, FrameTarget, Layer};
use snowglobe::runtime::SnowGlobe;
use snowglobe::scene::{NodeKind, SnowGlobeAssembly, GLOBE_CENTER};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Fragment {
    Background,
    Scene,
    Effect,
}

/// Tiny rasterizer: scene nodes are splatted per vertex, the overlay quad is
/// rasterized per triangle. Depth uses the wgpu [0, 1] range.
struct SoftwareTarget {
    width: usize,
    height: usize,
    color: Vec<Fragment>,
    depth: Vec<f32>,
    scene_fragments: usize,
}

impl SoftwareTarget {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            color: vec![Fragment::Background; width * height],
            depth: vec![1.0; width * height],
            scene_fragments: 0,
        }
    }

    fn project(view_proj: Mat4, p: Vec3) -> Option<Vec3> {
        let clip = view_proj * p.extend(1.0);
        (clip.w > 0.0).then(|| clip.truncate() / clip.w)
    }

    fn write(&mut self, x: usize, y: usize, z: f32, fragment: Fragment) -> bool {
        let i = y * self.width + x;
        if (0.0..=1.0).contains(&z) && z < self.depth[i] {
            self.depth[i] = z;
            self.color[i] = fragment;
            true
        } else {
            false
        }
    }

    fn pixel_of(&self, ndc: Vec3) -> Option<(usize, usize)> {
        if ndc.x.abs() > 1.0 || ndc.y.abs() > 1.0 {
            return None;
        }
        let x = (((ndc.x + 1.0) * 0.5 * self.width as f32) as usize).min(self.width - 1);
        let y = (((1.0 - ndc.y) * 0.5 * self.height as f32) as usize).min(self.height - 1);
        Some((x, y))
    }

    fn pixel_center(&self, x: usize, y: usize) -> (f32, f32) {
        (
            (x as f32 + 0.5) / self.width as f32 * 2.0 - 1.0,
            1.0 - (y as f32 + 0.5) / self.height as f32 * 2.0,
        )
    }

    fn rasterize(&mut self, tri: [Vec3; 3], fragment: Fragment) {
        let edge = |a: Vec3, b: Vec3, px: f32, py: f32| (b.x - a.x) * (py - a.y) - (b.y - a.y) * (px - a.x);
        let area = edge(tri[0], tri[1], tri[2].x, tri[2].y);
        if area.abs() < 1e-12 {
            return;
        }
        for y in 0..self.height {
            for x in 0..self.width {
                let (px, py) = self.pixel_center(x, y);
                let w0 = edge(tri[1], tri[2], px, py) / area;
                let w1 = edge(tri[2], tri[0], px, py) / area;
                let w2 = edge(tri[0], tri[1], px, py) / area;
                if w0 < -1e-6 || w1 < -1e-6 || w2 < -1e-6 {
                    continue;
                }
                let z = w0 * tri[0].z + w1 * tri[1].z + w2 * tri[2].z;
                self.write(x, y, z, fragment);
            }
        }
    }

    fn count(&self, fragment: Fragment) -> usize {
        self.color.iter().filter(|f| **f == fragment).count()
    }
}

impl FrameTarget for SoftwareTarget {
    fn clear(&mut self, flags: ClearFlags) {
        if flags.contains(ClearFlags::COLOR) {
            self.color.fill(Fragment::Background);
        }
        if flags.contains(ClearFlags::DEPTH) {
            self.depth.fill(1.0);
        }
    }

    fn draw(&mut self, layer: Layer<'_>, camera: &PerspectiveCamera) {
        let view_proj = camera.view_projection_matrix();
        match layer {
            Layer::Scene(store) => {
                for (_, node) in store.iter() {
                    let points: Vec<Vec3> = match &node.kind {
                        NodeKind::Mesh(mesh) => mesh.mesh.positions.iter().map(|p| Vec3::from_array(*p)).collect(),
                        NodeKind::Points(cloud) => cloud.positions.clone(),
                        _ => continue,
                    };
                    let model = node.transform.compose();
                    for p in points {
                        let Some(ndc) = Self::project(view_proj, model.transform_point3(p)) else { continue };
                        let Some((x, y)) = self.pixel_of(ndc) else { continue };
                        if self.write(x, y, ndc.z, Fragment::Scene) {
                            self.scene_fragments += 1;
                        }
                    }
                }
            }
            Layer::Effect(effect) => {
                if !effect.is_visible() {
                    return;
                }
                for tri in effect.quad.positions().chunks(3) {
                    let projected: Option<Vec<Vec3>> =
                        tri.iter().map(|p| Self::project(view_proj, *p)).collect();
                    if let Some(v) = projected {
                        self.rasterize([v[0], v[1], v[2]], Fragment::Effect);
                    }
                }
            }
        }
    }
}

fn globe(width: u32, height: u32) -> SnowGlobe {
    SnowGlobe::new(GlobeConfig::default(), SnowGlobeAssembly::new(7), width, height).unwrap()
}

/// Zoom far enough to end up inside the glass sphere.
fn dive_in(globe: &mut SnowGlobe) {
    globe.controls_mut().zoom(30.0);
}

#[test]
fn overlay_covers_every_pixel_once_inside() {
    let mut globe = globe(64, 48);
    dive_in(&mut globe);
    for i in 0..120 {
        globe.advance(i as f64 * 16.0);
    }
    let camera = globe.cameras().primary.position();
    assert!(camera.distance(GLOBE_CENTER) < globe.config().proximity.threshold);
    assert_abs_diff_eq!(globe.effect().material.opacity, 0.5);

    let mut target = SoftwareTarget::new(64, 48);
    globe.render(&mut target);
    assert!(target.scene_fragments > 0, "scene pass drew nothing");
    assert_eq!(target.count(Fragment::Effect), 64 * 48);
}

#[test]
fn overlay_invisible_from_outside() {
    let mut globe = globe(64, 48);
    for i in 0..60 {
        globe.advance(i as f64 * 16.0);
    }
    assert_eq!(globe.effect().material.opacity, 0.0);

    let mut target = SoftwareTarget::new(64, 48);
    globe.render(&mut target);
    assert_eq!(target.count(Fragment::Effect), 0);
    assert!(target.count(Fragment::Scene) > 0);
}

#[test]
fn opacity_ramps_and_returns_to_zero() {
    let mut globe = globe(100, 100);
    dive_in(&mut globe);
    for t in [0.0, 100.0, 200.0, 300.0] {
        globe.advance(t);
    }
    assert_abs_diff_eq!(globe.effect().material.opacity, 0.3, epsilon = 1e-5);

    globe.controls_mut().zoom(-30.0);
    let mut t = 300.0;
    for _ in 0..100 {
        t += 16.0;
        globe.advance(t);
    }
    assert!(globe.cameras().primary.position().distance(GLOBE_CENTER) > 0.11);
    assert_eq!(globe.effect().material.opacity, 0.0);
}

#[test]
fn slow_frames_shrink_the_surface_but_not_the_aspect() {
    let mut globe = globe(800, 600);
    assert_eq!(globe.take_surface_resize(), Some((800, 600)));

    globe.advance(0.0);
    assert_eq!(globe.take_surface_resize(), None);

    // one second after startup, a long frame
    globe.advance(1000.0);
    assert_abs_diff_eq!(globe.render_scale(), 0.9);
    assert_eq!(globe.take_surface_resize(), Some((720, 540)));

    // inside the cooldown of the resolution change
    globe.advance(1050.0);
    assert_abs_diff_eq!(globe.render_scale(), 0.9);
    assert_eq!(globe.take_surface_resize(), None);

    globe.advance(2100.0);
    assert_abs_diff_eq!(globe.render_scale(), 0.81, epsilon = 1e-5);
    let (w, h) = globe.take_surface_resize().unwrap();
    assert!((647..=648).contains(&w) && (485..=486).contains(&h), "{}x{}", w, h);

    assert_abs_diff_eq!(globe.cameras().primary.aspect, 800.0 / 600.0);
    assert_abs_diff_eq!(globe.effect().material.aspect_ratio, 800.0 / 600.0);
}

#[test]
fn window_resize_restarts_the_cooldown() {
    let mut globe = globe(800, 600);
    let mut t = 0.0;
    while t < 2000.0 {
        globe.advance(t);
        t += 16.0;
    }
    globe.resize(1024, 768);
    // a long frame right after the window resize is ignored
    globe.advance(t + 500.0);
    assert_eq!(globe.render_scale(), 1.0);

    // the same frame once the cooldown has passed is not
    globe.advance(t + 1600.0);
    assert!(globe.render_scale() < 1.0);
}

#[test]
fn backwards_timestamp_is_a_zero_delta() {
    let mut globe = globe(320, 240);
    globe.advance(1000.0);
    let frame = globe.advance(500.0);
    assert_eq!(frame.delta, 0.0);
}

#[test]
fn effect_quad_follows_window_aspect() {
    let mut globe = globe(800, 600);
    globe.resize(1200, 400);
    let mut target = SoftwareTarget::new(60, 20);
    dive_in(&mut globe);
    for i in 0..60 {
        globe.advance(i as f64 * 16.0);
    }
    globe.render(&mut target);
    assert_eq!(target.count(Fragment::Effect), 60 * 20);
}
