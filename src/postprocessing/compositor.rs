//! Two-pass frame composition: the scene, then the overlay on top.

use super::EffectLayer;
use crate::camera::PerspectiveCamera;
use crate::scene::SceneStore;
use bitflags::bitflags;

bitflags! {
    /// Buffers to clear.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u8 {
        /// Color buffer.
        const COLOR = 1 << 0;
        /// Depth buffer.
        const DEPTH = 1 << 1;
    }
}

/// Content of one draw.
#[derive(Debug, Clone, Copy)]
pub enum Layer<'a> {
    /// The main scene.
    Scene(&'a SceneStore),
    /// The overlay quad.
    Effect(&'a EffectLayer),
}

/// A color + depth target the compositor draws into.
///
/// Implementations must not clear on their own: buffers are cleared exactly
/// when [`FrameTarget::clear`] is called.
pub trait FrameTarget {
    /// Clear the given buffers.
    fn clear(&mut self, flags: ClearFlags);

    /// Draw a layer from a camera, depth tested against the current depth
    /// buffer.
    fn draw(&mut self, layer: Layer<'_>, camera: &PerspectiveCamera);
}

/// Issues the fixed clear/draw sequence for one frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct DualPassCompositor;

impl DualPassCompositor {
    /// Render the scene, then the overlay with fresh depth so nothing in the
    /// scene can occlude it.
    pub fn render_frame<T: FrameTarget + ?Sized>(
        &self,
        target: &mut T,
        scene: &SceneStore,
        scene_camera: &PerspectiveCamera,
        effect: &EffectLayer,
        effect_camera: &PerspectiveCamera,
    ) {
        target.clear(ClearFlags::COLOR | ClearFlags::DEPTH);
        target.draw(Layer::Scene(scene), scene_camera);
        target.clear(ClearFlags::DEPTH);
        target.draw(Layer::Effect(effect), effect_camera);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Op {
        Clear(ClearFlags),
        Scene,
        Effect,
    }

    #[derive(Default)]
    struct Recorder(Vec<Op>);

    impl FrameTarget for Recorder {
        fn clear(&mut self, flags: ClearFlags) {
            self.0.push(Op::Clear(flags));
        }

        fn draw(&mut self, layer: Layer<'_>, _camera: &PerspectiveCamera) {
            self.0.push(match layer {
                Layer::Scene(_) => Op::Scene,
                Layer::Effect(_) => Op::Effect,
            });
        }
    }

    #[test]
    fn test_sequence_is_fixed() {
        let mut target = Recorder::default();
        let camera = PerspectiveCamera::default();
        DualPassCompositor.render_frame(&mut target, &SceneStore::new(), &camera, &EffectLayer::default(), &camera);
        assert_eq!(
            target.0,
            vec![
                Op::Clear(ClearFlags::COLOR | ClearFlags::DEPTH),
                Op::Scene,
                Op::Clear(ClearFlags::DEPTH),
                Op::Effect,
            ]
        );
    }

    /// Single-pixel target: the scene writes depth 0 (as near as possible),
    /// the overlay arrives just behind it.
    #[derive(Default)]
    struct Pixel {
        color: Option<&'static str>,
        depth: f32,
    }

    impl FrameTarget for Pixel {
        fn clear(&mut self, flags: ClearFlags) {
            if flags.contains(ClearFlags::COLOR) {
                self.color = None;
            }
            if flags.contains(ClearFlags::DEPTH) {
                self.depth = 1.0;
            }
        }

        fn draw(&mut self, layer: Layer<'_>, _camera: &PerspectiveCamera) {
            let (color, depth) = match layer {
                Layer::Scene(_) => ("scene", 0.0),
                Layer::Effect(_) => ("effect", 1e-4),
            };
            if depth < self.depth {
                self.color = Some(color);
                self.depth = depth;
            }
        }
    }

    #[test]
    fn test_overlay_not_occluded_by_scene_depth() {
        let mut pixel = Pixel::default();
        let camera = PerspectiveCamera::default();
        DualPassCompositor.render_frame(&mut pixel, &SceneStore::new(), &camera, &EffectLayer::default(), &camera);
        assert_eq!(pixel.color, Some("effect"));
    }
}
