//! Adaptive render resolution.
//!
//! A single slow frame drops the render scale immediately; raising it again
//! needs a full window of fast frames. The asymmetry keeps the scale from
//! oscillating around the budget.

use crate::config::ResolutionConfig;
use crate::math::clamp;

/// Feedback controller mapping frame deltas to a render scale.
#[derive(Debug, Clone)]
pub struct AdaptiveResolution {
    config: ResolutionConfig,
    /// Current scale, always within `[min_scale, target_scale]`.
    scale: f32,
    /// Frames seen in the current window.
    steps_in_window: u32,
    /// Good frames seen in the current window.
    good_frames: u32,
}

impl Default for AdaptiveResolution {
    fn default() -> Self {
        Self::new(ResolutionConfig::default())
    }
}

impl AdaptiveResolution {
    /// Create a controller starting at the target scale.
    pub fn new(config: ResolutionConfig) -> Self {
        let scale = config.target_scale;
        Self {
            config,
            scale,
            steps_in_window: 0,
            good_frames: 0,
        }
    }

    /// Create a controller starting at an arbitrary scale (clamped).
    pub fn with_scale(config: ResolutionConfig, scale: f32) -> Self {
        let mut controller = Self::new(config);
        controller.scale = controller.clamp_scale(scale);
        controller
    }

    /// Current render scale.
    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Frames counted in the current window.
    #[inline]
    pub fn steps_in_window(&self) -> u32 {
        self.steps_in_window
    }

    /// Good frames counted in the current window.
    #[inline]
    pub fn good_frames(&self) -> u32 {
        self.good_frames
    }

    fn clamp_scale(&self, scale: f32) -> f32 {
        clamp(scale, self.config.min_scale, self.config.target_scale)
    }

    /// Feed one frame.
    ///
    /// `time_since_resize` is the time since the output surface last changed
    /// size, for any reason. Returns the new scale when it changed; the caller
    /// must then resize the output surface.
    pub fn update(&mut self, delta: f32, time_since_resize: f32) -> Option<f32> {
        let previous = self.scale;
        let cfg = &self.config;

        if delta > cfg.bad_frame_time && time_since_resize >= cfg.resize_cooldown {
            self.scale = clamp(
                self.scale * cfg.step_down_factor,
                cfg.min_scale,
                cfg.target_scale,
            );
            if self.scale < previous {
                log::info!(
                    "frame took {:.1}ms, render scale {:.3} -> {:.3}",
                    delta * 1000.0,
                    previous,
                    self.scale
                );
            }
        } else if delta < cfg.good_frame_time {
            self.good_frames += 1;
        }
        self.steps_in_window += 1;

        if self.steps_in_window >= self.config.window_frames {
            if self.good_frames >= self.config.window_frames && self.scale < self.config.target_scale {
                self.scale = self.clamp_scale(self.scale + self.config.step_up);
                log::debug!("stable frame times, render scale -> {:.3}", self.scale);
            }
            self.steps_in_window = 0;
            self.good_frames = 0;
        }

        (self.scale != previous).then_some(self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const GOOD: f32 = 1.0 / 120.0;
    const BAD: f32 = 1.0 / 20.0;
    const MEDIOCRE: f32 = 1.0 / 40.0;

    #[test]
    fn test_full_good_window_steps_up() {
        let mut res = AdaptiveResolution::with_scale(ResolutionConfig::default(), 0.8);
        let mut changes = Vec::new();
        for _ in 0..150 {
            if let Some(scale) = res.update(GOOD, 10.0) {
                changes.push(scale);
            }
        }
        assert_eq!(changes.len(), 1);
        assert_abs_diff_eq!(res.scale(), 0.85, epsilon = 1e-6);
        assert_eq!(res.steps_in_window(), 0);
        assert_eq!(res.good_frames(), 0);
    }

    #[test]
    fn test_step_up_clamps_to_target() {
        let mut res = AdaptiveResolution::with_scale(ResolutionConfig::default(), 0.98);
        for _ in 0..150 {
            res.update(GOOD, 10.0);
        }
        assert_eq!(res.scale(), 1.0);
    }

    #[test]
    fn test_one_mediocre_frame_blocks_the_window() {
        let mut res = AdaptiveResolution::with_scale(ResolutionConfig::default(), 0.8);
        for i in 0..150 {
            let delta = if i == 75 { MEDIOCRE } else { GOOD };
            assert_eq!(res.update(delta, 10.0), None);
        }
        assert_abs_diff_eq!(res.scale(), 0.8);
        // counters reset even though nothing changed
        assert_eq!(res.steps_in_window(), 0);
    }

    #[test]
    fn test_bad_frame_drops_immediately() {
        let mut res = AdaptiveResolution::with_scale(ResolutionConfig::default(), 0.85);
        for _ in 0..40 {
            res.update(GOOD, 10.0);
        }
        let changed = res.update(BAD, 10.0);
        assert_abs_diff_eq!(changed.unwrap(), 0.765, epsilon = 1e-6);
    }

    #[test]
    fn test_bad_frame_inside_cooldown_is_ignored() {
        let mut res = AdaptiveResolution::with_scale(ResolutionConfig::default(), 0.85);
        assert_eq!(res.update(BAD, 0.4), None);
        assert_abs_diff_eq!(res.scale(), 0.85);
    }

    #[test]
    fn test_floor_at_min_scale() {
        let mut res = AdaptiveResolution::with_scale(ResolutionConfig::default(), 0.21);
        assert_abs_diff_eq!(res.update(BAD, 10.0).unwrap(), 0.2);
        assert_eq!(res.update(BAD, 10.0), None);
        assert_eq!(res.scale(), 0.2);
    }

    #[test]
    fn test_scale_stays_in_range_for_mixed_sequences() {
        let mut res = AdaptiveResolution::default();
        let pattern = [GOOD, BAD, MEDIOCRE, 0.0, 5.0, GOOD, GOOD, f32::NAN, -1.0];
        for i in 0..5000 {
            let delta = pattern[(i * 7 + i / 3) % pattern.len()];
            res.update(delta, (i % 90) as f32 / 30.0);
            assert!((0.2..=1.0).contains(&res.scale()), "scale {} out of range", res.scale());
        }
    }

    #[test]
    fn test_with_scale_clamps() {
        assert_eq!(AdaptiveResolution::with_scale(ResolutionConfig::default(), 3.0).scale(), 1.0);
        assert_eq!(AdaptiveResolution::with_scale(ResolutionConfig::default(), 0.0).scale(), 0.2);
    }
}
