//! Candle-like flicker for the house light.

use crate::math::consts::PI;

/// Intensity of the flickering light at `time` seconds.
///
/// Sum of three cosines with incommensurate periods, so the pattern never
/// visibly repeats. The result stays within `[0.1 * base, 0.9 * base]`.
pub fn flicker_intensity(time: f32, base: f32) -> f32 {
    let slow = (time * PI).cos() + 2.0;
    let medium = (time * 2.0 * PI).cos() + 1.0;
    let fast = ((time + 23.4536) * 2.5 * PI).cos() + 1.0;
    base * (slow * 0.1 + medium * 0.15 + fast * 0.15)
}
