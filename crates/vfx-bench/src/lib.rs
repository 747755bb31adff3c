//! Fixtures shared by the vfx-grading benchmarks.

use vfx_grading::{GradingStyle, GradingTone, GradingToneOpData, GradingResult, TransformDirection};

/// A grade touching every band, so no curve short-circuits.
pub fn busy_tone(style: GradingStyle) -> GradingTone {
    let mut tone = GradingTone::new(style);
    tone.midtones.master = 1.2;
    tone.midtones.red = 0.9;
    tone.highlights.master = 1.3;
    tone.highlights.blue = 0.8;
    tone.whites.master = 1.15;
    tone.whites.green = 0.85;
    tone.shadows.master = 0.9;
    tone.shadows.red = 1.2;
    tone.blacks.master = 1.1;
    tone.blacks.blue = 0.9;
    tone.s_contrast = 1.2;
    tone
}

/// Forward op for [`busy_tone`].
pub fn busy_op(style: GradingStyle) -> GradingResult<GradingToneOpData> {
    GradingToneOpData::new(style, busy_tone(style), TransformDirection::Forward)
}

/// Packed RGBA image: a horizontal ramp over `[lo, hi]` per row with a
/// slight per-channel offset and opaque alpha.
pub fn rgba_ramp(width: usize, height: usize, lo: f32, hi: f32) -> Vec<f32> {
    let mut buf = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        let row = y as f32 / height.max(1) as f32;
        for x in 0..width {
            let v = lo + (hi - lo) * x as f32 / width.max(1) as f32;
            buf.extend_from_slice(&[v, v * (0.9 + 0.1 * row), v * (1.0 - 0.1 * row), 1.0]);
        }
    }
    buf
}
