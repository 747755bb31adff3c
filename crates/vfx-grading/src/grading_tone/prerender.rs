//! Coefficient table derived from GradingTone parameters.
//!
//! Reference: OCIO ops/gradingtone/GradingTone.cpp
//!
//! The renderer never derives coefficients itself; it only reads a
//! [`GradingTonePreRender`]. Channels whose control is neutral keep the
//! default segments, which describe the identity line.

use super::curves::contrast_multiplier;
use super::types::{Band, GradingStyle, GradingTone, RGBMChannel};

/// Style-dependent range constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleParams {
    /// Upper end of the graded range.
    pub top: f32,
    /// Upper end used by s-contrast.
    pub top_sc: f32,
    /// Lower end of the graded range.
    pub bottom: f32,
    /// S-contrast pivot.
    pub pivot: f32,
}

impl StyleParams {
    /// Constants for a style.
    pub fn from_style(style: GradingStyle) -> Self {
        match style {
            GradingStyle::Log | GradingStyle::Video => Self {
                top: 1.0,
                top_sc: 1.0,
                bottom: 0.0,
                pivot: 0.4,
            },
            // bottom sits on the lin-to-log breakpoint
            GradingStyle::Linear => Self {
                top: 7.5,
                top_sc: 6.5,
                bottom: -5.5,
                pivot: 0.0,
            },
        }
    }
}

/// Six-breakpoint midtone spline (five quadratic segments).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MidtoneSpline {
    /// Breakpoints, strictly increasing.
    pub x: [f32; 6],
    /// Ordinates at the breakpoints.
    pub y: [f32; 6],
    /// Slopes at the breakpoints.
    pub m: [f32; 6],
}

impl Default for MidtoneSpline {
    fn default() -> Self {
        let x = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0];
        Self { x, y: x, m: [1.0; 6] }
    }
}

/// Three-breakpoint highlight/shadow curve (two quadratic Bezier segments).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FauxCubic {
    /// Breakpoints, strictly increasing.
    pub x: [f32; 3],
    /// Ordinates at the breakpoints.
    pub y: [f32; 3],
    /// Slopes at the two ends.
    pub m: [f32; 2],
}

impl Default for FauxCubic {
    fn default() -> Self {
        let x = [0.0, 0.5, 1.0];
        Self { x, y: x, m: [1.0; 2] }
    }
}

/// Two-breakpoint white/black curve with a gain for the slope-increasing case.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainedQuad {
    /// Breakpoints, strictly increasing.
    pub x: [f32; 2],
    /// Ordinates at the breakpoints.
    pub y: [f32; 2],
    /// Slopes at the breakpoints.
    pub m: [f32; 2],
    /// Pre/post scale applied around the fixed end.
    pub gain: f32,
}

impl Default for GainedQuad {
    fn default() -> Self {
        let x = [0.0, 1.0];
        Self { x, y: x, m: [1.0; 2], gain: 1.0 }
    }
}

/// One s-contrast compensation segment (top or bottom end).
///
/// Only `x[1..=2]`, `y[1..=2]` and both slopes are read by the curve;
/// `x[0]`/`x[3]` record the span the segment was fitted to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContrastSegment {
    /// Breakpoints.
    pub x: [f32; 4],
    /// Ordinates.
    pub y: [f32; 4],
    /// Slope entering and leaving the segment.
    pub m: [f32; 2],
}

impl Default for ContrastSegment {
    fn default() -> Self {
        let x = [0.0, 0.25, 0.75, 1.0];
        Self { x, y: x, m: [1.0; 2] }
    }
}

/// Pre-computed curve data for GradingTone.
///
/// Computed once from [`GradingTone`] parameters and read for every pixel.
/// Per-channel arrays are indexed by [`RGBMChannel`].
#[derive(Debug, Clone, PartialEq)]
pub struct GradingTonePreRender {
    /// Grading style.
    pub style: GradingStyle,
    /// Top of curve range.
    pub top: f32,
    /// Top for s-contrast.
    pub top_sc: f32,
    /// Bottom of curve range.
    pub bottom: f32,
    /// Pivot point for s-contrast.
    pub pivot: f32,

    /// Highlight start after clamping against its pivot.
    pub highlights_start: f64,
    /// Highlight pivot.
    pub highlights_width: f64,
    /// Shadow start after clamping against its pivot.
    pub shadows_start: f64,
    /// Shadow pivot.
    pub shadows_width: f64,
    /// Whites start, moved by the highlight curve.
    pub whites_start: f64,
    /// Whites width, moved by the highlight curve.
    pub whites_width: f64,
    /// Blacks start, moved by the shadow curve.
    pub blacks_start: f64,
    /// Blacks width, moved by the shadow curve.
    pub blacks_width: f64,

    /// Midtone splines per channel.
    pub midtones: [MidtoneSpline; 4],
    /// Highlight curves per channel.
    pub highlights: [FauxCubic; 4],
    /// Shadow curves per channel.
    pub shadows: [FauxCubic; 4],
    /// White curves per channel.
    pub whites: [GainedQuad; 4],
    /// Black curves per channel.
    pub blacks: [GainedQuad; 4],
    /// S-contrast compensation at the top end.
    pub contrast_top: ContrastSegment,
    /// S-contrast compensation at the bottom end.
    pub contrast_bottom: ContrastSegment,

    /// True if this is an identity transform (no effect).
    pub local_bypass: bool,
}

impl GradingTonePreRender {
    /// Create pre-render data from GradingTone parameters.
    pub fn new(style: GradingStyle, tone: &GradingTone) -> Self {
        let params = StyleParams::from_style(style);
        let mut pr = Self {
            style,
            top: params.top,
            top_sc: params.top_sc,
            bottom: params.bottom,
            pivot: params.pivot,
            highlights_start: 0.0,
            highlights_width: 0.0,
            shadows_start: 0.0,
            shadows_width: 0.0,
            whites_start: 0.0,
            whites_width: 0.0,
            blacks_start: 0.0,
            blacks_width: 0.0,
            midtones: [MidtoneSpline::default(); 4],
            highlights: [FauxCubic::default(); 4],
            shadows: [FauxCubic::default(); 4],
            whites: [GainedQuad::default(); 4],
            blacks: [GainedQuad::default(); 4],
            contrast_top: ContrastSegment::default(),
            contrast_bottom: ContrastSegment::default(),
            local_bypass: true,
        };
        pr.update(tone);
        pr
    }

    /// Recompute every table from `tone`. Neutral channels get the default
    /// entries, as from [`GradingTonePreRender::new`].
    pub fn update(&mut self, tone: &GradingTone) {
        self.reset();
        self.local_bypass = tone.is_identity();
        if self.local_bypass {
            return;
        }

        self.zone_boundaries(tone);
        self.derive_midtones(tone);
        self.derive_highlights_shadows(tone);
        self.derive_whites_blacks(tone);
        self.derive_scontrast(tone);
    }

    fn reset(&mut self) {
        self.highlights_start = 0.0;
        self.highlights_width = 0.0;
        self.shadows_start = 0.0;
        self.shadows_width = 0.0;
        self.whites_start = 0.0;
        self.whites_width = 0.0;
        self.blacks_start = 0.0;
        self.blacks_width = 0.0;
        self.midtones = [MidtoneSpline::default(); 4];
        self.highlights = [FauxCubic::default(); 4];
        self.shadows = [FauxCubic::default(); 4];
        self.whites = [GainedQuad::default(); 4];
        self.blacks = [GainedQuad::default(); 4];
        self.contrast_top = ContrastSegment::default();
        self.contrast_bottom = ContrastSegment::default();
    }

    /// Highlights move the whites zone; shadows move the blacks zone.
    fn zone_boundaries(&mut self, tone: &GradingTone) {
        let hl = &tone.highlights;
        let pivot = hl.width;
        self.highlights_start = hl.start.min(pivot - 0.01);
        self.highlights_width = pivot;

        let w = &tone.whites;
        let new_start = highlight_eval(w.start, self.highlights_start, pivot, hl.master);
        let new_end = highlight_eval(w.start + w.width, self.highlights_start, pivot, hl.master);
        self.whites_start = new_start;
        self.whites_width = new_end - new_start;

        let sh = &tone.shadows;
        let pivot = sh.width;
        self.shadows_start = sh.start.max(pivot + 0.01);
        self.shadows_width = pivot;

        let b = &tone.blacks;
        let new_start = shadow_eval(b.start, pivot, self.shadows_start, sh.master);
        let new_end = shadow_eval(b.start - b.width, pivot, self.shadows_start, sh.master);
        self.blacks_start = new_start;
        self.blacks_width = new_start - new_end;
    }

    fn derive_midtones(&mut self, tone: &GradingTone) {
        const HALO: f32 = 0.4;
        const MIN_SLOPE: f32 = 0.1;

        for channel in RGBMChannel::ALL {
            let mid_adj = channel_value(tone, Band::Midtones, channel).clamp(0.01, 1.99);
            if mid_adj == 1.0 {
                continue;
            }

            let x0 = self.bottom;
            let x5 = self.top;

            let max_width = (x5 - x0) * 0.95;
            let width = (tone.midtones.width as f32).clamp(0.01, max_width);
            let min_cent = x0 + width * 0.51;
            let max_cent = x5 - width * 0.51;
            let center = (tone.midtones.start as f32).clamp(min_cent, max_cent);

            let x1 = center - width * 0.5;
            let x4 = x1 + width;
            let x2 = x1 + (x4 - x1) * 0.25;
            let x3 = x1 + (x4 - x1) * 0.75;

            let y0 = x0;
            let m0 = 1.0_f32;
            let m5 = 1.0_f32;

            let adj = (mid_adj - 1.0) * (1.0 - MIN_SLOPE);
            let m2 = 1.0 + adj;
            let m3 = 1.0 - adj;
            let mut m1 = 1.0 + adj * HALO;
            let mut m4 = 1.0 - adj * HALO;

            // Keep the area under the slope curve equal on both sides of center
            // so the spline lands on y5 == x5.
            if center <= (x5 + x0) * 0.5 {
                let area = (x1 - x0) * (m1 - m0) * 0.5
                    + (x2 - x1) * ((m1 - m0) + (m2 - m1) * 0.5)
                    + (center - x2) * (m2 - m0) * 0.5;
                m4 = (-0.5 * (x5 - x4) * m5
                    + (x4 - x3) * (0.5 * m3 - m5)
                    + (x3 - center) * (m3 - m5) * 0.5
                    + area)
                    / (-0.5 * (x5 - x3));
            } else {
                let area = (x5 - x4) * (m4 - m5) * 0.5
                    + (x4 - x3) * ((m4 - m5) + (m3 - m4) * 0.5)
                    + (x3 - center) * (m3 - m5) * 0.5;
                m1 = (-0.5 * (x1 - x0) * m0
                    + (x2 - x1) * (0.5 * m2 - m0)
                    + (center - x2) * (m2 - m0) * 0.5
                    + area)
                    / (-0.5 * (x2 - x0));
            }

            let x = [x0, x1, x2, x3, x4, x5];
            let m = [m0, m1, m2, m3, m4, m5];
            let mut y = [y0; 6];
            for i in 1..6 {
                y[i] = y[i - 1] + (m[i - 1] + m[i]) * (x[i] - x[i - 1]) * 0.5;
            }

            self.midtones[channel as usize] = MidtoneSpline { x, y, m };
        }
    }

    fn derive_highlights_shadows(&mut self, tone: &GradingTone) {
        for is_shadow in [false, true] {
            let band = if is_shadow { Band::Shadows } else { Band::Highlights };
            let (start, pivot) = if is_shadow {
                (self.shadows_start as f32, self.shadows_width as f32)
            } else {
                (self.highlights_start as f32, self.highlights_width as f32)
            };

            for channel in RGBMChannel::ALL {
                let mut val = channel_value(tone, band, channel).clamp(0.01, 1.99);
                if !is_shadow {
                    val = 2.0 - val;
                }
                if val == 1.0 {
                    continue;
                }

                let (x0, x2) = if is_shadow { (pivot, start) } else { (start, pivot) };
                let (y0, y2) = (x0, x2);
                let x1 = x0 + (x2 - x0) * 0.5;

                // Expanding uses the mirrored slope so the curve is the
                // inverse of the matching compress curve.
                let bend = if val < 1.0 { val } else { 2.0 - val }.max(0.01);
                let (m0, m2) = if is_shadow { (bend, 1.0) } else { (1.0, bend) };

                let y1 = faux_cubic_mid_ordinate(
                    x0 as f64, x1 as f64, x2 as f64, y0 as f64, y2 as f64, m0 as f64, m2 as f64,
                ) as f32;

                let curve = FauxCubic {
                    x: [x0, x1, x2],
                    y: [y0, y1, y2],
                    m: [m0, m2],
                };
                if is_shadow {
                    self.shadows[channel as usize] = curve;
                } else {
                    self.highlights[channel as usize] = curve;
                }
            }
        }
    }

    fn derive_whites_blacks(&mut self, tone: &GradingTone) {
        for is_black in [false, true] {
            let band = if is_black { Band::Blacks } else { Band::Whites };
            let (start, width) = if is_black {
                (self.blacks_start as f32, self.blacks_width as f32)
            } else {
                (self.whites_start as f32, self.whites_width as f32)
            };

            for channel in RGBMChannel::ALL {
                let val = channel_value(tone, band, channel).clamp(0.01, 1.99);
                let mtest = if is_black { 2.0 - val } else { val };
                if mtest == 1.0 {
                    continue;
                }

                let (x0, x1) = if is_black {
                    (start - width, start)
                } else {
                    (start, start + width)
                };

                let curve = if mtest < 1.0 {
                    // Slope decreasing toward the end of the range.
                    if is_black {
                        let m0 = (2.0 - val).max(0.01);
                        let m1 = 1.0;
                        let y1 = x1;
                        let y0 = y1 - (m0 + m1) * (x1 - x0) * 0.5;
                        GainedQuad { x: [x0, x1], y: [y0, y1], m: [m0, m1], gain: 1.0 }
                    } else {
                        let m0 = 1.0;
                        let m1 = val.max(0.01);
                        let y0 = x0;
                        let y1 = y0 + (m0 + m1) * (x1 - x0) * 0.5;
                        GainedQuad { x: [x0, x1], y: [y0, y1], m: [m0, m1], gain: 1.0 }
                    }
                } else if is_black {
                    let m0 = val.max(0.01);
                    let m1 = 1.0;
                    let y1 = x1;
                    let y0 = y1 - (m0 + m1) * (x1 - x0) * 0.5;
                    GainedQuad { x: [x0, x1], y: [y0, y1], m: [m0, m1], gain: (m0 + m1) * 0.5 }
                } else {
                    // Whites extrapolate past x1 without y1.
                    let m0 = 1.0;
                    let m1 = (2.0 - val).max(0.01);
                    GainedQuad { x: [x0, x1], y: [x0, 0.0], m: [m0, m1], gain: (m0 + m1) * 0.5 }
                };

                if is_black {
                    self.blacks[channel as usize] = curve;
                } else {
                    self.whites[channel as usize] = curve;
                }
            }
        }
    }

    fn derive_scontrast(&mut self, tone: &GradingTone) {
        let contrast = tone.s_contrast as f32;
        if contrast == 1.0 {
            return;
        }
        let contrast = contrast_multiplier(contrast);
        let pivot = self.pivot;

        // Top end.
        {
            let x3 = self.top_sc;
            let y3 = self.top_sc;
            let y0 = pivot + (y3 - pivot) * 0.25;
            let m0 = contrast;
            let x0 = pivot + (y0 - pivot) / m0;
            let min_width = (x3 - x0) * 0.3;
            let mut m3 = 1.0 / m0;

            let center = (y3 - y0 - m3 * x3 + m0 * x0) / (m0 - m3);
            let mut x1 = x0;
            let mut x2 = 2.0 * center - x1;

            if x2 > x3 {
                x2 = x3;
                x1 = 2.0 * center - x2;
            } else if (x2 - x1) < min_width {
                x2 = x1 + min_width;
                let new_center = (x2 + x1) * 0.5;
                m3 = (y3 - y0 + m0 * x0 - new_center * m0) / (x3 - new_center);
            }

            let y1 = y0;
            let y2 = y1 + (m0 + m3) * (x2 - x1) * 0.5;

            self.contrast_top = ContrastSegment {
                x: [x0, x1, x2, x3],
                y: [y0, y1, y2, y3],
                m: [m0, m3],
            };
        }

        // Bottom end.
        {
            let x0 = self.bottom;
            let y0 = self.bottom;
            let y3 = pivot - (pivot - y0) * 0.25;
            let m3 = contrast;
            let x3 = pivot - (pivot - y3) / m3;
            let min_width = (x3 - x0) * 0.3;
            let mut m0 = 1.0 / m3;

            let center = (y3 - y0 - m3 * x3 + m0 * x0) / (m0 - m3);
            let mut x2 = x3;
            let mut x1 = 2.0 * center - x2;

            if x1 < x0 {
                x1 = x0;
                x2 = 2.0 * center - x1;
            } else if (x2 - x1) < min_width {
                x1 = x2 - min_width;
                let new_center = (x2 + x1) * 0.5;
                m0 = (y3 - y0 - m3 * x3 + new_center * m3) / (new_center - x0);
            }

            let y2 = y3;
            let y1 = y2 - (m0 + m3) * (x2 - x1) * 0.5;

            self.contrast_bottom = ContrastSegment {
                x: [x0, x1, x2, x3],
                y: [y0, y1, y2, y3],
                m: [m0, m3],
            };
        }
    }
}

#[inline]
fn channel_value(tone: &GradingTone, band: Band, channel: RGBMChannel) -> f32 {
    tone.band(band).get(channel) as f32
}

/// Middle ordinate of a faux-cubic so both halves meet with matching slope.
fn faux_cubic_mid_ordinate(x0: f64, x1: f64, x2: f64, y0: f64, y2: f64, m0: f64, m2: f64) -> f64 {
    (0.5 / ((x2 - x1) + (x1 - x0)))
        * ((2.0 * y0 + m0 * (x1 - x0)) * (x2 - x1) + (2.0 * y2 - m2 * (x2 - x1)) * (x1 - x0))
}

/// Faux-cubic in f64, forward (`compress`) or as its analytic inverse.
fn faux_cubic_eval(t: f64, x: [f64; 3], y0: f64, y2: f64, m0: f64, m2: f64, compress: bool) -> f64 {
    let [x0, x1, x2] = x;
    let y1 = faux_cubic_mid_ordinate(x0, x1, x2, y0, y2, m0, m2);

    if compress {
        let tl = (t - x0) / (x1 - x0);
        let tr = (t - x1) / (x2 - x1);
        if t < x0 {
            y0 + (t - x0) * m0
        } else if t > x2 {
            y2 + (t - x2) * m2
        } else if t < x1 {
            y0 * (1.0 - tl * tl) + y1 * tl * tl + m0 * (1.0 - tl) * tl * (x1 - x0)
        } else {
            y1 * (1.0 - tr) * (1.0 - tr) + y2 * (2.0 - tr) * tr + m2 * (tr - 1.0) * tr * (x2 - x1)
        }
    } else if t < y0 {
        x0 + (t - y0) / m0
    } else if t > y2 {
        x2 + (t - y2) / m2
    } else if t < y1 {
        let c = y0 - t;
        let b = m0 * (x1 - x0);
        let a = y1 - y0 - m0 * (x1 - x0);
        let d = (b * b - 4.0 * a * c).sqrt();
        (2.0 * c) / (-d - b) * (x1 - x0) + x0
    } else {
        let c = y1 - t;
        let b = 2.0 * y2 - 2.0 * y1 - m2 * (x2 - x1);
        let a = y1 - y2 + m2 * (x2 - x1);
        let d = (b * b - 4.0 * a * c).sqrt();
        (2.0 * c) / (-d - b) * (x2 - x1) + x1
    }
}

/// Highlight curve at `t`, used to carry the whites zone along.
fn highlight_eval(t: f64, start: f64, pivot: f64, val: f64) -> f64 {
    let x = [start, start + (pivot - start) * 0.5, pivot];
    let val = 2.0 - val;
    let m2 = if val <= 1.0 { val } else { 2.0 - val }.max(0.01);
    faux_cubic_eval(t, x, start, pivot, 1.0, m2, val <= 1.0)
}

/// Shadow curve at `t`, used to carry the blacks zone along.
fn shadow_eval(t: f64, pivot: f64, start: f64, val: f64) -> f64 {
    let x = [pivot, pivot + (start - pivot) * 0.5, start];
    let m0 = if val <= 1.0 { val } else { 2.0 - val }.max(0.01);
    faux_cubic_eval(t, x, pivot, start, m0, 1.0, val <= 1.0)
}
