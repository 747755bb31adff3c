//! Log encoding used around the curves for the Linear grading style.
//!
//! Reference: OCIO ops/gradingtone/GradingToneOpCPU.cpp
//!
//! Scene-linear values are taken to a log2-like space where 18% grey sits
//! at 0, graded there, then brought back. Below a small breakpoint the
//! encoding is a straight line so zero and negatives stay finite.

use crate::lanes::Lanes;

/// Encoding constants.
pub mod constants {
    /// Linear-side breakpoint.
    pub const XBRK: f32 = 0.004_131_837_5;
    /// Offset applied before the log.
    pub const SHIFT: f32 = -0.000_157_849_85;
    /// Scale applied before the log.
    pub const M: f32 = 1.0 / (0.18 + SHIFT);
    /// Slope of the linear segment.
    pub const GAIN: f32 = 363.034_6;
    /// Intercept of the linear segment.
    pub const OFFS: f32 = -7.0;
    /// Log-side breakpoint.
    pub const YBRK: f32 = -5.5;
}

use constants::*;

/// Scene-linear to log.
#[inline(always)]
pub fn lin_to_log<L: Lanes>(x: L) -> L {
    let linear = x * L::splat(GAIN) + L::splat(OFFS);
    let log = ((x + L::splat(SHIFT)) * L::splat(M)).log2();
    x.select_lt(L::splat(XBRK), linear, log)
}

/// Log back to scene-linear.
#[inline(always)]
pub fn log_to_lin<L: Lanes>(y: L) -> L {
    let linear = (y - L::splat(OFFS)) / L::splat(GAIN);
    let exp = y.exp2() * L::splat(0.18 + SHIFT) - L::splat(SHIFT);
    y.select_lt(L::splat(YBRK), linear, exp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use wide::f32x8;

    #[test]
    fn test_roundtrip() {
        for val in [0.0_f32, 0.001, 0.004, 0.01, 0.18, 0.5, 1.0, 2.0, 100.0, 65504.0] {
            let back = log_to_lin(lin_to_log(val));
            assert_relative_eq!(back, val, max_relative = 1e-3, epsilon = 1e-6);
        }
        // Negatives stay on the linear segment.
        assert_abs_diff_eq!(log_to_lin(lin_to_log(-0.25_f32)), -0.25, epsilon = 1e-5);
    }

    #[test]
    fn test_segments() {
        assert_abs_diff_eq!(lin_to_log(0.001_f32), 0.001 * GAIN + OFFS, epsilon = 1e-5);
        assert_abs_diff_eq!(lin_to_log(0.0_f32), OFFS);
        // 18% grey is the origin of the log segment.
        assert_abs_diff_eq!(lin_to_log(0.18_f32), 0.0, epsilon = 1e-5);

        // Both segments meet at the breakpoints.
        let below = XBRK * GAIN + OFFS;
        let above = ((XBRK + SHIFT) * M).log2();
        assert_abs_diff_eq!(below, above, epsilon = 1e-3);
        assert_abs_diff_eq!(below, YBRK, epsilon = 1e-3);
    }

    #[test]
    fn test_monotonic() {
        let mut prev = f32::NEG_INFINITY;
        for i in 0..2000 {
            let x = -0.01 + i as f32 * 0.0005;
            let y = lin_to_log(x);
            assert!(y > prev, "lin_to_log not monotonic at {x}");
            prev = y;
        }
    }

    #[test]
    fn test_batched_matches_scalar() {
        let vals = [-0.1_f32, 0.0, 0.002, 0.0041, 0.05, 0.18, 4.0, 1000.0];
        let enc = lin_to_log(f32x8::from(vals)).to_array();
        for (e, v) in enc.iter().zip(vals) {
            assert_abs_diff_eq!(*e, lin_to_log(v), epsilon = 1e-4);
        }
        let dec = log_to_lin(f32x8::from(enc)).to_array();
        for (d, e) in dec.iter().zip(enc) {
            assert_relative_eq!(*d, log_to_lin(e), max_relative = 1e-4, epsilon = 1e-6);
        }
    }
}
