//! Curve evaluation for GradingTone.
//!
//! Reference: OCIO ops/gradingtone/GradingToneOpCPU.cpp
//!
//! Every curve is generic over [`Lanes`], so the same code grades one
//! component, a whole RGB triple, or eight pixels at once. Segments are
//! picked with [`Lanes::select_lt`]; at an exact breakpoint the segment to
//! the right of it is used.

use crate::lanes::Lanes;

use super::prerender::{ContrastSegment, FauxCubic, GainedQuad, MidtoneSpline};

/// Quadratic whose slope moves linearly from `m0` at `x0` to `m1` at `x1`.
#[inline(always)]
fn ramp<L: Lanes>(t: L, x0: f32, x1: f32, y0: f32, m0: f32, m1: f32) -> L {
    let w = x1 - x0;
    let u = (t - L::splat(x0)) / L::splat(w);
    u * L::splat(w) * (u * L::splat(0.5 * (m1 - m0)) + L::splat(m0)) + L::splat(y0)
}

#[inline(always)]
fn line<L: Lanes>(t: L, x0: f32, y0: f32, m: f32) -> L {
    (t - L::splat(x0)) * L::splat(m) + L::splat(y0)
}

/// Midtone spline.
///
/// `control` is the band value for the channel being graded; a neutral
/// control leaves `t` untouched.
pub fn midtone<L: Lanes>(control: f32, spline: &MidtoneSpline, t: L) -> L {
    if control.clamp(0.01, 1.99) == 1.0 {
        return t;
    }
    let MidtoneSpline { x, y, m } = spline;

    let mut res = t.select_lt(
        L::splat(x[1]),
        ramp(t, x[0], x[1], y[0], m[0], m[1]),
        ramp(t, x[1], x[2], y[1], m[1], m[2]),
    );
    for i in 2..5 {
        let seg = ramp(t, x[i], x[i + 1], y[i], m[i], m[i + 1]);
        res = t.select_lt(L::splat(x[i]), res, seg);
    }

    res = t.select_lt(L::splat(x[0]), line(t, x[0], y[0], m[0]), res);
    t.select_lt(L::splat(x[5]), res, line(t, x[5], y[5], m[5]))
}

/// Highlight (`is_shadow == false`) or shadow curve.
///
/// Controls below 1 (after the highlight mirror) compress with the
/// faux-cubic; controls above 1 expand with its analytic inverse.
pub fn highlight_shadow<L: Lanes>(control: f32, is_shadow: bool, curve: &FauxCubic, t: L) -> L {
    let val = if is_shadow { control } else { 2.0 - control };
    if val == 1.0 {
        return t;
    }

    let [x0, x1, x2] = curve.x;
    let [y0, y1, y2] = curve.y;
    let [m0, m2] = curve.m;
    let one = L::splat(1.0);

    if val < 1.0 {
        let tl = (t - L::splat(x0)) / L::splat(x1 - x0);
        let tr = (t - L::splat(x1)) / L::splat(x2 - x1);
        let fl = L::splat(y0) * (one - tl * tl)
            + L::splat(y1) * tl * tl
            + L::splat(m0 * (x1 - x0)) * (one - tl) * tl;
        let fr = L::splat(y1) * (one - tr) * (one - tr)
            + L::splat(y2) * (L::splat(2.0) - tr) * tr
            + L::splat(m2 * (x2 - x1)) * (tr - one) * tr;

        let res = t.select_lt(L::splat(x1), fl, fr);
        let res = t.select_lt(L::splat(x0), line(t, x0, y0, m0), res);
        t.select_lt(L::splat(x2), res, line(t, x2, y2, m2))
    } else {
        let b_l = m0 * (x1 - x0);
        let a_l = y1 - y0 - m0 * (x1 - x0);
        let c_l = L::splat(y0) - t;
        let disc_l = (L::splat(b_l * b_l) - L::splat(4.0 * a_l) * c_l).sqrt();
        let out_l =
            L::splat(-2.0) * c_l / (disc_l + L::splat(b_l)) * L::splat(x1 - x0) + L::splat(x0);

        let b_r = 2.0 * y2 - 2.0 * y1 - m2 * (x2 - x1);
        let a_r = y1 - y2 + m2 * (x2 - x1);
        let c_r = L::splat(y1) - t;
        let disc_r = (L::splat(b_r * b_r) - L::splat(4.0 * a_r) * c_r).sqrt();
        let out_r =
            L::splat(-2.0) * c_r / (disc_r + L::splat(b_r)) * L::splat(x2 - x1) + L::splat(x1);

        let res = t.select_lt(L::splat(y1), out_l, out_r);
        let below = (t - L::splat(y0)) / L::splat(m0) + L::splat(x0);
        let res = t.select_lt(L::splat(y0), below, res);
        let above = (t - L::splat(y2)) / L::splat(m2) + L::splat(x2);
        t.select_lt(L::splat(y2), res, above)
    }
}

/// Whites (`is_black == false`) or blacks curve.
pub fn white_black<L: Lanes>(control: f32, is_black: bool, quad: &GainedQuad, t: L) -> L {
    let mtest = if is_black { 2.0 - control } else { control };

    let [x0, x1] = quad.x;
    let [y0, y1] = quad.y;
    let [m0, m1] = quad.m;
    let gain = quad.gain;

    if mtest < 1.0 {
        // Slope decreasing.
        let res = ramp(t, x0, x1, y0, m0, m1);
        let res = t.select_lt(L::splat(x0), line(t, x0, y0, m0), res);
        t.select_lt(L::splat(x1), res, line(t, x1, y1, m1))
    } else if mtest > 1.0 {
        // Slope increasing: invert the ramp in a gained space.
        let fixed = if is_black { x1 } else { x0 };
        let ts = (t - L::splat(fixed)) * L::splat(gain) + L::splat(fixed);

        let a = 0.5 * (m1 - m0) * (x1 - x0);
        let b = m0 * (x1 - x0);
        let c = L::splat(y0) - ts;
        let disc = (L::splat(b * b) - L::splat(4.0 * a) * c).sqrt();
        let res = L::splat(-2.0) * c / (disc + L::splat(b)) * L::splat(x1 - x0) + L::splat(x0);
        let below = (ts - L::splat(y0)) / L::splat(m0) + L::splat(x0);
        let res = ts.select_lt(L::splat(y0), below, res);

        if is_black {
            let above = (ts - L::splat(y1)) / L::splat(m1) + L::splat(x1);
            let res = ts.select_lt(L::splat(y1), res, above);
            (res - L::splat(x1)) / L::splat(gain) + L::splat(x1)
        } else {
            let res = (res - L::splat(x0)) / L::splat(gain) + L::splat(x0);

            // Quadratic extrapolation past x1 keeps highlights under control in HDR.
            let new_y1 = (x1 - x0) / gain + x0;
            let xd = x0 + (x1 - x0) * 0.99;
            let md = 1.0 / (m0 + (xd - x0) * (m1 - m0) / (x1 - x0));
            let aim = (1.0 / m1 - md) / (x1 - xd);
            let bb = 1.0 / m1 - aim * x1;
            let cc = new_y1 - bb * x1 - 0.5 * aim * x1 * x1;

            let tu = (ts - L::splat(x0)) / L::splat(gain) + L::splat(x0);
            let extra = (L::splat(0.5 * aim) * tu + L::splat(bb)) * tu + L::splat(cc);
            tu.select_lt(L::splat(x1), res, extra)
        }
    } else {
        t
    }
}

/// Map an s-contrast control to the slope used around the pivot.
///
/// The range is limited so the curve never reverses.
#[inline]
pub fn contrast_multiplier(contrast: f32) -> f32 {
    if contrast > 1.0 {
        1.0 / (1.8125 - 0.8125 * contrast.min(1.99))
    } else {
        0.28125 + 0.71875 * contrast.max(0.01)
    }
}

/// S-contrast: a linear slope around `pivot` eased back to the identity
/// at both ends.
pub fn scontrast<L: Lanes>(
    contrast: f32,
    pivot: f32,
    top: &ContrastSegment,
    bottom: &ContrastSegment,
    t: L,
) -> L {
    if contrast == 1.0 {
        return t;
    }
    let k = contrast_multiplier(contrast);
    let mut out = (t - L::splat(pivot)) * L::splat(k) + L::splat(pivot);

    {
        let (x1, x2, y1, y2) = (top.x[1], top.x[2], top.y[1], top.y[2]);
        let [m0, m3] = top.m;
        out = t.select_lt(L::splat(x1), out, ramp(t, x1, x2, y1, m0, m3));
        out = t.select_lt(L::splat(x2), out, line(t, x2, y2, m3));
    }

    {
        let (x1, x2, y1) = (bottom.x[1], bottom.x[2], bottom.y[1]);
        let [m0, m3] = bottom.m;
        out = t.select_lt(L::splat(x2), ramp(t, x1, x2, y1, m0, m3), out);
        out = t.select_lt(L::splat(x1), line(t, x1, y1, m0), out);
    }

    out
}
