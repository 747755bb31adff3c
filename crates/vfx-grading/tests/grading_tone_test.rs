//! Renderer tests for vfx-grading.

use std::sync::Arc;

use approx::{assert_abs_diff_eq, assert_relative_eq};
use vfx_grading::grading_tone::curves::{highlight_shadow, midtone, scontrast, white_black};
use vfx_grading::grading_tone::linlog::{lin_to_log, log_to_lin};
use vfx_grading::grading_tone::{read_property, write_property, GainedQuad, MidtoneSpline, MAX_HALF_FLOAT};
use vfx_grading::lanes::Triple;
use vfx_grading::{
    DynamicPropertyType, ExecutionStrategy, GradingError, GradingStyle, GradingTone,
    GradingToneCpu, GradingToneOpData, RGBMChannel, RenderOptions, RenderVariant,
    TransformDirection,
};

const STYLES: [GradingStyle; 3] = [GradingStyle::Log, GradingStyle::Linear, GradingStyle::Video];

fn op(style: GradingStyle, tone: GradingTone) -> GradingToneOpData {
    GradingToneOpData::new(style, tone, TransformDirection::Forward).unwrap()
}

/// Scalar, vectorized, and vectorized split over rayon.
fn all_renderers(op: &GradingToneOpData) -> Vec<GradingToneCpu> {
    let sequential = RenderOptions::default().with_parallel(false);
    vec![
        GradingToneCpu::new(op, sequential.with_strategy(ExecutionStrategy::Scalar)),
        GradingToneCpu::new(op, sequential.with_strategy(ExecutionStrategy::Vectorized)),
        GradingToneCpu::new(
            op,
            RenderOptions::default()
                .with_parallel_threshold(0)
                .with_chunk_pixels(16),
        ),
    ]
}

/// RGBA ramp with a distinct alpha per pixel.
fn ramp(num_pixels: usize, lo: f32, hi: f32) -> Vec<f32> {
    let mut buf = Vec::with_capacity(num_pixels * 4);
    for i in 0..num_pixels {
        let f = i as f32 / (num_pixels - 1).max(1) as f32;
        let v = lo + (hi - lo) * f;
        buf.extend_from_slice(&[v, v * 0.8 + 0.05 * (hi - lo), hi - (v - lo), 0.25 + i as f32]);
    }
    buf
}

fn graded_tone(style: GradingStyle) -> GradingTone {
    let mut tone = GradingTone::new(style);
    tone.midtones.master = 1.3;
    tone.midtones.green = 0.8;
    tone.highlights.red = 1.25;
    tone.highlights.master = 0.85;
    tone.whites.master = 1.2;
    tone.whites.blue = 0.7;
    tone.shadows.master = 1.15;
    tone.shadows.red = 0.8;
    tone.blacks.master = 0.9;
    tone.blacks.green = 1.1;
    tone.s_contrast = 1.25;
    tone
}

#[test]
fn test_bypass_is_bit_exact() {
    let src = [
        0.18_f32, -0.0, f32::NAN, 1.0,
        1.0e30, f32::INFINITY, f32::NEG_INFINITY, -5.0,
        f32::MIN_POSITIVE, 65505.0, 0.5, f32::NAN,
    ];
    for style in STYLES {
        let op = GradingToneOpData::identity(style);
        for cpu in all_renderers(&op) {
            let mut dst = [7.0_f32; 12];
            cpu.apply(&src, &mut dst, 3).unwrap();
            for (d, s) in dst.iter().zip(src.iter()) {
                assert_eq!(d.to_bits(), s.to_bits());
            }

            let mut buf = src;
            cpu.apply_inplace(&mut buf, 3).unwrap();
            for (d, s) in buf.iter().zip(src.iter()) {
                assert_eq!(d.to_bits(), s.to_bits());
            }
        }
    }
}

#[test]
fn test_output_clamped_to_half_max() {
    for style in [GradingStyle::Log, GradingStyle::Linear] {
        let mut tone = GradingTone::new(style);
        tone.midtones.master = 1.4;
        let op = op(style, tone);

        for cpu in all_renderers(&op) {
            let src = [1.0e6_f32, 70000.0, 0.5, 1.0e6];
            let mut dst = [0.0_f32; 4];
            cpu.apply(&src, &mut dst, 1).unwrap();
            assert_eq!(dst[0], MAX_HALF_FLOAT);
            assert_eq!(dst[1], MAX_HALF_FLOAT);
            assert!(dst[2] < MAX_HALF_FLOAT);
            assert_eq!(dst[3], 1.0e6);
        }
    }
}

#[test]
fn test_alpha_passes_through() {
    for style in STYLES {
        let op = op(style, graded_tone(style));
        for cpu in all_renderers(&op) {
            let src = ramp(37, -0.1, 1.2);
            let mut dst = vec![0.0_f32; src.len()];
            cpu.apply(&src, &mut dst, 37).unwrap();
            for (d, s) in dst.chunks_exact(4).zip(src.chunks_exact(4)) {
                assert_eq!(d[3].to_bits(), s[3].to_bits());
            }
        }
    }
}

#[test]
fn test_inverse_always_fails() {
    for style in STYLES {
        for tone in [GradingTone::new(style), graded_tone(style)] {
            let op = GradingToneOpData::new(style, tone, TransformDirection::Inverse).unwrap();
            for cpu in all_renderers(&op) {
                assert!(cpu.variant().is_inverse());

                let src = ramp(9, 0.0, 1.0);
                let mut dst = vec![-1.0_f32; src.len()];
                let err = cpu.apply(&src, &mut dst, 9).unwrap_err();
                assert_eq!(
                    err,
                    GradingError::NotImplemented("GradingTone inverse CPU not implemented.".into())
                );
                // Nothing was written.
                assert!(dst.iter().all(|v| *v == -1.0));

                let mut buf = src.clone();
                assert!(matches!(
                    cpu.apply_inplace(&mut buf, 9),
                    Err(GradingError::NotImplemented(_))
                ));
                assert_eq!(buf, src);
            }
        }
    }
}

#[test]
fn test_variant_follows_op() {
    let fwd = GradingToneCpu::new(&GradingToneOpData::identity(GradingStyle::Linear), RenderOptions::default());
    assert_eq!(fwd.variant(), RenderVariant::LinearForward);

    let inv = GradingToneOpData::new(
        GradingStyle::Video,
        GradingTone::new(GradingStyle::Video),
        TransformDirection::Inverse,
    )
    .unwrap();
    assert_eq!(
        GradingToneCpu::new(&inv, RenderOptions::default()).variant(),
        RenderVariant::PlainInverse
    );
}

#[test]
fn test_strategies_agree() {
    for style in STYLES {
        let (lo, hi) = if style.is_linear() { (-0.05, 40.0) } else { (-0.2, 1.3) };
        let op = op(style, graded_tone(style));
        let src = ramp(1001, lo, hi);

        let outputs: Vec<Vec<f32>> = all_renderers(&op)
            .iter()
            .map(|cpu| {
                let mut dst = vec![0.0_f32; src.len()];
                cpu.apply(&src, &mut dst, 1001).unwrap();
                dst
            })
            .collect();

        for other in &outputs[1..] {
            for (a, b) in outputs[0].iter().zip(other.iter()) {
                assert_relative_eq!(*a, *b, epsilon = 1e-4, max_relative = 1e-4);
            }
        }
    }
}

/// Equal up to float tolerance; NaN matches NaN and infinities match exactly.
fn assert_same(a: f32, b: f32) {
    if a.is_nan() || b.is_nan() {
        assert!(a.is_nan() && b.is_nan(), "{a} vs {b}");
    } else if a.is_infinite() || b.is_infinite() {
        assert_eq!(a, b);
    } else {
        assert_relative_eq!(a, b, epsilon = 1e-4, max_relative = 1e-4);
    }
}

/// Grey pixels at `values`, repeated past two batches so every renderer
/// takes its batched path as well as its scalar tail.
fn grey_pixels(values: &[f32]) -> Vec<f32> {
    let mut buf = Vec::new();
    for v in values.iter().cycle().take(values.len().max(8) * 2 + 3) {
        buf.extend_from_slice(&[*v, *v, *v, 1.0]);
    }
    buf
}

fn render_all(op: &GradingToneOpData, src: &[f32]) -> Vec<Vec<f32>> {
    all_renderers(op)
        .iter()
        .map(|cpu| {
            let mut dst = vec![0.0_f32; src.len()];
            cpu.apply(src, &mut dst, src.len() / 4).unwrap();
            dst
        })
        .collect()
}

#[test]
fn test_bright_linear_pixels_clamp_in_every_strategy() {
    let style = GradingStyle::Linear;

    let mut whites = GradingTone::new(style);
    whites.whites.master = 1.9;
    let mut contrast = GradingTone::new(style);
    contrast.s_contrast = 1.5;

    let cases = [
        (whites, vec![1.0e3_f32, 1.0e5, 1.0e7, 1.0e9, 1.0e12]),
        (contrast, vec![1.0e7_f32, 1.0e12, 1.0e20, 1.0e38, f32::MAX, f32::INFINITY]),
    ];

    for (tone, clamped) in cases {
        let op = op(style, tone);
        let mut values = vec![10.0_f32];
        values.extend_from_slice(&clamped);
        let src = grey_pixels(&values);
        let outputs = render_all(&op, &src);

        for out in &outputs {
            for (d, s) in out.chunks_exact(4).zip(src.chunks_exact(4)) {
                if s[0] == 10.0 {
                    assert!(d[0].is_finite() && d[0] > 0.0 && d[0] < MAX_HALF_FLOAT);
                } else {
                    assert_eq!(&d[..3], &[MAX_HALF_FLOAT; 3], "input {}", s[0]);
                }
                assert_eq!(d[3], 1.0);
            }
        }
        for other in &outputs[1..] {
            for (a, b) in outputs[0].iter().zip(other.iter()) {
                assert_same(*a, *b);
            }
        }
    }
}

#[test]
fn test_strategies_agree_on_extreme_inputs() {
    let values = [
        -1.0e6_f32, 0.0, 1.0e3, 1.0e6, 1.0e12, 1.0e30, f32::MAX, f32::INFINITY,
        f32::NEG_INFINITY, 0.18, 50.0,
    ];
    let src = grey_pixels(&values);

    for style in STYLES {
        let mut tone = graded_tone(style);
        tone.whites.master = 1.9;
        let op = op(style, tone);

        let outputs = render_all(&op, &src);

        for out in &outputs {
            assert!(out.iter().all(|v| v.is_nan() || *v <= MAX_HALF_FLOAT));
        }
        for other in &outputs[1..] {
            for (a, b) in outputs[0].iter().zip(other.iter()) {
                assert_same(*a, *b);
            }
        }
    }
}

#[test]
fn test_nan_is_not_clamped() {
    let mut src = Vec::new();
    for i in 0..11 {
        src.extend_from_slice(&[f32::NAN, 0.5, 0.1 * i as f32, 1.0]);
    }

    for style in STYLES {
        let mut tone = graded_tone(style);
        tone.midtones.master = 1.4;
        let op = op(style, tone);

        let outputs = render_all(&op, &src);

        for out in &outputs {
            for px in out.chunks_exact(4) {
                assert!(px[0].is_nan());
                assert!(px[1].is_finite());
                assert_eq!(px[3], 1.0);
            }
        }
        for other in &outputs[1..] {
            for (a, b) in outputs[0].iter().zip(other.iter()) {
                assert_same(*a, *b);
            }
        }
    }
}

#[test]
fn test_inplace_matches_copy() {
    let op = op(GradingStyle::Video, graded_tone(GradingStyle::Video));
    for cpu in all_renderers(&op) {
        let src = ramp(50, 0.0, 1.0);
        let mut dst = vec![0.0_f32; src.len()];
        cpu.apply(&src, &mut dst, 50).unwrap();

        let mut buf = src.clone();
        cpu.apply_inplace(&mut buf, 50).unwrap();
        assert_eq!(buf, dst);
    }
}

#[test]
fn test_only_requested_pixels_are_written() {
    let op = op(GradingStyle::Log, graded_tone(GradingStyle::Log));
    for cpu in all_renderers(&op) {
        let src = ramp(12, 0.0, 1.0);
        let mut dst = vec![-9.0_f32; src.len()];
        cpu.apply(&src, &mut dst, 10).unwrap();
        assert!(dst[40..].iter().all(|v| *v == -9.0));
    }
}

#[test]
fn test_short_buffers_rejected() {
    let op = op(GradingStyle::Log, graded_tone(GradingStyle::Log));
    let cpu = GradingToneCpu::new(&op, RenderOptions::default());

    let src = vec![0.5_f32; 8];
    let mut dst = vec![0.0_f32; 8];
    assert_eq!(
        cpu.apply(&src, &mut dst, 3),
        Err(GradingError::BufferSize { expected: 12, actual: 8 })
    );
    let mut short = vec![0.0_f32; 4];
    assert!(matches!(
        cpu.apply(&src, &mut short, 2),
        Err(GradingError::BufferSize { expected: 8, actual: 4 })
    ));
    assert!(cpu.apply(&src, &mut dst, 0).is_ok());
}

#[test]
fn test_neutral_band_leaves_others_unchanged() {
    // Turning one band neutral equals rendering without that band at all.
    let style = GradingStyle::Log;
    let mut with_neutral_whites = graded_tone(style);
    with_neutral_whites.whites = GradingTone::new(style).whites;

    let a = op(style, with_neutral_whites.clone());
    let pr = read_property(&a.dynamic_property()).computed_value().clone();

    let cpu = GradingToneCpu::new(&a, RenderOptions::default());
    let src = ramp(64, 0.0, 1.1);
    let mut dst = vec![0.0_f32; src.len()];
    cpu.apply(&src, &mut dst, 64).unwrap();

    for (d, s) in dst.chunks_exact(4).zip(src.chunks_exact(4)) {
        let mut rgb = [s[0], s[1], s[2]];
        vfx_grading::apply_grading_tone(style, &pr, &with_neutral_whites, &mut rgb);
        for c in 0..3 {
            assert_abs_diff_eq!(d[c], rgb[c], epsilon = 1e-5);
        }
    }
}

#[test]
fn test_midtone_band_alone_equals_curve() {
    let style = GradingStyle::Log;
    let mut tone = GradingTone::new(style);
    tone.midtones.red = 1.4;
    tone.midtones.master = 0.7;
    let op = op(style, tone.clone());
    let pr = read_property(&op.dynamic_property()).computed_value().clone();

    let src = ramp(40, -0.1, 1.2);
    for cpu in all_renderers(&op) {
        let mut dst = vec![0.0_f32; src.len()];
        cpu.apply(&src, &mut dst, 40).unwrap();

        for (d, s) in dst.chunks_exact(4).zip(src.chunks_exact(4)) {
            let r = midtone(1.4, &pr.midtones[RGBMChannel::R as usize], s[0]);
            let expected = midtone(
                0.7,
                &pr.midtones[RGBMChannel::M as usize],
                Triple::new(r, s[1], s[2]),
            );
            for c in 0..3 {
                assert_abs_diff_eq!(d[c], expected.0[c], epsilon = 1e-5);
            }
        }
    }
}

/// R, G, B curves of one band, then its Master curve.
fn band_pass(
    rgb: &mut Triple<f32>,
    channel: impl Fn(usize, f32) -> f32,
    master: impl Fn(Triple<f32>) -> Triple<f32>,
) {
    for i in 0..3 {
        rgb.0[i] = channel(i, rgb.0[i]);
    }
    *rgb = master(*rgb);
}

#[test]
fn test_pipeline_is_sequential_composition() {
    let style = GradingStyle::Linear;
    let tone = graded_tone(style);
    let op = op(style, tone.clone());
    let pr = read_property(&op.dynamic_property()).computed_value().clone();

    let cpu = GradingToneCpu::new(
        &op,
        RenderOptions::default()
            .with_strategy(ExecutionStrategy::Scalar)
            .with_parallel(false),
    );
    let src = ramp(30, 0.001, 20.0);
    let mut dst = vec![0.0_f32; src.len()];
    cpu.apply(&src, &mut dst, 30).unwrap();

    let m = RGBMChannel::M as usize;
    let ch = |i: usize| RGBMChannel::RGB[i];
    for (d, s) in dst.chunks_exact(4).zip(src.chunks_exact(4)) {
        let mut rgb = lin_to_log(Triple::new(s[0], s[1], s[2]));

        band_pass(
            &mut rgb,
            |i, t| midtone(tone.midtones.get(ch(i)) as f32, &pr.midtones[i], t),
            |t| midtone(tone.midtones.master as f32, &pr.midtones[m], t),
        );
        band_pass(
            &mut rgb,
            |i, t| highlight_shadow(tone.highlights.get(ch(i)) as f32, false, &pr.highlights[i], t),
            |t| highlight_shadow(tone.highlights.master as f32, false, &pr.highlights[m], t),
        );
        band_pass(
            &mut rgb,
            |i, t| white_black(tone.whites.get(ch(i)) as f32, false, &pr.whites[i], t),
            |t| white_black(tone.whites.master as f32, false, &pr.whites[m], t),
        );
        band_pass(
            &mut rgb,
            |i, t| highlight_shadow(tone.shadows.get(ch(i)) as f32, true, &pr.shadows[i], t),
            |t| highlight_shadow(tone.shadows.master as f32, true, &pr.shadows[m], t),
        );
        band_pass(
            &mut rgb,
            |i, t| white_black(tone.blacks.get(ch(i)) as f32, true, &pr.blacks[i], t),
            |t| white_black(tone.blacks.master as f32, true, &pr.blacks[m], t),
        );
        rgb = scontrast(
            tone.s_contrast as f32,
            pr.pivot,
            &pr.contrast_top,
            &pr.contrast_bottom,
            rgb,
        );
        let rgb = log_to_lin(rgb);

        for c in 0..3 {
            assert_abs_diff_eq!(d[c], rgb.0[c].min(MAX_HALF_FLOAT), epsilon = 1e-6);
        }
    }
}

#[test]
fn test_midtone_scenario_hand_computed() {
    let x = [0.0, 0.1, 0.3, 0.5, 0.8, 1.0];
    let m = [1.0, 1.25, 1.35, 0.75, 0.8, 1.0];
    let mut y = [0.0; 6];
    for i in 1..6 {
        y[i] = y[i - 1] + (m[i - 1] + m[i]) * (x[i] - x[i - 1]) * 0.5;
    }
    let spline = MidtoneSpline { x, y, m };

    // Exactly on x2 the segment starting there is used and returns y2.
    assert_abs_diff_eq!(midtone(1.4, &spline, 0.3_f32), y[2], epsilon = 1e-6);
    assert_abs_diff_eq!(y[2], 0.3725, epsilon = 1e-6);

    // u = 0.5 on segment 2: 0.5 * 0.2 * (0.5 * 0.5 * (0.75 - 1.35) + 1.35) + y2
    assert_abs_diff_eq!(midtone(1.4, &spline, 0.4_f32), 0.1 * 1.2 + 0.3725, epsilon = 1e-6);

    let eps = 1e-5_f32;
    let lo = midtone(1.4, &spline, 0.3 - eps);
    let hi = midtone(1.4, &spline, 0.3 + eps);
    assert!((hi - lo).abs() < 1e-4);
}

#[test]
fn test_whites_gain_scenario() {
    let quad = GainedQuad {
        x: [0.5, 1.0],
        y: [0.5, 0.0],
        m: [1.0, 3.0],
        gain: 2.0,
    };

    // Above x1: pre-scale by gain plus the quadratic extrapolation.
    assert_abs_diff_eq!(white_black(1.3, false, &quad, 1.3_f32), 0.829866, epsilon = 1e-4);
    assert_abs_diff_eq!(white_black(1.3, false, &quad, 1.6_f32), 0.869463, epsilon = 1e-4);
    // The bare analytic inverse would give 0.930074 at 1.3.
    assert!((white_black(1.3, false, &quad, 1.3_f32) - 0.930074).abs() > 0.05);

    // Inside the segment only the gain applies.
    assert_abs_diff_eq!(white_black(1.3, false, &quad, 0.9_f32), 0.715037, epsilon = 1e-4);
}

#[test]
fn test_dynamic_property_queries() {
    let op = op(GradingStyle::Log, graded_tone(GradingStyle::Log));
    let cpu = GradingToneCpu::new(&op, RenderOptions::default());

    assert!(!cpu.has_dynamic_property(DynamicPropertyType::GradingTone));
    assert_eq!(
        cpu.dynamic_property(DynamicPropertyType::GradingTone).unwrap_err(),
        GradingError::InvalidDynamicProperty("GradingTone property is not dynamic.".into())
    );

    op.make_dynamic();
    assert!(cpu.has_dynamic_property(DynamicPropertyType::GradingTone));
    assert!(!cpu.has_dynamic_property(DynamicPropertyType::Exposure));
    assert!(cpu.dynamic_property(DynamicPropertyType::GradingTone).is_ok());

    for ty in [
        DynamicPropertyType::Exposure,
        DynamicPropertyType::Contrast,
        DynamicPropertyType::Gamma,
        DynamicPropertyType::GradingPrimary,
        DynamicPropertyType::GradingRgbCurve,
        DynamicPropertyType::GradingHueCurve,
    ] {
        assert_eq!(
            cpu.dynamic_property(ty).unwrap_err(),
            GradingError::InvalidDynamicProperty(
                "Dynamic property type not supported by GradingTone.".into()
            )
        );
    }
}

#[test]
fn test_dynamic_edit_reaches_renderer() {
    let style = GradingStyle::Video;
    let op = GradingToneOpData::identity(style);
    op.make_dynamic();
    let cpu = GradingToneCpu::new(&op, RenderOptions::default());
    let handle = cpu.dynamic_property(DynamicPropertyType::GradingTone).unwrap();

    let src = ramp(20, 0.0, 1.0);
    let mut dst = vec![0.0_f32; src.len()];
    cpu.apply(&src, &mut dst, 20).unwrap();
    assert_eq!(dst, src);

    write_property(&handle).set_value(graded_tone(style)).unwrap();
    cpu.apply(&src, &mut dst, 20).unwrap();
    assert_ne!(dst, src);

    // Back to neutral: bypass again.
    write_property(&handle).set_value(GradingTone::new(style)).unwrap();
    cpu.apply(&src, &mut dst, 20).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn test_unify_shares_one_copy() {
    let style = GradingStyle::Log;
    let op = op(style, graded_tone(style));
    let mut first = GradingToneCpu::new(&op, RenderOptions::default());
    let mut second = GradingToneCpu::new(&op, RenderOptions::default());
    assert!(!first.binding().is_shared());

    let mut slot = None;
    first
        .unify_dynamic_property(DynamicPropertyType::GradingTone, &mut slot)
        .unwrap();
    let shared = slot.clone().unwrap();
    // The copy is new and editable.
    assert!(!Arc::ptr_eq(&shared, &op.dynamic_property()));
    assert!(read_property(&shared).is_dynamic());
    assert!(first.binding().is_shared());
    assert!(first.has_dynamic_property(DynamicPropertyType::GradingTone));

    second
        .unify_dynamic_property(DynamicPropertyType::GradingTone, &mut slot)
        .unwrap();
    assert!(Arc::ptr_eq(slot.as_ref().unwrap(), &shared));
    assert!(Arc::ptr_eq(second.binding().handle(), first.binding().handle()));

    // One edit is seen by both renderers but not by the op.
    write_property(&shared).set_value(GradingTone::new(style)).unwrap();
    let src = ramp(10, 0.0, 1.0);
    for cpu in [&first, &second] {
        let mut dst = vec![0.0_f32; src.len()];
        cpu.apply(&src, &mut dst, 10).unwrap();
        assert_eq!(dst, src);
    }
    assert!(!op.is_identity());
}

#[test]
fn test_unify_rejects_other_types() {
    let op = GradingToneOpData::identity(GradingStyle::Log);
    let mut cpu = GradingToneCpu::new(&op, RenderOptions::default());
    let mut slot = None;
    let err = cpu
        .unify_dynamic_property(DynamicPropertyType::GradingPrimary, &mut slot)
        .unwrap_err();
    assert!(matches!(err, GradingError::InvalidDynamicProperty(_)));
    assert!(slot.is_none());
    assert!(!cpu.binding().is_shared());
}

#[test]
fn test_midtones_monotonic_through_renderer() {
    for control in [0.3, 0.7, 1.3, 1.9] {
        let mut tone = GradingTone::new(GradingStyle::Log);
        tone.midtones.master = control;
        let op = op(GradingStyle::Log, tone);

        for cpu in all_renderers(&op) {
            let src = ramp(400, -0.2, 1.4);
            let mut dst = vec![0.0_f32; src.len()];
            cpu.apply(&src, &mut dst, 400).unwrap();
            let reds: Vec<f32> = dst.chunks_exact(4).map(|p| p[0]).collect();
            for w in reds.windows(2) {
                assert!(w[1] >= w[0], "midtones {control} not monotonic: {w:?}");
            }
        }
    }
}
