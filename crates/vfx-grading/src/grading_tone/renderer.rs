//! CPU renderer for GradingTone.
//!
//! Reference: OCIO ops/gradingtone/GradingToneOpCPU.cpp
//!
//! Pixels are packed RGBA f32. Each pixel goes through, in order: the five
//! bands (R, G, B curves then the Master curve on the triple), s-contrast,
//! and a clamp to the largest finite half float. The Linear style wraps
//! the bands and s-contrast in the log encoding. Alpha is copied through.

use std::sync::Arc;

use tracing::{debug, trace};
use wide::f32x8;

use super::curves::{highlight_shadow, midtone, scontrast, white_black};
use super::dynamic::{read_property, DynamicPropertyGradingTone, DynamicPropertyType, SharedGradingTone, ToneBinding};
use super::linlog::{lin_to_log, log_to_lin};
use super::op_data::GradingToneOpData;
use super::prerender::GradingTonePreRender;
use super::types::{Band, GradingStyle, GradingTone, RGBMChannel, TransformDirection};
use crate::lanes::{Lanes, Triple, BATCH};
use crate::options::{ExecutionStrategy, RenderOptions};
use crate::{GradingError, GradingResult};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Largest finite half float; graded RGB never exceeds it.
pub const MAX_HALF_FLOAT: f32 = half::f16::MAX.to_f32_const();

const CHANNELS: usize = 4;

/// Renderer behavior, fixed when the renderer is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderVariant {
    /// Log or Video style, forward.
    PlainForward,
    /// Linear style, forward.
    LinearForward,
    /// Log or Video style, inverse.
    PlainInverse,
    /// Linear style, inverse.
    LinearInverse,
}

impl RenderVariant {
    /// Variant for a style and direction.
    pub fn select(style: GradingStyle, direction: TransformDirection) -> Self {
        match (style.is_linear(), direction) {
            (false, TransformDirection::Forward) => RenderVariant::PlainForward,
            (true, TransformDirection::Forward) => RenderVariant::LinearForward,
            (false, TransformDirection::Inverse) => RenderVariant::PlainInverse,
            (true, TransformDirection::Inverse) => RenderVariant::LinearInverse,
        }
    }

    /// True for the inverse variants, which have no CPU implementation.
    #[inline]
    pub fn is_inverse(self) -> bool {
        matches!(self, RenderVariant::PlainInverse | RenderVariant::LinearInverse)
    }

    /// True for the variants that grade in the log encoding.
    #[inline]
    pub fn is_linear(self) -> bool {
        matches!(self, RenderVariant::LinearForward | RenderVariant::LinearInverse)
    }
}

/// Parameters and table borrowed for one buffer.
#[derive(Clone, Copy)]
struct ToneKernel<'a> {
    tone: &'a GradingTone,
    pr: &'a GradingTonePreRender,
    linear: bool,
}

impl<'a> ToneKernel<'a> {
    fn new(prop: &'a DynamicPropertyGradingTone, linear: bool) -> Self {
        Self {
            tone: prop.value(),
            pr: prop.computed_value(),
            linear,
        }
    }

    #[inline(always)]
    fn band<L: Lanes>(&self, band: Band, channel: RGBMChannel, t: L) -> L {
        let control = self.tone.band(band).get(channel) as f32;
        let i = channel as usize;
        let pr = self.pr;
        match band {
            Band::Midtones => midtone(control, &pr.midtones[i], t),
            Band::Highlights => highlight_shadow(control, false, &pr.highlights[i], t),
            Band::Whites => white_black(control, false, &pr.whites[i], t),
            Band::Shadows => highlight_shadow(control, true, &pr.shadows[i], t),
            Band::Blacks => white_black(control, true, &pr.blacks[i], t),
        }
    }

    #[inline(always)]
    fn grade<L: Lanes>(&self, rgb: Triple<L>) -> Triple<L> {
        let mut rgb = if self.linear { lin_to_log(rgb) } else { rgb };

        for band in Band::RENDER_ORDER {
            for channel in RGBMChannel::RGB {
                let i = channel as usize;
                rgb.0[i] = self.band(band, channel, rgb.0[i]);
            }
            rgb = self.band(band, RGBMChannel::M, rgb);
        }

        let pr = self.pr;
        rgb = scontrast(
            self.tone.s_contrast as f32,
            pr.pivot,
            &pr.contrast_top,
            &pr.contrast_bottom,
            rgb,
        );

        if self.linear {
            rgb = log_to_lin(rgb);
        }
        // Only values above the limit are clamped; NaN passes through.
        let max = Triple::splat(MAX_HALF_FLOAT);
        max.select_lt(rgb, max, rgb)
    }

    #[inline]
    fn grade_pixel(&self, px: &mut [f32]) {
        let out = self.grade(Triple::new(px[0], px[1], px[2]));
        px[..3].copy_from_slice(&out.0);
    }

    /// Eight pixels, deinterleaved into one lane per component.
    #[inline]
    fn grade_batch(&self, block: &mut [f32]) {
        let mut r = [0.0_f32; BATCH];
        let mut g = [0.0_f32; BATCH];
        let mut b = [0.0_f32; BATCH];
        for (i, px) in block.chunks_exact(CHANNELS).enumerate() {
            r[i] = px[0];
            g[i] = px[1];
            b[i] = px[2];
        }

        let out = self.grade(Triple::new(f32x8::from(r), f32x8::from(g), f32x8::from(b)));
        let [r, g, b] = out.0.map(|lane| lane.to_array());

        for (i, px) in block.chunks_exact_mut(CHANNELS).enumerate() {
            px[0] = r[i];
            px[1] = g[i];
            px[2] = b[i];
        }
    }

    fn run(&self, buf: &mut [f32], strategy: ExecutionStrategy) {
        match strategy {
            ExecutionStrategy::Scalar => {
                for px in buf.chunks_exact_mut(CHANNELS) {
                    self.grade_pixel(px);
                }
            }
            ExecutionStrategy::Vectorized => {
                let mut blocks = buf.chunks_exact_mut(CHANNELS * BATCH);
                for block in &mut blocks {
                    self.grade_batch(block);
                }
                for px in blocks.into_remainder().chunks_exact_mut(CHANNELS) {
                    self.grade_pixel(px);
                }
            }
        }
    }
}

/// CPU renderer for one GradingTone op.
///
/// Built from a [`GradingToneOpData`]; the renderer shares the op's
/// property handle, so parameter edits on a dynamic op apply to the next
/// buffer.
///
/// # Example
///
/// ```rust
/// use vfx_grading::{
///     GradingStyle, GradingTone, GradingToneCpu, GradingToneOpData, RenderOptions,
///     TransformDirection,
/// };
///
/// let mut tone = GradingTone::new(GradingStyle::Log);
/// tone.midtones.master = 1.3;
/// let op = GradingToneOpData::new(GradingStyle::Log, tone, TransformDirection::Forward).unwrap();
/// let cpu = GradingToneCpu::new(&op, RenderOptions::default());
///
/// let src = [0.18_f32, 0.18, 0.18, 1.0];
/// let mut dst = [0.0_f32; 4];
/// cpu.apply(&src, &mut dst, 1).unwrap();
/// assert!(dst[0] > 0.18);
/// assert_eq!(dst[3], 1.0);
/// ```
#[derive(Debug)]
pub struct GradingToneCpu {
    binding: ToneBinding,
    variant: RenderVariant,
    options: RenderOptions,
}

impl GradingToneCpu {
    /// Build a renderer for `op`.
    pub fn new(op: &GradingToneOpData, options: RenderOptions) -> Self {
        let variant = RenderVariant::select(op.style(), op.direction());
        debug!(
            ?variant,
            dynamic = op.is_dynamic(),
            strategy = ?options.strategy,
            "GradingTone CPU renderer created"
        );
        Self {
            binding: ToneBinding::Exclusive(op.dynamic_property()),
            variant,
            options,
        }
    }

    /// Selected variant.
    #[inline]
    pub fn variant(&self) -> RenderVariant {
        self.variant
    }

    /// Render options.
    #[inline]
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Current parameter binding.
    #[inline]
    pub fn binding(&self) -> &ToneBinding {
        &self.binding
    }

    /// True only for [`DynamicPropertyType::GradingTone`] on a dynamic op.
    pub fn has_dynamic_property(&self, ty: DynamicPropertyType) -> bool {
        ty == DynamicPropertyType::GradingTone && read_property(self.binding.handle()).is_dynamic()
    }

    /// The live parameter handle.
    pub fn dynamic_property(&self, ty: DynamicPropertyType) -> GradingResult<SharedGradingTone> {
        if ty != DynamicPropertyType::GradingTone {
            return Err(unsupported_property());
        }
        let handle = self.binding.handle();
        if !read_property(handle).is_dynamic() {
            return Err(GradingError::InvalidDynamicProperty(
                "GradingTone property is not dynamic.".into(),
            ));
        }
        Ok(Arc::clone(handle))
    }

    /// Merge this renderer's parameters with a handle shared by siblings.
    ///
    /// An empty `slot` receives a dynamic copy of the current parameters; a
    /// filled one is adopted as is. Either way the renderer ends up bound to
    /// the handle in `slot`.
    pub fn unify_dynamic_property(
        &mut self,
        ty: DynamicPropertyType,
        slot: &mut Option<SharedGradingTone>,
    ) -> GradingResult<()> {
        if ty != DynamicPropertyType::GradingTone {
            return Err(unsupported_property());
        }

        let first = slot.is_none();
        let handle = slot
            .get_or_insert_with(|| read_property(self.binding.handle()).create_editable_copy());
        self.binding = ToneBinding::Shared(Arc::clone(handle));

        debug!(first, "GradingTone dynamic property unified");
        Ok(())
    }

    /// Grade `num_pixels` RGBA pixels from `src` into `dst`.
    pub fn apply(&self, src: &[f32], dst: &mut [f32], num_pixels: usize) -> GradingResult<()> {
        self.check_direction()?;
        let len = required_len(num_pixels, src.len())?;
        required_len(num_pixels, dst.len())?;

        dst[..len].copy_from_slice(&src[..len]);
        self.render(&mut dst[..len]);
        Ok(())
    }

    /// Grade `num_pixels` RGBA pixels of `buf` in place.
    pub fn apply_inplace(&self, buf: &mut [f32], num_pixels: usize) -> GradingResult<()> {
        self.check_direction()?;
        let len = required_len(num_pixels, buf.len())?;
        self.render(&mut buf[..len]);
        Ok(())
    }

    fn check_direction(&self) -> GradingResult<()> {
        if self.variant.is_inverse() {
            return Err(GradingError::NotImplemented(
                "GradingTone inverse CPU not implemented.".into(),
            ));
        }
        Ok(())
    }

    /// Grade `buf` in place; the parameters are read once for the whole buffer.
    fn render(&self, buf: &mut [f32]) {
        let prop = read_property(self.binding.handle());
        if prop.local_bypass() {
            return;
        }

        let num_pixels = buf.len() / CHANNELS;
        let strategy = self.options.strategy;
        let split = self.options.splits(num_pixels);
        trace!(num_pixels, ?strategy, split, "GradingTone apply");

        let kernel = ToneKernel::new(&prop, self.variant.is_linear());

        #[cfg(feature = "parallel")]
        if split {
            buf.par_chunks_mut(self.options.chunk_len() * CHANNELS)
                .for_each(|chunk| kernel.run(chunk, strategy));
            return;
        }

        kernel.run(buf, strategy);
    }
}

fn unsupported_property() -> GradingError {
    GradingError::InvalidDynamicProperty("Dynamic property type not supported by GradingTone.".into())
}

/// Float count for `num_pixels`, checked against a buffer length.
fn required_len(num_pixels: usize, actual: usize) -> GradingResult<usize> {
    let expected = num_pixels.checked_mul(CHANNELS).unwrap_or(usize::MAX);
    if actual < expected {
        return Err(GradingError::BufferSize { expected, actual });
    }
    Ok(expected)
}

/// Grade one RGB triple forward.
///
/// # Example
///
/// ```rust
/// use vfx_grading::{apply_grading_tone, GradingStyle, GradingTone, GradingTonePreRender};
///
/// let mut tone = GradingTone::new(GradingStyle::Log);
/// tone.s_contrast = 1.2;
/// let pr = GradingTonePreRender::new(GradingStyle::Log, &tone);
///
/// let mut rgb = [0.6_f32, 0.4, 0.2];
/// apply_grading_tone(GradingStyle::Log, &pr, &tone, &mut rgb);
/// assert!(rgb[0] > 0.6 && rgb[2] < 0.2);
/// ```
pub fn apply_grading_tone(
    style: GradingStyle,
    pr: &GradingTonePreRender,
    tone: &GradingTone,
    rgb: &mut [f32; 3],
) {
    if pr.local_bypass {
        return;
    }
    let kernel = ToneKernel {
        tone,
        pr,
        linear: style.is_linear(),
    };
    *rgb = kernel.grade(Triple(*rgb)).0;
}

/// Grade packed RGBA pixels forward, in place. Trailing floats that do not
/// make a whole pixel are left alone.
pub fn apply_grading_tone_rgba(
    style: GradingStyle,
    pr: &GradingTonePreRender,
    tone: &GradingTone,
    pixels: &mut [f32],
) {
    if pr.local_bypass {
        return;
    }
    let kernel = ToneKernel {
        tone,
        pr,
        linear: style.is_linear(),
    };
    kernel.run(pixels, ExecutionStrategy::Vectorized);
}
