//! GradingTone: zone-based tonal adjustments.
//!
//! Reference: OCIO ops/gradingtone/GradingToneOpCPU.cpp
//!
//! Five tonal bands, each with RGBM (red, green, blue, master) controls:
//! - **Blacks**: toe (lift/crush)
//! - **Shadows**: lower half, around the shadow pivot
//! - **Midtones**: gamma-like adjustment around the middle of the range
//! - **Highlights**: upper half, around the highlight pivot
//! - **Whites**: shoulder (extend/compress)
//!
//! plus an s-contrast curve around a pivot. A value of 1.0 is neutral.
//!
//! # Grading Styles
//!
//! - **Log**: log footage, graded in place over [0, 1].
//! - **Linear**: scene-linear footage, graded in a log-like encoding.
//! - **Video**: display-referred footage, graded in place with video defaults.
//!
//! # Example
//!
//! ```
//! use vfx_grading::grading_tone::*;
//!
//! let mut tone = GradingTone::new(GradingStyle::Log);
//! tone.midtones.master = 1.3;
//! tone.s_contrast = 1.1;
//!
//! let pr = GradingTonePreRender::new(GradingStyle::Log, &tone);
//!
//! let mut rgb = [0.18_f32, 0.18, 0.18];
//! apply_grading_tone(GradingStyle::Log, &pr, &tone, &mut rgb);
//! ```
//!
//! Only the forward direction renders on the CPU; an inverse renderer
//! reports [`GradingError::NotImplemented`](crate::GradingError::NotImplemented).

pub mod curves;
mod dynamic;
pub mod linlog;
mod op_data;
mod prerender;
mod renderer;
mod types;

pub use dynamic::{
    read_property, write_property, DynamicPropertyGradingTone, DynamicPropertyType,
    SharedGradingTone, ToneBinding,
};
pub use op_data::GradingToneOpData;
pub use prerender::{
    ContrastSegment, FauxCubic, GainedQuad, GradingTonePreRender, MidtoneSpline, StyleParams,
};
pub use renderer::{
    apply_grading_tone, apply_grading_tone_rgba, GradingToneCpu, RenderVariant, MAX_HALF_FLOAT,
};
pub use types::{
    Band, GradingRGBMSW, GradingStyle, GradingTone, RGBMChannel, TransformDirection, MAX_CONTROL,
    MIN_CONTROL,
};
