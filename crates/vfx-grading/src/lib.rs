//! # vfx-grading
//!
//! CPU rendering of the GradingTone color operator for VFX pipelines.
//!
//! GradingTone reshapes the tonal response of an image with five bands
//! (blacks, shadows, midtones, highlights, whites), each with red, green,
//! blue and master controls, followed by an s-contrast curve. Pixels are
//! packed RGBA `f32`; alpha passes through untouched.
//!
//! # Modules
//!
//! - [`grading_tone`] - parameters, coefficient tables, curves and the renderer
//! - [`lanes`] - the lane abstraction the curves are written against
//!
//! # Example
//!
//! ```rust
//! use vfx_grading::{
//!     GradingStyle, GradingTone, GradingToneCpu, GradingToneOpData, RenderOptions,
//!     TransformDirection,
//! };
//!
//! let mut tone = GradingTone::new(GradingStyle::Linear);
//! tone.whites.master = 0.8;
//! tone.s_contrast = 1.2;
//!
//! let op = GradingToneOpData::new(GradingStyle::Linear, tone, TransformDirection::Forward)?;
//! let cpu = GradingToneCpu::new(&op, RenderOptions::default());
//!
//! let mut pixels = vec![0.18_f32; 64 * 4];
//! cpu.apply_inplace(&mut pixels, 64)?;
//! # Ok::<(), vfx_grading::GradingError>(())
//! ```
//!
//! # Features
//!
//! - `parallel` (default): split large buffers across the rayon thread pool.
//! - `serde`: `Serialize`/`Deserialize` for parameters and options.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod grading_tone;
pub mod lanes;
mod options;

pub use error::{GradingError, GradingResult};
pub use grading_tone::{
    apply_grading_tone, apply_grading_tone_rgba, DynamicPropertyGradingTone, DynamicPropertyType,
    GradingRGBMSW, GradingStyle, GradingTone, GradingToneCpu, GradingToneOpData,
    GradingTonePreRender, RGBMChannel, RenderVariant, SharedGradingTone, ToneBinding,
    TransformDirection,
};
pub use options::{ExecutionStrategy, RenderOptions};
