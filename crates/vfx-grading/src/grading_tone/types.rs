//! GradingTone parameter types.
//!
//! Reference: OCIO include/OpenColorIO/OpenColorTransforms.h

use crate::{GradingError, GradingResult};

/// Lowest accepted control value.
pub const MIN_CONTROL: f64 = 0.01;
/// Highest accepted control value.
pub const MAX_CONTROL: f64 = 1.99;

/// Grading style of the footage the op is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GradingStyle {
    /// Log-encoded footage, graded in place.
    #[default]
    Log,
    /// Scene-linear footage, graded in a log-like encoding.
    Linear,
    /// Display-referred video footage, graded in place.
    Video,
}

impl GradingStyle {
    /// True for the style that converts to and from a log encoding around the curves.
    #[inline]
    pub fn is_linear(self) -> bool {
        self == GradingStyle::Linear
    }
}

/// Direction of the op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransformDirection {
    /// Apply the grade.
    #[default]
    Forward,
    /// Undo the grade. Not available on the CPU renderer.
    Inverse,
}

/// Channel index for RGBM controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum RGBMChannel {
    /// Red channel.
    R = 0,
    /// Green channel.
    G = 1,
    /// Blue channel.
    B = 2,
    /// Master: one curve applied to the whole RGB triple.
    M = 3,
}

impl RGBMChannel {
    /// All channels: R, G, B, M.
    pub const ALL: [RGBMChannel; 4] = [
        RGBMChannel::R,
        RGBMChannel::G,
        RGBMChannel::B,
        RGBMChannel::M,
    ];

    /// RGB channels only (no Master).
    pub const RGB: [RGBMChannel; 3] = [RGBMChannel::R, RGBMChannel::G, RGBMChannel::B];
}

/// Tonal band with an RGBM control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    /// Gamma-like adjustment around the middle of the range.
    Midtones,
    /// Upper half, pivoting on the highlight start.
    Highlights,
    /// Shoulder.
    Whites,
    /// Lower half, pivoting on the shadow start.
    Shadows,
    /// Toe.
    Blacks,
}

impl Band {
    /// Order in which the forward renderer evaluates the bands.
    pub const RENDER_ORDER: [Band; 5] = [
        Band::Midtones,
        Band::Highlights,
        Band::Whites,
        Band::Shadows,
        Band::Blacks,
    ];

    /// Lower-case name used in messages.
    pub fn name(self) -> &'static str {
        match self {
            Band::Midtones => "midtones",
            Band::Highlights => "highlights",
            Band::Whites => "whites",
            Band::Shadows => "shadows",
            Band::Blacks => "blacks",
        }
    }
}

/// RGBM + Start/Width parameters for a tonal band.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GradingRGBMSW {
    /// Red channel adjustment (1.0 = no change).
    pub red: f64,
    /// Green channel adjustment (1.0 = no change).
    pub green: f64,
    /// Blue channel adjustment (1.0 = no change).
    pub blue: f64,
    /// Master adjustment (1.0 = no change).
    pub master: f64,
    /// Start position of the band.
    pub start: f64,
    /// Width (or pivot, for highlights and shadows) of the band.
    pub width: f64,
}

impl GradingRGBMSW {
    /// Neutral RGBM with the given start/width.
    pub fn identity(start: f64, width: f64) -> Self {
        Self {
            red: 1.0,
            green: 1.0,
            blue: 1.0,
            master: 1.0,
            start,
            width,
        }
    }

    /// Create with all values specified.
    pub fn new(red: f64, green: f64, blue: f64, master: f64, start: f64, width: f64) -> Self {
        Self { red, green, blue, master, start, width }
    }

    /// True when all four RGBM controls are exactly 1.0.
    pub fn is_identity(&self) -> bool {
        self.red == 1.0 && self.green == 1.0 && self.blue == 1.0 && self.master == 1.0
    }

    /// Control for one channel.
    #[inline]
    pub fn get(&self, channel: RGBMChannel) -> f64 {
        match channel {
            RGBMChannel::R => self.red,
            RGBMChannel::G => self.green,
            RGBMChannel::B => self.blue,
            RGBMChannel::M => self.master,
        }
    }

    /// Mutable control for one channel.
    #[inline]
    pub fn get_mut(&mut self, channel: RGBMChannel) -> &mut f64 {
        match channel {
            RGBMChannel::R => &mut self.red,
            RGBMChannel::G => &mut self.green,
            RGBMChannel::B => &mut self.blue,
            RGBMChannel::M => &mut self.master,
        }
    }

    fn validate(&self, band: Band) -> GradingResult<()> {
        for channel in RGBMChannel::ALL {
            let v = self.get(channel);
            if !v.is_finite() || !(MIN_CONTROL..=MAX_CONTROL).contains(&v) {
                return Err(GradingError::InvalidParameter(format!(
                    "GradingTone {} {:?} value {} is outside [{}, {}]",
                    band.name(),
                    channel,
                    v,
                    MIN_CONTROL,
                    MAX_CONTROL
                )));
            }
        }
        if !self.start.is_finite() || !self.width.is_finite() {
            return Err(GradingError::InvalidParameter(format!(
                "GradingTone {} start/width must be finite",
                band.name()
            )));
        }
        Ok(())
    }
}

impl Default for GradingRGBMSW {
    fn default() -> Self {
        Self::identity(0.0, 1.0)
    }
}

/// GradingTone parameters: five tonal bands plus s-contrast.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GradingTone {
    /// Blacks control (toe).
    pub blacks: GradingRGBMSW,
    /// Shadows control.
    pub shadows: GradingRGBMSW,
    /// Midtones control.
    pub midtones: GradingRGBMSW,
    /// Highlights control.
    pub highlights: GradingRGBMSW,
    /// Whites control (shoulder).
    pub whites: GradingRGBMSW,
    /// S-contrast (1.0 = no change).
    pub s_contrast: f64,
}

impl GradingTone {
    /// Neutral parameters with the start/width defaults of the given style.
    pub fn new(style: GradingStyle) -> Self {
        match style {
            GradingStyle::Log => Self {
                blacks: GradingRGBMSW::identity(0.4, 0.4),
                shadows: GradingRGBMSW::identity(0.5, 0.0),
                midtones: GradingRGBMSW::identity(0.4, 0.6),
                highlights: GradingRGBMSW::identity(0.3, 1.0),
                whites: GradingRGBMSW::identity(0.4, 0.5),
                s_contrast: 1.0,
            },
            GradingStyle::Linear => Self {
                blacks: GradingRGBMSW::identity(0.0, 4.0),
                shadows: GradingRGBMSW::identity(2.0, -7.0),
                midtones: GradingRGBMSW::identity(0.0, 8.0),
                highlights: GradingRGBMSW::identity(-2.0, 9.0),
                whites: GradingRGBMSW::identity(0.0, 8.0),
                s_contrast: 1.0,
            },
            GradingStyle::Video => Self {
                blacks: GradingRGBMSW::identity(0.4, 0.4),
                shadows: GradingRGBMSW::identity(0.6, 0.0),
                midtones: GradingRGBMSW::identity(0.4, 0.7),
                highlights: GradingRGBMSW::identity(0.2, 1.0),
                whites: GradingRGBMSW::identity(0.5, 0.5),
                s_contrast: 1.0,
            },
        }
    }

    /// Controls of one band.
    #[inline]
    pub fn band(&self, band: Band) -> &GradingRGBMSW {
        match band {
            Band::Midtones => &self.midtones,
            Band::Highlights => &self.highlights,
            Band::Whites => &self.whites,
            Band::Shadows => &self.shadows,
            Band::Blacks => &self.blacks,
        }
    }

    /// Mutable controls of one band.
    #[inline]
    pub fn band_mut(&mut self, band: Band) -> &mut GradingRGBMSW {
        match band {
            Band::Midtones => &mut self.midtones,
            Band::Highlights => &mut self.highlights,
            Band::Whites => &mut self.whites,
            Band::Shadows => &mut self.shadows,
            Band::Blacks => &mut self.blacks,
        }
    }

    /// True when no band and no contrast would change a pixel.
    pub fn is_identity(&self) -> bool {
        Band::RENDER_ORDER.iter().all(|b| self.band(*b).is_identity()) && self.s_contrast == 1.0
    }

    /// Check control ranges before a coefficient table is derived.
    pub fn validate(&self) -> GradingResult<()> {
        for band in Band::RENDER_ORDER {
            self.band(band).validate(band)?;
        }
        if !self.s_contrast.is_finite() || !(MIN_CONTROL..=MAX_CONTROL).contains(&self.s_contrast) {
            return Err(GradingError::InvalidParameter(format!(
                "GradingTone s-contrast value {} is outside [{}, {}]",
                self.s_contrast, MIN_CONTROL, MAX_CONTROL
            )));
        }
        Ok(())
    }
}

impl Default for GradingTone {
    fn default() -> Self {
        Self::new(GradingStyle::Log)
    }
}
