//! Runtime-editable GradingTone parameters.
//!
//! A [`DynamicPropertyGradingTone`] keeps the parameter set together with
//! the coefficient table derived from it, so an edit is visible to every
//! renderer holding the same [`SharedGradingTone`] on its next buffer.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use super::prerender::GradingTonePreRender;
use super::types::{GradingStyle, GradingTone};
use crate::GradingResult;

/// Kinds of dynamic property a renderer may be asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DynamicPropertyType {
    /// Exposure of an exposure/contrast op.
    Exposure,
    /// Contrast of an exposure/contrast op.
    Contrast,
    /// Gamma of an exposure/contrast op.
    Gamma,
    /// Primary grading parameters.
    GradingPrimary,
    /// RGB curve grading parameters.
    GradingRgbCurve,
    /// Hue curve grading parameters.
    GradingHueCurve,
    /// Tone grading parameters.
    GradingTone,
}

/// Parameter set, its coefficient table and the dynamic flag.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicPropertyGradingTone {
    style: GradingStyle,
    value: GradingTone,
    computed: GradingTonePreRender,
    is_dynamic: bool,
}

/// Handle shared between the op and every renderer bound to it.
pub type SharedGradingTone = Arc<RwLock<DynamicPropertyGradingTone>>;

impl DynamicPropertyGradingTone {
    /// Validate `value` and derive its table. The property starts out static.
    pub fn new(style: GradingStyle, value: GradingTone) -> GradingResult<Self> {
        value.validate()?;
        let computed = GradingTonePreRender::new(style, &value);
        Ok(Self {
            style,
            value,
            computed,
            is_dynamic: false,
        })
    }

    /// Neutral parameters with the defaults of `style`.
    pub fn identity(style: GradingStyle) -> Self {
        let value = GradingTone::new(style);
        let computed = GradingTonePreRender::new(style, &value);
        Self {
            style,
            value,
            computed,
            is_dynamic: false,
        }
    }

    /// Grading style the table was derived for.
    #[inline]
    pub fn style(&self) -> GradingStyle {
        self.style
    }

    /// Current parameters.
    #[inline]
    pub fn value(&self) -> &GradingTone {
        &self.value
    }

    /// Coefficient table for the current parameters.
    #[inline]
    pub fn computed_value(&self) -> &GradingTonePreRender {
        &self.computed
    }

    /// True when no band and no contrast would change a pixel.
    #[inline]
    pub fn local_bypass(&self) -> bool {
        self.computed.local_bypass
    }

    /// Whether the parameters may be edited at runtime.
    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.is_dynamic
    }

    /// Flag the parameters as runtime-editable.
    pub fn make_dynamic(&mut self) {
        self.is_dynamic = true;
    }

    /// Replace the parameters and recompute the table.
    ///
    /// On error the previous parameters stay in place.
    pub fn set_value(&mut self, value: GradingTone) -> GradingResult<()> {
        value.validate()?;
        self.computed.update(&value);
        self.value = value;
        debug!(
            style = ?self.style,
            bypass = self.computed.local_bypass,
            "GradingTone parameters updated"
        );
        Ok(())
    }

    /// Switch style; the table is rebuilt with the new style constants.
    pub fn set_style(&mut self, style: GradingStyle) {
        if style != self.style {
            self.style = style;
            self.computed = GradingTonePreRender::new(style, &self.value);
        }
    }

    /// Independent dynamic copy behind a fresh handle.
    pub fn create_editable_copy(&self) -> SharedGradingTone {
        let mut copy = self.clone();
        copy.is_dynamic = true;
        Arc::new(RwLock::new(copy))
    }

    /// Move into a new handle.
    pub fn into_shared(self) -> SharedGradingTone {
        Arc::new(RwLock::new(self))
    }
}

/// Read access to a shared property.
///
/// A writer that panicked cannot leave the property half-updated (`set_value`
/// only assigns after validation), so a poisoned lock is read anyway.
pub fn read_property(handle: &SharedGradingTone) -> RwLockReadGuard<'_, DynamicPropertyGradingTone> {
    handle.read().unwrap_or_else(PoisonError::into_inner)
}

/// Write access to a shared property.
pub fn write_property(
    handle: &SharedGradingTone,
) -> RwLockWriteGuard<'_, DynamicPropertyGradingTone> {
    handle.write().unwrap_or_else(PoisonError::into_inner)
}

/// How a renderer holds its parameters.
#[derive(Debug, Clone)]
pub enum ToneBinding {
    /// The op's own handle, not unified with any other renderer.
    Exclusive(SharedGradingTone),
    /// A handle adopted through unification; siblings may hold it too.
    Shared(SharedGradingTone),
}

impl ToneBinding {
    /// The handle regardless of how it was bound.
    #[inline]
    pub fn handle(&self) -> &SharedGradingTone {
        match self {
            ToneBinding::Exclusive(h) | ToneBinding::Shared(h) => h,
        }
    }

    /// True once the renderer has been unified.
    #[inline]
    pub fn is_shared(&self) -> bool {
        matches!(self, ToneBinding::Shared(_))
    }
}
