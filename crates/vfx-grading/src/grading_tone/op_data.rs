//! GradingTone operator description.

use std::sync::Arc;

use super::dynamic::{read_property, write_property, DynamicPropertyGradingTone, SharedGradingTone};
use super::types::{GradingStyle, GradingTone, TransformDirection};
use crate::GradingResult;

/// Style, direction and parameters of one GradingTone op.
///
/// The op owns a [`SharedGradingTone`]; renderers built from it hold the
/// same handle, so edits made through [`GradingToneOpData::dynamic_property`]
/// reach them.
#[derive(Debug, Clone)]
pub struct GradingToneOpData {
    style: GradingStyle,
    direction: TransformDirection,
    property: SharedGradingTone,
}

impl GradingToneOpData {
    /// Validate `value` and build the op.
    pub fn new(
        style: GradingStyle,
        value: GradingTone,
        direction: TransformDirection,
    ) -> GradingResult<Self> {
        let property = DynamicPropertyGradingTone::new(style, value)?.into_shared();
        Ok(Self {
            style,
            direction,
            property,
        })
    }

    /// Neutral op with the defaults of `style`.
    pub fn identity(style: GradingStyle) -> Self {
        Self {
            style,
            direction: TransformDirection::Forward,
            property: DynamicPropertyGradingTone::identity(style).into_shared(),
        }
    }

    /// Grading style.
    #[inline]
    pub fn style(&self) -> GradingStyle {
        self.style
    }

    /// Transform direction.
    #[inline]
    pub fn direction(&self) -> TransformDirection {
        self.direction
    }

    /// Snapshot of the current parameters.
    pub fn value(&self) -> GradingTone {
        read_property(&self.property).value().clone()
    }

    /// Replace the parameters.
    pub fn set_value(&self, value: GradingTone) -> GradingResult<()> {
        write_property(&self.property).set_value(value)
    }

    /// True when the current parameters leave pixels unchanged.
    pub fn is_identity(&self) -> bool {
        read_property(&self.property).local_bypass()
    }

    /// Flag the parameters as runtime-editable.
    pub fn make_dynamic(&self) {
        write_property(&self.property).make_dynamic();
    }

    /// Whether the parameters are runtime-editable.
    pub fn is_dynamic(&self) -> bool {
        read_property(&self.property).is_dynamic()
    }

    /// The op's property handle.
    pub fn dynamic_property(&self) -> SharedGradingTone {
        Arc::clone(&self.property)
    }
}
