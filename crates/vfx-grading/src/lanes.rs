//! Lane abstraction shared by every curve evaluator.
//!
//! Curves are written once against [`Lanes`] and instantiated for:
//!
//! - `f32` - one component of one pixel (R, G or B pass)
//! - [`Triple<f32>`] - the full RGB of one pixel (Master pass, s-contrast)
//! - `f32x8` - one component of eight pixels (vectorized R, G or B pass)
//! - [`Triple<f32x8>`] - the full RGB of eight pixels (vectorized Master pass)
//!
//! Branches are expressed as [`Lanes::select_lt`], so every instantiation
//! picks segments the same way and only differs in how many values it
//! carries.

use std::ops::{Add, Div, Mul, Sub};

use wide::{f32x8, CmpGe, CmpLt};

/// Number of pixels processed together by the vectorized strategy.
pub const BATCH: usize = 8;

/// Elementwise float arithmetic over one or more lanes.
pub trait Lanes:
    Copy + Add<Output = Self> + Sub<Output = Self> + Mul<Output = Self> + Div<Output = Self>
{
    /// Broadcast a scalar to every lane.
    fn splat(v: f32) -> Self;

    /// Lane-wise square root.
    fn sqrt(self) -> Self;

    /// Lane-wise base-2 logarithm.
    fn log2(self) -> Self;

    /// Lane-wise `2^self`.
    fn exp2(self) -> Self;

    /// Lane-wise `if self < limit { below } else { above }`.
    ///
    /// NaN lanes compare false and take `above`.
    fn select_lt(self, limit: Self, below: Self, above: Self) -> Self;
}

impl Lanes for f32 {
    #[inline(always)]
    fn splat(v: f32) -> Self {
        v
    }

    #[inline(always)]
    fn sqrt(self) -> Self {
        f32::sqrt(self)
    }

    #[inline(always)]
    fn log2(self) -> Self {
        f32::log2(self)
    }

    #[inline(always)]
    fn exp2(self) -> Self {
        f32::exp2(self)
    }

    #[inline(always)]
    fn select_lt(self, limit: Self, below: Self, above: Self) -> Self {
        if self < limit { below } else { above }
    }
}

impl Lanes for f32x8 {
    #[inline(always)]
    fn splat(v: f32) -> Self {
        f32x8::splat(v)
    }

    #[inline(always)]
    fn sqrt(self) -> Self {
        f32x8::sqrt(self)
    }

    #[inline(always)]
    fn log2(self) -> Self {
        f32x8::ln(self) * f32x8::splat(std::f32::consts::LOG2_E)
    }

    /// `wide`'s `exp` returns 0 outside `|x| < 87.3`, so the power is taken
    /// as the square of its half; overflow and NaN then follow `f32::exp2`.
    #[inline(always)]
    fn exp2(self) -> Self {
        let root = f32x8::exp(self * f32x8::splat(0.5 * std::f32::consts::LN_2));
        let out = self
            .cmp_ge(f32x8::splat(128.0))
            .blend(f32x8::splat(f32::INFINITY), root * root);
        self.is_nan().blend(self, out)
    }

    #[inline(always)]
    fn select_lt(self, limit: Self, below: Self, above: Self) -> Self {
        self.cmp_lt(limit).blend(below, above)
    }
}

/// Three lanes of `L` evaluated together: the R, G and B of a pixel (or of a
/// batch of pixels).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triple<L>(pub [L; 3]);

impl<L: Copy> Triple<L> {
    /// Create from three components.
    #[inline(always)]
    pub fn new(r: L, g: L, b: L) -> Self {
        Self([r, g, b])
    }

    #[inline(always)]
    fn zip(self, rhs: Self, f: impl Fn(L, L) -> L) -> Self {
        Self([f(self.0[0], rhs.0[0]), f(self.0[1], rhs.0[1]), f(self.0[2], rhs.0[2])])
    }

    #[inline(always)]
    fn map(self, f: impl Fn(L) -> L) -> Self {
        Self([f(self.0[0]), f(self.0[1]), f(self.0[2])])
    }
}

macro_rules! triple_op {
    ($trait:ident, $method:ident) => {
        impl<L: Lanes> $trait for Triple<L> {
            type Output = Self;

            #[inline(always)]
            fn $method(self, rhs: Self) -> Self {
                self.zip(rhs, |a, b| a.$method(b))
            }
        }
    };
}

triple_op!(Add, add);
triple_op!(Sub, sub);
triple_op!(Mul, mul);
triple_op!(Div, div);

impl<L: Lanes> Lanes for Triple<L> {
    #[inline(always)]
    fn splat(v: f32) -> Self {
        Self([L::splat(v); 3])
    }

    #[inline(always)]
    fn sqrt(self) -> Self {
        self.map(L::sqrt)
    }

    #[inline(always)]
    fn log2(self) -> Self {
        self.map(L::log2)
    }

    #[inline(always)]
    fn exp2(self) -> Self {
        self.map(L::exp2)
    }

    #[inline(always)]
    fn select_lt(self, limit: Self, below: Self, above: Self) -> Self {
        Self([
            self.0[0].select_lt(limit.0[0], below.0[0], above.0[0]),
            self.0[1].select_lt(limit.0[1], below.0[1], above.0[1]),
            self.0[2].select_lt(limit.0[2], below.0[2], above.0[2]),
        ])
    }
}
