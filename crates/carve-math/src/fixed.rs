//! Q16.16 fixed-point scalar
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  i64 layout                                                  │
//! │  [S][IIII...IIII (47 bits)][FFFFFFFFFFFFFFFF (16 bits)]      │
//! │                                                              │
//! │  Precision: 1/65536 ≈ 0.0000153 units, everywhere            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Multiplication and division widen to `i128` before shifting so that no
//! intermediate overflows or loses fractional bits. Results that do not fit
//! back into 64 bits saturate, like the float conversions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{
    Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Rem, RemAssign, Sub, SubAssign,
};

/// Number of fractional bits.
const FRACTION_BITS: u32 = 16;

/// Raw value of 1.0.
const UNIT: i64 = 1 << FRACTION_BITS;

/// Mask selecting the fractional bits of a raw value.
const FRACTION_MASK: i64 = UNIT - 1;

/// Narrow a widened raw value, saturating at the `i64` bounds.
#[inline]
pub(crate) fn saturate(wide: i128) -> i64 {
    wide.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

/// Signed Q16.16 fixed-point number backed by an `i64`.
///
/// Ordering, equality and negation work directly on the raw integer.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixedInt(i64);

impl FixedInt {
    /// 0.0
    pub const ZERO: Self = Self(0);
    /// 1.0
    pub const ONE: Self = Self(UNIT);
    /// 0.5
    pub const HALF: Self = Self(UNIT / 2);
    /// Smallest positive value (1/65536).
    pub const EPSILON: Self = Self(1);
    /// Largest representable value.
    pub const MAX: Self = Self(i64::MAX);
    /// Smallest representable value.
    pub const MIN: Self = Self(i64::MIN);
    /// Raw value of 1.0.
    pub const UNIT_VALUE: i64 = UNIT;

    /// Construct directly from raw Q16.16 bits.
    #[inline]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw Q16.16 representation.
    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Construct from a whole number. Saturates outside the representable range.
    #[inline]
    pub const fn from_int(n: i64) -> Self {
        Self(n.saturating_mul(UNIT))
    }

    /// Convert from `f32`, rounding to the nearest representable value.
    ///
    /// NaN maps to zero and out-of-range values saturate.
    #[inline]
    pub fn from_f32(f: f32) -> Self {
        Self::from_f64(f64::from(f))
    }

    /// Convert from `f64`, rounding to the nearest representable value.
    ///
    /// NaN maps to zero and out-of-range values saturate.
    #[inline]
    pub fn from_f64(f: f64) -> Self {
        // float -> int `as` casts saturate and send NaN to 0
        Self((f * UNIT as f64).round() as i64)
    }

    #[inline]
    pub fn to_f32(self) -> f32 {
        self.to_f64() as f32
    }

    #[inline]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / UNIT as f64
    }

    /// Integer part, rounding the fraction half-to-even.
    #[inline]
    pub fn to_int(self) -> i64 {
        let whole = self.0 >> FRACTION_BITS;
        let fraction = self.0 & FRACTION_MASK;
        let half = UNIT / 2;
        if fraction > half || (fraction == half && whole & 1 != 0) {
            whole + 1
        } else {
            whole
        }
    }

    /// Round to the nearest whole value, ties to even (banker's rounding).
    #[inline]
    pub fn round(self) -> Self {
        Self::from_int(self.to_int())
    }

    /// Largest whole value not greater than `self`.
    #[inline]
    pub const fn floor(self) -> Self {
        Self(self.0 & !FRACTION_MASK)
    }

    /// Smallest whole value not less than `self`.
    #[inline]
    pub const fn ceil(self) -> Self {
        if self.0 & FRACTION_MASK == 0 {
            self
        } else {
            Self((self.0 & !FRACTION_MASK).saturating_add(UNIT))
        }
    }

    /// Fractional part, always in `[0, 1)`.
    #[inline]
    pub const fn fract(self) -> Self {
        Self(self.0 & FRACTION_MASK)
    }

    #[inline]
    pub const fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    #[inline]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Square root, computed through an `f64` intermediate.
    ///
    /// Negative inputs yield zero.
    pub fn sqrt(self) -> Self {
        if self.0 <= 0 {
            return Self::ZERO;
        }
        // sqrt(raw / U) * U == sqrt(raw * U)
        Self(((self.0 as f64) * UNIT as f64).sqrt().round() as i64)
    }

    /// Split the raw bits into `(low, high)` 32-bit halves.
    ///
    /// Shader uniforms and vertex channels are limited to 32-bit lanes; the
    /// renderer recombines the halves with [`FixedInt::join`].
    #[inline]
    pub const fn split(self) -> (u32, u32) {
        let bits = self.0 as u64;
        (bits as u32, (bits >> 32) as u32)
    }

    /// Rebuild a value from the halves produced by [`FixedInt::split`].
    #[inline]
    pub const fn join(low: u32, high: u32) -> Self {
        Self((((high as u64) << 32) | low as u64) as i64)
    }
}

impl fmt::Debug for FixedInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedInt({} = {:#x})", self.to_f64(), self.0)
    }
}

impl fmt::Display for FixedInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_f64(), f)
    }
}

impl From<i32> for FixedInt {
    fn from(n: i32) -> Self {
        Self::from_int(i64::from(n))
    }
}

impl From<f32> for FixedInt {
    fn from(f: f32) -> Self {
        Self::from_f32(f)
    }
}

impl From<f64> for FixedInt {
    fn from(f: f64) -> Self {
        Self::from_f64(f)
    }
}

impl From<FixedInt> for f32 {
    fn from(v: FixedInt) -> Self {
        v.to_f32()
    }
}

impl From<FixedInt> for f64 {
    fn from(v: FixedInt) -> Self {
        v.to_f64()
    }
}

// ============================================================================
// Arithmetic
// ============================================================================

impl Add for FixedInt {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for FixedInt {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul for FixedInt {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self(saturate((i128::from(self.0) * i128::from(rhs.0)) >> FRACTION_BITS))
    }
}

impl Div for FixedInt {
    type Output = Self;

    /// # Panics
    ///
    /// Panics when `rhs` is zero, like integer division.
    #[inline]
    fn div(self, rhs: Self) -> Self {
        Self(saturate((i128::from(self.0) << FRACTION_BITS) / i128::from(rhs.0)))
    }
}

impl Rem for FixedInt {
    type Output = Self;
    #[inline]
    fn rem(self, rhs: Self) -> Self {
        Self(self.0 % rhs.0)
    }
}

impl Neg for FixedInt {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

macro_rules! impl_assign_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait for FixedInt {
            #[inline]
            fn $method(&mut self, rhs: Self) {
                *self = *self $op rhs;
            }
        }
    };
}

impl_assign_op!(AddAssign, add_assign, +);
impl_assign_op!(SubAssign, sub_assign, -);
impl_assign_op!(MulAssign, mul_assign, *);
impl_assign_op!(DivAssign, div_assign, /);
impl_assign_op!(RemAssign, rem_assign, %);

impl Sum for FixedInt {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}
