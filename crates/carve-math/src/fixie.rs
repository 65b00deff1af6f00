//! Three-lane fixed-point vector for authoritative world positions

use crate::FixedInt;
use crate::fixed::saturate;
use bytemuck::{Pod, Zeroable};
use glam::{DVec3, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Rem, Sub, SubAssign};

/// Q16.16 fixed-point 3D vector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fixie {
    pub x: FixedInt,
    pub y: FixedInt,
    pub z: FixedInt,
}

impl Fixie {
    pub const ZERO: Self = Self::splat(FixedInt::ZERO);

    #[inline]
    pub const fn new(x: FixedInt, y: FixedInt, z: FixedInt) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn splat(v: FixedInt) -> Self {
        Self::new(v, v, v)
    }

    /// Construct from whole-number components.
    #[inline]
    pub const fn from_ints(x: i64, y: i64, z: i64) -> Self {
        Self::new(
            FixedInt::from_int(x),
            FixedInt::from_int(y),
            FixedInt::from_int(z),
        )
    }

    #[inline]
    pub fn from_vec3(v: Vec3) -> Self {
        Self::new(v.x.into(), v.y.into(), v.z.into())
    }

    #[inline]
    pub fn from_dvec3(v: DVec3) -> Self {
        Self::new(v.x.into(), v.y.into(), v.z.into())
    }

    /// Lossy conversion for field queries and rendering.
    #[inline]
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x.to_f32(), self.y.to_f32(), self.z.to_f32())
    }

    #[inline]
    pub fn to_dvec3(self) -> DVec3 {
        DVec3::new(self.x.to_f64(), self.y.to_f64(), self.z.to_f64())
    }

    /// Offset from `origin` as a float vector.
    ///
    /// The subtraction happens in fixed point, so the result stays precise
    /// even when both positions are far from the world origin.
    #[inline]
    pub fn relative_to(self, origin: Self) -> Vec3 {
        (self - origin).to_vec3()
    }

    /// Dot product, accumulated in 128 bits before the final shift.
    pub fn dot(self, rhs: Self) -> FixedInt {
        let sum = self.raw_dot(rhs) >> 16;
        FixedInt::from_raw(saturate(sum))
    }

    /// Squared length. Saturates when the true value is not representable.
    #[inline]
    pub fn length_squared(self) -> FixedInt {
        self.dot(self)
    }

    /// Euclidean length.
    ///
    /// The squared magnitude is kept in raw 128-bit form and promoted through
    /// `f64` for the square root, so it does not saturate for large vectors.
    pub fn length(self) -> FixedInt {
        let raw_squared = self.raw_dot(self);
        FixedInt::from_raw((raw_squared as f64).sqrt().round() as i64)
    }

    /// Unit direction and magnitude.
    ///
    /// A zero vector yields `(Fixie::ZERO, FixedInt::ZERO)`.
    pub fn normalize(self) -> (Self, FixedInt) {
        let magnitude = self.length();
        if magnitude == FixedInt::ZERO {
            return (Self::ZERO, FixedInt::ZERO);
        }
        (self / magnitude, magnitude)
    }

    /// Rotate by a floating-point quaternion.
    ///
    /// This is an approximation: the vector is converted to `f64`, rotated,
    /// and converted back instead of rotating in fixed point. The error grows
    /// with distance from the origin.
    pub fn rotate(self, rotation: Quat) -> Self {
        Self::from_dvec3(rotation.as_dquat() * self.to_dvec3())
    }

    #[inline]
    pub fn lerp(self, rhs: Self, t: FixedInt) -> Self {
        self + (rhs - self) * t
    }

    /// Split every lane into 32-bit halves for upload to the GPU.
    pub fn split(self) -> SplitFixie {
        let (xl, xh) = self.x.split();
        let (yl, yh) = self.y.split();
        let (zl, zh) = self.z.split();
        SplitFixie {
            low: [xl, yl, zl],
            _pad0: 0,
            high: [xh, yh, zh],
            _pad1: 0,
        }
    }

    fn raw_dot(self, rhs: Self) -> i128 {
        i128::from(self.x.raw()) * i128::from(rhs.x.raw())
            + i128::from(self.y.raw()) * i128::from(rhs.y.raw())
            + i128::from(self.z.raw()) * i128::from(rhs.z.raw())
    }
}

/// GPU layout of a [`Fixie`]: the low and high 32-bit halves of each lane.
///
/// Matches a WGSL `struct { low: vec3<u32>, high: vec3<u32> }` with each
/// `vec3` padded to 16 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct SplitFixie {
    pub low: [u32; 3],
    _pad0: u32,
    pub high: [u32; 3],
    _pad1: u32,
}

impl SplitFixie {
    /// Recombine the halves into the original position, bit for bit.
    pub fn join(&self) -> Fixie {
        Fixie::new(
            FixedInt::join(self.low[0], self.high[0]),
            FixedInt::join(self.low[1], self.high[1]),
            FixedInt::join(self.low[2], self.high[2]),
        )
    }
}

impl From<Fixie> for SplitFixie {
    fn from(v: Fixie) -> Self {
        v.split()
    }
}

impl From<SplitFixie> for Fixie {
    fn from(v: SplitFixie) -> Self {
        v.join()
    }
}

// ============================================================================
// Componentwise arithmetic
// ============================================================================

macro_rules! impl_lane_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait for Fixie {
            type Output = Self;
            #[inline]
            fn $method(self, rhs: Self) -> Self {
                Self::new(self.x $op rhs.x, self.y $op rhs.y, self.z $op rhs.z)
            }
        }

        impl $trait<FixedInt> for Fixie {
            type Output = Self;
            #[inline]
            fn $method(self, rhs: FixedInt) -> Self {
                Self::new(self.x $op rhs, self.y $op rhs, self.z $op rhs)
            }
        }
    };
}

impl_lane_op!(Add, add, +);
impl_lane_op!(Sub, sub, -);
impl_lane_op!(Mul, mul, *);
impl_lane_op!(Div, div, /);
impl_lane_op!(Rem, rem, %);

impl Neg for Fixie {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl AddAssign for Fixie {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Fixie {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl From<Vec3> for Fixie {
    fn from(v: Vec3) -> Self {
        Self::from_vec3(v)
    }
}

impl From<Fixie> for Vec3 {
    fn from(v: Fixie) -> Self {
        v.to_vec3()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_componentwise_ops() {
        let a = Fixie::from_ints(1, 2, 3);
        let b = Fixie::from_vec3(Vec3::new(0.5, -1.0, 2.0));

        assert_eq!((a + b).to_vec3(), Vec3::new(1.5, 1.0, 5.0));
        assert_eq!((a - b).to_vec3(), Vec3::new(0.5, 3.0, 1.0));
        assert_eq!((a * b).to_vec3(), Vec3::new(0.5, -2.0, 6.0));
        assert_eq!((a / b).to_vec3(), Vec3::new(2.0, -2.0, 1.5));
        assert_eq!((a % Fixie::splat(FixedInt::from_int(2))).to_vec3(), Vec3::new(1.0, 0.0, 1.0));
        assert_eq!((-a).to_vec3(), Vec3::new(-1.0, -2.0, -3.0));
    }

    #[test]
    fn test_dot_and_length() {
        let v = Fixie::from_ints(3, 4, 12);
        assert_eq!(v.dot(v), FixedInt::from_int(169));
        assert_eq!(v.length(), FixedInt::from_int(13));
    }

    #[test]
    fn test_length_does_not_saturate_far_from_origin() {
        // 2^35 units: the squared length is far beyond i64 in raw form
        let v = Fixie::from_ints(1 << 35, 0, 0);
        assert_eq!(v.length(), FixedInt::from_int(1 << 35));
        assert_eq!(v.length_squared(), FixedInt::MAX);
    }

    #[test]
    fn test_normalize_returns_direction_and_magnitude() {
        let (dir, mag) = Fixie::from_ints(0, -5, 0).normalize();
        assert_eq!(mag, FixedInt::from_int(5));
        assert_eq!(dir, Fixie::from_ints(0, -1, 0));

        let (dir, mag) = Fixie::ZERO.normalize();
        assert_eq!(mag, FixedInt::ZERO);
        assert_eq!(dir, Fixie::ZERO);
    }

    #[test]
    fn test_rotation_is_approximate_but_close() {
        let v = Fixie::from_ints(10, 0, 0);
        let r = v.rotate(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2));
        let out = r.to_vec3();
        assert_abs_diff_eq!(out.x, 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(out.y, 10.0, epsilon = 1e-3);
        assert_abs_diff_eq!(out.z, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_far_positions_keep_relative_precision() {
        let origin = Fixie::from_ints(50_000_000, -20_000_000, 7);
        let p = origin + Fixie::from_vec3(Vec3::new(0.125, 0.5, -0.25));
        assert_eq!(p.relative_to(origin), Vec3::new(0.125, 0.5, -0.25));
    }

    #[test]
    fn test_split_round_trip_is_bit_exact() {
        let v = Fixie::new(
            FixedInt::from_raw(-0x7123_4567_89ab_cdef),
            FixedInt::from_raw(42),
            FixedInt::from_raw(i64::MIN),
        );
        let split = v.split();
        assert_eq!(split.join(), v);

        let bytes: &[u8] = bytemuck::bytes_of(&split);
        assert_eq!(bytes.len(), 32);
    }

    #[test]
    fn test_lerp_midpoint() {
        let a = Fixie::from_ints(0, 0, 0);
        let b = Fixie::from_ints(2, -4, 8);
        assert_eq!(a.lerp(b, FixedInt::HALF), Fixie::from_ints(1, -2, 4));
    }

    #[test]
    fn test_scaling_saturates_per_lane() {
        let far = Fixie::from_ints(1 << 24, -(1 << 24), 3);
        let scaled = far * FixedInt::from_int(1 << 24);
        assert_eq!(scaled.x, FixedInt::MAX);
        assert_eq!(scaled.y, FixedInt::MIN);
        assert_eq!(scaled.z, FixedInt::from_int(3 << 24));
    }
}
