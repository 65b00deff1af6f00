//! Immutable rigid transform with uniform scale

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Rotation, translation and uniform scale of a single SDF leaf.
///
/// Composition never mutates: every method returns a new transform that
/// applies the existing one first and then the new operation in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Unit quaternion
    pub rotation: Quat,
    pub translation: Vec3,
    /// Uniform scale, always positive
    pub scalation: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        rotation: Quat::IDENTITY,
        translation: Vec3::ZERO,
        scalation: 1.0,
    };

    /// # Panics
    ///
    /// Panics if `scalation` is not a positive finite number.
    pub fn new(rotation: Quat, translation: Vec3, scalation: f32) -> Self {
        assert_valid_scale(scalation);
        Self {
            rotation: rotation.normalize(),
            translation,
            scalation,
        }
    }

    /// Move by `offset` after the existing transform.
    #[inline]
    pub fn translate(self, offset: Vec3) -> Self {
        Self {
            translation: self.translation + offset,
            ..self
        }
    }

    /// Rotate about the world origin after the existing transform.
    ///
    /// The composed quaternion is renormalized so repeated composition does
    /// not drift away from unit length.
    #[inline]
    pub fn rotate(self, rotation: Quat) -> Self {
        Self {
            rotation: (rotation * self.rotation).normalize(),
            translation: rotation * self.translation,
            scalation: self.scalation,
        }
    }

    /// Scale about the world origin after the existing transform.
    ///
    /// # Panics
    ///
    /// Panics if `factor` is not a positive finite number.
    #[inline]
    pub fn scale(self, factor: f32) -> Self {
        assert_valid_scale(factor);
        Self {
            rotation: self.rotation,
            translation: self.translation * factor,
            scalation: self.scalation * factor,
        }
    }

    /// Local space to world space: `rotate(p * scale) + translate`.
    #[inline]
    pub fn apply(&self, p: Vec3) -> Vec3 {
        self.rotation * (p * self.scalation) + self.translation
    }

    /// World space to local space: `rotate⁻¹(p - translate) / scale`.
    #[inline]
    pub fn apply_inverse(&self, p: Vec3) -> Vec3 {
        // conjugate == inverse for a unit quaternion
        (self.rotation.conjugate() * (p - self.translation)) / self.scalation
    }
}

fn assert_valid_scale(factor: f32) {
    assert!(
        factor > 0.0 && factor.is_finite(),
        "transform scale must be positive and finite, got {factor}"
    );
}
