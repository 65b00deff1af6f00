//! Signed distance fields
//!
//! Anything that can report the distance from a point to its surface is an
//! [`Sdf`]. Negative values are inside, positive values are outside, and zero
//! is exactly on the surface. Compiled [`Program`]s are the main
//! implementation; [`FnSdf`] wraps a closure for tests and prototyping.
//!
//! ## Example
//!
//! ```rust
//! use carve_core::prelude::*;
//!
//! let ball = sphere(2.0);
//! assert!((ball.distance(Vec3::new(0.0, 0.0, 3.0)) - 2.0).abs() < 1e-6);
//! assert!(ball.gradient(Vec3::new(0.0, 0.0, 3.0)).abs_diff_eq(Vec3::Z, 1e-3));
//! ```

pub mod eval;
pub mod gradient;

use carve_sdf::Program;
use glam::Vec3;

/// The core SDF trait - any type that can compute distance from a point
pub trait Sdf: Send + Sync {
    /// Calculate the signed distance from point `p` to the surface.
    fn distance(&self, p: Vec3) -> f32;

    /// Unit surface normal estimate at `p`.
    ///
    /// Returns the zero vector only where the field is flat in every
    /// direction sampled.
    fn gradient(&self, p: Vec3) -> Vec3 {
        gradient::estimate(self, p, gradient::DEFAULT_EPSILON)
    }
}

impl Sdf for Program {
    fn distance(&self, p: Vec3) -> f32 {
        eval::eval(self, p)
    }
}

impl<T: Sdf + ?Sized> Sdf for &T {
    fn distance(&self, p: Vec3) -> f32 {
        (**self).distance(p)
    }

    fn gradient(&self, p: Vec3) -> Vec3 {
        (**self).gradient(p)
    }
}

impl<T: Sdf + ?Sized> Sdf for Box<T> {
    fn distance(&self, p: Vec3) -> f32 {
        (**self).distance(p)
    }

    fn gradient(&self, p: Vec3) -> Vec3 {
        (**self).gradient(p)
    }
}

/// A distance field backed by a closure.
#[derive(Clone, Copy)]
pub struct FnSdf<F>(pub F);

impl<F> Sdf for FnSdf<F>
where
    F: Fn(Vec3) -> f32 + Send + Sync,
{
    fn distance(&self, p: Vec3) -> f32 {
        (self.0)(p)
    }
}

impl<F> std::fmt::Debug for FnSdf<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FnSdf")
    }
}
