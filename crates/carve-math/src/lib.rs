//! Carve Math - world-scale numerics shared by every Carve crate
//!
//! Two concerns live here:
//!
//! - [`FixedInt`] and [`Fixie`]: a Q16.16 fixed-point scalar stored in an `i64`
//!   and its three-lane vector. Authoritative world positions are kept in this
//!   form so that precision does not degrade far from the origin.
//! - [`Transform`]: the immutable rotation + translation + uniform scale that
//!   every leaf of a compiled SDF program carries.
//!
//! # Example
//!
//! ```rust
//! use carve_math::{Fixie, FixedInt, Transform};
//! use glam::Vec3;
//!
//! let far_away = Fixie::from_vec3(Vec3::new(1.0e6, 0.25, -3.5));
//! let nudged = far_away + Fixie::from_vec3(Vec3::new(0.0, 0.0, 0.5));
//! assert_eq!(nudged.z, FixedInt::from_f32(-3.0));
//!
//! let t = Transform::IDENTITY.translate(Vec3::X).scale(2.0);
//! let p = Vec3::new(0.5, 1.0, -1.0);
//! assert!((t.apply_inverse(t.apply(p)) - p).length() < 1e-5);
//! ```

mod fixed;
mod fixie;
mod transform;

pub use fixed::FixedInt;
pub use fixie::{Fixie, SplitFixie};
pub use transform::Transform;
