//! Carve SDF - CSG expressions compiled to flat bytecode
//!
//! Shapes are built with pure combinators. Each call returns a new
//! [`Program`]: a word stream for a small stack machine plus one rigid
//! transform per leaf. Evaluation lives in `carve-core`; this crate only
//! defines the representation and how to build it.
//!
//! ## Example
//!
//! ```rust
//! use carve_sdf::{box3, cylinder, sphere};
//! use glam::Vec3;
//!
//! let body = box3(2.0, 2.0, 1.0).blend_union(&sphere(1.5).translate(Vec3::Z * 0.5), 0.2);
//! let hole = cylinder(0.5, 4.0);
//! let part = body.diff(&hole).rotate_z(0.3);
//!
//! assert_eq!(part.leaf_count(), 3);
//! assert!(part.validate().is_ok());
//! ```

mod error;
mod opcode;
mod primitives;
mod program;

pub use error::ProgramError;
pub use opcode::{Opcode, Word};
pub use primitives::{box3, cone, coninder, cube, cylinder, ellipsoid, ground, plane, sphere, torus};
pub use program::Program;

// Transforms are part of the program representation
pub use carve_math::Transform;
