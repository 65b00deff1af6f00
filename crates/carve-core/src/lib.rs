//! # Carve Core
//!
//! Queries over compiled CSG distance fields.
//!
//! Shapes are built with the `carve_sdf` combinators and evaluated here by a
//! small stack machine. On top of the evaluator sit a normal estimator, three
//! sphere-tracing queries and a movement integrator that steps fixed-point
//! bodies through the field.
//!
//! ## Quick Start
//!
//! ```rust
//! use carve_core::prelude::*;
//!
//! // A rounded pillar standing on the ground
//! let pillar = cylinder(1.0, 4.0)
//!     .blend_union(&sphere(1.6).translate(Vec3::new(0.0, 0.0, 2.0)), 0.2)
//!     .translate(Vec3::new(0.0, 0.0, 2.0));
//! let scene = ground().union(&pillar);
//!
//! // Drop a body onto it
//! let (position, velocity) = integrate_movement(
//!     &scene,
//!     Fixie::from_ints(3, 0, 2),
//!     Vec3::new(0.0, 0.0, -1.0),
//!     0.5,
//! );
//! assert!(scene.distance(position.to_vec3()) > 0.0);
//! assert_eq!(velocity, Vec3::new(0.0, 0.0, -1.0));
//! ```
//!
//! ## Units and Conventions
//!
//! - **Coordinate system**: Right-handed, Z-up
//! - **Angles**: All rotation functions use **radians**
//! - **Sizes**: Primitives take diameters and full extents
//! - **Precision**: Field queries use `f32`; body positions are Q16.16 fixed point

pub mod config;
pub mod movement;
pub mod sdf;
pub mod trace;

mod error;

pub use config::{MovementConfig, TraceConfig};
pub use error::{Error, Result};
pub use movement::{Body, MovementIntegrator, integrate_batch, integrate_movement};
pub use sdf::eval::{eval, eval_batch};
pub use sdf::{FnSdf, Sdf};
pub use trace::{Hit, SphereTracer, Travel, light_trace, trace, travel_trace};

/// Prelude module for convenient imports
pub mod prelude {
    // Shapes
    pub use carve_sdf::{
        Program, box3, cone, coninder, cube, cylinder, ellipsoid, ground, plane, sphere, torus,
    };

    // Queries
    pub use crate::movement::{Body, MovementIntegrator, integrate_movement};
    pub use crate::sdf::{FnSdf, Sdf};
    pub use crate::trace::{SphereTracer, light_trace, trace, travel_trace};
    pub use crate::{MovementConfig, TraceConfig};

    // Math
    pub use carve_math::{FixedInt, Fixie, Transform};
    pub use glam::{Quat, Vec3};

    // Error handling
    pub use crate::{Error, Result};
}
