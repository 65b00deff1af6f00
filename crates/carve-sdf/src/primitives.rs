//! Leaf constructors
//!
//! All primitives are centered at the origin with Z as the up axis. Sizes are
//! given as full diameters/extents and stored as radii/half-extents, which is
//! what the evaluator consumes. Use the spatial wrappers on [`Program`] to
//! position them.

use crate::{Opcode, Program};
use glam::Vec3;

/// Sphere of the given diameter.
pub fn sphere(diameter: f32) -> Program {
    Program::leaf(Opcode::Sphere, &[diameter * 0.5])
}

/// Axis-aligned ellipsoid with the given diameters along X, Y and Z.
pub fn ellipsoid(dx: f32, dy: f32, dz: f32) -> Program {
    Program::leaf(Opcode::Ellipsoid, &[dx * 0.5, dy * 0.5, dz * 0.5])
}

/// Axis-aligned box with the given full sizes.
pub fn box3(sx: f32, sy: f32, sz: f32) -> Program {
    Program::leaf(Opcode::Box, &[sx * 0.5, sy * 0.5, sz * 0.5])
}

/// Cube with the given edge length.
pub fn cube(size: f32) -> Program {
    box3(size, size, size)
}

/// Torus lying in the XY plane.
///
/// `major_diameter` spans the ring's center line, `minor_diameter` is the
/// thickness of the tube.
pub fn torus(major_diameter: f32, minor_diameter: f32) -> Program {
    Program::leaf(Opcode::Torus, &[major_diameter * 0.5, minor_diameter * 0.5])
}

/// Capped cylinder along Z.
pub fn cylinder(diameter: f32, height: f32) -> Program {
    Program::leaf(Opcode::Cylinder, &[diameter * 0.5, height * 0.5])
}

/// Cone along Z with its base at `-height/2` and apex at `+height/2`.
pub fn cone(diameter: f32, height: f32) -> Program {
    Program::leaf(Opcode::Cone, &[diameter * 0.5, height * 0.5])
}

/// Truncated cone along Z, blending a cone into a cylinder.
///
/// Equal diameters give a cylinder; a zero `top_diameter` gives a cone.
pub fn coninder(bottom_diameter: f32, top_diameter: f32, height: f32) -> Program {
    Program::leaf(
        Opcode::Coninder,
        &[bottom_diameter * 0.5, top_diameter * 0.5, height * 0.5],
    )
}

/// Half-space through the origin; positive on the side `normal` points to.
///
/// The normal is normalized on construction.
///
/// # Panics
///
/// Panics if the normal has zero length.
pub fn plane(nx: f32, ny: f32, nz: f32) -> Program {
    let n = Vec3::new(nx, ny, nz);
    assert!(
        n.length_squared() > 0.0 && n.is_finite(),
        "plane normal must be non-zero and finite, got {n}"
    );
    let n = n.normalize();
    Program::leaf(Opcode::Plane, &[n.x, n.y, n.z])
}

/// The `z = 0` ground plane, solid below.
pub fn ground() -> Program {
    plane(0.0, 0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Word;

    fn immediates(p: &Program) -> Vec<f32> {
        p.words()
            .iter()
            .filter_map(|w| match w {
                Word::Imm(v) => Some(*v),
                Word::Op(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_sizes_are_halved() {
        assert_eq!(immediates(&sphere(3.0)), [1.5]);
        assert_eq!(immediates(&box3(2.0, 4.0, 8.0)), [1.0, 2.0, 4.0]);
        assert_eq!(immediates(&cylinder(1.0, 3.0)), [0.5, 1.5]);
        assert_eq!(immediates(&torus(4.0, 1.0)), [2.0, 0.5]);
        assert_eq!(immediates(&ellipsoid(2.0, 4.0, 6.0)), [1.0, 2.0, 3.0]);
        assert_eq!(immediates(&cone(2.0, 2.0)), [1.0, 1.0]);
        assert_eq!(immediates(&coninder(4.0, 2.0, 6.0)), [2.0, 1.0, 3.0]);
    }

    #[test]
    fn test_plane_normal_is_normalized() {
        assert_eq!(immediates(&plane(0.0, 0.0, 5.0)), [0.0, 0.0, 1.0]);
        assert_eq!(ground(), plane(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_every_leaf_is_valid() {
        for p in [
            sphere(1.0),
            ellipsoid(1.0, 2.0, 3.0),
            cube(1.0),
            torus(2.0, 0.5),
            cylinder(1.0, 2.0),
            cone(1.0, 2.0),
            coninder(1.0, 0.5, 2.0),
            ground(),
        ] {
            assert_eq!(p.validate(), Ok(()));
            assert_eq!(p.stack_depth(), 1);
            assert_eq!(p.leaf_count(), 1);
        }
    }

    #[test]
    #[should_panic(expected = "plane normal")]
    fn test_zero_plane_normal_is_rejected() {
        let _ = plane(0.0, 0.0, 0.0);
    }
}
