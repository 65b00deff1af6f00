//! Normal estimation by finite differences
//!
//! Uses the four-sample tetrahedral stencil: each sample is weighted by its
//! offset direction and the sum normalized. Four evaluations instead of six,
//! with no bias toward any axis.

use super::Sdf;
use glam::Vec3;

/// Sample offset used by [`Sdf::gradient`].
pub const DEFAULT_EPSILON: f32 = 1e-4;

const TETRAHEDRON: [Vec3; 4] = [
    Vec3::new(1.0, -1.0, -1.0),
    Vec3::new(-1.0, -1.0, 1.0),
    Vec3::new(-1.0, 1.0, -1.0),
    Vec3::new(1.0, 1.0, 1.0),
];

/// Unit normal estimate of `sdf` at `p` using samples `epsilon` away.
///
/// If the tetrahedral samples cancel out exactly (a flat or symmetric spot),
/// falls back to forward differences along each axis. Returns the zero
/// vector if those cancel too.
pub fn estimate<S: Sdf + ?Sized>(sdf: &S, p: Vec3, epsilon: f32) -> Vec3 {
    let n = TETRAHEDRON
        .iter()
        .fold(Vec3::ZERO, |acc, &k| acc + k * sdf.distance(p + k * epsilon));
    if n.length_squared() > 0.0 {
        return n.normalize();
    }

    let d = sdf.distance(p);
    Vec3::new(
        sdf.distance(p + Vec3::X * epsilon) - d,
        sdf.distance(p + Vec3::Y * epsilon) - d,
        sdf.distance(p + Vec3::Z * epsilon) - d,
    )
    .normalize_or_zero()
}
