//! Opcode and word definitions for compiled SDF programs

use std::fmt;

/// Operation codes of the SDF stack machine.
///
/// Leaves push one distance; binary operators pop two and push one; `Flate`
/// pops one and pushes one. Every opcode is followed in the word stream by
/// exactly [`Opcode::immediate_count`] immediates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    // === Leaves ===
    /// radius
    Sphere,
    /// radii (x, y, z)
    Ellipsoid,
    /// half extents (x, y, z)
    Box,
    /// major radius, minor radius
    Torus,
    /// radius, half height
    Cylinder,
    /// base radius, half height
    Cone,
    /// bottom radius, top radius, half height
    Coninder,
    /// unit normal (x, y, z)
    Plane,

    // === Operators ===
    Union,
    Inter,
    Diff,
    /// threshold
    BlendUnion,
    /// threshold
    BlendInter,
    /// threshold
    BlendDiff,
    /// amount
    Flate,
}

impl Opcode {
    /// Number of immediate words that follow this opcode.
    pub const fn immediate_count(self) -> usize {
        match self {
            Self::Union | Self::Inter | Self::Diff => 0,
            Self::Sphere
            | Self::BlendUnion
            | Self::BlendInter
            | Self::BlendDiff
            | Self::Flate => 1,
            Self::Torus | Self::Cylinder | Self::Cone => 2,
            Self::Ellipsoid | Self::Box | Self::Coninder | Self::Plane => 3,
        }
    }

    /// Returns true for primitives, which consume one leaf transform.
    pub const fn is_leaf(self) -> bool {
        matches!(
            self,
            Self::Sphere
                | Self::Ellipsoid
                | Self::Box
                | Self::Torus
                | Self::Cylinder
                | Self::Cone
                | Self::Coninder
                | Self::Plane
        )
    }

    /// Number of values popped from the evaluation stack.
    pub const fn operand_count(self) -> usize {
        match self {
            Self::Union
            | Self::Inter
            | Self::Diff
            | Self::BlendUnion
            | Self::BlendInter
            | Self::BlendDiff => 2,
            Self::Flate => 1,
            _ => 0,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Sphere => "sphere",
            Self::Ellipsoid => "ellipsoid",
            Self::Box => "box",
            Self::Torus => "torus",
            Self::Cylinder => "cylinder",
            Self::Cone => "cone",
            Self::Coninder => "coninder",
            Self::Plane => "plane",
            Self::Union => "union",
            Self::Inter => "inter",
            Self::Diff => "diff",
            Self::BlendUnion => "blend_union",
            Self::BlendInter => "blend_inter",
            Self::BlendDiff => "blend_diff",
            Self::Flate => "flate",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One cell of a program: either an opcode or a float immediate.
///
/// Which one is expected at a given index is fixed by the program structure;
/// the tag only lets the evaluator detect a malformed stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Word {
    Op(Opcode),
    Imm(f32),
}

impl From<Opcode> for Word {
    fn from(op: Opcode) -> Self {
        Self::Op(op)
    }
}

impl From<f32> for Word {
    fn from(v: f32) -> Self {
        Self::Imm(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Opcode; 15] = [
        Opcode::Sphere,
        Opcode::Ellipsoid,
        Opcode::Box,
        Opcode::Torus,
        Opcode::Cylinder,
        Opcode::Cone,
        Opcode::Coninder,
        Opcode::Plane,
        Opcode::Union,
        Opcode::Inter,
        Opcode::Diff,
        Opcode::BlendUnion,
        Opcode::BlendInter,
        Opcode::BlendDiff,
        Opcode::Flate,
    ];

    #[test]
    fn test_eight_leaves_seven_operators() {
        assert_eq!(ALL.iter().filter(|op| op.is_leaf()).count(), 8);
        assert_eq!(ALL.iter().filter(|op| op.operand_count() > 0).count(), 7);
    }

    #[test]
    fn test_leaves_pop_nothing() {
        for op in ALL.iter().filter(|op| op.is_leaf()) {
            assert_eq!(op.operand_count(), 0, "{op}");
            assert!(op.immediate_count() >= 1, "{op}");
        }
    }

    #[test]
    fn test_blends_carry_a_threshold() {
        assert_eq!(Opcode::Union.immediate_count(), 0);
        assert_eq!(Opcode::BlendUnion.immediate_count(), 1);
        assert_eq!(Opcode::BlendDiff.immediate_count(), 1);
    }
}
