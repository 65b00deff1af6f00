//! Compiled SDF programs and the combinators that build them
//!
//! A [`Program`] is immutable. Every combinator borrows its operands and
//! returns a new program by concatenation, so sub-expressions can be reused in
//! as many places as needed.

use crate::{Opcode, ProgramError, Word};
use carve_math::Transform;
use glam::{Quat, Vec3};
use std::fmt;

/// Flat stack-machine bytecode with one transform per leaf.
///
/// Invariants upheld by every constructor in this crate:
/// - each opcode is followed by its [`Opcode::immediate_count`] immediates
/// - `leaf_transforms[i]` belongs to the i-th leaf opcode in `words`
/// - `stack_depth` is exactly the evaluator's value-stack high-water mark
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    words: Vec<Word>,
    leaf_transforms: Vec<Transform>,
    stack_depth: usize,
}

impl Program {
    /// Single leaf with an identity transform.
    pub(crate) fn leaf(opcode: Opcode, immediates: &[f32]) -> Self {
        debug_assert!(opcode.is_leaf());
        debug_assert_eq!(immediates.len(), opcode.immediate_count());

        let mut words = Vec::with_capacity(1 + immediates.len());
        words.push(Word::Op(opcode));
        words.extend(immediates.iter().copied().map(Word::Imm));

        Self {
            words,
            leaf_transforms: vec![Transform::IDENTITY],
            stack_depth: 1,
        }
    }

    /// Assemble a program from raw parts, checking every invariant.
    pub fn from_parts(
        words: Vec<Word>,
        leaf_transforms: Vec<Transform>,
        stack_depth: usize,
    ) -> Result<Self, ProgramError> {
        let program = Self {
            words,
            leaf_transforms,
            stack_depth,
        };
        program.validate()?;
        Ok(program)
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn leaf_transforms(&self) -> &[Transform] {
        &self.leaf_transforms
    }

    /// Value-stack slots needed to evaluate this program.
    pub fn stack_depth(&self) -> usize {
        self.stack_depth
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_transforms.len()
    }

    // ========================================================================
    // Boolean and blend operators
    // ========================================================================

    /// `min(self, rhs)`
    pub fn union(&self, rhs: &Self) -> Self {
        self.binary(rhs, Opcode::Union, None)
    }

    /// `max(self, rhs)`
    pub fn inter(&self, rhs: &Self) -> Self {
        self.binary(rhs, Opcode::Inter, None)
    }

    /// `max(self, -rhs)`: carve `rhs` out of `self`
    pub fn diff(&self, rhs: &Self) -> Self {
        self.binary(rhs, Opcode::Diff, None)
    }

    /// Union with a quadratic fillet of width `threshold`.
    ///
    /// # Panics
    ///
    /// Panics if `threshold` is not positive.
    pub fn blend_union(&self, rhs: &Self, threshold: f32) -> Self {
        self.binary(rhs, Opcode::BlendUnion, Some(threshold))
    }

    /// Intersection with a quadratic fillet of width `threshold`.
    ///
    /// # Panics
    ///
    /// Panics if `threshold` is not positive.
    pub fn blend_inter(&self, rhs: &Self, threshold: f32) -> Self {
        self.binary(rhs, Opcode::BlendInter, Some(threshold))
    }

    /// Difference with a quadratic fillet of width `threshold`.
    ///
    /// # Panics
    ///
    /// Panics if `threshold` is not positive.
    pub fn blend_diff(&self, rhs: &Self, threshold: f32) -> Self {
        self.binary(rhs, Opcode::BlendDiff, Some(threshold))
    }

    /// Grow the surface outward by `amount` (shrink it when negative).
    pub fn flate(&self, amount: f32) -> Self {
        let mut words = Vec::with_capacity(self.words.len() + 2);
        words.extend_from_slice(&self.words);
        words.push(Word::Op(Opcode::Flate));
        words.push(Word::Imm(amount));

        Self {
            words,
            leaf_transforms: self.leaf_transforms.clone(),
            stack_depth: self.stack_depth,
        }
    }

    fn binary(&self, rhs: &Self, opcode: Opcode, threshold: Option<f32>) -> Self {
        if let Some(t) = threshold {
            assert!(
                t > 0.0 && t.is_finite(),
                "{opcode} threshold must be positive and finite, got {t}"
            );
        }

        let mut words = Vec::with_capacity(self.words.len() + rhs.words.len() + 2);
        words.extend_from_slice(&self.words);
        words.extend_from_slice(&rhs.words);
        words.push(Word::Op(opcode));
        words.extend(threshold.map(Word::Imm));

        let mut leaf_transforms =
            Vec::with_capacity(self.leaf_transforms.len() + rhs.leaf_transforms.len());
        leaf_transforms.extend_from_slice(&self.leaf_transforms);
        leaf_transforms.extend_from_slice(&rhs.leaf_transforms);

        // lhs collapses to one value before rhs starts pushing
        let stack_depth = self.stack_depth.max(rhs.stack_depth + 1);

        Self {
            words,
            leaf_transforms,
            stack_depth,
        }
    }

    // ========================================================================
    // Spatial wrappers
    // ========================================================================

    /// Pass every leaf transform through `f`, leaving the words untouched.
    pub fn map_transforms(&self, f: impl Fn(Transform) -> Transform) -> Self {
        Self {
            words: self.words.clone(),
            leaf_transforms: self.leaf_transforms.iter().copied().map(f).collect(),
            stack_depth: self.stack_depth,
        }
    }

    pub fn translate(&self, offset: Vec3) -> Self {
        self.map_transforms(|t| t.translate(offset))
    }

    /// Rotate about the world origin.
    pub fn rotate(&self, rotation: Quat) -> Self {
        self.map_transforms(|t| t.rotate(rotation))
    }

    /// Rotate about the X axis (radians)
    pub fn rotate_x(&self, angle: f32) -> Self {
        self.rotate(Quat::from_rotation_x(angle))
    }

    /// Rotate about the Y axis (radians)
    pub fn rotate_y(&self, angle: f32) -> Self {
        self.rotate(Quat::from_rotation_y(angle))
    }

    /// Rotate about the Z axis (radians)
    pub fn rotate_z(&self, angle: f32) -> Self {
        self.rotate(Quat::from_rotation_z(angle))
    }

    /// Uniform scale about the world origin.
    ///
    /// # Panics
    ///
    /// Panics if `factor` is not positive.
    pub fn scale(&self, factor: f32) -> Self {
        self.map_transforms(|t| t.scale(factor))
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Re-derive the structure of the word stream and compare it with the
    /// declared transforms and stack depth.
    pub fn validate(&self) -> Result<(), ProgramError> {
        if self.words.is_empty() {
            return Err(ProgramError::Empty);
        }

        let mut height = 0_usize;
        let mut high_water = 0_usize;
        let mut leaves = 0_usize;
        let mut index = 0_usize;

        while index < self.words.len() {
            let Word::Op(opcode) = self.words[index] else {
                return Err(ProgramError::StrayImmediate { index });
            };

            let expected = opcode.immediate_count();
            let immediates = self.words.get(index + 1..=index + expected);
            if !immediates.is_some_and(|imms| imms.iter().all(|w| matches!(w, Word::Imm(_)))) {
                return Err(ProgramError::MissingImmediates {
                    index,
                    opcode,
                    expected,
                });
            }

            if opcode.is_leaf() {
                leaves += 1;
                height += 1;
            } else {
                let popped = opcode.operand_count();
                if height < popped {
                    return Err(ProgramError::StackUnderflow { index, opcode });
                }
                height = height - popped + 1;
            }
            high_water = high_water.max(height);
            index += 1 + expected;
        }

        if height != 1 {
            return Err(ProgramError::Unbalanced { remaining: height });
        }
        if leaves != self.leaf_transforms.len() {
            return Err(ProgramError::TransformCount {
                leaves,
                transforms: self.leaf_transforms.len(),
            });
        }
        if high_water != self.stack_depth {
            return Err(ProgramError::StackDepth {
                declared: self.stack_depth,
                required: high_water,
            });
        }
        Ok(())
    }
}

/// Disassembly, one opcode per line with its immediates.
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for word in &self.words {
            match word {
                Word::Op(op) => {
                    if !first {
                        writeln!(f)?;
                    }
                    first = false;
                    write!(f, "{op}")?;
                }
                Word::Imm(v) => write!(f, " {v}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{box3, cylinder, plane, sphere, torus};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_leaf_layout() {
        let s = sphere(2.0);
        assert_eq!(s.words(), &[Word::Op(Opcode::Sphere), Word::Imm(1.0)]);
        assert_eq!(s.leaf_transforms(), &[Transform::IDENTITY]);
        assert_eq!(s.stack_depth(), 1);
    }

    #[test]
    fn test_binary_concatenates_in_order() {
        let a = sphere(2.0);
        let b = box3(2.0, 4.0, 6.0);
        let u = a.union(&b);

        assert_eq!(
            u.words(),
            &[
                Word::Op(Opcode::Sphere),
                Word::Imm(1.0),
                Word::Op(Opcode::Box),
                Word::Imm(1.0),
                Word::Imm(2.0),
                Word::Imm(3.0),
                Word::Op(Opcode::Union),
            ]
        );
        assert_eq!(u.leaf_count(), 2);
        assert_eq!(u.stack_depth(), 2);
    }

    #[test]
    fn test_blend_appends_threshold_after_opcode() {
        let u = sphere(1.0).blend_union(&sphere(1.0), 0.25);
        assert_eq!(
            &u.words()[u.words().len() - 2..],
            &[Word::Op(Opcode::BlendUnion), Word::Imm(0.25)]
        );
    }

    #[test]
    fn test_stack_depth_credits_the_right_operand() {
        let leaf = sphere(1.0);
        let pair = leaf.union(&leaf); // depth 2

        // deep lhs, shallow rhs: max(2, 1 + 1)
        assert_eq!(pair.union(&leaf).stack_depth(), 2);
        // shallow lhs, deep rhs: max(1, 2 + 1)
        assert_eq!(leaf.union(&pair).stack_depth(), 3);
        // right-leaning chain grows by one per level
        let chain = leaf.union(&leaf.union(&leaf.union(&leaf)));
        assert_eq!(chain.stack_depth(), 4);
        // left-leaning chain never grows past two
        let chain = leaf.union(&leaf).union(&leaf).union(&leaf);
        assert_eq!(chain.stack_depth(), 2);

        for p in [pair.union(&leaf), leaf.union(&pair), chain] {
            assert_eq!(p.validate(), Ok(()));
        }
    }

    #[test]
    fn test_flate_keeps_depth_and_transforms() {
        let p = sphere(1.0).union(&torus(2.0, 0.5)).flate(0.1);
        assert_eq!(p.stack_depth(), 2);
        assert_eq!(p.leaf_count(), 2);
        assert_eq!(p.validate(), Ok(()));
    }

    #[test]
    fn test_operands_are_not_mutated() {
        let a = sphere(1.0);
        let before = a.clone();
        let _ = a.union(&a).translate(Vec3::X).flate(0.5);
        assert_eq!(a, before);
    }

    #[test]
    fn test_spatial_wrappers_reach_nested_leaves() {
        let inner = sphere(1.0).translate(Vec3::X);
        let scene = inner
            .union(&box3(1.0, 1.0, 1.0))
            .diff(&cylinder(0.5, 2.0).translate(Vec3::Y))
            .translate(Vec3::Z);

        let t = scene.leaf_transforms();
        assert_eq!(t.len(), 3);
        assert_eq!(t[0].translation, Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(t[1].translation, Vec3::Z);
        assert_eq!(t[2].translation, Vec3::new(0.0, 1.0, 1.0));
        assert_eq!(scene.words(), inner.union(&box3(1.0, 1.0, 1.0)).diff(&cylinder(0.5, 2.0)).words());
    }

    #[test]
    fn test_rotate_and_scale_compose_on_every_leaf() {
        let p = sphere(1.0)
            .translate(Vec3::X)
            .union(&plane(0.0, 0.0, 1.0))
            .rotate_z(std::f32::consts::FRAC_PI_2)
            .scale(2.0);

        let moved = p.leaf_transforms()[0].apply(Vec3::ZERO);
        assert_abs_diff_eq!(moved.x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(moved.y, 2.0, epsilon = 1e-6);
        assert!(p.leaf_transforms().iter().all(|t| t.scalation == 2.0));
    }

    #[test]
    fn test_validate_rejects_malformed_streams() {
        let ok = sphere(1.0).union(&sphere(1.0));

        let err = Program::from_parts(vec![], vec![], 0).unwrap_err();
        assert_eq!(err, ProgramError::Empty);

        let err = Program::from_parts(
            vec![Word::Op(Opcode::Sphere)],
            vec![Transform::IDENTITY],
            1,
        )
        .unwrap_err();
        assert!(matches!(err, ProgramError::MissingImmediates { index: 0, .. }));

        let err = Program::from_parts(
            vec![Word::Imm(1.0)],
            vec![],
            1,
        )
        .unwrap_err();
        assert_eq!(err, ProgramError::StrayImmediate { index: 0 });

        let err = Program::from_parts(
            vec![Word::Op(Opcode::Sphere), Word::Imm(1.0), Word::Op(Opcode::Union)],
            vec![Transform::IDENTITY],
            1,
        )
        .unwrap_err();
        assert!(matches!(err, ProgramError::StackUnderflow { index: 2, .. }));

        let err = Program::from_parts(ok.words().to_vec(), vec![Transform::IDENTITY], 2)
            .unwrap_err();
        assert_eq!(
            err,
            ProgramError::TransformCount {
                leaves: 2,
                transforms: 1
            }
        );

        let err = Program::from_parts(ok.words().to_vec(), ok.leaf_transforms().to_vec(), 5)
            .unwrap_err();
        assert_eq!(
            err,
            ProgramError::StackDepth {
                declared: 5,
                required: 2
            }
        );

        let two_leaves = [&sphere(1.0).words()[..], &sphere(1.0).words()[..]].concat();
        let err = Program::from_parts(two_leaves, vec![Transform::IDENTITY; 2], 2).unwrap_err();
        assert_eq!(err, ProgramError::Unbalanced { remaining: 2 });
    }

    #[test]
    fn test_disassembly() {
        let p = sphere(2.0).blend_diff(&box3(2.0, 2.0, 2.0), 0.5);
        assert_eq!(p.to_string(), "sphere 1\nbox 1 1 1\nblend_diff 0.5");
    }

    #[test]
    #[should_panic(expected = "threshold must be positive")]
    fn test_zero_threshold_is_rejected() {
        let _ = sphere(1.0).blend_inter(&sphere(1.0), 0.0);
    }
}
