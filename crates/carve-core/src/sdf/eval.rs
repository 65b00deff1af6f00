//! Stack-machine evaluator for compiled programs
//!
//! Walks the word stream once per query. Leaves map the query point into
//! their local frame, push a distance and consume the next leaf transform;
//! operators pop their operands and push the combined distance. The value
//! stack is a [`SmallVec`] sized to the program's declared depth, so typical
//! scenes never touch the heap.

use carve_sdf::{Opcode, Program, Word};
use glam::{Vec2, Vec3, Vec3Swizzles};
use rayon::prelude::*;
use smallvec::SmallVec;

/// Stack slots kept inline before spilling to the heap.
const INLINE_STACK: usize = 16;

type ValueStack = SmallVec<[f32; INLINE_STACK]>;

/// Evaluate the signed distance of `program` at `point`.
///
/// Every [`Program`] is validated when it is built, whether by the
/// `carve_sdf` combinators or by [`Program::from_parts`], so evaluation
/// cannot fail. The internal assertions guard the stack discipline only.
pub fn eval(program: &Program, point: Vec3) -> f32 {
    let words = program.words();
    let depth = program.stack_depth();
    let mut stack = ValueStack::with_capacity(depth);
    let mut transforms = program.leaf_transforms().iter();
    let mut pc = 0;

    while pc < words.len() {
        let Word::Op(opcode) = words[pc] else {
            panic!("malformed program: immediate at word {pc} where an opcode was expected");
        };
        let args = immediates(words, pc, opcode);
        pc += 1 + opcode.immediate_count();

        let value = match opcode {
            Opcode::Union | Opcode::Inter | Opcode::Diff => {
                let (lhs, rhs) = pop_pair(&mut stack, opcode);
                combine(opcode, lhs, rhs, 0.0)
            }
            Opcode::BlendUnion | Opcode::BlendInter | Opcode::BlendDiff => {
                let (lhs, rhs) = pop_pair(&mut stack, opcode);
                combine(opcode, lhs, rhs, args[0])
            }
            Opcode::Flate => pop(&mut stack, opcode) - args[0],
            leaf => {
                let Some(transform) = transforms.next() else {
                    panic!("malformed program: no transform left for {leaf} at word {pc}");
                };
                let local = transform.apply_inverse(point);
                leaf_distance(leaf, &args, local) * transform.scalation
            }
        };

        assert!(
            stack.len() < depth,
            "malformed program: value stack exceeds declared depth {depth}"
        );
        stack.push(value);
    }

    assert!(
        stack.len() == 1,
        "malformed program: {} values left on the stack",
        stack.len()
    );
    stack[0]
}

/// Evaluate `program` at many points in parallel.
pub fn eval_batch(program: &Program, points: &[Vec3]) -> Vec<f32> {
    points.par_iter().map(|&p| eval(program, p)).collect()
}

fn immediates(words: &[Word], pc: usize, opcode: Opcode) -> [f32; 3] {
    let mut args = [0.0; 3];
    for (i, slot) in args.iter_mut().take(opcode.immediate_count()).enumerate() {
        match words.get(pc + 1 + i) {
            Some(Word::Imm(v)) => *slot = *v,
            _ => panic!("malformed program: {opcode} at word {pc} is missing immediates"),
        }
    }
    args
}

fn pop(stack: &mut ValueStack, opcode: Opcode) -> f32 {
    match stack.pop() {
        Some(v) => v,
        None => panic!("malformed program: stack underflow at {opcode}"),
    }
}

/// Pops the right operand first: it was pushed last.
fn pop_pair(stack: &mut ValueStack, opcode: Opcode) -> (f32, f32) {
    let rhs = pop(stack, opcode);
    let lhs = pop(stack, opcode);
    (lhs, rhs)
}

// ============================================================================
// Operators
// ============================================================================

fn combine(opcode: Opcode, a: f32, b: f32, t: f32) -> f32 {
    match opcode {
        Opcode::Union => a.min(b),
        Opcode::Inter => a.max(b),
        Opcode::Diff => a.max(-b),
        Opcode::BlendUnion => {
            let h = (t - (a - b).abs()).max(0.0);
            a.min(b) - h * h * 0.25 / t
        }
        Opcode::BlendInter => {
            let h = (t - (a - b).abs()).max(0.0);
            a.max(b) + h * h * 0.25 / t
        }
        Opcode::BlendDiff => {
            let h = (t - (a + b).abs()).max(0.0);
            a.max(-b) + h * h * 0.25 / t
        }
        _ => unreachable!("{opcode} is not a binary operator"),
    }
}

// ============================================================================
// Primitives
// ============================================================================

fn leaf_distance(opcode: Opcode, args: &[f32; 3], p: Vec3) -> f32 {
    let [a, b, c] = *args;
    match opcode {
        Opcode::Sphere => p.length() - a,
        Opcode::Ellipsoid => ellipsoid(p, Vec3::new(a, b, c)),
        Opcode::Box => cuboid(p, Vec3::new(a, b, c)),
        Opcode::Torus => torus(p, a, b),
        Opcode::Cylinder => cylinder(p, a, b),
        Opcode::Cone => capped_cone(p, a, 0.0, b),
        Opcode::Coninder => capped_cone(p, a, b, c),
        Opcode::Plane => p.dot(Vec3::new(a, b, c)),
        _ => unreachable!("{opcode} is not a leaf"),
    }
}

/// Bound rather than exact; the center falls back to the smallest radius.
fn ellipsoid(p: Vec3, radii: Vec3) -> f32 {
    let k0 = (p / radii).length();
    let k1 = (p / (radii * radii)).length();
    if k1 == 0.0 {
        return -radii.min_element();
    }
    k0 * (k0 - 1.0) / k1
}

fn cuboid(p: Vec3, half_extents: Vec3) -> f32 {
    let q = p.abs() - half_extents;
    q.max(Vec3::ZERO).length() + q.max_element().min(0.0)
}

fn torus(p: Vec3, major: f32, minor: f32) -> f32 {
    let q = Vec2::new(p.xy().length() - major, p.z);
    q.length() - minor
}

fn cylinder(p: Vec3, radius: f32, half_height: f32) -> f32 {
    let d = Vec2::new(p.xy().length(), p.z).abs() - Vec2::new(radius, half_height);
    d.max_element().min(0.0) + d.max(Vec2::ZERO).length()
}

/// Exact capped cone along Z: radius `r1` at `-h`, `r2` at `+h`.
fn capped_cone(p: Vec3, r1: f32, r2: f32, h: f32) -> f32 {
    let q = Vec2::new(p.xy().length(), p.z);
    let k1 = Vec2::new(r2, h);
    let k2 = Vec2::new(r2 - r1, 2.0 * h);
    let cap_radius = if q.y < 0.0 { r1 } else { r2 };
    let ca = Vec2::new(q.x - q.x.min(cap_radius), q.y.abs() - h);
    let cb = q - k1 + k2 * ((k1 - q).dot(k2) / k2.length_squared()).clamp(0.0, 1.0);
    let sign = if cb.x < 0.0 && ca.y < 0.0 { -1.0 } else { 1.0 };
    sign * ca.length_squared().min(cb.length_squared()).sqrt()
}
