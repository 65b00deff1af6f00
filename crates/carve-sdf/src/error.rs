//! Error types for program validation

use crate::Opcode;
use thiserror::Error;

/// Structural problems found by [`Program::validate`](crate::Program::validate).
///
/// Programs built with the combinators never produce these; they guard
/// programs assembled by hand with [`Program::from_parts`](crate::Program::from_parts).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProgramError {
    /// The word stream is empty
    #[error("Program has no words")]
    Empty,

    /// An immediate appeared where an opcode was expected
    #[error("Expected an opcode at word {index}, found an immediate")]
    StrayImmediate { index: usize },

    /// An opcode is missing some of its immediates
    #[error("Opcode {opcode} at word {index} needs {expected} immediates")]
    MissingImmediates {
        index: usize,
        opcode: Opcode,
        expected: usize,
    },

    /// An operator popped more values than the stack held
    #[error("Opcode {opcode} at word {index} underflows the value stack")]
    StackUnderflow { index: usize, opcode: Opcode },

    /// The stream did not reduce to exactly one value
    #[error("Program leaves {remaining} values on the stack, expected 1")]
    Unbalanced { remaining: usize },

    /// Leaf opcodes and transforms are out of step
    #[error("Program has {leaves} leaves but {transforms} transforms")]
    TransformCount { leaves: usize, transforms: usize },

    /// Declared stack depth differs from the real high-water mark
    #[error("Declared stack depth {declared}, but evaluation needs {required}")]
    StackDepth { declared: usize, required: usize },
}
