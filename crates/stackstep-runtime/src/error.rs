//! Error taxonomy for the simulator
//!
//! Every error here is a programming or invocation error of the simulated
//! program, never a transient condition: nothing is retried and nothing is
//! silently defaulted. The step loop halts on the first error.

use crate::value::ValueKind;
use thiserror::Error;

/// Fatal simulation error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MachineError {
    /// A typed accessor named a variable the frame never declared.
    #[error("variable '{name}' is not declared in this frame")]
    UndeclaredName { name: String },

    /// `declare` was called twice for the same name in one frame.
    #[error("variable '{name}' is already declared in this frame")]
    DuplicateName { name: String },

    /// A typed accessor asked for a different variant than the slot holds.
    #[error("variable '{name}' holds {found}, expected {expected}")]
    TypeMismatch {
        name: String,
        expected: ValueKind,
        found: ValueKind,
    },

    /// `pop` or `top(k)` reached past the bottom of the call stack.
    #[error("call stack underflow: wanted frame {wanted} from the top, depth is {depth}")]
    StackUnderflow { depth: usize, wanted: usize },

    /// A dynamic jump named an address outside the transition table.
    #[error("unknown address '{label}'")]
    UnknownAddress { label: String },

    /// The simulated program's `n` argument was missing or non-numeric.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },
}
