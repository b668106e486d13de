//! VM execution errors.

use tern_gen::GeneratorError;

/// Errors raised while executing a function body.
///
/// Inside a generator these surface as `GeneratorError::VmExecutionFailed`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum VmError {
    #[error("operand stack underflow in `{function}` at instruction {pc}")]
    StackUnderflow { function: String, pc: usize },

    #[error("unsupported operand types for {op}: {left} and {right}")]
    TypeMismatch {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },

    #[error("call to undefined function {name}()")]
    UnknownFunction { name: String },

    #[error("`{function}` has no argument {index}")]
    ArgumentOutOfRange { function: String, index: usize },

    #[error("`{function}` has no local slot {index}")]
    LocalOutOfRange { function: String, index: usize },

    #[error("jump target {target} is outside `{function}`")]
    InvalidJump { function: String, target: usize },

    #[error("illegal offset type {type_name}")]
    InvalidArrayKey { type_name: &'static str },

    #[error("cannot add element to the array as the next element is already occupied")]
    ArrayFull,

    #[error("uncaught exception: {message}")]
    Thrown { message: String },

    #[error("step budget of {budget} instructions exceeded")]
    BudgetExceeded { budget: u64 },

    #[error("maximum call depth of {limit} reached")]
    CallDepthExceeded { limit: usize },

    #[error("`{name}` is not a generator function")]
    NotAGenerator { name: String },

    #[error(transparent)]
    Delegation(#[from] GeneratorError),
}
