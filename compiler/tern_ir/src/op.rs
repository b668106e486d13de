//! Instruction set.
//!
//! Stack-based: operands are popped from the frame's operand stack and
//! results pushed back. Jump targets are absolute instruction indices.

use tern_value::Value;

use crate::function::FunctionId;

/// A single VM instruction.
#[derive(Clone, Debug, PartialEq)]
pub enum Op {
    /// Push a constant.
    Const(Value),
    /// Push the n-th call argument.
    LoadArg(usize),
    /// Push local slot n.
    LoadLocal(usize),
    /// Pop into local slot n.
    StoreLocal(usize),
    /// Discard the top of stack.
    Pop,
    /// Duplicate the top of stack.
    Dup,

    /// Numeric addition: pop `b`, pop `a`, push `a + b`.
    Add,
    /// Numeric subtraction: pop `b`, pop `a`, push `a - b`.
    Sub,
    /// Numeric or string comparison: pop `b`, pop `a`, push `a < b`.
    Lt,
    /// Strict equality: pop `b`, pop `a`, push `a === b`.
    Eq,

    /// Unconditional jump.
    Jump(usize),
    /// Pop a condition; jump when it is falsy.
    JumpIfFalse(usize),

    /// Push an empty array.
    NewArray,
    /// Pop a value, append it to the array below it (auto-increment key).
    ArrayPush,
    /// Pop value, pop key, store into the array below them.
    ArraySet,

    /// Pop a value and yield it under an automatic key.
    ///
    /// On resume, pushes the value delivered by `send` (`Null` for `next`).
    Yield,
    /// Pop a value, pop a key, and yield the pair.
    ///
    /// On resume, pushes the value delivered by `send` (`Null` for `next`).
    YieldPair,
    /// Pop a source (array or generator) and delegate to it.
    ///
    /// When the delegation finishes, pushes its result: the child
    /// generator's return value, or `Null` for arrays.
    YieldFrom,

    /// Pop `argc` arguments and call the function.
    ///
    /// Generator functions push a new, unstarted generator; other functions
    /// run to completion and push their return value.
    Instantiate(FunctionId, usize),

    /// Pop a value and write it to the output handler.
    Echo,
    /// Pop the return value and finish the body.
    Return,
    /// Raise an execution error.
    Throw(String),
}

impl Op {
    /// Whether this instruction suspends a generator body.
    pub fn is_yield(&self) -> bool {
        matches!(self, Op::Yield | Op::YieldPair | Op::YieldFrom)
    }
}
