//! Call frames.

use smallvec::SmallVec;
use tern_ir::FunctionRef;
use tern_value::{Array, Value};

use crate::errors::VmError;

/// What a suspended frame pushes when it is resumed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(super) enum Resume {
    /// Fresh frame, or one that never suspended.
    #[default]
    Nothing,
    /// Paused at `Yield`/`YieldPair`: push the value delivered by `send`.
    Sent,
    /// Paused at `YieldFrom`: push the delegation result.
    DelegationResult,
}

/// One activation of a function body.
///
/// Owned by the generator while suspended; the VM only sees it between
/// `execute_until_yield`/`resume_from_yield` and the next yield.
pub struct CallFrame {
    pub(super) function: FunctionRef,
    arguments: Vec<Value>,
    locals: Vec<Value>,
    stack: SmallVec<[Value; 8]>,
    pub(super) pc: usize,
    pub(super) resume: Resume,
}

impl CallFrame {
    pub(super) fn new(function: FunctionRef, arguments: Vec<Value>) -> Self {
        let locals = vec![Value::Null; function.locals()];
        Self {
            function,
            arguments,
            locals,
            stack: SmallVec::new(),
            pc: 0,
            resume: Resume::Nothing,
        }
    }

    pub fn function(&self) -> &FunctionRef {
        &self.function
    }

    /// Index of the next instruction to execute.
    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub(super) fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    pub(super) fn pop(&mut self) -> Result<Value, VmError> {
        self.stack.pop().ok_or_else(|| self.underflow())
    }

    /// Pop `count` values, returned in push order.
    pub(super) fn pop_n(&mut self, count: usize) -> Result<Vec<Value>, VmError> {
        let Some(at) = self.stack.len().checked_sub(count) else {
            return Err(self.underflow());
        };
        Ok(self.stack.drain(at..).collect())
    }

    /// Pop the value to return; an empty stack returns `Null`.
    pub(super) fn pop_or_null(&mut self) -> Value {
        self.stack.pop().unwrap_or_default()
    }

    pub(super) fn peek(&self) -> Result<&Value, VmError> {
        self.stack.last().ok_or_else(|| self.underflow())
    }

    /// The array on top of the stack, unshared for in-place mutation.
    pub(super) fn top_array_mut(&mut self, op: &'static str) -> Result<&mut Array, VmError> {
        match self.stack.last_mut() {
            Some(Value::Array(array)) => Ok(array.make_mut()),
            Some(other) => Err(VmError::TypeMismatch {
                op,
                left: other.type_name(),
                right: "array",
            }),
            None => Err(VmError::StackUnderflow {
                function: self.function.name().to_owned(),
                pc: self.pc.saturating_sub(1),
            }),
        }
    }

    pub(super) fn argument(&self, index: usize) -> Result<Value, VmError> {
        self.arguments
            .get(index)
            .cloned()
            .ok_or_else(|| VmError::ArgumentOutOfRange {
                function: self.function.name().to_owned(),
                index,
            })
    }

    pub(super) fn local(&self, index: usize) -> Result<Value, VmError> {
        self.locals
            .get(index)
            .cloned()
            .ok_or_else(|| self.local_out_of_range(index))
    }

    pub(super) fn store_local(&mut self, index: usize, value: Value) -> Result<(), VmError> {
        match self.locals.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(self.local_out_of_range(index)),
        }
    }

    pub(super) fn jump(&mut self, target: usize) -> Result<(), VmError> {
        if target > self.function.body().len() {
            return Err(VmError::InvalidJump {
                function: self.function.name().to_owned(),
                target,
            });
        }
        self.pc = target;
        Ok(())
    }

    fn underflow(&self) -> VmError {
        VmError::StackUnderflow {
            function: self.function.name().to_owned(),
            pc: self.pc.saturating_sub(1),
        }
    }

    fn local_out_of_range(&self, index: usize) -> VmError {
        VmError::LocalOutOfRange {
            function: self.function.name().to_owned(),
            index,
        }
    }
}
