//! The instruction loop.

use std::cmp::Ordering;

use tern_gen::YieldSink;
use tern_ir::Op;
use tern_value::{Array, ArrayKey, Value};

use super::frame::{CallFrame, Resume};
use super::{ExecutionContext, Vm};
use crate::errors::VmError;

/// Why `execute` returned.
pub(super) enum Exit {
    /// Paused at a yield instruction; the pair (or delegation) was reported.
    Suspend,
    /// The body finished.
    Return(Value),
}

impl Vm {
    /// Run `frame` until it yields or returns.
    ///
    /// A frame resumed after a yield first pushes the value the yield
    /// expression evaluates to.
    pub(super) fn execute(
        &self,
        sink: &mut dyn YieldSink,
        context: &mut ExecutionContext,
        frame: &mut CallFrame,
    ) -> Result<Exit, VmError> {
        match std::mem::take(&mut frame.resume) {
            Resume::Nothing => {}
            Resume::Sent => frame.push(sink.take_sent()),
            Resume::DelegationResult => frame.push(sink.take_delegation_result()),
        }

        let function = frame.function.clone();
        let budget = self.config.mode.step_budget();

        while let Some(op) = function.body().get(frame.pc) {
            context.tick(budget)?;
            tracing::trace!(function = %function.name(), pc = frame.pc, ?op, "exec");
            frame.pc += 1;

            match op {
                Op::Const(value) => frame.push(value.clone()),
                Op::LoadArg(index) => {
                    let value = frame.argument(*index)?;
                    frame.push(value);
                }
                Op::LoadLocal(index) => {
                    let value = frame.local(*index)?;
                    frame.push(value);
                }
                Op::StoreLocal(index) => {
                    let value = frame.pop()?;
                    frame.store_local(*index, value)?;
                }
                Op::Pop => {
                    frame.pop()?;
                }
                Op::Dup => {
                    let value = frame.peek()?.clone();
                    frame.push(value);
                }

                Op::Add => binary(frame, add)?,
                Op::Sub => binary(frame, sub)?,
                Op::Lt => binary(frame, less_than)?,
                Op::Eq => binary(frame, |a, b| Ok(Value::Bool(a == b)))?,

                Op::Jump(target) => frame.jump(*target)?,
                Op::JumpIfFalse(target) => {
                    if !frame.pop()?.is_truthy() {
                        frame.jump(*target)?;
                    }
                }

                Op::NewArray => frame.push(Value::array(Array::new())),
                Op::ArrayPush => {
                    let value = frame.pop()?;
                    frame
                        .top_array_mut("[]")?
                        .push(value)
                        .ok_or(VmError::ArrayFull)?;
                }
                Op::ArraySet => {
                    let value = frame.pop()?;
                    let offset = frame.pop()?;
                    let key = ArrayKey::from_value(&offset).ok_or(VmError::InvalidArrayKey {
                        type_name: offset.type_name(),
                    })?;
                    frame.top_array_mut("[]=")?.insert(key, value);
                }

                Op::Yield => {
                    let value = frame.pop()?;
                    sink.yield_value(value);
                    frame.resume = Resume::Sent;
                    return Ok(Exit::Suspend);
                }
                Op::YieldPair => {
                    let value = frame.pop()?;
                    let key = frame.pop()?;
                    sink.yield_pair(key, value);
                    frame.resume = Resume::Sent;
                    return Ok(Exit::Suspend);
                }
                Op::YieldFrom => {
                    let source = frame.pop()?;
                    sink.start_delegation(source)?;
                    if sink.delegation_active() {
                        frame.resume = Resume::DelegationResult;
                        return Ok(Exit::Suspend);
                    }
                    frame.push(sink.take_delegation_result());
                }

                Op::Instantiate(id, argc) => {
                    let arguments = frame.pop_n(*argc)?;
                    let callee = self.registry.get(*id).cloned().ok_or_else(|| {
                        VmError::UnknownFunction {
                            name: id.to_string(),
                        }
                    })?;
                    let result = self.invoke(context, callee, arguments)?;
                    frame.push(result);
                }

                Op::Echo => {
                    let value = frame.pop()?;
                    self.output.print(&value.to_string());
                }
                Op::Return => return Ok(Exit::Return(frame.pop_or_null())),
                Op::Throw(message) => {
                    return Err(VmError::Thrown {
                        message: message.clone(),
                    })
                }
            }
        }

        Ok(Exit::Return(Value::Null))
    }
}

fn binary(
    frame: &mut CallFrame,
    apply: impl FnOnce(&Value, &Value) -> Result<Value, VmError>,
) -> Result<(), VmError> {
    let right = frame.pop()?;
    let left = frame.pop()?;
    let result = apply(&left.deref_value(), &right.deref_value())?;
    frame.push(result);
    Ok(())
}

#[expect(
    clippy::cast_precision_loss,
    reason = "int to float promotion matches the language's arithmetic"
)]
fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Int(n) => Some(*n as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

fn mismatch(op: &'static str, left: &Value, right: &Value) -> VmError {
    VmError::TypeMismatch {
        op,
        left: left.type_name(),
        right: right.type_name(),
    }
}

/// Integer arithmetic overflows into floats.
fn arithmetic(
    op: &'static str,
    left: &Value,
    right: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, VmError> {
    if let (Value::Int(a), Value::Int(b)) = (left, right) {
        if let Some(n) = int_op(*a, *b) {
            return Ok(Value::Int(n));
        }
    }
    match (as_float(left), as_float(right)) {
        (Some(a), Some(b)) => Ok(Value::Float(float_op(a, b))),
        _ => Err(mismatch(op, left, right)),
    }
}

fn add(left: &Value, right: &Value) -> Result<Value, VmError> {
    arithmetic("+", left, right, i64::checked_add, |a, b| a + b)
}

fn sub(left: &Value, right: &Value) -> Result<Value, VmError> {
    arithmetic("-", left, right, i64::checked_sub, |a, b| a - b)
}

fn less_than(left: &Value, right: &Value) -> Result<Value, VmError> {
    let ordering = match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => match (as_float(left), as_float(right)) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => return Err(mismatch("<", left, right)),
        },
    };
    Ok(Value::Bool(ordering == Some(Ordering::Less)))
}
