//! Delegation driver for `yield from`.
//!
//! While a body is delegating, the VM stays suspended at the `yield from`
//! instruction and the outer generator's pairs come from the source:
//!
//! - **Array**: keys are snapshotted once when delegation starts and walked
//!   in that (insertion) order; values are read from the array captured at
//!   the same moment.
//! - **Generator**: the child is advanced once per outer advance and its
//!   key/value forwarded unmodified.
//!
//! Once the source is exhausted the owner drops the delegation and resumes
//! the VM, which continues the body after the `yield from`.

use tern_value::{Array, ArrayKey, GeneratorRef, Heap, Value};

use crate::errors::GeneratorError;
use crate::stack::ensure_sufficient_stack;

/// Where delegated pairs come from.
enum DelegationSource {
    Array {
        array: Heap<Array>,
        keys: Vec<ArrayKey>,
        cursor: usize,
    },
    Generator {
        child: GeneratorRef,
    },
}

/// Result of advancing a delegation source by one pair.
pub(crate) enum DelegateStep {
    /// The source produced a pair.
    Pair { key: Value, value: Value },
    /// The source has nothing left; `result` becomes the value of the
    /// `yield from` expression.
    Exhausted { result: Value },
    /// The child generator failed while being advanced.
    Failed(GeneratorError),
}

/// An in-progress `yield from`.
pub(crate) struct Delegation {
    source: DelegationSource,
}

impl Delegation {
    /// Bind `source` and produce its first pair.
    ///
    /// Returns the delegation together with the first step. A source that is
    /// exhausted from the start yields `DelegateStep::Exhausted` and the
    /// delegation can be dropped immediately.
    pub(crate) fn start(source: Value) -> Result<(Self, DelegateStep), GeneratorError> {
        let source = match source.deref_value() {
            Value::Array(array) => {
                let keys: Vec<ArrayKey> = array.keys().cloned().collect();
                DelegationSource::Array {
                    array,
                    keys,
                    cursor: 0,
                }
            }
            Value::Generator(child) => DelegationSource::Generator { child },
            Value::Object(object) if object.is_generator_class() => {
                return Err(GeneratorError::MissingDelegationBinding);
            }
            other => {
                return Err(GeneratorError::UnsupportedDelegationSource {
                    type_name: other.type_name(),
                });
            }
        };

        let mut delegation = Delegation { source };
        let first = delegation.advance(None);
        if let DelegateStep::Failed(error) = first {
            return Err(error);
        }
        Ok((delegation, first))
    }

    /// Produce the next pair. `sent` is forwarded to a child generator's
    /// pending yield; arrays ignore it.
    pub(crate) fn advance(&mut self, sent: Option<Value>) -> DelegateStep {
        match &mut self.source {
            DelegationSource::Array {
                array,
                keys,
                cursor,
            } => match keys.get(*cursor) {
                Some(key) => {
                    *cursor += 1;
                    DelegateStep::Pair {
                        key: key.to_value(),
                        value: array.get(key).cloned().unwrap_or_default(),
                    }
                }
                None => DelegateStep::Exhausted {
                    result: Value::Null,
                },
            },
            DelegationSource::Generator { child } => advance_child(child, sent),
        }
    }

    pub(crate) fn is_generator(&self) -> bool {
        matches!(self.source, DelegationSource::Generator { .. })
    }
}

fn advance_child(child: &GeneratorRef, sent: Option<Value>) -> DelegateStep {
    let Some(mut generator) = child.try_lock() else {
        return DelegateStep::Failed(GeneratorError::AlreadyRunning);
    };

    let produced = ensure_sufficient_stack(|| match sent {
        Some(value) => generator.send(value),
        None => generator.next(),
    });

    if produced {
        return DelegateStep::Pair {
            key: generator.key(),
            value: generator.current(),
        };
    }

    match (generator.return_value(), generator.last_error_message()) {
        (None, Some(message)) => DelegateStep::Failed(GeneratorError::DelegateFailed {
            function: generator.function_name().to_owned(),
            message,
        }),
        (result, _) => DelegateStep::Exhausted {
            result: result.unwrap_or_default(),
        },
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
