//! Generator-side state visible to the engine while a body runs.

use tern_value::Value;

use crate::delegation::{DelegateStep, Delegation};
use crate::engine::YieldSink;
use crate::errors::GeneratorError;
use crate::flags::Lifecycle;

/// Everything the engine may touch through `YieldSink` during a call.
///
/// Kept apart from the engine handle and the suspended frame so the
/// generator can lend it mutably to the engine it is calling.
#[derive(Default)]
pub(crate) struct GeneratorState {
    pub(crate) flags: Lifecycle,
    pub(crate) key: Value,
    pub(crate) value: Value,
    /// Largest integer key yielded by the body itself; `None` before any.
    largest_int_key: Option<i64>,
    pub(crate) delegation: Option<Delegation>,
    /// Pending value for the current yield expression.
    pub(crate) sent: Value,
    /// Result of the last finished `yield from`.
    pub(crate) delegation_result: Value,
    /// Set whenever the engine reports a pair during the current call.
    pub(crate) reported: bool,
}

impl GeneratorState {
    pub(crate) fn set_pair(&mut self, key: Value, value: Value) {
        tracing::trace!(?key, ?value, "generator produced pair");
        self.key = key;
        self.value = value;
        self.reported = true;
    }

    /// One past the largest integer key, never negative.
    ///
    /// Once `i64::MAX` has been used the key space is spent: later plain
    /// yields reuse `i64::MAX` rather than wrapping to a negative key.
    /// Unlike array appends this is not an error, since generator keys need
    /// not be unique.
    fn next_auto_key(&self) -> i64 {
        self.largest_int_key.map_or(0, |n| n.saturating_add(1).max(0))
    }
}

impl YieldSink for GeneratorState {
    fn yield_pair(&mut self, key: Value, value: Value) {
        if let Value::Int(n) = key {
            if self.largest_int_key.map_or(true, |largest| n > largest) {
                self.largest_int_key = Some(n);
            }
        }
        self.set_pair(key, value);
    }

    fn yield_value(&mut self, value: Value) {
        let key = self.next_auto_key();
        self.yield_pair(Value::Int(key), value);
    }

    fn start_delegation(&mut self, source: Value) -> Result<(), GeneratorError> {
        let (delegation, first) = Delegation::start(source)?;
        match first {
            DelegateStep::Pair { key, value } => {
                tracing::debug!(
                    generator_source = delegation.is_generator(),
                    "delegation started"
                );
                self.set_pair(key, value);
                self.delegation = Some(delegation);
                self.flags.insert(Lifecycle::SUSPENDED);
                Ok(())
            }
            DelegateStep::Exhausted { result } => {
                tracing::debug!("delegation source empty; continuing body");
                self.delegation_result = result;
                Ok(())
            }
            DelegateStep::Failed(error) => Err(error),
        }
    }

    fn delegation_active(&self) -> bool {
        self.delegation.is_some()
    }

    fn take_sent(&mut self) -> Value {
        std::mem::take(&mut self.sent)
    }

    fn take_delegation_result(&mut self) -> Value {
        std::mem::take(&mut self.delegation_result)
    }
}
