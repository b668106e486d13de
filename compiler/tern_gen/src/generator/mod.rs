//! Generator lifecycle state machine.
//!
//! ```text
//! Fresh ─next─▶ Running ─yield─▶ Suspended ─next─▶ Running ─ ... ─▶ Finished
//!                  │                 │ ▲
//!                  │       yield from│ │source exhausted
//!                  │                 ▼ │
//!                  │             Delegating
//!                  └─return / error─────────────────────────────▶ Finished
//! ```
//!
//! `next()` is the only externally driven transition (`send()` is `next()`
//! with a value for the pending yield). `Running` only exists while an engine
//! call is on the stack.

mod state;

use std::fmt;
use std::iter::FusedIterator;

use tern_ir::FunctionRef;
use tern_value::{GeneratorObject, GeneratorRef, Value};

use crate::delegation::DelegateStep;
use crate::engine::{Engine, EngineStep, Step, Suspended};
use crate::errors::GeneratorError;
use crate::flags::Lifecycle;

use state::GeneratorState;

/// A lazily executed function body producing key/value pairs.
///
/// Single-pass: once started it cannot be rewound, and once finished every
/// further `next()` returns `false`.
pub struct Generator<E: Engine> {
    engine: E,
    function: FunctionRef,
    arguments: Vec<Value>,
    state: GeneratorState,
    suspended: Option<Suspended<E::Context, E::Frame>>,
    return_value: Option<Value>,
    last_error: Option<GeneratorError>,
}

impl<E: Engine> Generator<E> {
    /// Bind a generator to one function and argument list. Nothing runs
    /// until the first `next()`.
    pub fn new(engine: E, function: FunctionRef, arguments: Vec<Value>) -> Self {
        Self {
            engine,
            function,
            arguments,
            state: GeneratorState::default(),
            suspended: None,
            return_value: None,
            last_error: None,
        }
    }

    pub fn function(&self) -> &FunctionRef {
        &self.function
    }

    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.state.flags
    }

    /// Advance to the next pair.
    ///
    /// Returns `false` when the body completes, and on every call after
    /// that. An engine failure also ends iteration here; the error stays
    /// available through `last_error()`.
    pub fn next(&mut self) -> bool {
        matches!(self.advance(None), Ok(true))
    }

    /// Like `next()`, but returns the error that finalized the generator
    /// during this call instead of swallowing it.
    pub fn try_next(&mut self) -> Result<bool, GeneratorError> {
        self.advance(None)
    }

    /// Deliver `value` as the result of the pending `yield` and advance.
    ///
    /// A fresh generator first runs to its first yield, which then receives
    /// the value. While delegating to a child generator the value is
    /// forwarded to the child.
    pub fn send(&mut self, value: Value) -> bool {
        matches!(self.try_send(value), Ok(true))
    }

    pub fn try_send(&mut self, value: Value) -> Result<bool, GeneratorError> {
        if !self.state.flags.is_started() {
            self.advance(None)?;
        }
        self.advance(Some(value))
    }

    /// Value of the last pair; `Null` before the first advance.
    pub fn current(&self) -> Value {
        self.state.value.clone()
    }

    /// Key of the last pair; `Null` before the first advance.
    pub fn key(&self) -> Value {
        self.state.key.clone()
    }

    pub fn valid(&self) -> bool {
        self.state.flags.is_started() && !self.state.flags.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.state.flags.is_finished()
    }

    pub fn is_delegating(&self) -> bool {
        self.state.delegation.is_some()
    }

    /// Generators are single-pass: rewinding is a no-op before the first
    /// advance and an error afterwards.
    pub fn rewind(&self) -> Result<(), GeneratorError> {
        if self.state.flags.is_started() {
            return Err(GeneratorError::AlreadyStarted);
        }
        Ok(())
    }

    /// Value the body returned.
    pub fn get_return(&self) -> Result<Value, GeneratorError> {
        match (&self.return_value, self.state.flags.is_finished()) {
            (Some(value), _) => Ok(value.clone()),
            (None, true) => Err(GeneratorError::NoReturnValue),
            (None, false) => Err(GeneratorError::NotFinished),
        }
    }

    /// The error that finalized the generator, if one did.
    pub fn last_error(&self) -> Option<&GeneratorError> {
        self.last_error.as_ref()
    }

    /// Finish the generator now, releasing its suspended frame.
    ///
    /// A child generator being delegated to is unbound but not closed.
    pub fn close(&mut self) {
        if self.state.flags.is_finished() {
            return;
        }
        tracing::debug!(function = %self.function.name(), "generator closed");
        self.finish();
    }

    /// Iterate the remaining pairs.
    pub fn pairs(&mut self) -> Pairs<'_, E> {
        Pairs { generator: self }
    }

    /// Move the generator behind a shared handle.
    pub fn into_ref(self) -> GeneratorRef {
        GeneratorRef::new(self)
    }

    pub fn into_value(self) -> Value {
        Value::generator(self.into_ref())
    }

    fn advance(&mut self, sent: Option<Value>) -> Result<bool, GeneratorError> {
        let flags = self.state.flags;
        if flags.is_finished() {
            return Ok(false);
        }
        if self.state.delegation.is_some() {
            return self.handle_delegate_next(sent);
        }
        if !flags.is_started() {
            return self.start();
        }
        if flags.is_suspended() {
            if let Some(value) = sent {
                self.state.sent = value;
            }
            return self.resume();
        }
        Ok(false)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(function = %self.function.name()))]
    fn start(&mut self) -> Result<bool, GeneratorError> {
        self.state.flags.insert(Lifecycle::STARTED);
        let context = self.engine.create_execution_context();
        let frame = self
            .engine
            .create_call_frame(&self.function, &self.arguments);
        self.state.reported = false;
        let step = self
            .engine
            .execute_until_yield(&mut self.state, context, frame);
        self.settle(step)
    }

    #[tracing::instrument(level = "trace", skip_all, fields(function = %self.function.name()))]
    fn resume(&mut self) -> Result<bool, GeneratorError> {
        let Some(suspended) = self.suspended.take() else {
            // Flagged suspended with no frame captured: nothing left to run.
            self.finish();
            return Ok(false);
        };
        self.state.flags.remove(Lifecycle::SUSPENDED);
        self.state.reported = false;
        let step = self.engine.resume_from_yield(&mut self.state, suspended);
        self.settle(step)
    }

    fn handle_delegate_next(&mut self, sent: Option<Value>) -> Result<bool, GeneratorError> {
        let Some(delegation) = self.state.delegation.as_mut() else {
            return Ok(false);
        };
        match delegation.advance(sent) {
            DelegateStep::Pair { key, value } => {
                self.state.set_pair(key, value);
                Ok(true)
            }
            DelegateStep::Exhausted { result } => {
                tracing::debug!(function = %self.function.name(), "delegation exhausted; resuming body");
                self.state.delegation = None;
                self.state.delegation_result = result;
                self.resume()
            }
            DelegateStep::Failed(error) => Err(self.fail(error)),
        }
    }

    fn settle(&mut self, step: Result<EngineStep<E>, E::Error>) -> Result<bool, GeneratorError> {
        match step {
            Ok(Step::Yielded(suspended)) => {
                debug_assert!(
                    self.state.reported,
                    "engine suspended `{}` without reporting a pair",
                    self.function.name()
                );
                self.suspended = Some(suspended);
                self.state.flags.insert(Lifecycle::SUSPENDED);
                Ok(true)
            }
            Ok(Step::Returned(value)) => {
                tracing::debug!(function = %self.function.name(), "generator returned");
                self.return_value = Some(value);
                self.finish();
                Ok(false)
            }
            Err(error) => Err(self.fail(GeneratorError::vm(error))),
        }
    }

    fn fail(&mut self, error: GeneratorError) -> GeneratorError {
        tracing::warn!(function = %self.function.name(), %error, "generator finalized by error");
        self.finish();
        self.last_error = Some(error.clone());
        error
    }

    fn finish(&mut self) {
        if let Some(suspended) = self.suspended.take() {
            self.engine.discard(suspended);
        }
        self.state.delegation = None;
        self.state.flags = Lifecycle::TERMINAL;
    }
}

impl<E: Engine> Drop for Generator<E> {
    fn drop(&mut self) {
        if let Some(suspended) = self.suspended.take() {
            self.engine.discard(suspended);
        }
    }
}

impl<E: Engine> fmt::Debug for Generator<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("function", &self.function.name())
            .field("lifecycle", &self.state.flags)
            .field("key", &self.state.key)
            .field("value", &self.state.value)
            .field("delegating", &self.is_delegating())
            .finish_non_exhaustive()
    }
}

impl<E: Engine> GeneratorObject for Generator<E> {
    fn next(&mut self) -> bool {
        Generator::next(self)
    }

    fn send(&mut self, value: Value) -> bool {
        Generator::send(self, value)
    }

    fn current(&self) -> Value {
        Generator::current(self)
    }

    fn key(&self) -> Value {
        Generator::key(self)
    }

    fn valid(&self) -> bool {
        Generator::valid(self)
    }

    fn is_finished(&self) -> bool {
        Generator::is_finished(self)
    }

    fn return_value(&self) -> Option<Value> {
        self.return_value.clone()
    }

    fn last_error_message(&self) -> Option<String> {
        self.last_error.as_ref().map(ToString::to_string)
    }

    fn function_name(&self) -> &str {
        self.function.name()
    }
}

/// Iterator over a generator's remaining `(key, value)` pairs.
pub struct Pairs<'a, E: Engine> {
    generator: &'a mut Generator<E>,
}

impl<E: Engine> Iterator for Pairs<'_, E> {
    type Item = (Value, Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.generator
            .next()
            .then(|| (self.generator.key(), self.generator.current()))
    }
}

impl<E: Engine> FusedIterator for Pairs<'_, E> {}
