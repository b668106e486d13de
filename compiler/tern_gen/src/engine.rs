//! The VM boundary.
//!
//! The generator drives execution exclusively through `Engine`. Execution
//! contexts and call frames are opaque associated types: the generator
//! receives them packed in a `Suspended` handle when the body yields, and
//! hands the same handle back to resume it. The handle is move-only, so the
//! body can never be resumed twice from the same yield.

use tern_ir::FunctionRef;
use tern_value::Value;

use crate::errors::GeneratorError;

/// Captured execution of a body paused at a yield instruction.
///
/// Owned by exactly one generator between a yield and the next resume.
/// Deliberately not `Clone`.
pub struct Suspended<C, F> {
    context: C,
    frame: F,
}

impl<C, F> Suspended<C, F> {
    pub fn new(context: C, frame: F) -> Self {
        Self { context, frame }
    }

    /// Unpack the handle. Only the engine that produced it calls this.
    pub fn into_parts(self) -> (C, F) {
        (self.context, self.frame)
    }
}

/// Outcome of running a body until it yields or completes.
pub enum Step<C, F> {
    /// The body reached a yield point; the pair was reported through the
    /// sink (or a delegation was started) right before returning.
    Yielded(Suspended<C, F>),
    /// The body returned without yielding again.
    Returned(Value),
}

/// `Step` specialized to an engine's context and frame types.
pub type EngineStep<E> = Step<<E as Engine>::Context, <E as Engine>::Frame>;

/// Execution engine consumed by generators.
///
/// Engine calls block and may run arbitrary user code, including driving
/// other generators, before they return.
pub trait Engine: Clone + Send + 'static {
    type Context: Send + 'static;
    type Frame: Send + 'static;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fresh container for the state needed to run a frame.
    fn create_execution_context(&self) -> Self::Context;

    /// Activation of `function` with `arguments` bound.
    fn create_call_frame(&self, function: &FunctionRef, arguments: &[Value]) -> Self::Frame;

    /// Run a fresh frame until its first yield or completion.
    fn execute_until_yield(
        &self,
        sink: &mut dyn YieldSink,
        context: Self::Context,
        frame: Self::Frame,
    ) -> Result<EngineStep<Self>, Self::Error>;

    /// Continue a suspended frame until its next yield or completion.
    fn resume_from_yield(
        &self,
        sink: &mut dyn YieldSink,
        suspended: Suspended<Self::Context, Self::Frame>,
    ) -> Result<EngineStep<Self>, Self::Error>;

    /// Release a suspended frame that will never be resumed.
    fn discard(&self, suspended: Suspended<Self::Context, Self::Frame>) {
        drop(suspended);
    }
}

/// Callbacks an engine invokes on the generator whose body it is running.
pub trait YieldSink {
    /// Report the pair produced by a `yield key => value` instruction.
    fn yield_pair(&mut self, key: Value, value: Value);

    /// Report a `yield value` instruction; the key is the next automatic
    /// integer key.
    fn yield_value(&mut self, value: Value);

    /// Begin `yield from source`.
    ///
    /// When the source produces at least one pair, the first pair is already
    /// current on return and `delegation_active()` is true: the engine must
    /// suspend at the `yield from` instruction. Otherwise the engine continues
    /// the body, reading the delegation result from `take_delegation_result`.
    fn start_delegation(&mut self, source: Value) -> Result<(), GeneratorError>;

    fn delegation_active(&self) -> bool;

    /// Value delivered by `send` to the pending yield (`Null` after `next`).
    fn take_sent(&mut self) -> Value;

    /// Result of the last finished `yield from`: the child generator's return
    /// value, or `Null` for arrays.
    fn take_delegation_result(&mut self) -> Value;
}
