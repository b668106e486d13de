//! Test helpers for generator unit testing.
//!
//! Provides `MockEngine`, a scripted stand-in for the VM so the lifecycle
//! and delegation logic can be tested without compiling or interpreting
//! anything.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tern_ir::{FunctionBuilder, FunctionRef};
use tern_value::Value;

use crate::engine::{Engine, EngineStep, Step, Suspended, YieldSink};
use crate::errors::GeneratorError;
use crate::generator::Generator;

/// One step of a scripted body.
#[derive(Clone, Debug)]
pub enum MockOp {
    /// `yield key => value`
    Yield(Value, Value),
    /// `yield value`
    YieldValue(Value),
    /// `yield from source`
    YieldFrom(Value),
    /// `yield from $args[n]`
    YieldFromArg(usize),
    /// Append the value sent to the previous yield to the engine log.
    RecordSent,
    /// Append the last `yield from` result to the engine log.
    RecordDelegationResult,
    /// Fail with an execution error.
    Fail(&'static str),
    /// `return value`
    Return(Value),
}

#[derive(Debug, thiserror::Error)]
pub enum MockError {
    #[error("mock failure: {0}")]
    Failed(&'static str),
    #[error(transparent)]
    Delegation(#[from] GeneratorError),
}

pub struct MockContext;

pub struct MockFrame {
    script: Arc<Vec<MockOp>>,
    arguments: Vec<Value>,
    pc: usize,
}

/// Scripted engine: each function name maps to a list of `MockOp`s.
///
/// Functions without a script return `Null` immediately.
#[derive(Clone, Default)]
pub struct MockEngine {
    scripts: Arc<FxHashMap<String, Arc<Vec<MockOp>>>>,
    log: Arc<Mutex<Vec<Value>>>,
    contexts: Arc<AtomicUsize>,
    discarded: Arc<AtomicUsize>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the body of `name`.
    pub fn with_script(mut self, name: &str, ops: Vec<MockOp>) -> Self {
        Arc::make_mut(&mut self.scripts).insert(name.to_owned(), Arc::new(ops));
        self
    }

    /// A fresh generator for `name`.
    pub fn generator(&self, name: &str, arguments: Vec<Value>) -> Generator<MockEngine> {
        Generator::new(self.clone(), function(name), arguments)
    }

    /// Values recorded by `RecordSent` / `RecordDelegationResult`.
    pub fn log(&self) -> Vec<Value> {
        self.log.lock().clone()
    }

    /// Number of execution contexts created so far.
    pub fn contexts_created(&self) -> usize {
        self.contexts.load(Ordering::SeqCst)
    }

    /// Number of suspended frames released without being resumed.
    pub fn discarded(&self) -> usize {
        self.discarded.load(Ordering::SeqCst)
    }

    fn run(
        &self,
        sink: &mut dyn YieldSink,
        context: MockContext,
        mut frame: MockFrame,
    ) -> Result<EngineStep<Self>, MockError> {
        loop {
            let Some(op) = frame.script.get(frame.pc).cloned() else {
                return Ok(Step::Returned(Value::Null));
            };
            frame.pc += 1;
            match op {
                MockOp::Yield(key, value) => {
                    sink.yield_pair(key, value);
                    return Ok(Step::Yielded(Suspended::new(context, frame)));
                }
                MockOp::YieldValue(value) => {
                    sink.yield_value(value);
                    return Ok(Step::Yielded(Suspended::new(context, frame)));
                }
                MockOp::YieldFrom(source) => {
                    sink.start_delegation(source)?;
                    if sink.delegation_active() {
                        return Ok(Step::Yielded(Suspended::new(context, frame)));
                    }
                }
                MockOp::YieldFromArg(index) => {
                    let source = frame.arguments.get(index).cloned().unwrap_or_default();
                    sink.start_delegation(source)?;
                    if sink.delegation_active() {
                        return Ok(Step::Yielded(Suspended::new(context, frame)));
                    }
                }
                MockOp::RecordSent => self.log.lock().push(sink.take_sent()),
                MockOp::RecordDelegationResult => {
                    self.log.lock().push(sink.take_delegation_result());
                }
                MockOp::Fail(message) => return Err(MockError::Failed(message)),
                MockOp::Return(value) => return Ok(Step::Returned(value)),
            }
        }
    }
}

impl Engine for MockEngine {
    type Context = MockContext;
    type Frame = MockFrame;
    type Error = MockError;

    fn create_execution_context(&self) -> MockContext {
        self.contexts.fetch_add(1, Ordering::SeqCst);
        MockContext
    }

    fn create_call_frame(&self, function: &FunctionRef, arguments: &[Value]) -> MockFrame {
        MockFrame {
            script: self
                .scripts
                .get(function.name())
                .cloned()
                .unwrap_or_default(),
            arguments: arguments.to_vec(),
            pc: 0,
        }
    }

    fn execute_until_yield(
        &self,
        sink: &mut dyn YieldSink,
        context: MockContext,
        frame: MockFrame,
    ) -> Result<EngineStep<Self>, MockError> {
        self.run(sink, context, frame)
    }

    fn resume_from_yield(
        &self,
        sink: &mut dyn YieldSink,
        suspended: Suspended<MockContext, MockFrame>,
    ) -> Result<EngineStep<Self>, MockError> {
        let (context, frame) = suspended.into_parts();
        self.run(sink, context, frame)
    }

    fn discard(&self, suspended: Suspended<MockContext, MockFrame>) {
        self.discarded.fetch_add(1, Ordering::SeqCst);
        drop(suspended);
    }
}

/// Descriptor for a scripted function.
pub fn function(name: &str) -> FunctionRef {
    FunctionBuilder::new(name).build_ref()
}

/// Collect every remaining `(key, value)` pair.
pub fn drain<E: Engine>(generator: &mut Generator<E>) -> Vec<(Value, Value)> {
    generator.pairs().collect()
}
