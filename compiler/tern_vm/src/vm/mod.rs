//! The reference VM.
//!
//! `Vm` is a cheap-to-clone handle: every generator it instantiates holds
//! its own clone, so registry, config and output are shared behind `Arc`s.
//!
//! A generator created from bytecode gets a clone whose `base_depth` is one
//! past its creator's call depth. Contexts it creates start there, so
//! recursive `yield from` is bounded by `max_call_depth` like plain calls.

mod builder;
mod frame;
mod interpret;

use std::sync::Arc;

use tern_gen::{ensure_sufficient_stack, Engine, EngineStep, Generator, Step, Suspended, YieldSink};
use tern_ir::{FunctionRef, FunctionRegistry};
use tern_value::Value;

use crate::config::VmConfig;
use crate::errors::VmError;
use crate::output::SharedOutput;

pub use builder::VmBuilder;
pub use frame::CallFrame;
use interpret::Exit;

/// Per-execution state that outlives a single call frame.
///
/// A generator owns one context from its first `next()` until it finishes;
/// plain calls made from its body run inside the same context.
#[derive(Debug, Default)]
pub struct ExecutionContext {
    steps: u64,
    depth: usize,
}

impl ExecutionContext {
    /// Instructions executed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Call depth of the innermost active frame.
    pub fn depth(&self) -> usize {
        self.depth
    }

    fn tick(&mut self, budget: Option<u64>) -> Result<(), VmError> {
        self.steps = self.steps.saturating_add(1);
        match budget {
            Some(budget) if self.steps > budget => Err(VmError::BudgetExceeded { budget }),
            _ => Ok(()),
        }
    }
}

/// Bytecode interpreter implementing the generator engine boundary.
#[derive(Clone)]
pub struct Vm {
    registry: Arc<FunctionRegistry>,
    config: VmConfig,
    output: SharedOutput,
    /// Depth new execution contexts start at.
    base_depth: usize,
}

impl Vm {
    /// A VM with default configuration writing to stdout.
    pub fn new(registry: FunctionRegistry) -> Self {
        VmBuilder::new(registry).build()
    }

    pub fn builder(registry: FunctionRegistry) -> VmBuilder {
        VmBuilder::new(registry)
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    /// Output captured by a buffer handler; empty otherwise.
    pub fn output(&self) -> String {
        self.output.output()
    }

    /// Create an unstarted generator for the generator function `name`.
    pub fn generator(&self, name: &str, arguments: Vec<Value>) -> Result<Generator<Vm>, VmError> {
        let function = self.function(name)?;
        if !function.is_generator() {
            return Err(VmError::NotAGenerator {
                name: name.to_owned(),
            });
        }
        Ok(Generator::new(self.clone(), function, arguments))
    }

    /// Call `name` the way bytecode does: generator functions return a new
    /// generator value, other functions run to completion.
    #[tracing::instrument(level = "debug", skip(self, arguments))]
    pub fn call(&self, name: &str, arguments: Vec<Value>) -> Result<Value, VmError> {
        let function = self.function(name)?;
        let mut context = self.create_execution_context();
        self.invoke(&mut context, function, arguments)
    }

    fn function(&self, name: &str) -> Result<FunctionRef, VmError> {
        self.registry
            .get_by_name(name)
            .cloned()
            .ok_or_else(|| VmError::UnknownFunction {
                name: name.to_owned(),
            })
    }

    fn invoke(
        &self,
        context: &mut ExecutionContext,
        function: FunctionRef,
        arguments: Vec<Value>,
    ) -> Result<Value, VmError> {
        let limit = self.config.max_call_depth;
        if context.depth >= limit {
            return Err(VmError::CallDepthExceeded { limit });
        }

        if function.is_generator() {
            tracing::debug!(
                function = %function.name(),
                depth = context.depth + 1,
                "instantiating generator"
            );
            let engine = Vm {
                base_depth: context.depth + 1,
                ..self.clone()
            };
            return Ok(Generator::new(engine, function, arguments).into_value());
        }

        context.depth += 1;
        let mut frame = CallFrame::new(function, arguments);
        let exit = ensure_sufficient_stack(|| self.execute(&mut Detached, context, &mut frame));
        context.depth -= 1;

        match exit? {
            Exit::Return(value) => Ok(value),
            Exit::Suspend => Err(VmError::NotAGenerator {
                name: frame.function().name().to_owned(),
            }),
        }
    }

    fn run(
        &self,
        sink: &mut dyn YieldSink,
        mut context: ExecutionContext,
        mut frame: CallFrame,
    ) -> Result<EngineStep<Self>, VmError> {
        match self.execute(sink, &mut context, &mut frame)? {
            Exit::Suspend => Ok(Step::Yielded(Suspended::new(context, frame))),
            Exit::Return(value) => {
                tracing::debug!(
                    function = %frame.function().name(),
                    steps = context.steps(),
                    "body returned"
                );
                Ok(Step::Returned(value))
            }
        }
    }
}

impl Engine for Vm {
    type Context = ExecutionContext;
    type Frame = CallFrame;
    type Error = VmError;

    fn create_execution_context(&self) -> ExecutionContext {
        ExecutionContext {
            steps: 0,
            depth: self.base_depth,
        }
    }

    fn create_call_frame(&self, function: &FunctionRef, arguments: &[Value]) -> CallFrame {
        CallFrame::new(function.clone(), arguments.to_vec())
    }

    #[tracing::instrument(level = "debug", skip_all, fields(function = %frame.function().name()))]
    fn execute_until_yield(
        &self,
        sink: &mut dyn YieldSink,
        context: ExecutionContext,
        frame: CallFrame,
    ) -> Result<EngineStep<Self>, VmError> {
        self.run(sink, context, frame)
    }

    #[tracing::instrument(level = "trace", skip_all)]
    fn resume_from_yield(
        &self,
        sink: &mut dyn YieldSink,
        suspended: Suspended<ExecutionContext, CallFrame>,
    ) -> Result<EngineStep<Self>, VmError> {
        let (context, frame) = suspended.into_parts();
        self.run(sink, context, frame)
    }

    fn discard(&self, suspended: Suspended<ExecutionContext, CallFrame>) {
        let (context, frame) = suspended.into_parts();
        tracing::debug!(
            function = %frame.function().name(),
            pc = frame.pc(),
            steps = context.steps(),
            "discarding suspended frame"
        );
    }
}

/// Sink for plain calls, whose bodies contain no yield instructions.
struct Detached;

impl YieldSink for Detached {
    fn yield_pair(&mut self, _key: Value, _value: Value) {}

    fn yield_value(&mut self, _value: Value) {}

    fn start_delegation(&mut self, _source: Value) -> Result<(), tern_gen::GeneratorError> {
        Ok(())
    }

    fn delegation_active(&self) -> bool {
        false
    }

    fn take_sent(&mut self) -> Value {
        Value::Null
    }

    fn take_delegation_result(&mut self) -> Value {
        Value::Null
    }
}
