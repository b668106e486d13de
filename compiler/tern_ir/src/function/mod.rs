//! Function descriptors.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::op::Op;

/// Index of a function in a `FunctionRegistry`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(u32);

impl FunctionId {
    /// Create a new `FunctionId`.
    #[inline]
    pub const fn new(index: u32) -> Self {
        FunctionId(index)
    }

    /// Get the index into the registry.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn#{}", self.0)
    }
}

/// Static description of a callable.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDescriptor {
    name: String,
    arity: usize,
    locals: usize,
    body: Vec<Op>,
}

impl FunctionDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of declared parameters.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Number of local variable slots.
    pub fn locals(&self) -> usize {
        self.locals
    }

    pub fn body(&self) -> &[Op] {
        &self.body
    }

    /// A function whose body contains a yield instruction is a generator
    /// function: calling it creates a generator instead of running the body.
    pub fn is_generator(&self) -> bool {
        self.body.iter().any(Op::is_yield)
    }
}

/// Shared, immutable reference to a `FunctionDescriptor`.
///
/// Cloning is O(1). Generators hold one of these for the function they run;
/// the descriptor itself is owned by whoever built it (usually the registry).
#[derive(Clone)]
pub struct FunctionRef(Arc<FunctionDescriptor>);

impl FunctionRef {
    pub fn new(descriptor: FunctionDescriptor) -> Self {
        FunctionRef(Arc::new(descriptor))
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for FunctionRef {
    type Target = FunctionDescriptor;

    fn deref(&self) -> &FunctionDescriptor {
        &self.0
    }
}

impl fmt::Debug for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionRef({}/{})", self.0.name, self.0.arity)
    }
}

/// Incremental builder for `FunctionDescriptor`.
///
/// ```text
/// let f = FunctionBuilder::new("pairs")
///     .op(Op::Const(Value::string("a")))
///     .op(Op::Const(Value::Int(1)))
///     .op(Op::YieldPair)
///     .build();
/// ```
#[derive(Clone, Debug)]
pub struct FunctionBuilder {
    name: String,
    arity: usize,
    locals: usize,
    body: Vec<Op>,
}

impl FunctionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arity: 0,
            locals: 0,
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn arity(mut self, arity: usize) -> Self {
        self.arity = arity;
        self
    }

    #[must_use]
    pub fn locals(mut self, locals: usize) -> Self {
        self.locals = locals;
        self
    }

    #[must_use]
    pub fn op(mut self, op: Op) -> Self {
        self.body.push(op);
        self
    }

    #[must_use]
    pub fn ops(mut self, ops: impl IntoIterator<Item = Op>) -> Self {
        self.body.extend(ops);
        self
    }

    /// Index the next pushed instruction will occupy (for jump targets).
    pub fn position(&self) -> usize {
        self.body.len()
    }

    pub fn build(self) -> FunctionDescriptor {
        FunctionDescriptor {
            name: self.name,
            arity: self.arity,
            locals: self.locals,
            body: self.body,
        }
    }

    /// Build straight into a shared reference.
    pub fn build_ref(self) -> FunctionRef {
        FunctionRef::new(self.build())
    }
}
