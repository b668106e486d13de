//! Runtime values for the Tern interpreter.
//!
//! # Heap Enforcement
//!
//! Heap allocations go through factory methods on `Value`. `Heap<T>` has a
//! crate-private constructor, so code outside this crate cannot build heap
//! values directly:
//!
//! ```text
//! let s = Value::string("hello");          // OK
//! let a = Value::list(vec![Value::Int(1)]); // OK
//! let s = Value::Str(Heap::new(...));      // ERROR: Heap::new is pub(crate)
//! ```
//!
//! # Thread Safety
//!
//! Heap types use `Arc` internally. Shared mutable cells (references and
//! generators) sit behind `parking_lot::Mutex`, so `Value` is `Send + Sync`.

mod heap;

use std::fmt;

pub use heap::Heap;

use crate::array::{Array, ArrayKey};
use crate::generator_ref::GeneratorRef;
use crate::object::{ObjectValue, ReferenceCell, ResourceHandle};

/// Runtime value in the Tern interpreter.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// The null value; also the initial key/value of a fresh generator.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),

    // Heap Types
    /// Immutable string.
    Str(Heap<str>),
    /// Ordered int/string keyed array.
    Array(Heap<Array>),
    /// Plain object instance.
    Object(Heap<ObjectValue>),

    /// Opaque host resource.
    Resource(ResourceHandle),
    /// Shared mutable slot (by-reference binding).
    Reference(ReferenceCell),
    /// Running or finished generator.
    Generator(GeneratorRef),
}

// Factory Methods (ONLY way to construct heap values)

impl Value {
    /// Create a string value.
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Heap::from_string(s.into()))
    }

    /// Create an array value.
    pub fn array(array: Array) -> Self {
        Value::Array(Heap::new(array))
    }

    /// Create an array value from a list of values with auto-increment keys.
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::array(items.into_iter().collect())
    }

    /// Create an array value from explicit key/value pairs, in order.
    pub fn map(entries: impl IntoIterator<Item = (ArrayKey, Value)>) -> Self {
        Value::array(entries.into_iter().collect())
    }

    /// Create an object value.
    pub fn object(object: ObjectValue) -> Self {
        Value::Object(Heap::new(object))
    }

    /// Create a resource value.
    pub fn resource(id: u64, kind: impl Into<String>) -> Self {
        Value::Resource(ResourceHandle::new(id, kind))
    }

    /// Create a reference cell initialized with `value`.
    pub fn reference(value: Value) -> Self {
        Value::Reference(ReferenceCell::new(value))
    }

    /// Wrap a generator handle.
    pub fn generator(generator: GeneratorRef) -> Self {
        Value::Generator(generator)
    }

    /// Name of the value's type, as shown in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Resource(_) => "resource",
            Value::Reference(_) => "reference",
            Value::Generator(_) => "Generator",
        }
    }

    /// The value behind a reference, or a clone of `self`.
    ///
    /// Cells never hold references, so one step is enough.
    pub fn deref_value(&self) -> Value {
        match self {
            Value::Reference(cell) => cell.get(),
            other => other.clone(),
        }
    }

    /// Get the integer payload, if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the string payload, if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get the array payload, if this is an `Array`.
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Truthiness used by conditional jumps.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty() && &**s != "0",
            Value::Array(a) => !a.is_empty(),
            Value::Reference(cell) => cell.get().is_truthy(),
            Value::Object(_) | Value::Resource(_) | Value::Generator(_) => true,
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<ArrayKey> for Value {
    fn from(key: ArrayKey) -> Self {
        key.to_value()
    }
}

/// Structural equality; references and generators compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Resource(a), Value::Resource(b)) => a == b,
            (Value::Reference(a), Value::Reference(b)) => a.ptr_eq(b),
            (Value::Generator(a), Value::Generator(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

/// Output form used by `echo`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null | Value::Bool(false) => Ok(()),
            Value::Bool(true) => write!(f, "1"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => {
                if x.fract() == 0.0 && x.is_finite() {
                    write!(f, "{x:.0}")
                } else {
                    write!(f, "{x}")
                }
            }
            Value::Str(s) => write!(f, "{s}"),
            Value::Array(_) => write!(f, "Array"),
            Value::Object(o) => write!(f, "{}", o.class_name()),
            Value::Resource(r) => write!(f, "Resource id #{}", r.id()),
            Value::Reference(cell) => write!(f, "{}", cell.get()),
            Value::Generator(_) => write!(f, "Generator"),
        }
    }
}
