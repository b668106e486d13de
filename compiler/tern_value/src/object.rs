//! Objects, resources and reference cells.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::value::Value;

/// Class name the runtime reserves for generator instances.
///
/// A plain object carrying this class name has no generator behind it;
/// generators proper are always `Value::Generator`.
pub const GENERATOR_CLASS: &str = "Generator";

/// Plain object: a class name plus properties in declaration order.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectValue {
    class_name: String,
    properties: Vec<(String, Value)>,
}

impl ObjectValue {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            properties: Vec::new(),
        }
    }

    /// Builder-style property assignment.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: Value) -> Self {
        self.set(name, value);
        self
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Whether this object claims to be a generator instance.
    pub fn is_generator_class(&self) -> bool {
        self.class_name.eq_ignore_ascii_case(GENERATOR_CLASS)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.properties.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.properties.push((name, value)),
        }
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.properties.iter().map(|(n, v)| (n.as_str(), v))
    }
}

/// Opaque host resource (file handle, stream, ...).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceHandle {
    id: u64,
    kind: String,
}

impl ResourceHandle {
    pub fn new(id: u64, kind: impl Into<String>) -> Self {
        Self {
            id,
            kind: kind.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }
}

/// Shared mutable slot backing by-reference bindings.
///
/// A cell never holds another `Value::Reference`: storing a reference
/// stores the value it currently points at, so following a cell is always
/// a single step.
#[derive(Clone)]
pub struct ReferenceCell(Arc<Mutex<Value>>);

impl ReferenceCell {
    pub fn new(value: Value) -> Self {
        ReferenceCell(Arc::new(Mutex::new(unwrap_reference(value))))
    }

    /// Snapshot of the referenced value.
    pub fn get(&self) -> Value {
        self.0.lock().clone()
    }

    /// Replace the referenced value, returning the previous one.
    pub fn set(&self, value: Value) -> Value {
        // Resolve before locking: `value` may be a handle to this same cell.
        let value = unwrap_reference(value);
        std::mem::replace(&mut *self.0.lock(), value)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

fn unwrap_reference(value: Value) -> Value {
    match value {
        Value::Reference(cell) => cell.get(),
        other => other,
    }
}

impl fmt::Debug for ReferenceCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_lock() {
            Some(value) => write!(f, "&{:?}", *value),
            None => write!(f, "&<locked>"),
        }
    }
}
