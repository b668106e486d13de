//! Shared generator handles.
//!
//! `GeneratorRef` is what a `Value::Generator` carries. The concrete
//! generator type lives in the engine crate; values only see it through the
//! object-safe `GeneratorObject` trait, which is exactly the surface `yield
//! from` needs to drive a child generator.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::value::Value;

/// Driver-facing surface of a generator.
pub trait GeneratorObject {
    /// Advance to the next yielded pair. Returns `false` once finished.
    fn next(&mut self) -> bool;

    /// Deliver `value` to the pending yield expression and advance.
    fn send(&mut self, value: Value) -> bool;

    /// Value of the last yielded pair (`Null` before the first advance).
    fn current(&self) -> Value;

    /// Key of the last yielded pair (`Null` before the first advance).
    fn key(&self) -> Value;

    /// Whether the generator has started and not yet finished.
    fn valid(&self) -> bool;

    fn is_finished(&self) -> bool;

    /// The body's return value, once it has returned normally.
    fn return_value(&self) -> Option<Value>;

    /// Message of the error that ended iteration, if any.
    fn last_error_message(&self) -> Option<String>;

    /// Name of the function whose body the generator runs.
    fn function_name(&self) -> &str;
}

/// Locked access to a generator.
pub type GeneratorGuard<'a> = MutexGuard<'a, dyn GeneratorObject + Send + 'static>;

/// Shared handle to a generator.
///
/// Generators are single-pass and driven by one caller at a time. The lock
/// is never waited on: a handle that is already being driven (for example a
/// body delegating to its own generator) reports `None` from `try_lock`.
#[derive(Clone)]
pub struct GeneratorRef(Arc<Mutex<dyn GeneratorObject + Send>>);

impl GeneratorRef {
    pub fn new<G: GeneratorObject + Send + 'static>(generator: G) -> Self {
        let inner: Arc<Mutex<dyn GeneratorObject + Send>> = Arc::new(Mutex::new(generator));
        GeneratorRef(inner)
    }

    /// Lock the generator for driving, or `None` if it is already running.
    pub fn try_lock(&self) -> Option<GeneratorGuard<'_>> {
        self.0.try_lock()
    }

    /// Whether both handles refer to the same generator.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for GeneratorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_lock() {
            Some(generator) => write!(
                f,
                "Generator({}, finished={})",
                generator.function_name(),
                generator.is_finished()
            ),
            None => write!(f, "Generator(<running>)"),
        }
    }
}
