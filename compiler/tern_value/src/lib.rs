//! Tern Value - runtime values for the Tern interpreter.
//!
//! This crate provides the tagged value model shared by the VM and the
//! generator engine:
//! - `Value`: closed tagged union (null, scalars, strings, arrays, objects,
//!   resources, references, generators)
//! - `Array`: ordered int/string keyed map with an auto-increment cursor
//! - `GeneratorRef`: shared handle to a running generator, driven through the
//!   object-safe `GeneratorObject` trait
//!
//! Generators are a variant of `Value` rather than objects inspected for an
//! internal slot, so consumers dispatch on them with a direct match.

mod array;
mod generator_ref;
mod object;
mod value;

pub use array::{Array, ArrayKey};
pub use generator_ref::{GeneratorGuard, GeneratorObject, GeneratorRef};
pub use object::{ObjectValue, ReferenceCell, ResourceHandle, GENERATOR_CLASS};
pub use value::{Heap, Value};
