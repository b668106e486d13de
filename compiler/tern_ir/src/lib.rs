//! Tern IR - callable descriptions for the Tern interpreter.
//!
//! - `FunctionDescriptor`: static description of a user function (name,
//!   arity, local slots, instruction body)
//! - `FunctionRef`: shared handle to a descriptor; generators borrow
//!   descriptors through it, the registry owns them
//! - `FunctionRegistry`: id/name lookup for descriptors
//! - `Op`: the instruction set executed by the reference VM

mod function;
mod op;
mod registry;

pub use function::{FunctionBuilder, FunctionDescriptor, FunctionId, FunctionRef};
pub use op::Op;
pub use registry::{FunctionRegistry, RegistryError};
