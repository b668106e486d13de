//! Tern Gen - generator execution engine for the Tern interpreter.
//!
//! A generator runs an interpreted function body lazily: the body executes
//! until a `yield`, hands a key/value pair to the generator, and is suspended
//! until the driver asks for the next pair.
//!
//! # Architecture
//!
//! - `Generator`: lifecycle state machine (fresh, suspended, delegating,
//!   finished) behind the `next`/`current`/`key`/`valid` contract
//! - `Engine`: the VM boundary, injected at construction. The generator never
//!   executes code itself; it asks the engine to start or resume the body and
//!   threads the opaque `Suspended` handle between calls
//! - `YieldSink`: the callback surface the engine uses while running a body
//!   (`yield`, `yield from`, values delivered by `send`)
//! - delegation driver: walks an array snapshot or a child generator for
//!   `yield from`, then falls back to resuming the engine
//!
//! Execution is single-threaded and cooperative: nothing here spawns threads
//! or tasks, and suspension only happens at explicit yield instructions.

mod delegation;
mod engine;
mod errors;
mod flags;
mod generator;
mod stack;

#[cfg(test)]
mod test_helpers;

pub use engine::{Engine, EngineStep, Step, Suspended, YieldSink};
pub use errors::GeneratorError;
pub use flags::Lifecycle;
pub use generator::{Generator, Pairs};
pub use stack::ensure_sufficient_stack;
