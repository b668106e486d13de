//! Generator errors.

use std::error::Error;
use std::sync::Arc;

/// Errors raised by the generator lifecycle and delegation driver.
///
/// Lifecycle violations (`rewind`, `get_return`, `yield from` on a bad
/// source) are returned from the offending call. Engine failures finalize the
/// generator; `next()` reports them as end of iteration and keeps them for
/// `last_error()`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GeneratorError {
    #[error("cannot rewind a generator that was already run")]
    AlreadyStarted,

    #[error("cannot resume an already running generator")]
    AlreadyRunning,

    #[error("can use \"yield from\" only with arrays and generators, {type_name} given")]
    UnsupportedDelegationSource { type_name: &'static str },

    #[error("generator object has no generator bound to it")]
    MissingDelegationBinding,

    #[error("delegated generator `{function}` failed: {message}")]
    DelegateFailed { function: String, message: String },

    #[error("cannot get return value of a generator that hasn't returned")]
    NotFinished,

    #[error("generator finished without returning a value")]
    NoReturnValue,

    #[error("execution failed: {0}")]
    VmExecutionFailed(#[source] Arc<dyn Error + Send + Sync>),
}

impl GeneratorError {
    /// Wrap an engine error.
    pub fn vm(error: impl Error + Send + Sync + 'static) -> Self {
        GeneratorError::VmExecutionFailed(Arc::new(error))
    }
}
