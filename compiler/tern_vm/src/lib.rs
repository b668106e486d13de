//! Tern VM - reference bytecode interpreter for Tern generator bodies.
//!
//! Implements the `tern_gen::Engine` boundary on top of the `tern_ir`
//! instruction set:
//! - `Vm`: cheap-to-clone engine handle (shared registry, config, output)
//! - `ExecutionContext`: per-generator step accounting and call depth
//! - `CallFrame`: one activation (arguments, locals, operand stack, pc)
//! - `VmConfig` / `ExecMode`: execution policy, optionally from the
//!   environment
//!
//! A generator body runs inside `execute_until_yield` / `resume_from_yield`
//! until it reaches a yield instruction; the frame is then handed back to
//! the generator as an owned `Suspended` value.

mod config;
mod errors;
mod output;
mod vm;

use std::sync::Once;

pub use config::{ExecMode, VmConfig};
pub use errors::VmError;
pub use output::{buffer_output, silent_output, stdout_output, OutputHandler, SharedOutput};
pub use vm::{CallFrame, ExecutionContext, Vm, VmBuilder};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing subscriber for debug output.
///
/// Call this once at startup to enable tracing. Set `RUST_LOG` environment
/// variable to control output:
/// - `RUST_LOG=tern_gen=debug` - generator lifecycle
/// - `RUST_LOG=tern_vm=trace` - every executed instruction
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
