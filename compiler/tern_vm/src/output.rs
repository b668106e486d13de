//! Output handler for `Echo`.
//!
//! Output goes to stdout by default; tests and embedders capture it in a
//! buffer instead.

use std::sync::Arc;

use parking_lot::Mutex;

/// Destination for echoed values, dispatched by match.
pub enum OutputHandler {
    /// Writes to stdout (default).
    Stdout,
    /// Captures to a buffer.
    Buffer(Mutex<String>),
    /// Discards all output.
    Silent,
}

impl OutputHandler {
    /// Write without newline.
    pub fn print(&self, msg: &str) {
        match self {
            Self::Stdout => print!("{msg}"),
            Self::Buffer(buffer) => buffer.lock().push_str(msg),
            Self::Silent => {}
        }
    }

    /// Everything captured so far; empty for handlers that don't capture.
    pub fn output(&self) -> String {
        match self {
            Self::Buffer(buffer) => buffer.lock().clone(),
            Self::Stdout | Self::Silent => String::new(),
        }
    }

    pub fn clear(&self) {
        if let Self::Buffer(buffer) = self {
            buffer.lock().clear();
        }
    }
}

/// Output handler shared by every clone of a `Vm`.
pub type SharedOutput = Arc<OutputHandler>;

pub fn stdout_output() -> SharedOutput {
    Arc::new(OutputHandler::Stdout)
}

/// A capturing handler; read it back with `output()`.
pub fn buffer_output() -> SharedOutput {
    Arc::new(OutputHandler::Buffer(Mutex::new(String::new())))
}

pub fn silent_output() -> SharedOutput {
    Arc::new(OutputHandler::Silent)
}
