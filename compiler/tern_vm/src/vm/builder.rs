//! `VmBuilder` for creating `Vm` instances with various configurations.

use std::sync::Arc;

use tern_ir::FunctionRegistry;

use super::Vm;
use crate::config::{ExecMode, VmConfig};
use crate::output::{stdout_output, SharedOutput};

/// Builder for `Vm`.
///
/// Defaults: `VmConfig::default()` and stdout output.
pub struct VmBuilder {
    registry: FunctionRegistry,
    config: VmConfig,
    output: Option<SharedOutput>,
}

impl VmBuilder {
    pub fn new(registry: FunctionRegistry) -> Self {
        Self {
            registry,
            config: VmConfig::default(),
            output: None,
        }
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, config: VmConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: ExecMode) -> Self {
        self.config.mode = mode;
        self
    }

    #[must_use]
    pub fn max_call_depth(mut self, depth: usize) -> Self {
        self.config.max_call_depth = depth;
        self
    }

    /// Set where `Echo` writes. Overrides the stdout default.
    #[must_use]
    pub fn output(mut self, output: SharedOutput) -> Self {
        self.output = Some(output);
        self
    }

    pub fn build(self) -> Vm {
        tracing::debug!(mode = ?self.config.mode, functions = self.registry.len(), "building vm");
        Vm {
            registry: Arc::new(self.registry),
            config: self.config,
            output: self.output.unwrap_or_else(stdout_output),
            base_depth: 0,
        }
    }
}
