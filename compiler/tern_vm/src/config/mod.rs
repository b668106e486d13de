//! Execution policy for the VM.
//!
//! `ExecMode` follows the enum-policy style: a closed set of modes with
//! query methods, matched on where behavior differs.

/// How much work a single execution context may do.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ExecMode {
    /// No limit on executed instructions.
    #[default]
    Interpret,
    /// Abort once an execution context has executed `budget` instructions.
    ///
    /// A generator keeps one context for its whole life, so the budget
    /// covers every resume, not just a single `next()`.
    Bounded { budget: u64 },
}

impl ExecMode {
    /// Instruction budget per execution context, or `None` when unbounded.
    #[inline]
    pub fn step_budget(&self) -> Option<u64> {
        match self {
            Self::Interpret => None,
            Self::Bounded { budget } => Some(*budget),
        }
    }

    #[inline]
    pub fn is_bounded(&self) -> bool {
        matches!(self, Self::Bounded { .. })
    }
}

/// VM configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VmConfig {
    pub mode: ExecMode,
    /// Maximum nesting of plain function calls inside one context.
    pub max_call_depth: usize,
}

impl VmConfig {
    /// Environment variable holding an instruction budget.
    pub const STEP_BUDGET_VAR: &'static str = "TERN_STEP_BUDGET";

    pub const DEFAULT_MAX_CALL_DEPTH: usize = 512;

    /// Default configuration, switched to `ExecMode::Bounded` when
    /// `TERN_STEP_BUDGET` holds an integer.
    pub fn from_env() -> Self {
        let budget = std::env::var(Self::STEP_BUDGET_VAR).ok();
        Self::with_budget_setting(budget.as_deref())
    }

    fn with_budget_setting(setting: Option<&str>) -> Self {
        let mode = match setting.map(str::trim) {
            None | Some("") => ExecMode::Interpret,
            Some(raw) => match raw.parse::<u64>() {
                Ok(budget) => ExecMode::Bounded { budget },
                Err(error) => {
                    tracing::warn!(
                        var = Self::STEP_BUDGET_VAR,
                        value = raw,
                        %error,
                        "ignoring invalid step budget"
                    );
                    ExecMode::Interpret
                }
            },
        };
        Self {
            mode,
            ..Self::default()
        }
    }
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            mode: ExecMode::Interpret,
            max_call_depth: Self::DEFAULT_MAX_CALL_DEPTH,
        }
    }
}
