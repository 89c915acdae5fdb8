use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::error::MachineError;
use crate::parser::SourceLine;

/// Execution state of the debugged program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ExecutionState {
    #[default]
    Idle,
    Running,
    Stopped,
    Exited,
    Failed,
}

impl ExecutionState {
    /// States from which `step` and `continue_prog` may proceed.
    pub fn is_live(self) -> bool {
        matches!(self, ExecutionState::Running | ExecutionState::Stopped)
    }
}

/// Why an execution-control operation returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    Breakpoint(SourceLine),
    /// A single source-line step completed.
    Step(SourceLine),
    /// The continuation was cancelled.
    Interrupted(SourceLine),
    Exited,
    Failed(MachineError),
}

/// Shared flag a long continuation polls once per source-line step.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear the flag and report whether it was set.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}
