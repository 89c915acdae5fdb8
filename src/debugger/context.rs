use tracing::{debug, info, warn};

use super::breakpoints::Breakpoints;
use super::stepping::{CancelToken, ExecutionState, StopReason};
use crate::error::{ControlError, MachineError};
use crate::parser::{Address, DebugInfo, SourceLine};
use crate::vm::{Machine, Position, Signal};

/// Execution controller: owns the machine and drives it one source line at a
/// time, stopping on breakpoints.
///
/// `state` only changes inside the operations below. The debug info is fixed
/// at construction.
pub struct Debugger<M> {
    machine: M,
    debug_info: DebugInfo,
    breakpoints: Breakpoints,
    position: Position,
    state: ExecutionState,
    fault: Option<MachineError>,
}

impl<M: Machine> Debugger<M> {
    pub fn new(machine: M, debug_info: DebugInfo) -> Self {
        Self {
            machine,
            debug_info,
            breakpoints: Breakpoints::new(),
            position: Position::NotStarted,
            state: ExecutionState::Idle,
            fault: None,
        }
    }

    pub fn state(&self) -> ExecutionState {
        self.state
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn machine(&self) -> &M {
        &self.machine
    }

    pub fn debug_info(&self) -> &DebugInfo {
        &self.debug_info
    }

    pub fn breakpoints(&self) -> &Breakpoints {
        &self.breakpoints
    }

    /// The runtime fault of the last failed run, if any.
    pub fn fault(&self) -> Option<&MachineError> {
        self.fault.as_ref()
    }

    pub fn add_breakpoint(&mut self, line: SourceLine) -> usize {
        self.breakpoints.add(line, &self.debug_info)
    }

    pub fn remove_breakpoint(&mut self, line: SourceLine) -> usize {
        self.breakpoints.remove(line)
    }

    pub fn address(&self) -> Address {
        self.position.address()
    }

    /// Source line of the current address, `0` when unmapped.
    pub fn line(&self) -> SourceLine {
        self.debug_info.line_for(self.address())
    }

    /// Execute micro-steps until the mapped line changes or the machine stops
    /// signalling `Ok`. Always performs at least one micro-step.
    fn step_line(&mut self) -> Signal {
        let entry_line = self.line();
        loop {
            let signal = self.machine.advance(&mut self.position);
            if !signal.is_ok() || self.line() != entry_line {
                return signal;
            }
        }
    }

    fn settle(
        &mut self,
        signal: Signal,
        stopped: impl FnOnce(SourceLine) -> StopReason,
    ) -> StopReason {
        let reason = match signal {
            Signal::Ok => {
                self.state = ExecutionState::Stopped;
                stopped(self.line())
            }
            Signal::Exit => {
                self.state = ExecutionState::Exited;
                StopReason::Exited
            }
            Signal::Error(err) => {
                warn!(%err, address = self.address(), "program failed");
                self.state = ExecutionState::Failed;
                self.fault = Some(err.clone());
                StopReason::Failed(err)
            }
        };
        debug!(state = ?self.state, line = self.line(), address = self.address(), "settled");
        reason
    }

    /// Interrupts only apply to the continuation they were raised during.
    fn discard_stale_interrupt(cancel: &CancelToken) {
        if cancel.take() {
            debug!("discarding interrupt raised while nothing was running");
        }
    }

    fn continuation(&mut self, cancel: &CancelToken) -> StopReason {
        self.state = ExecutionState::Running;
        let mut signal = Signal::Ok;
        while signal.is_ok() && !self.breakpoints.hit(self.address()) {
            if cancel.take() {
                info!(line = self.line(), "continuation interrupted");
                return self.settle(Signal::Ok, StopReason::Interrupted);
            }
            signal = self.step_line();
        }
        self.settle(signal, StopReason::Breakpoint)
    }

    /// Advance exactly one source line.
    pub fn step(&mut self) -> Result<StopReason, ControlError> {
        if !self.state.is_live() {
            return Err(ControlError::NotRunning);
        }
        self.state = ExecutionState::Running;
        let signal = self.step_line();
        Ok(self.settle(signal, StopReason::Step))
    }

    /// Step until a breakpoint is hit or the program stops.
    pub fn continue_prog(&mut self) -> Result<StopReason, ControlError> {
        self.continue_with(&CancelToken::new())
    }

    /// [`Debugger::continue_prog`] with a cancellation check once per source-line step.
    pub fn continue_with(&mut self, cancel: &CancelToken) -> Result<StopReason, ControlError> {
        if !self.state.is_live() {
            return Err(ControlError::NotRunning);
        }
        Self::discard_stale_interrupt(cancel);
        Ok(self.continuation(cancel))
    }

    /// Leave the current stop with one step, then continue to the next breakpoint.
    pub fn resume(&mut self, cancel: &CancelToken) -> Result<StopReason, ControlError> {
        if self.state.is_live() {
            Self::discard_stale_interrupt(cancel);
        }
        let reason = self.step()?;
        if self.state != ExecutionState::Stopped {
            return Ok(reason);
        }
        Ok(self.continuation(cancel))
    }

    pub fn run(&mut self) -> StopReason {
        self.run_from(0, &CancelToken::new())
    }

    /// Restart the program so that the first micro-step executes `from`.
    pub fn run_from(&mut self, from: Address, cancel: &CancelToken) -> StopReason {
        info!(from, "starting execution");
        Self::discard_stale_interrupt(cancel);
        self.machine.reset();
        self.position = Position::start(from);
        self.fault = None;
        self.continuation(cancel)
    }

    /// Move a failed run to `Exited` once the failure has been reported.
    pub fn acknowledge_failure(&mut self) -> Option<MachineError> {
        if self.state != ExecutionState::Failed {
            return None;
        }
        self.state = ExecutionState::Exited;
        self.fault.clone()
    }
}
