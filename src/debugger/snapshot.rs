use serde::Serialize;

use super::context::Debugger;
use super::stepping::ExecutionState;
use crate::parser::{Address, SourceLine};
use crate::vm::{Machine, Position, Word};

/// Point-in-time view of a debug session, printable as JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub state: ExecutionState,
    pub line: SourceLine,
    pub address: Address,
    pub position: Position,
    /// Stack cells, top first.
    pub stack: Vec<Word>,
    pub breakpoints: Vec<SourceLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<String>,
}

impl<M: Machine> Debugger<M> {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state(),
            line: self.line(),
            address: self.address(),
            position: self.position(),
            stack: self.machine().stack(),
            breakpoints: self.breakpoints().lines(),
            fault: self.fault().map(ToString::to_string),
        }
    }
}
