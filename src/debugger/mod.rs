mod breakpoints;
mod context;
mod snapshot;
mod stepping;

pub use breakpoints::Breakpoints;
pub use context::Debugger;
pub use snapshot::Snapshot;
pub use stepping::{CancelToken, ExecutionState, StopReason};
