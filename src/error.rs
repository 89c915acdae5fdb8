//! Error types for the debugger.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::parser::{Address, SourceLine};

/// Crate-level result type, used by the binary.
pub type Result<T> = std::result::Result<T, Error>;

/// A malformed record in the debug-information text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("debug info line {line}: {kind}")]
pub struct DebugInfoError {
    /// Physical line of the offending record (1-based).
    pub line: usize,
    pub kind: DebugInfoErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DebugInfoErrorKind {
    #[error("expected 5 fields, found {0}")]
    FieldCount(usize),
    #[error("expected ':' after the line number, found '{0}'")]
    MissingColon(String),
    #[error("expected '-' between addresses, found '{0}'")]
    MissingDash(String),
    #[error("'{0}' is not a non-negative integer")]
    NotANumber(String),
}

/// A program image that could not be turned into machine code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    #[error("line {line}: unknown word '{word}'")]
    UnknownWord { line: usize, word: String },
    #[error("program image is empty")]
    Empty,
}

/// Runtime faults raised by the machine while executing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    #[error("invalid opcode {opcode} at address {address}")]
    InvalidOpcode { opcode: i64, address: Address },
    #[error("missing operand for instruction at address {0}")]
    MissingOperand(Address),
    #[error("stack underflow at address {0}")]
    StackUnderflow(Address),
    #[error("stack overflow at address {0}")]
    StackOverflow(Address),
    #[error("division by zero at address {0}")]
    DivisionByZero(Address),
    #[error("heap address {cell} out of range at address {address}")]
    HeapOutOfRange { cell: i64, address: Address },
    #[error("jump target {target} out of range at address {address}")]
    JumpOutOfRange { target: i64, address: Address },
}

/// An execution-control operation invoked in a state that does not allow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error("Program is not running at the moment")]
    NotRunning,
}

/// The background worker thread is no longer running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("debugger worker has stopped")]
pub struct WorkerGone;

/// Bad input typed at the prompt. Reported to the user, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Invalid position!")]
    InvalidLine(String),
    #[error("Invalid address!")]
    InvalidAddress(String),
    #[error("Address {0} is outside the heap")]
    AddressOutOfRange(usize),
    #[error("'{0}' needs an argument")]
    MissingArgument(String),
    #[error("Unbalanced quotes in input")]
    Unbalanced,
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
    #[error("No breakpoint can be placed on line {0}")]
    UnmappedLine(SourceLine),
}

/// Invalid configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("heap_size + stack_size must not exceed {max} cells (got {heap_size} + {stack_size})")]
    TooLarge {
        heap_size: usize,
        stack_size: usize,
        max: usize,
    },
}

/// Everything that can stop a debug session from starting.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("Unable to debug: debug file loading failed: {0}")]
    DebugInfo(#[from] DebugInfoError),
    #[error("Unable to start debugging: {0}")]
    Image(#[from] ImageError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
}
