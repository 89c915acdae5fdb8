//! The virtual machine as seen by the debugger.
//!
//! The execution controller only needs a single micro-step primitive and
//! read access to memory; [`Machine`] captures exactly that. [`StackMachine`]
//! is a small reference implementation used by the binary and the tests.

mod image;
mod machine;

pub use image::{assemble, Opcode};
pub use machine::StackMachine;

use serde::Serialize;

use crate::error::MachineError;
use crate::parser::Address;

/// A machine word.
pub type Word = i64;

/// Where execution currently is.
///
/// [`Position::address`] is always a cell that has executed, except before
/// the first micro-step, where it is the entry address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Position {
    /// Nothing executed yet; the first micro-step lands on address `0`.
    #[default]
    NotStarted,
    /// Nothing executed yet; the first micro-step lands on this address.
    Entry(Address),
    /// The last executed instruction ended on this address.
    At(Address),
    /// The last executed instruction ended on `from` and transferred control
    /// to `to`.
    Jumped { from: Address, to: Address },
}

impl Position {
    /// The position before anything ran, such that the next micro-step lands
    /// on `address`.
    pub fn start(address: Address) -> Self {
        match address {
            0 => Position::NotStarted,
            address => Position::Entry(address),
        }
    }

    /// Address reported to the user and tested against breakpoints.
    pub fn address(&self) -> Address {
        match self {
            Position::NotStarted => 0,
            Position::Entry(address) | Position::At(address) => *address,
            Position::Jumped { from, .. } => *from,
        }
    }

    /// Address the next micro-step will fetch from.
    pub fn next_address(&self) -> Address {
        match self {
            Position::NotStarted => 0,
            Position::Entry(address) => *address,
            Position::At(address) => address + 1,
            Position::Jumped { to, .. } => *to,
        }
    }
}

/// Outcome of one micro-step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    Ok,
    Exit,
    Error(MachineError),
}

impl Signal {
    pub fn is_ok(&self) -> bool {
        matches!(self, Signal::Ok)
    }
}

/// Canonical base-of-stack offset for a heap of `heap_size` cells.
pub fn stack_base(heap_size: usize) -> usize {
    heap_size
}

/// A machine the debugger can drive one instruction at a time.
pub trait Machine {
    /// Execute the instruction at `position.next_address()` and move
    /// `position` onto the last cell that instruction occupied. A taken jump
    /// leaves [`Position::Jumped`] so the reported address stays on the jump.
    fn advance(&mut self, position: &mut Position) -> Signal;

    /// Restore load-time memory and put the stack pointer at the stack base.
    fn reset(&mut self);

    /// Number of code cells.
    fn code_len(&self) -> usize;

    /// Heap cells, including the stack region.
    fn heap(&self) -> &[Word];

    fn heap_size(&self) -> usize;

    fn stack_ptr(&self) -> usize;

    /// Stack cells from the top down.
    fn stack(&self) -> Vec<Word> {
        let base = stack_base(self.heap_size());
        let heap = self.heap();
        (base + 1..=self.stack_ptr())
            .rev()
            .filter_map(|i| heap.get(i).copied())
            .collect()
    }
}
