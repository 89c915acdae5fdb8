use tracing::trace;

use super::image::Opcode;
use super::{stack_base, Machine, Position, Signal, Word};
use crate::error::MachineError;
use crate::parser::Address;

/// Reference stack machine.
///
/// Code and data live in separate buffers. The data buffer holds `heap_size`
/// addressable cells followed by the stack, which grows upward from
/// [`stack_base`]; the stack pointer indexes the top element.
#[derive(Debug, Clone)]
pub struct StackMachine {
    code: Vec<Word>,
    heap: Vec<Word>,
    heap_size: usize,
    sp: usize,
}

impl StackMachine {
    /// `heap_size + stack_size` is bounded by
    /// [`DebuggerConfig::validate`](crate::config::DebuggerConfig::validate).
    pub fn new(code: Vec<Word>, heap_size: usize, stack_size: usize) -> Self {
        Self {
            code,
            heap: vec![0; heap_size + stack_size + 1],
            heap_size,
            sp: stack_base(heap_size),
        }
    }

    pub fn code(&self) -> &[Word] {
        &self.code
    }

    fn push(&mut self, value: Word, at: Address) -> Result<(), MachineError> {
        if self.sp + 1 >= self.heap.len() {
            return Err(MachineError::StackOverflow(at));
        }
        self.sp += 1;
        self.heap[self.sp] = value;
        Ok(())
    }

    fn pop(&mut self, at: Address) -> Result<Word, MachineError> {
        if self.sp <= stack_base(self.heap_size) {
            return Err(MachineError::StackUnderflow(at));
        }
        let value = self.heap[self.sp];
        self.sp -= 1;
        Ok(value)
    }

    fn binary(
        &mut self,
        at: Address,
        op: impl FnOnce(Word, Word) -> Result<Word, MachineError>,
    ) -> Result<(), MachineError> {
        if self.sp < stack_base(self.heap_size) + 2 {
            return Err(MachineError::StackUnderflow(at));
        }
        let rhs = self.pop(at)?;
        let lhs = self.pop(at)?;
        self.push(op(lhs, rhs)?, at)
    }

    fn heap_cell(&self, cell: Word, at: Address) -> Result<usize, MachineError> {
        usize::try_from(cell)
            .ok()
            .filter(|c| *c < self.heap_size)
            .ok_or(MachineError::HeapOutOfRange { cell, address: at })
    }

    fn jump_target(&self, target: Word, at: Address) -> Result<Address, MachineError> {
        usize::try_from(target)
            .ok()
            .filter(|t| *t < self.code.len())
            .ok_or(MachineError::JumpOutOfRange { target, address: at })
    }

    fn execute(&mut self, position: &mut Position) -> Result<bool, MachineError> {
        let at = position.next_address();
        *position = Position::At(at);

        let word = self.code[at];
        let op = Opcode::from_word(word).ok_or(MachineError::InvalidOpcode {
            opcode: word,
            address: at,
        })?;
        let operand = if op.operands() > 0 {
            let value = *self
                .code
                .get(at + 1)
                .ok_or(MachineError::MissingOperand(at))?;
            *position = Position::At(at + 1);
            value
        } else {
            0
        };
        trace!(address = at, op = op.mnemonic(), operand, "micro-step");

        match op {
            Opcode::Nop => {}
            Opcode::Push => self.push(operand, at)?,
            Opcode::Pop => {
                self.pop(at)?;
            }
            Opcode::Dup => {
                let top = self.pop(at)?;
                self.push(top, at)?;
                self.push(top, at)?;
            }
            Opcode::Add => self.binary(at, |a, b| Ok(a.wrapping_add(b)))?,
            Opcode::Sub => self.binary(at, |a, b| Ok(a.wrapping_sub(b)))?,
            Opcode::Mul => self.binary(at, |a, b| Ok(a.wrapping_mul(b)))?,
            Opcode::Div => self.binary(at, |a, b| {
                if b == 0 {
                    Err(MachineError::DivisionByZero(at))
                } else {
                    Ok(a.wrapping_div(b))
                }
            })?,
            Opcode::Load => {
                let cell = self.heap_cell(operand, at)?;
                self.push(self.heap[cell], at)?;
            }
            Opcode::Store => {
                let cell = self.heap_cell(operand, at)?;
                self.heap[cell] = self.pop(at)?;
            }
            Opcode::Jmp => {
                let to = self.jump_target(operand, at)?;
                *position = Position::Jumped { from: at + 1, to };
            }
            Opcode::Jz => {
                let to = self.jump_target(operand, at)?;
                if self.pop(at)? == 0 {
                    *position = Position::Jumped { from: at + 1, to };
                }
            }
            Opcode::Halt => return Ok(false),
        }
        Ok(true)
    }
}

impl Machine for StackMachine {
    fn advance(&mut self, position: &mut Position) -> Signal {
        if position.next_address() >= self.code.len() {
            return Signal::Exit;
        }
        match self.execute(position) {
            Ok(true) => Signal::Ok,
            Ok(false) => Signal::Exit,
            Err(err) => Signal::Error(err),
        }
    }

    fn reset(&mut self) {
        self.heap.iter_mut().for_each(|cell| *cell = 0);
        self.sp = stack_base(self.heap_size);
    }

    fn code_len(&self) -> usize {
        self.code.len()
    }

    fn heap(&self) -> &[Word] {
        &self.heap
    }

    fn heap_size(&self) -> usize {
        self.heap_size
    }

    fn stack_ptr(&self) -> usize {
        self.sp
    }
}
