use super::Word;
use crate::error::ImageError;
use crate::parser::Lexer;

/// Instruction set of the reference machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Nop = 0,
    Push = 1,
    Pop = 2,
    Dup = 3,
    Add = 4,
    Sub = 5,
    Mul = 6,
    Div = 7,
    Load = 8,
    Store = 9,
    Jmp = 10,
    Jz = 11,
    Halt = 12,
}

impl Opcode {
    pub const ALL: [Opcode; 13] = [
        Opcode::Nop,
        Opcode::Push,
        Opcode::Pop,
        Opcode::Dup,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mul,
        Opcode::Div,
        Opcode::Load,
        Opcode::Store,
        Opcode::Jmp,
        Opcode::Jz,
        Opcode::Halt,
    ];

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Nop => "nop",
            Opcode::Push => "push",
            Opcode::Pop => "pop",
            Opcode::Dup => "dup",
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Mul => "mul",
            Opcode::Div => "div",
            Opcode::Load => "load",
            Opcode::Store => "store",
            Opcode::Jmp => "jmp",
            Opcode::Jz => "jz",
            Opcode::Halt => "halt",
        }
    }

    pub fn from_mnemonic(word: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(word))
    }

    pub fn from_word(word: Word) -> Option<Self> {
        Self::ALL.into_iter().find(|op| *op as Word == word)
    }

    /// Operand cells following the opcode cell.
    pub fn operands(self) -> usize {
        match self {
            Opcode::Push | Opcode::Load | Opcode::Store | Opcode::Jmp | Opcode::Jz => 1,
            _ => 0,
        }
    }
}

/// Turn a program image into code cells.
///
/// The image is a list of whitespace-separated words, each filling one cell:
/// mnemonics become their opcode, integers are stored as-is. `#` starts a
/// comment.
pub fn assemble(source: &str) -> Result<Vec<Word>, ImageError> {
    let lexer = Lexer::new()
        .add_linebreak('\n')
        .add_ignore(' ')
        .add_ignore('\t')
        .add_ignore('\r')
        .add_ignore(',')
        .comment('#')
        .erase_empty();

    let mut code = Vec::new();
    for token in lexer.lex(source) {
        let cell = match Opcode::from_mnemonic(&token.src) {
            Some(op) => op as Word,
            None => token.src.parse::<Word>().map_err(|_| ImageError::UnknownWord {
                line: token.line,
                word: token.src.clone(),
            })?,
        };
        code.push(cell);
    }

    if code.is_empty() {
        return Err(ImageError::Empty);
    }
    Ok(code)
}
