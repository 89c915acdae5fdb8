use serde::Serialize;

/// One line of the debugged program's source text. `0` means "no mapped line".
pub type SourceLine = usize;

/// Index into the machine's flat instruction space.
pub type Address = usize;

/// Contiguous, inclusive address range compiled from one source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Section {
    pub line: SourceLine,
    pub from: Address,
    pub to: Address,
}

impl Section {
    pub fn new(line: SourceLine, from: Address, to: Address) -> Self {
        Self { line, from, to }
    }

    /// Inclusive on both ends.
    pub fn contains(&self, address: Address) -> bool {
        self.from <= address && address <= self.to
    }
}

/// One token produced by the lexer, tagged with its physical line (1-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub src: String,
    pub line: usize,
}
