mod commands;
mod debuginfo;
mod lexer;
mod types;

pub use commands::{parse_command, Command, HELP};
pub use debuginfo::DebugInfo;
pub use lexer::{group_by_line, Lexer};
pub use types::{Address, Section, SourceLine, Token};

/// Split source text into display lines. A trailing newline does not produce
/// an extra empty line.
pub fn source_lines(source: &str) -> Vec<String> {
    let source = source.strip_suffix('\n').unwrap_or(source);
    if source.is_empty() {
        return Vec::new();
    }
    Lexer::new()
        .add_linebreak('\n')
        .lex(source)
        .into_iter()
        .map(|t| t.src.trim_end_matches('\r').to_string())
        .collect()
}
