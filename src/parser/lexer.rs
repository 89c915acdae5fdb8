use super::types::Token;

/// Small character-class tokenizer shared by the debug-info loader, the
/// program image loader and the source viewer.
#[derive(Debug, Clone, Default)]
pub struct Lexer {
    linebreaks: Vec<char>,
    ignores: Vec<char>,
    extracts: Vec<char>,
    comment: Option<char>,
    erase_empty: bool,
}

impl Lexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_linebreak(mut self, ch: char) -> Self {
        self.linebreaks.push(ch);
        self
    }

    pub fn add_ignore(mut self, ch: char) -> Self {
        self.ignores.push(ch);
        self
    }

    /// Characters that always form a token of their own.
    pub fn add_extract(mut self, ch: char) -> Self {
        self.extracts.push(ch);
        self
    }

    /// Everything from `ch` to the end of the physical line is dropped.
    pub fn comment(mut self, ch: char) -> Self {
        self.comment = Some(ch);
        self
    }

    pub fn erase_empty(mut self) -> Self {
        self.erase_empty = true;
        self
    }

    pub fn lex(&self, source: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut current = String::new();
        let mut line = 1usize;
        let mut in_comment = false;

        for ch in source.chars() {
            if self.linebreaks.contains(&ch) {
                self.flush(&mut tokens, &mut current, line);
                in_comment = false;
                line += 1;
                continue;
            }
            if in_comment {
                continue;
            }
            if self.comment == Some(ch) {
                self.flush(&mut tokens, &mut current, line);
                in_comment = true;
                continue;
            }
            if self.ignores.contains(&ch) {
                self.flush(&mut tokens, &mut current, line);
                continue;
            }
            if self.extracts.contains(&ch) {
                self.flush(&mut tokens, &mut current, line);
                tokens.push(Token {
                    src: ch.to_string(),
                    line,
                });
                continue;
            }
            current.push(ch);
        }
        self.flush(&mut tokens, &mut current, line);

        tokens
    }

    fn flush(&self, tokens: &mut Vec<Token>, current: &mut String, line: usize) {
        if current.is_empty() && self.erase_empty {
            return;
        }
        tokens.push(Token {
            src: std::mem::take(current),
            line,
        });
    }
}

/// Group tokens by the physical line they were found on, keeping file order.
pub fn group_by_line(tokens: Vec<Token>) -> Vec<(usize, Vec<String>)> {
    let mut groups: Vec<(usize, Vec<String>)> = Vec::new();
    for token in tokens {
        match groups.last_mut() {
            Some((line, words)) if *line == token.line => words.push(token.src),
            _ => groups.push((token.line, vec![token.src])),
        }
    }
    groups
}
