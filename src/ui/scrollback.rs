use std::collections::VecDeque;

/// Bounded message log shown under the source view.
#[derive(Debug, Clone)]
pub struct Scrollback {
    rows: VecDeque<String>,
    capacity: usize,
    width: usize,
}

impl Scrollback {
    pub fn new(capacity: usize, width: usize) -> Self {
        Self {
            rows: VecDeque::new(),
            capacity: capacity.max(1),
            width: width.max(1),
        }
    }

    /// Append text; `\n` starts a new row and rows wider than the log wrap.
    /// A leading newline into an empty log is dropped, so messages can always
    /// be written as `"\nmessage"`.
    pub fn append(&mut self, text: &str) {
        let text = if self.rows.is_empty() {
            text.strip_prefix('\n').unwrap_or(text)
        } else {
            text
        };
        if self.rows.is_empty() {
            self.rows.push_back(String::new());
        }

        for ch in text.chars() {
            if ch == '\n' {
                self.rows.push_back(String::new());
                continue;
            }
            let full = self
                .rows
                .back()
                .is_some_and(|row| row.chars().count() >= self.width);
            if full {
                self.rows.push_back(String::new());
            }
            if let Some(row) = self.rows.back_mut() {
                row.push(ch);
            }
        }

        while self.rows.len() > self.capacity {
            self.rows.pop_front();
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.rows.back().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }
}
