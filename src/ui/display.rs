use crate::debugger::ExecutionState;
use crate::parser::SourceLine;

/// Scroll position of the source view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayPosition {
    /// Index of the first visible source line.
    pub line: usize,
    /// Number of source lines.
    pub max: usize,
}

/// Size of the source view, in rows and columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub height: usize,
    pub width: usize,
}

/// What the source view needs to know about the program.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub state: ExecutionState,
    pub current_line: SourceLine,
    pub breakpoints: &'a [SourceLine],
}

impl DisplayPosition {
    pub fn new(max: usize) -> Self {
        Self { line: 0, max }
    }

    /// Returns false when already at the top.
    pub fn scroll_up(&mut self) -> bool {
        if self.line == 0 {
            return false;
        }
        self.line -= 1;
        true
    }

    pub fn scroll_down(&mut self) -> bool {
        if self.line + 1 >= self.max {
            return false;
        }
        self.line += 1;
        true
    }

    pub fn top(&mut self) -> bool {
        if self.line == 0 {
            return false;
        }
        self.line = 0;
        true
    }

    pub fn end(&mut self) -> bool {
        let last = self.max.saturating_sub(1);
        if self.line == last {
            return false;
        }
        self.line = last;
        true
    }

    /// Scroll so that `current` sits in the middle of a view `height` rows tall.
    pub fn centre_on(&mut self, current: SourceLine, height: usize) {
        let index = current.saturating_sub(1);
        self.line = index
            .saturating_sub(height / 2)
            .min(self.max.saturating_sub(1));
    }
}

/// Split `text` into chunks of at most `width` characters. Empty text is one
/// empty chunk.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars.chunks(width).map(|c| c.iter().collect()).collect()
}

fn marker(number: SourceLine, frame: &Frame<'_>) -> char {
    if number == frame.current_line {
        '>'
    } else if frame.breakpoints.contains(&number) {
        '*'
    } else {
        '|'
    }
}

/// Render the source view. The first row is a status line; the rest are
/// source rows `"nnnn m text"` where `m` marks the current line (`>`), a
/// breakpoint (`*`) or nothing (`|`).
pub fn render(
    lines: &[String],
    position: &DisplayPosition,
    viewport: Viewport,
    frame: &Frame<'_>,
) -> Vec<String> {
    let mut rows = Vec::with_capacity(viewport.height);
    rows.push(match frame.current_line {
        0 => format!("[{:?}]", frame.state),
        line => format!("[{:?}] line {}", frame.state, line),
    });

    let text_width = viewport.width.saturating_sub(10);
    for (index, text) in lines.iter().enumerate().skip(position.line) {
        let number = index + 1;
        let mark = marker(number, frame);
        for chunk in wrap(text, text_width) {
            if rows.len() >= viewport.height {
                return rows;
            }
            rows.push(format!("{:4} {} {}", number, mark, chunk));
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("stmt {i}")).collect()
    }

    #[test]
    fn marks_current_line_and_breakpoints() {
        let frame = Frame {
            state: ExecutionState::Stopped,
            current_line: 2,
            breakpoints: &[2, 3],
        };
        let rows = render(
            &lines(4),
            &DisplayPosition::new(4),
            Viewport { height: 10, width: 40 },
            &frame,
        );
        assert_eq!(
            rows,
            vec![
                "[Stopped] line 2",
                "   1 | stmt 1",
                "   2 > stmt 2",
                "   3 * stmt 3",
                "   4 | stmt 4",
            ]
        );
    }

    #[test]
    fn wraps_long_lines_and_respects_height() {
        let frame = Frame {
            state: ExecutionState::Idle,
            current_line: 0,
            breakpoints: &[],
        };
        let source = vec!["abcdefgh".to_string(), "x".to_string()];
        let rows = render(
            &source,
            &DisplayPosition::new(2),
            Viewport { height: 3, width: 14 },
            &frame,
        );
        assert_eq!(rows, vec!["[Idle]", "   1 | abcd", "   1 | efgh"]);
    }

    #[test]
    fn scrolling_stays_in_range() {
        let mut pos = DisplayPosition::new(3);
        assert!(!pos.scroll_up());
        assert!(pos.scroll_down());
        assert!(pos.scroll_down());
        assert!(!pos.scroll_down());
        assert!(!pos.end());
        assert!(pos.top());
        assert_eq!(pos.line, 0);
    }

    #[test]
    fn centring_clamps_to_the_source() {
        let mut pos = DisplayPosition::new(100);
        pos.centre_on(50, 20);
        assert_eq!(pos.line, 39);
        pos.centre_on(3, 20);
        assert_eq!(pos.line, 0);

        let mut short = DisplayPosition::new(5);
        short.centre_on(90, 2);
        assert_eq!(short.line, 4);
    }

    #[test]
    fn wrap_handles_empty_text() {
        assert_eq!(wrap("", 5), vec![String::new()]);
        assert_eq!(wrap("abcdef", 0).len(), 6);
    }
}
