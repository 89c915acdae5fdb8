use tracing::info;

use crate::parser::{Address, DebugInfo, Section, SourceLine};

/// Sections promoted into the active stop-set.
#[derive(Debug, Clone, Default)]
pub struct Breakpoints {
    points: Vec<Section>,
}

impl Breakpoints {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Copy every section of `line` into the set. Returns how many sections
    /// were added; a line the compiler emitted no code for adds nothing.
    pub fn add(&mut self, line: SourceLine, info: &DebugInfo) -> usize {
        let mut added = 0;
        for section in info.sections_for(line) {
            if !self.points.contains(section) {
                self.points.push(*section);
                added += 1;
            }
        }
        info!(line, added, "breakpoint set");
        added
    }

    /// Drop every section of `line`. Returns how many were removed.
    pub fn remove(&mut self, line: SourceLine) -> usize {
        let before = self.points.len();
        self.points.retain(|s| s.line != line);
        let removed = before - self.points.len();
        info!(line, removed, "breakpoint removed");
        removed
    }

    pub fn hit(&self, address: Address) -> bool {
        self.points.iter().any(|s| s.contains(address))
    }

    /// Lines with at least one active section, ascending and deduplicated.
    pub fn lines(&self) -> Vec<SourceLine> {
        let mut lines: Vec<_> = self.points.iter().map(|s| s.line).collect();
        lines.sort_unstable();
        lines.dedup();
        lines
    }

    pub fn sections(&self) -> &[Section] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}
