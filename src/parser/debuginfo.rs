use std::str::FromStr;

use tracing::{debug, warn};

use super::lexer::{group_by_line, Lexer};
use super::types::{Address, Section, SourceLine};
use crate::error::{DebugInfoError, DebugInfoErrorKind};

/// Address-to-line mapping emitted by the compiler.
///
/// Records look like `<line> : <from> - <to>`, one per physical line.
/// Lookups scan sections in file order and the first match wins; sections are
/// expected not to overlap but this is not checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugInfo {
    sections: Vec<Section>,
    cursor: usize,
}

fn debuginfo_lexer() -> Lexer {
    Lexer::new()
        .add_linebreak('\n')
        .add_ignore(' ')
        .add_ignore('\t')
        .add_ignore('\r')
        .add_extract('-')
        .add_extract(':')
        .erase_empty()
}

fn parse_number(word: &str, line: usize) -> Result<usize, DebugInfoError> {
    let fail = || DebugInfoError {
        line,
        kind: DebugInfoErrorKind::NotANumber(word.to_string()),
    };
    if !word.bytes().all(|b| b.is_ascii_digit()) {
        return Err(fail());
    }
    word.parse::<usize>().map_err(|_| fail())
}

fn parse_record(line: usize, words: &[String]) -> Result<Section, DebugInfoError> {
    let fail = |kind| DebugInfoError { line, kind };

    if words.len() != 5 {
        return Err(fail(DebugInfoErrorKind::FieldCount(words.len())));
    }
    if words[1] != ":" {
        return Err(fail(DebugInfoErrorKind::MissingColon(words[1].clone())));
    }
    if words[3] != "-" {
        return Err(fail(DebugInfoErrorKind::MissingDash(words[3].clone())));
    }

    Ok(Section {
        line: parse_number(&words[0], line)?,
        from: parse_number(&words[2], line)?,
        to: parse_number(&words[4], line)?,
    })
}

impl DebugInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the table with the records in `source`.
    ///
    /// Loading is all-or-nothing: if any record is malformed the table is left
    /// empty and the first offending record is reported.
    pub fn load(&mut self, source: &str) -> Result<(), DebugInfoError> {
        self.sections.clear();
        self.cursor = 0;

        let mut parsed = Vec::new();
        for (line, words) in group_by_line(debuginfo_lexer().lex(source)) {
            match parse_record(line, &words) {
                Ok(section) => parsed.push(section),
                Err(err) => {
                    warn!(%err, "rejecting debug info");
                    return Err(err);
                }
            }
        }

        debug!(sections = parsed.len(), "debug info loaded");
        self.sections = parsed;
        Ok(())
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Line of the first section containing `address`, or `0`.
    pub fn line_for(&self, address: Address) -> SourceLine {
        self.sections
            .iter()
            .find(|s| s.contains(address))
            .map(|s| s.line)
            .unwrap_or(0)
    }

    /// All sections compiled from `line`, in file order.
    pub fn sections_for(&self, line: SourceLine) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(move |s| s.line == line)
    }

    /// Highest address covered by any section.
    pub fn last_address(&self) -> Option<Address> {
        self.sections.iter().map(|s| s.to).max()
    }

    pub fn next(&mut self) -> Option<Section> {
        let section = self.sections.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(section)
    }

    pub fn has_next(&self) -> bool {
        self.cursor < self.sections.len()
    }

    pub fn rewind(&mut self) {
        self.cursor = 0;
    }
}

impl FromStr for DebugInfo {
    type Err = DebugInfoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut info = DebugInfo::new();
        info.load(s)?;
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_sections_in_file_order() {
        let info: DebugInfo = "1 : 0 - 3\n2 : 4 - 7".parse().unwrap();
        assert_eq!(
            info.sections(),
            &[Section::new(1, 0, 3), Section::new(2, 4, 7)]
        );
        assert_eq!(info.line_for(0), 1);
        assert_eq!(info.line_for(5), 2);
        assert_eq!(info.line_for(8), 0);
    }

    #[test]
    fn whitespace_is_insignificant() {
        let info: DebugInfo = "  3:10-12\n\n\t4 :13 -  20\r\n".parse().unwrap();
        assert_eq!(
            info.sections(),
            &[Section::new(3, 10, 12), Section::new(4, 13, 20)]
        );
    }

    #[test]
    fn first_section_wins_on_overlap() {
        let info: DebugInfo = "5 : 0 - 10\n6 : 4 - 6".parse().unwrap();
        assert_eq!(info.line_for(5), 5);
    }

    #[test]
    fn rejects_non_numeric_fields() {
        let mut info = DebugInfo::new();
        let err = info.load("abc : 1 - 2").unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(
            err.kind,
            DebugInfoErrorKind::NotANumber("abc".to_string())
        );
        assert!(info.is_empty());
    }

    #[test]
    fn rejects_wrong_field_count() {
        let err = "1 : 0 - 3 9".parse::<DebugInfo>().unwrap_err();
        assert_eq!(err.kind, DebugInfoErrorKind::FieldCount(6));

        let err = "1 : 0".parse::<DebugInfo>().unwrap_err();
        assert_eq!(err.kind, DebugInfoErrorKind::FieldCount(3));
    }

    #[test]
    fn rejects_wrong_separators() {
        let err = "1 - 0 - 3".parse::<DebugInfo>().unwrap_err();
        assert_eq!(err.kind, DebugInfoErrorKind::MissingColon("-".to_string()));

        let err = "1 : 0 : 3".parse::<DebugInfo>().unwrap_err();
        assert_eq!(err.kind, DebugInfoErrorKind::MissingDash(":".to_string()));
    }

    #[test]
    fn negative_numbers_split_into_extra_fields() {
        let err = "1 : -4 - 3".parse::<DebugInfo>().unwrap_err();
        assert_eq!(err.kind, DebugInfoErrorKind::FieldCount(6));
    }

    #[test]
    fn failed_load_discards_earlier_records() {
        let mut info: DebugInfo = "9 : 0 - 1".parse().unwrap();
        let err = info.load("1 : 0 - 3\n2 : 4 - 7\n3 : x - 9").unwrap_err();
        assert_eq!(err.line, 3);
        assert!(info.is_empty());
        assert_eq!(info.line_for(0), 0);
    }

    #[test]
    fn cursor_walks_every_section_once() {
        let mut info: DebugInfo = "1 : 0 - 3\n2 : 4 - 7".parse().unwrap();
        assert!(info.has_next());
        assert_eq!(info.next(), Some(Section::new(1, 0, 3)));
        assert!(info.has_next());
        assert_eq!(info.next(), Some(Section::new(2, 4, 7)));
        assert!(!info.has_next());
        assert_eq!(info.next(), None);

        info.rewind();
        assert_eq!(info.next().map(|s| s.line), Some(1));
    }

    #[test]
    fn empty_text_is_an_empty_table() {
        let info: DebugInfo = "\n\n".parse().unwrap();
        assert!(info.is_empty());
        assert!(!info.has_next());
        assert_eq!(info.last_address(), None);
    }
}
