//! Source location tracking
//!
//! Positions carry a byte offset plus a 1-based line and column. Columns count
//! characters, not bytes, and a tab occupies a single column. Line boundaries
//! follow the lexer's terminator rules: CR, LF, CRLF and LFCR each end exactly
//! one line.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text with line, column, and byte offset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Byte offset from start of input (0-based)
    pub offset: usize,
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based)
    pub column: u32,
}

impl Position {
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Create the starting position (offset 0, line 1, column 1)
    pub fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span of source text from start to end position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(
            start.offset <= end.offset,
            "Span start must not be after end"
        );
        Self { start, end }
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    /// Byte length of this span
    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.offset >= self.start.offset && pos.offset < self.end.offset
    }

    /// Source text for this span
    pub fn slice<'a>(&self, input: &'a str) -> &'a str {
        &input[self.start.offset..self.end.offset]
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// A source map that tracks line starts for efficient position lookup
#[derive(Debug, Clone)]
pub struct SourceMap {
    pub source: String,
    /// Byte offsets of line starts
    line_starts: Vec<usize>,
    /// Byte offsets where each line's content ends (terminator excluded)
    line_ends: Vec<usize>,
}

impl SourceMap {
    pub fn new(source: String) -> Self {
        let mut line_starts = vec![0];
        let mut line_ends = Vec::new();
        let mut chars = source.char_indices().peekable();

        while let Some((offset, ch)) = chars.next() {
            let complement = match ch {
                '\r' => '\n',
                '\n' => '\r',
                _ => continue,
            };
            line_ends.push(offset);
            let mut next_start = offset + 1;
            if let Some(&(pair_offset, next)) = chars.peek() {
                if next == complement {
                    chars.next();
                    next_start = pair_offset + 1;
                }
            }
            line_starts.push(next_start);
        }
        line_ends.push(source.len());

        Self {
            source,
            line_starts,
            line_ends,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Get the line and column for a byte offset
    pub fn position_at(&self, offset: usize) -> Position {
        let line = self
            .line_starts
            .binary_search(&offset)
            .unwrap_or_else(|i| i - 1);

        let line_start = self.line_starts[line];
        let column = self.source[line_start..offset].chars().count();

        Position::new(offset, (line + 1) as u32, (column + 1) as u32)
    }

    /// Get a line of text by line number (1-based), without its terminator
    pub fn get_line(&self, line_num: u32) -> Option<&str> {
        let line_idx = (line_num as usize).checked_sub(1)?;
        let start = *self.line_starts.get(line_idx)?;
        let end = *self.line_ends.get(line_idx)?;
        Some(&self.source[start..end])
    }

    /// Format a message with the offending line and a caret underline
    pub fn format_error(&self, span: &Span, message: &str) -> String {
        let mut result = String::new();

        result.push_str(&format!("Error: {}\n", message));
        result.push_str(&format!(
            "  --> {}:{}\n",
            span.start.line, span.start.column
        ));

        if let Some(line) = self.get_line(span.start.line) {
            let line_num_str = format!("{}", span.start.line);
            let padding = " ".repeat(line_num_str.len());

            result.push_str(&format!("   {} |\n", padding));
            result.push_str(&format!("{} | {}\n", line_num_str, line));

            let mut underline = String::new();
            underline.push_str(&format!("   {} | ", padding));
            for _ in 1..span.start.column {
                underline.push(' ');
            }

            let line_width = line.chars().count() as u32;
            let span_len = if span.start.line == span.end.line {
                span.end.column.saturating_sub(span.start.column)
            } else {
                (line_width + 1).saturating_sub(span.start.column)
            };

            for _ in 0..span_len.max(1) {
                underline.push('^');
            }

            result.push_str(&underline);
            result.push('\n');
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_display() {
        assert_eq!(Position::new(12, 3, 7).to_string(), "3:7");
        assert_eq!(Position::start(), Position::new(0, 1, 1));
    }

    #[test]
    fn test_span_basics() {
        let span = Span::new(Position::new(2, 1, 3), Position::new(5, 1, 6));
        assert_eq!(span.len(), 3);
        assert!(span.contains(Position::new(4, 1, 5)));
        assert!(!span.contains(Position::new(5, 1, 6)));
        assert_eq!(span.slice("a bcd e"), "bcd");
        assert_eq!(span.to_string(), "1:3-6");
    }

    #[test]
    fn test_source_map_terminator_pairs() {
        // CRLF and LFCR count once, lone CR counts on its own
        let map = SourceMap::new("a\r\nb\n\rc\rd".to_string());
        assert_eq!(map.line_count(), 4);
        assert_eq!(map.get_line(1), Some("a"));
        assert_eq!(map.get_line(2), Some("b"));
        assert_eq!(map.get_line(3), Some("c"));
        assert_eq!(map.get_line(4), Some("d"));
        assert_eq!(map.get_line(5), None);
        assert_eq!(map.get_line(0), None);
        assert_eq!(map.position_at(6), Position::new(6, 3, 1));
    }

    #[test]
    fn test_source_map_counts_chars_not_bytes() {
        let map = SourceMap::new("äö x".to_string());
        assert_eq!(map.position_at(5), Position::new(5, 1, 4));
    }

    #[test]
    fn test_format_error() {
        let map = SourceMap::new("Library\tOS\nResource".to_string());
        let span = Span::new(Position::new(8, 1, 9), Position::new(10, 1, 11));
        let rendered = map.format_error(&span, "bad cell");

        assert!(rendered.contains("Error: bad cell"));
        assert!(rendered.contains("--> 1:9"));
        assert!(rendered.contains("1 | Library\tOS"));
        assert!(rendered.ends_with("^^\n"));
    }
}
