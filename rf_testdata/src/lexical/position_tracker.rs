//! Line and column bookkeeping for the lexer
//!
//! CR, LF, CRLF and LFCR each advance exactly one line. The second half of a
//! pair only moves the byte offset; the line was already advanced by the first
//! half, so the pair's token ends at column 1 of the next line.

use crate::utils::Position;

#[derive(Debug, Clone)]
pub struct PositionTracker {
    current: Position,
    /// Terminator that opened a line break and is still waiting for a partner
    pending_terminator: Option<char>,
    completed_pair: bool,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self {
            current: Position::start(),
            pending_terminator: None,
            completed_pair: false,
        }
    }

    /// Consume `ch` and return the position before it
    pub fn advance(&mut self, ch: char) -> Position {
        let before = self.current;
        self.completed_pair = false;

        match ch {
            '\r' | '\n' => {
                if self.pending_terminator == Some(complement(ch)) {
                    self.current.offset += ch.len_utf8();
                    self.pending_terminator = None;
                    self.completed_pair = true;
                } else {
                    self.current = Position::new(
                        self.current.offset + ch.len_utf8(),
                        self.current.line + 1,
                        1,
                    );
                    self.pending_terminator = Some(ch);
                }
            }
            _ => {
                self.current.offset += ch.len_utf8();
                self.current.column += 1;
                self.pending_terminator = None;
            }
        }

        before
    }

    /// Position after everything consumed so far
    pub fn current(&self) -> Position {
        self.current
    }

    /// Whether the last character completed a CRLF or LFCR pair
    pub fn completed_pair(&self) -> bool {
        self.completed_pair
    }
}

impl Default for PositionTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn complement(terminator: char) -> char {
    if terminator == '\r' {
        '\n'
    } else {
        '\r'
    }
}
