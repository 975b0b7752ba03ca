//! Token types for tabular test data
//!
//! The lexer produces tokens of the single-character and merged classes below.
//! The cell grouper folds those into the cell-level classes, which are what
//! the settings mappers read.

use crate::utils::{Position, Span};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of token classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TokenType {
    // === SINGLE CHARACTER CLASSES ===
    Space,
    Tab,
    Pipe,
    Dot,
    Asterisk,
    Hash,
    Backslash,
    Dollar,
    At,
    Percent,
    Ampersand,
    Colon,
    Quote,
    Equals,
    SquareBracketOpen,
    SquareBracketClose,
    CurlyBracketOpen,
    CurlyBracketClose,
    CarriageReturn,
    LineFeed,

    // === MERGED CLASSES ===
    DoubleSpace,
    ManyAsterisks,
    ManyCommentHashes,
    /// `..`
    EmptyCellDots,
    /// `...`
    ContinuePreviousLineDots,
    MoreThanThreeDots,
    /// `\\`
    DoubleEscapeBackslash,
    /// CRLF or LFCR
    EndOfLine,

    // === TEXT ===
    /// Run of ordinary text characters
    Word,
    /// A character no matcher claimed
    Unknown,

    // === CELL LEVEL ===
    Cell,
    CommentCell,
    CellSeparator,
}

/// Coarse classification used by the cell grouper and the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    Whitespace,
    LineTerminator,
    /// Pipes, sigils and brackets
    Structural,
    /// Asterisk, hash, dot and backslash families
    Run,
    Text,
    CellLevel,
}

impl TokenType {
    pub fn token_class(&self) -> TokenClass {
        match self {
            Self::Space | Self::Tab | Self::DoubleSpace => TokenClass::Whitespace,

            Self::CarriageReturn | Self::LineFeed | Self::EndOfLine => TokenClass::LineTerminator,

            Self::Pipe
            | Self::Dollar
            | Self::At
            | Self::Percent
            | Self::Ampersand
            | Self::Colon
            | Self::Quote
            | Self::Equals
            | Self::SquareBracketOpen
            | Self::SquareBracketClose
            | Self::CurlyBracketOpen
            | Self::CurlyBracketClose => TokenClass::Structural,

            Self::Dot
            | Self::Asterisk
            | Self::Hash
            | Self::Backslash
            | Self::ManyAsterisks
            | Self::ManyCommentHashes
            | Self::EmptyCellDots
            | Self::ContinuePreviousLineDots
            | Self::MoreThanThreeDots
            | Self::DoubleEscapeBackslash => TokenClass::Run,

            Self::Word | Self::Unknown => TokenClass::Text,

            Self::Cell | Self::CommentCell | Self::CellSeparator => TokenClass::CellLevel,
        }
    }

    pub fn is_whitespace(&self) -> bool {
        self.token_class() == TokenClass::Whitespace
    }

    pub fn is_line_terminator(&self) -> bool {
        self.token_class() == TokenClass::LineTerminator
    }

    pub fn is_comment_marker(&self) -> bool {
        matches!(self, Self::Hash | Self::ManyCommentHashes)
    }

    /// True for classes produced by merging more than one character
    pub fn is_merged(&self) -> bool {
        matches!(
            self,
            Self::DoubleSpace
                | Self::ManyAsterisks
                | Self::ManyCommentHashes
                | Self::EmptyCellDots
                | Self::ContinuePreviousLineDots
                | Self::MoreThanThreeDots
                | Self::DoubleEscapeBackslash
                | Self::EndOfLine
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Space => "space",
            Self::Tab => "tab",
            Self::Pipe => "pipe",
            Self::Dot => "dot",
            Self::Asterisk => "asterisk",
            Self::Hash => "hash",
            Self::Backslash => "backslash",
            Self::Dollar => "dollar",
            Self::At => "at",
            Self::Percent => "percent",
            Self::Ampersand => "ampersand",
            Self::Colon => "colon",
            Self::Quote => "quote",
            Self::Equals => "equals",
            Self::SquareBracketOpen => "square-bracket-open",
            Self::SquareBracketClose => "square-bracket-close",
            Self::CurlyBracketOpen => "curly-bracket-open",
            Self::CurlyBracketClose => "curly-bracket-close",
            Self::CarriageReturn => "carriage-return",
            Self::LineFeed => "line-feed",
            Self::DoubleSpace => "double-space",
            Self::ManyAsterisks => "many-asterisks",
            Self::ManyCommentHashes => "many-comment-hashes",
            Self::EmptyCellDots => "empty-cell-dots",
            Self::ContinuePreviousLineDots => "continue-previous-line-dots",
            Self::MoreThanThreeDots => "more-than-three-dots",
            Self::DoubleEscapeBackslash => "double-escape-backslash",
            Self::EndOfLine => "end-of-line",
            Self::Word => "word",
            Self::Unknown => "unknown",
            Self::Cell => "cell",
            Self::CommentCell => "comment-cell",
            Self::CellSeparator => "cell-separator",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A classified, position-tagged piece of source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub start: Position,
    /// Exclusive end
    pub end: Position,
    pub text: String,
    pub token_type: TokenType,
}

impl Token {
    pub fn new(token_type: TokenType, text: impl Into<String>, start: Position, end: Position) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            token_type,
        }
    }

    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    pub fn is(&self, token_type: TokenType) -> bool {
        self.token_type == token_type
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?}) at {}", self.token_type, self.text, self.start)
    }
}

/// Non-owning reference to a token: its index in a `TokenStream`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenRef(pub usize);

impl TokenRef {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_classes() {
        assert!(TokenType::DoubleSpace.is_whitespace());
        assert!(TokenType::EndOfLine.is_line_terminator());
        assert!(TokenType::ManyCommentHashes.is_comment_marker());
        assert_eq!(TokenType::Pipe.token_class(), TokenClass::Structural);
        assert_eq!(TokenType::MoreThanThreeDots.token_class(), TokenClass::Run);
        assert_eq!(TokenType::Cell.token_class(), TokenClass::CellLevel);
    }

    #[test]
    fn test_merged_classes() {
        assert!(TokenType::EmptyCellDots.is_merged());
        assert!(!TokenType::Dot.is_merged());
        assert!(!TokenType::Word.is_merged());
    }

    #[test]
    fn test_token_display() {
        let token = Token::new(
            TokenType::Word,
            "Library",
            Position::start(),
            Position::new(7, 1, 8),
        );
        assert_eq!(token.to_string(), "word(\"Library\") at 1:1");
        assert_eq!(token.span().len(), 7);
    }
}
