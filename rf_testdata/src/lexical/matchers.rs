//! Single-unit matchers
//!
//! Each matcher looks at one character plus the last token emitted so far and
//! decides whether to start a new token, grow the last one, or pass. The
//! driver tries them in the order returned by [`default_matchers`] and stops at
//! the first one that claims the character.

use crate::tokens::{Token, TokenType};

/// Outcome of offering a character to a matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchDecision {
    NoMatch,
    /// Start a new token of this type
    Append(TokenType),
    /// Grow the last token and promote it to this type
    Merge(TokenType),
}

impl MatchDecision {
    pub fn is_match(&self) -> bool {
        !matches!(self, MatchDecision::NoMatch)
    }
}

pub trait SingleUnitMatcher: Send + Sync {
    fn name(&self) -> &'static str;

    /// Read-only: must not depend on anything but `ch` and `last`
    fn decide(&self, ch: char, last: Option<&Token>) -> MatchDecision;
}

/// Ordered matcher chain. The order is part of the lexer's contract.
pub fn default_matchers() -> Vec<Box<dyn SingleUnitMatcher>> {
    vec![
        Box::new(LineTerminatorMatcher),
        Box::new(SpaceMatcher),
        Box::new(TabMatcher),
        Box::new(SigilMatcher),
        Box::new(AsteriskMatcher),
        Box::new(HashMatcher),
        Box::new(DotMatcher),
        Box::new(BackslashMatcher),
        Box::new(WordMatcher),
    ]
}

fn last_type(last: Option<&Token>) -> Option<TokenType> {
    last.map(|token| token.token_type)
}

// ============================================================================
// LINE TERMINATORS
// ============================================================================

pub struct LineTerminatorMatcher;

impl SingleUnitMatcher for LineTerminatorMatcher {
    fn name(&self) -> &'static str {
        "line-terminator"
    }

    fn decide(&self, ch: char, last: Option<&Token>) -> MatchDecision {
        match (ch, last_type(last)) {
            ('\n', Some(TokenType::CarriageReturn)) => MatchDecision::Merge(TokenType::EndOfLine),
            ('\r', Some(TokenType::LineFeed)) => MatchDecision::Merge(TokenType::EndOfLine),
            ('\n', _) => MatchDecision::Append(TokenType::LineFeed),
            ('\r', _) => MatchDecision::Append(TokenType::CarriageReturn),
            _ => MatchDecision::NoMatch,
        }
    }
}

// ============================================================================
// WHITESPACE
// ============================================================================

/// Two spaces collapse; a third starts over
pub struct SpaceMatcher;

impl SingleUnitMatcher for SpaceMatcher {
    fn name(&self) -> &'static str {
        "space"
    }

    fn decide(&self, ch: char, last: Option<&Token>) -> MatchDecision {
        if ch != ' ' {
            return MatchDecision::NoMatch;
        }
        match last_type(last) {
            Some(TokenType::Space) => MatchDecision::Merge(TokenType::DoubleSpace),
            _ => MatchDecision::Append(TokenType::Space),
        }
    }
}

pub struct TabMatcher;

impl SingleUnitMatcher for TabMatcher {
    fn name(&self) -> &'static str {
        "tab"
    }

    fn decide(&self, ch: char, _last: Option<&Token>) -> MatchDecision {
        if ch == '\t' {
            MatchDecision::Append(TokenType::Tab)
        } else {
            MatchDecision::NoMatch
        }
    }
}

// ============================================================================
// SIGILS AND STRUCTURAL PUNCTUATION
// ============================================================================

pub struct SigilMatcher;

impl SigilMatcher {
    pub fn classify(ch: char) -> Option<TokenType> {
        let token_type = match ch {
            '|' => TokenType::Pipe,
            '$' => TokenType::Dollar,
            '@' => TokenType::At,
            '%' => TokenType::Percent,
            '&' => TokenType::Ampersand,
            ':' => TokenType::Colon,
            '"' => TokenType::Quote,
            '=' => TokenType::Equals,
            '[' => TokenType::SquareBracketOpen,
            ']' => TokenType::SquareBracketClose,
            '{' => TokenType::CurlyBracketOpen,
            '}' => TokenType::CurlyBracketClose,
            _ => return None,
        };
        Some(token_type)
    }
}

impl SingleUnitMatcher for SigilMatcher {
    fn name(&self) -> &'static str {
        "sigil"
    }

    fn decide(&self, ch: char, _last: Option<&Token>) -> MatchDecision {
        match Self::classify(ch) {
            Some(token_type) => MatchDecision::Append(token_type),
            None => MatchDecision::NoMatch,
        }
    }
}

// ============================================================================
// RUN-FORMING SYMBOLS
// ============================================================================

/// Asterisk runs only ever grow
pub struct AsteriskMatcher;

impl SingleUnitMatcher for AsteriskMatcher {
    fn name(&self) -> &'static str {
        "asterisk"
    }

    fn decide(&self, ch: char, last: Option<&Token>) -> MatchDecision {
        if ch != '*' {
            return MatchDecision::NoMatch;
        }
        match last_type(last) {
            Some(TokenType::Asterisk | TokenType::ManyAsterisks) => {
                MatchDecision::Merge(TokenType::ManyAsterisks)
            }
            _ => MatchDecision::Append(TokenType::Asterisk),
        }
    }
}

pub struct HashMatcher;

impl SingleUnitMatcher for HashMatcher {
    fn name(&self) -> &'static str {
        "comment-hash"
    }

    fn decide(&self, ch: char, last: Option<&Token>) -> MatchDecision {
        if ch != '#' {
            return MatchDecision::NoMatch;
        }
        match last_type(last) {
            Some(TokenType::Hash | TokenType::ManyCommentHashes) => {
                MatchDecision::Merge(TokenType::ManyCommentHashes)
            }
            _ => MatchDecision::Append(TokenType::Hash),
        }
    }
}

/// Each dot count up to three is its own type; four or more share one
pub struct DotMatcher;

impl SingleUnitMatcher for DotMatcher {
    fn name(&self) -> &'static str {
        "dot"
    }

    fn decide(&self, ch: char, last: Option<&Token>) -> MatchDecision {
        if ch != '.' {
            return MatchDecision::NoMatch;
        }
        match last_type(last) {
            Some(TokenType::Dot) => MatchDecision::Merge(TokenType::EmptyCellDots),
            Some(TokenType::EmptyCellDots) => {
                MatchDecision::Merge(TokenType::ContinuePreviousLineDots)
            }
            Some(TokenType::ContinuePreviousLineDots | TokenType::MoreThanThreeDots) => {
                MatchDecision::Merge(TokenType::MoreThanThreeDots)
            }
            _ => MatchDecision::Append(TokenType::Dot),
        }
    }
}

/// Backslash pairs collapse; a third starts over
pub struct BackslashMatcher;

impl SingleUnitMatcher for BackslashMatcher {
    fn name(&self) -> &'static str {
        "backslash"
    }

    fn decide(&self, ch: char, last: Option<&Token>) -> MatchDecision {
        if ch != '\\' {
            return MatchDecision::NoMatch;
        }
        match last_type(last) {
            Some(TokenType::Backslash) => MatchDecision::Merge(TokenType::DoubleEscapeBackslash),
            _ => MatchDecision::Append(TokenType::Backslash),
        }
    }
}

// ============================================================================
// WORDS
// ============================================================================

/// Everything printable that no earlier matcher handles
pub struct WordMatcher;

impl WordMatcher {
    pub fn is_word_char(ch: char) -> bool {
        !ch.is_control()
            && !ch.is_whitespace()
            && SigilMatcher::classify(ch).is_none()
            && !matches!(ch, '*' | '#' | '.' | '\\')
    }
}

impl SingleUnitMatcher for WordMatcher {
    fn name(&self) -> &'static str {
        "word"
    }

    fn decide(&self, ch: char, last: Option<&Token>) -> MatchDecision {
        if !Self::is_word_char(ch) {
            return MatchDecision::NoMatch;
        }
        match last_type(last) {
            Some(TokenType::Word) => MatchDecision::Merge(TokenType::Word),
            _ => MatchDecision::Append(TokenType::Word),
        }
    }
}
