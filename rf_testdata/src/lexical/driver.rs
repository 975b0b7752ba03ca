//! Lexer driver: feeds characters one at a time through the matcher chain

use super::matchers::{default_matchers, MatchDecision, SingleUnitMatcher};
use super::position_tracker::PositionTracker;
use crate::config::compile_time::lexical::MAX_TOKEN_COUNT;
use crate::config::runtime::LexicalPreferences;
use crate::logging::codes;
use crate::model::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::tokens::{stream::validation, TokenOutput, TokenOutputError, TokenStream, TokenType};
use crate::utils::{Position, Span};
use crate::{log_debug, log_error, log_success};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Fatal lexer failures. Each one indicates a lexer bug or a resource limit,
/// never merely malformed input.
#[derive(Debug, thiserror::Error)]
pub enum LexerError {
    #[error("Position invariant violated at character {index}: {detail}")]
    PositionInvariantViolation { index: usize, detail: String },

    #[error("Too many tokens: {count} (max {MAX_TOKEN_COUNT})")]
    TooManyTokens { count: usize },

    #[error("Buffer index {index} out of range for buffer of length {len}")]
    BufferIndexOutOfRange { index: usize, len: usize },

    #[error("Token output misuse: {0}")]
    Output(#[from] TokenOutputError),
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::PositionInvariantViolation { .. } | LexerError::Output(_) => {
                codes::lexical::POSITION_INVARIANT_VIOLATION
            }
            LexerError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
            LexerError::BufferIndexOutOfRange { .. } => codes::lexical::BUFFER_INDEX_OUT_OF_RANGE,
        }
    }
}

/// Cooperative stop signal checked between characters
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default, Clone)]
pub struct LexicalMetrics {
    pub characters: usize,
    pub total_tokens: usize,
    pub merges: usize,
    pub unclassified_characters: usize,
    pub lines: u32,

    // Only filled when detailed metrics are enabled
    pub token_type_counts: HashMap<TokenType, usize>,
}

impl LexicalMetrics {
    fn record_detail(&mut self, stream: &TokenStream, preferences: &LexicalPreferences) {
        self.total_tokens = stream.len();
        if preferences.collect_detailed_metrics {
            for token in stream {
                *self.token_type_counts.entry(token.token_type).or_insert(0) += 1;
            }
        }
    }
}

/// Everything one lex invocation produces
#[derive(Debug, Clone)]
pub struct LexicalResult {
    pub tokens: TokenStream,
    pub diagnostics: Diagnostics,
    pub metrics: LexicalMetrics,
    /// True when a cancellation request stopped the lexer early
    pub cancelled: bool,
}

pub struct LexerDriver {
    matchers: Vec<Box<dyn SingleUnitMatcher>>,
    tracker: PositionTracker,
    output: TokenOutput,
    diagnostics: Diagnostics,
    metrics: LexicalMetrics,
    preferences: LexicalPreferences,
    cancellation: Option<CancellationToken>,
    next_index: usize,
}

impl LexerDriver {
    pub fn new() -> Self {
        Self::with_preferences(LexicalPreferences::default())
    }

    pub fn with_preferences(preferences: LexicalPreferences) -> Self {
        Self::with_matchers(default_matchers(), preferences)
    }

    /// Driver over a caller-supplied matcher chain, tried in the given order
    pub fn with_matchers(
        matchers: Vec<Box<dyn SingleUnitMatcher>>,
        preferences: LexicalPreferences,
    ) -> Self {
        Self {
            matchers,
            tracker: PositionTracker::new(),
            output: TokenOutput::new(),
            diagnostics: Diagnostics::new(),
            metrics: LexicalMetrics::default(),
            preferences,
            cancellation: None,
            next_index: 0,
        }
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = Some(cancellation);
        self
    }

    /// Feed `buffer[index]` to the matcher chain.
    ///
    /// Returns `Ok(true)` if a matcher claimed the character. An unclaimed
    /// character is kept as an `Unknown` token and reported as a diagnostic;
    /// the result is then `Ok(false)`. Characters must be fed in order.
    pub fn consume(&mut self, buffer: &[char], index: usize) -> Result<bool, LexerError> {
        let ch = *buffer
            .get(index)
            .ok_or(LexerError::BufferIndexOutOfRange {
                index,
                len: buffer.len(),
            })?;

        if index != self.next_index {
            return Err(self.violation(
                index,
                format!("expected character {} next", self.next_index),
            ));
        }
        self.next_index += 1;

        let start = self.tracker.advance(ch);
        let end = self.tracker.current();
        self.metrics.characters += 1;

        if let Some(last) = self.output.last() {
            if last.end != start {
                let detail = format!("previous token ends at {} but next starts at {}", last.end, start);
                return Err(self.violation(index, detail));
            }
        }

        let last = self.output.last();
        let decision = self
            .matchers
            .iter()
            .map(|matcher| matcher.decide(ch, last))
            .find(MatchDecision::is_match)
            .unwrap_or(MatchDecision::NoMatch);

        // The tracker and the terminator matcher must agree on pairs
        let merges_line_end = decision == MatchDecision::Merge(TokenType::EndOfLine);
        if merges_line_end != self.tracker.completed_pair() {
            return Err(self.violation(
                index,
                format!("line terminator pairing disagrees at {}", start),
            ));
        }

        let mut encoded = [0u8; 4];
        let text = ch.encode_utf8(&mut encoded);

        match decision {
            MatchDecision::Append(token_type) => {
                self.ensure_capacity(start)?;
                self.output.append(token_type, text, start, end);
                if token_type.is_line_terminator() {
                    self.metrics.lines += 1;
                }
                Ok(true)
            }
            MatchDecision::Merge(token_type) => {
                self.output.extend_last(ch, end, token_type)?;
                self.metrics.merges += 1;
                Ok(true)
            }
            MatchDecision::NoMatch => {
                self.ensure_capacity(start)?;
                self.output.append(TokenType::Unknown, text, start, end);
                self.record_unclassified(ch, Span::new(start, end));
                Ok(false)
            }
        }
    }

    /// Lex a whole buffer, consuming the driver
    pub fn lex(mut self, source: &str) -> Result<LexicalResult, LexerError> {
        let buffer: Vec<char> = source.chars().collect();

        log_debug!("Starting lexical analysis",
            "char_count" => buffer.len(),
            "byte_count" => source.len(),
            "max_tokens_allowed" => MAX_TOKEN_COUNT
        );

        let mut cancelled = false;
        for index in 0..buffer.len() {
            if self.is_cancelled() {
                cancelled = true;
                log_debug!("Lexical analysis cancelled", "at_character" => index);
                break;
            }
            self.consume(&buffer, index)?;
        }

        let result = self.finish(cancelled);

        debug_assert!(
            validation::validate_token_stream(&result.tokens).is_ok(),
            "lexer produced an inconsistent token stream"
        );

        log_success!(
            codes::success::TOKENIZATION_COMPLETE,
            "Lexical analysis completed",
            "tokens" => result.metrics.total_tokens,
            "merges" => result.metrics.merges,
            "unclassified" => result.metrics.unclassified_characters,
            "cancelled" => result.cancelled
        );

        Ok(result)
    }

    /// Hand over what has been built so far
    pub fn finish(self, cancelled: bool) -> LexicalResult {
        let tokens = self.output.finish();
        let mut metrics = self.metrics;
        metrics.record_detail(&tokens, &self.preferences);
        // Lines are counted by breaks; the text before the first break is line 1
        metrics.lines += 1;

        LexicalResult {
            tokens,
            diagnostics: self.diagnostics,
            metrics,
            cancelled,
        }
    }

    pub fn position(&self) -> Position {
        self.tracker.current()
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    fn ensure_capacity(&self, at: Position) -> Result<(), LexerError> {
        let count = self.output.len();
        if count >= MAX_TOKEN_COUNT {
            let error = LexerError::TooManyTokens { count };
            log_error!(error.error_code(), "Token limit exceeded",
                span = Span::new(at, at),
                "token_count" => count,
                "limit" => MAX_TOKEN_COUNT
            );
            return Err(error);
        }
        Ok(())
    }

    fn record_unclassified(&mut self, ch: char, span: Span) {
        self.metrics.unclassified_characters += 1;
        let message = format!("Unclassified character {:?} (U+{:04X})", ch, ch as u32);

        if self.preferences.log_unclassified_characters {
            log_error!(codes::lexical::UNCLASSIFIED_CHARACTER, &message,
                span = span,
                "character" => ch.escape_default()
            );
        }
        self.diagnostics.push(Diagnostic::new(
            DiagnosticKind::UnclassifiedCharacter,
            message,
            span,
        ));
    }

    fn violation(&self, index: usize, detail: String) -> LexerError {
        let error = LexerError::PositionInvariantViolation { index, detail };
        log_error!(error.error_code(), &error.to_string(), "index" => index);
        error
    }
}

impl Default for LexerDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn lex(input: &str) -> LexicalResult {
        LexerDriver::new().lex(input).unwrap()
    }

    fn types(result: &LexicalResult) -> Vec<TokenType> {
        result.tokens.iter().map(|t| t.token_type).collect()
    }

    #[test]
    fn test_three_asterisks() {
        let result = lex("***");
        assert_eq!(result.tokens.len(), 1);

        let token = &result.tokens.tokens()[0];
        assert_eq!(token.token_type, TokenType::ManyAsterisks);
        assert_eq!(token.text, "***");
        assert_eq!((token.start.line, token.start.column), (1, 1));
        assert_eq!((token.end.line, token.end.column), (1, 4));
    }

    #[test]
    fn test_asterisk_runs() {
        for n in 1..=6 {
            let result = lex(&"*".repeat(n));
            assert_eq!(result.tokens.len(), 1);
            let token = &result.tokens.tokens()[0];
            assert_eq!(token.text.len(), n);
            let expected = if n == 1 {
                TokenType::Asterisk
            } else {
                TokenType::ManyAsterisks
            };
            assert_eq!(token.token_type, expected);
        }
    }

    #[test]
    fn test_dot_runs() {
        let expected = [
            TokenType::Dot,
            TokenType::EmptyCellDots,
            TokenType::ContinuePreviousLineDots,
            TokenType::MoreThanThreeDots,
            TokenType::MoreThanThreeDots,
        ];
        for (n, expected) in (1..=5).zip(expected) {
            let result = lex(&".".repeat(n));
            assert_eq!(types(&result), vec![expected]);
            assert_eq!(result.tokens.tokens()[0].text.len(), n);
        }
    }

    #[test]
    fn test_hash_runs_grow() {
        let result = lex("####");
        assert_eq!(types(&result), vec![TokenType::ManyCommentHashes]);
    }

    #[test]
    fn test_two_spaces_merge() {
        let result = lex("  ");
        assert_eq!(types(&result), vec![TokenType::DoubleSpace]);
        assert_eq!(result.tokens.tokens()[0].text, "  ");
    }

    #[test]
    fn test_three_spaces_restart() {
        let result = lex("   ");
        assert_eq!(types(&result), vec![TokenType::DoubleSpace, TokenType::Space]);
    }

    #[test]
    fn test_backslash_pairs_restart() {
        let result = lex("\\\\\\");
        assert_eq!(
            types(&result),
            vec![TokenType::DoubleEscapeBackslash, TokenType::Backslash]
        );
    }

    #[test]
    fn test_words_and_sigils() {
        let result = lex("${var}=x");
        assert_eq!(
            types(&result),
            vec![
                TokenType::Dollar,
                TokenType::CurlyBracketOpen,
                TokenType::Word,
                TokenType::CurlyBracketClose,
                TokenType::Equals,
                TokenType::Word,
            ]
        );
    }

    #[test]
    fn test_line_terminator_variants() {
        let cases: [(&str, Vec<TokenType>, u32); 6] = [
            ("\r", vec![TokenType::CarriageReturn], 2),
            ("\n", vec![TokenType::LineFeed], 2),
            ("\r\n", vec![TokenType::EndOfLine], 2),
            ("\n\r", vec![TokenType::EndOfLine], 2),
            ("\r\n\r\n", vec![TokenType::EndOfLine, TokenType::EndOfLine], 3),
            ("\n\r\n", vec![TokenType::EndOfLine, TokenType::LineFeed], 3),
        ];

        for (input, expected, final_line) in cases {
            let result = lex(input);
            assert_eq!(types(&result), expected, "input {:?}", input);
            let last = result.tokens.tokens().last().unwrap();
            assert_eq!(last.end.line, final_line, "input {:?}", input);
            assert_eq!(last.end.column, 1);
        }
    }

    #[test]
    fn test_crlf_token_positions() {
        let result = lex("a\r\nb");
        let tokens = result.tokens.tokens();
        assert_eq!(tokens[1].token_type, TokenType::EndOfLine);
        assert_eq!(tokens[1].start, Position::new(1, 1, 2));
        assert_eq!(tokens[1].end, Position::new(3, 2, 1));
        assert_eq!(tokens[2].start, Position::new(3, 2, 1));
    }

    #[test]
    fn test_multiline_tokens_contain_terminators() {
        let result = lex("Library  OS\r\n\nResource\rx.resource\n\r");
        for token in result.tokens.iter() {
            if token.end.line > token.start.line {
                assert!(token.token_type.is_line_terminator());
                assert!(token.text.contains(['\r', '\n']));
            }
        }
    }

    #[test]
    fn test_round_trip() {
        let input = "*** Settings ***\nLibrary    OS\t# comment\r\n| Resource | a.resource |\n...  ${x}=@{y}[0] &{z}%{ENV} \\\\\\ \"q\" :\n";
        let result = lex(input);
        assert_eq!(result.tokens.text(), input);
        assert!(result.diagnostics.is_empty());
        assert!(validation::validate_token_stream(&result.tokens).is_ok());
    }

    #[test]
    fn test_type_index_stays_in_sync() {
        let result = lex("... .. . **** ## \\\\ \r\n  ");
        assert!(validation::validate_index(&result.tokens).is_ok());
        assert!(result.tokens.positions_of(TokenType::Dot).len() == 1);
        assert!(result.tokens.positions_of(TokenType::Asterisk).is_empty());
    }

    #[test]
    fn test_unclassified_character_is_kept_and_reported() {
        let result = lex("a\u{0b}b");
        assert_eq!(
            types(&result),
            vec![TokenType::Word, TokenType::Unknown, TokenType::Word]
        );
        assert_eq!(result.tokens.text(), "a\u{0b}b");
        assert_eq!(result.metrics.unclassified_characters, 1);

        let diagnostic = result.diagnostics.iter().next().unwrap();
        assert_eq!(diagnostic.kind, DiagnosticKind::UnclassifiedCharacter);
        assert_eq!(diagnostic.span.start.column, 2);
    }

    #[test]
    fn test_consume_reports_claim() {
        let buffer: Vec<char> = "a\u{0b}".chars().collect();
        let mut driver = LexerDriver::new();
        assert!(driver.consume(&buffer, 0).unwrap());
        assert!(!driver.consume(&buffer, 1).unwrap());
        assert_matches!(
            driver.consume(&buffer, 2),
            Err(LexerError::BufferIndexOutOfRange { index: 2, len: 2 })
        );
    }

    #[test]
    fn test_out_of_order_consume_is_fatal() {
        let buffer: Vec<char> = "abc".chars().collect();
        let mut driver = LexerDriver::new();
        driver.consume(&buffer, 0).unwrap();
        assert_matches!(
            driver.consume(&buffer, 2),
            Err(LexerError::PositionInvariantViolation { index: 2, .. })
        );
    }

    #[test]
    fn test_cancellation_stops_before_first_character() {
        let token = CancellationToken::new();
        token.cancel();

        let result = LexerDriver::new()
            .with_cancellation(token)
            .lex("Library  OS")
            .unwrap();
        assert!(result.cancelled);
        assert!(result.tokens.is_empty());
    }

    /// Claims nothing; cancels the lex once it has seen `limit` characters
    struct CancelAfter {
        token: CancellationToken,
        limit: usize,
        seen: std::sync::atomic::AtomicUsize,
    }

    impl SingleUnitMatcher for CancelAfter {
        fn name(&self) -> &'static str {
            "CancelAfter"
        }

        fn decide(&self, _ch: char, _last: Option<&crate::tokens::Token>) -> MatchDecision {
            if self.seen.fetch_add(1, Ordering::SeqCst) + 1 >= self.limit {
                self.token.cancel();
            }
            MatchDecision::NoMatch
        }
    }

    #[test]
    fn test_cancellation_midway_keeps_prefix() {
        let source = "*** Settings ***\nLibrary  OS\n";
        let limit = 20;
        let token = CancellationToken::new();

        let mut matchers: Vec<Box<dyn SingleUnitMatcher>> = vec![Box::new(CancelAfter {
            token: token.clone(),
            limit,
            seen: std::sync::atomic::AtomicUsize::new(0),
        })];
        matchers.extend(default_matchers());

        let result = LexerDriver::with_matchers(matchers, LexicalPreferences::default())
            .with_cancellation(token)
            .lex(source)
            .unwrap();

        assert!(result.cancelled);
        assert_eq!(result.metrics.characters, limit);
        assert_eq!(result.tokens.text(), &source[..limit]);
        assert_eq!(result.tokens.tokens().last().unwrap().end.offset, limit);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_metrics() {
        let result = lex("a  b\nc");
        assert_eq!(result.metrics.characters, 6);
        assert_eq!(result.metrics.total_tokens, 5);
        assert_eq!(result.metrics.merges, 1);
        assert_eq!(result.metrics.lines, 2);
    }
}
