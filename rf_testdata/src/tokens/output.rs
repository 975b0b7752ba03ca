//! Token Output: the growing token list plus its type position index
//!
//! Every mutation goes through a method here so the index can never drift out
//! of sync with the list. Promoting the last token to a merged class is a
//! single operation (`extend_last` / `replace_last`).

use super::stream::TokenStream;
use super::token::{Token, TokenType};
use crate::utils::Position;
use std::collections::HashMap;

/// Errors from misuse of the builder; each indicates a lexer bug
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenOutputError {
    #[error("Cannot modify the last token of an empty output")]
    EmptyOutput,

    #[error("Replacement moved token start from {original} to {replacement}")]
    StartMoved {
        original: Position,
        replacement: Position,
    },
}

#[derive(Debug, Default)]
pub struct TokenOutput {
    tokens: Vec<Token>,
    positions: HashMap<TokenType, Vec<usize>>,
}

impl TokenOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new token and return its index
    pub fn append(
        &mut self,
        token_type: TokenType,
        text: &str,
        start: Position,
        end: Position,
    ) -> usize {
        let index = self.tokens.len();
        self.tokens.push(Token::new(token_type, text, start, end));
        self.positions.entry(token_type).or_default().push(index);
        index
    }

    /// Replace the last token in place. The start position must not change.
    pub fn replace_last(&mut self, token: Token) -> Result<(), TokenOutputError> {
        let index = self.last_index()?;
        let original = self.tokens[index].start;
        if original != token.start {
            return Err(TokenOutputError::StartMoved {
                original,
                replacement: token.start,
            });
        }

        self.reindex(index, self.tokens[index].token_type, token.token_type);
        self.tokens[index] = token;
        Ok(())
    }

    /// Grow the last token by one character and promote it to `promoted`
    pub fn extend_last(
        &mut self,
        ch: char,
        end: Position,
        promoted: TokenType,
    ) -> Result<(), TokenOutputError> {
        let index = self.last_index()?;
        self.reindex(index, self.tokens[index].token_type, promoted);

        let token = &mut self.tokens[index];
        token.text.push(ch);
        token.end = end;
        token.token_type = promoted;
        Ok(())
    }

    /// Ascending indices of every token of `token_type`
    pub fn positions_of(&self, token_type: TokenType) -> &[usize] {
        self.positions
            .get(&token_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn last(&self) -> Option<&Token> {
        self.tokens.last()
    }

    pub fn last_of_type(&self, token_type: TokenType) -> Option<&Token> {
        self.positions_of(token_type)
            .last()
            .map(|&index| &self.tokens[index])
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn finish(self) -> TokenStream {
        TokenStream::from_parts(self.tokens, self.positions)
    }

    fn last_index(&self) -> Result<usize, TokenOutputError> {
        self.tokens
            .len()
            .checked_sub(1)
            .ok_or(TokenOutputError::EmptyOutput)
    }

    // Only the last slot is ever re-typed, so it is always the tail of its
    // old list and pushing keeps the new list ascending.
    fn reindex(&mut self, index: usize, from: TokenType, to: TokenType) {
        if from == to {
            return;
        }

        if let Some(slots) = self.positions.get_mut(&from) {
            debug_assert_eq!(slots.last(), Some(&index));
            slots.pop();
            if slots.is_empty() {
                self.positions.remove(&from);
            }
        }
        self.positions.entry(to).or_default().push(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn pos(offset: usize) -> Position {
        Position::new(offset, 1, offset as u32 + 1)
    }

    #[test]
    fn test_append_indexes_by_type() {
        let mut output = TokenOutput::new();
        assert_eq!(output.append(TokenType::Word, "a", pos(0), pos(1)), 0);
        assert_eq!(output.append(TokenType::Space, " ", pos(1), pos(2)), 1);
        assert_eq!(output.append(TokenType::Word, "b", pos(2), pos(3)), 2);

        assert_eq!(output.positions_of(TokenType::Word), &[0, 2]);
        assert_eq!(output.positions_of(TokenType::Space), &[1]);
        assert!(output.positions_of(TokenType::Tab).is_empty());
        assert_eq!(output.last_of_type(TokenType::Word).unwrap().text, "b");
    }

    #[test]
    fn test_extend_last_promotes_atomically() {
        let mut output = TokenOutput::new();
        output.append(TokenType::Dot, ".", pos(0), pos(1));
        output.append(TokenType::Dot, ".", pos(1), pos(2));
        output.extend_last('.', pos(3), TokenType::EmptyCellDots).unwrap();

        assert_eq!(output.len(), 2);
        assert_eq!(output.positions_of(TokenType::Dot), &[0]);
        assert_eq!(output.positions_of(TokenType::EmptyCellDots), &[1]);

        let last = output.last().unwrap();
        assert_eq!(last.text, "..");
        assert_eq!(last.start, pos(1));
        assert_eq!(last.end, pos(3));
    }

    #[test]
    fn test_extend_same_type_keeps_single_index_entry() {
        let mut output = TokenOutput::new();
        output.append(TokenType::Word, "a", pos(0), pos(1));
        output.extend_last('b', pos(2), TokenType::Word).unwrap();
        assert_eq!(output.positions_of(TokenType::Word), &[0]);
    }

    #[test]
    fn test_promoted_type_removed_when_emptied() {
        let mut output = TokenOutput::new();
        output.append(TokenType::Asterisk, "*", pos(0), pos(1));
        output.extend_last('*', pos(2), TokenType::ManyAsterisks).unwrap();

        let stream = output.finish();
        assert!(stream.positions_of(TokenType::Asterisk).is_empty());
        assert_eq!(stream.positions_of(TokenType::ManyAsterisks), &[0]);
    }

    #[test]
    fn test_replace_last_rejects_moved_start() {
        let mut output = TokenOutput::new();
        output.append(TokenType::Space, " ", pos(0), pos(1));

        let moved = Token::new(TokenType::DoubleSpace, "  ", pos(1), pos(3));
        assert_matches!(
            output.replace_last(moved),
            Err(TokenOutputError::StartMoved { .. })
        );

        let grown = Token::new(TokenType::DoubleSpace, "  ", pos(0), pos(2));
        output.replace_last(grown).unwrap();
        assert_eq!(output.positions_of(TokenType::DoubleSpace), &[0]);
        assert!(output.positions_of(TokenType::Space).is_empty());
    }

    #[test]
    fn test_empty_output_errors() {
        let mut output = TokenOutput::new();
        assert_matches!(
            output.extend_last('x', pos(1), TokenType::Word),
            Err(TokenOutputError::EmptyOutput)
        );
        assert!(output.last().is_none());
    }
}
