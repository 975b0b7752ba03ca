//! Finalized token stream
//!
//! Immutable once built, except for post-hoc text rewrites made through the
//! file model. Declarations hold `TokenRef` indices into it.

use super::token::{Token, TokenRef, TokenType};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize)]
pub struct TokenStream {
    tokens: Vec<Token>,
    #[serde(skip)]
    positions: HashMap<TokenType, Vec<usize>>,
}

impl TokenStream {
    /// Build a stream and its type index from an ordered token list
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        let mut positions: HashMap<TokenType, Vec<usize>> = HashMap::new();
        for (index, token) in tokens.iter().enumerate() {
            positions.entry(token.token_type).or_default().push(index);
        }
        Self { tokens, positions }
    }

    pub(crate) fn from_parts(tokens: Vec<Token>, positions: HashMap<TokenType, Vec<usize>>) -> Self {
        Self { tokens, positions }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn get(&self, token_ref: TokenRef) -> Option<&Token> {
        self.tokens.get(token_ref.index())
    }

    pub fn positions_of(&self, token_type: TokenType) -> &[usize] {
        self.positions
            .get(&token_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn count_of(&self, token_type: TokenType) -> usize {
        self.positions_of(token_type).len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Concatenated text of every token, in order
    pub fn text(&self) -> String {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    /// Replace a token's text; type and position are left untouched
    pub(crate) fn rewrite_text(&mut self, token_ref: TokenRef, text: String) -> bool {
        match self.tokens.get_mut(token_ref.index()) {
            Some(token) => {
                token.text = text;
                true
            }
            None => false,
        }
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

/// Integrity checks over a finished stream
pub mod validation {
    use super::*;

    /// Each token must start exactly where the previous one ended
    pub fn validate_contiguity(stream: &TokenStream) -> Result<(), String> {
        for (index, window) in stream.tokens.windows(2).enumerate() {
            if window[0].end != window[1].start {
                return Err(format!(
                    "Token {} ends at {} but token {} starts at {}",
                    index,
                    window[0].end,
                    index + 1,
                    window[1].start
                ));
            }
        }
        Ok(())
    }

    /// The type index must list exactly the tokens of each type, ascending
    pub fn validate_index(stream: &TokenStream) -> Result<(), String> {
        let rebuilt = TokenStream::from_tokens(stream.tokens.clone());

        for (token_type, slots) in &stream.positions {
            if rebuilt.positions_of(*token_type) != slots.as_slice() {
                return Err(format!("Type index out of sync for {}", token_type));
            }
        }
        if rebuilt.positions.len() != stream.positions.len() {
            return Err("Type index is missing entries".to_string());
        }
        Ok(())
    }

    pub fn validate_token_stream(stream: &TokenStream) -> Result<(), String> {
        validate_contiguity(stream)?;
        validate_index(stream)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Position;

    fn word(text: &str, offset: usize) -> Token {
        let len = text.len();
        Token::new(
            TokenType::Word,
            text,
            Position::new(offset, 1, offset as u32 + 1),
            Position::new(offset + len, 1, (offset + len) as u32 + 1),
        )
    }

    #[test]
    fn test_from_tokens_builds_index() {
        let stream = TokenStream::from_tokens(vec![word("a", 0), word("b", 1)]);
        assert_eq!(stream.positions_of(TokenType::Word), &[0, 1]);
        assert_eq!(stream.count_of(TokenType::Word), 2);
        assert_eq!(stream.text(), "ab");
        assert!(validation::validate_token_stream(&stream).is_ok());
    }

    #[test]
    fn test_rewrite_text_keeps_reference() {
        let mut stream = TokenStream::from_tokens(vec![word("vars.py", 0)]);
        assert!(stream.rewrite_text(TokenRef(0), "other.py".to_string()));
        assert!(!stream.rewrite_text(TokenRef(5), "missing".to_string()));
        assert_eq!(stream.get(TokenRef(0)).unwrap().text, "other.py");
    }

    #[test]
    fn test_contiguity_violation_detected() {
        let stream = TokenStream::from_tokens(vec![word("a", 0), word("b", 3)]);
        assert!(validation::validate_contiguity(&stream).is_err());
    }
}
