//! Token system for tabular test data
//!
//! - [`TokenType`] - closed set of lexical and cell-level classes
//! - [`Token`] - classified text with start and end positions
//! - [`TokenOutput`] - builder used by the lexer; keeps the type position
//!   index in sync with the token list
//! - [`TokenStream`] - the finished, ordered stream handed to the mappers

pub mod output;
pub mod stream;
pub mod token;

pub use output::{TokenOutput, TokenOutputError};
pub use stream::TokenStream;
pub use token::{Token, TokenClass, TokenRef, TokenType};

pub use crate::utils::{Position, Span};
