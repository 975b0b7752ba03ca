//! Lexer and settings-import mapper for Robot Framework style tabular test
//! data.
//!
//! `lexical` turns a buffer into a lossless raw token stream and groups it
//! into cells; `mapping` walks the cells of `*** Settings ***` tables and
//! records `Library`, `Resource` and `Variables` declarations in a
//! [`model::FileOutput`]. `pipeline` runs both stages, optionally loading the
//! buffer from disk through `file_processor`.

// Internal modules
pub mod config;
pub mod file_processor;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod mapping;
pub mod model;
pub mod pipeline;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use lexical::{lex, LexerError, LexicalResult};
pub use mapping::map_settings_tokens;
pub use model::{Diagnostic, FileOutput, ImportDeclaration, ImportKind};
pub use pipeline::{parse_file, parse_source, ParseResult, PipelineError};
pub use tokens::{Token, TokenRef, TokenStream, TokenType};
