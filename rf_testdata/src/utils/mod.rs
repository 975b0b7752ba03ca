//! Shared source-location types used by the lexer, the mappers and logging

pub mod span;

pub use span::{Position, SourceMap, Span};
