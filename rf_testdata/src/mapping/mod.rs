//! Structural mapping of cell streams onto the settings table

pub mod mappers;
pub mod recognizer;
pub mod state;

use crate::config::runtime::MappingPreferences;
use crate::logging::codes;
use crate::lexical::group_cells;
use crate::log_success;
use crate::model::FileOutput;
use crate::tokens::{TokenStream, TokenType};

pub use mappers::{
    is_alias_keyword, settings_mappers, CommentMapper, ImportArgumentMapper, ImportPathMapper,
    LibraryAliasMapper, LibraryAliasValueMapper, SectionMapper,
};
pub use recognizer::SettingsRecognizer;
pub use state::{ParsingState, ParsingStateStack, StateError};

/// Map a token stream into `output`, which takes ownership of the stream.
///
/// A raw lexer stream is grouped into cells first; a stream that already
/// carries cells is mapped as is.
pub fn map_settings_tokens(tokens: TokenStream, output: FileOutput) -> FileOutput {
    map_settings_tokens_with_preferences(tokens, output, MappingPreferences::default())
}

pub fn map_settings_tokens_with_preferences(
    tokens: TokenStream,
    mut output: FileOutput,
    preferences: MappingPreferences,
) -> FileOutput {
    let tokens = if is_cell_stream(&tokens) {
        tokens
    } else {
        group_cells(&tokens)
    };
    output.attach_tokens(tokens);
    SettingsRecognizer::new(preferences).run(&mut output);

    log_success!(
        codes::success::SETTINGS_MAPPING_COMPLETE,
        "Settings mapping completed",
        "imports" => output.settings().len(),
        "diagnostics" => output.diagnostics().len()
    );

    output
}

fn is_cell_stream(tokens: &TokenStream) -> bool {
    tokens.is_empty()
        || [TokenType::Cell, TokenType::CommentCell, TokenType::CellSeparator]
            .into_iter()
            .any(|t| tokens.count_of(t) > 0)
}
