//! Section mappers
//!
//! One mapper per grammar production of an import line. A mapper is only
//! tried when `can_apply` holds for the current top of the state stack; its
//! `apply` attaches the cell to the nearest open declaration and returns the
//! state to push next.

use super::state::ParsingState;
use crate::config::runtime::MappingPreferences;
use crate::log_warning;
use crate::logging::codes;
use crate::model::{Diagnostic, DiagnosticKind, FileOutput, ImportDeclaration, ImportKind};
use crate::tokens::{Token, TokenRef, TokenType};

pub trait SectionMapper: Send + Sync {
    fn name(&self) -> &'static str;

    fn can_apply(&self, state: Option<ParsingState>, token: &Token) -> bool;

    fn apply(&self, token_ref: TokenRef, output: &mut FileOutput) -> ParsingState;
}

/// Mapper chain for the settings table
pub fn settings_mappers(preferences: &MappingPreferences) -> Vec<Box<dyn SectionMapper>> {
    let mut mappers: Vec<Box<dyn SectionMapper>> = Vec::new();
    for kind in [ImportKind::Library, ImportKind::Resource, ImportKind::Variables] {
        mappers.push(Box::new(ImportPathMapper::new(kind)));
        mappers.push(Box::new(ImportArgumentMapper::new(
            kind,
            preferences.warn_on_unwanted_arguments,
        )));
    }
    mappers.push(Box::new(LibraryAliasMapper));
    mappers.push(Box::new(LibraryAliasValueMapper));
    mappers.push(Box::new(CommentMapper));
    mappers
}

/// `WITH NAME` and `AS` introduce a library alias
pub fn is_alias_keyword(text: &str) -> bool {
    matches!(text, "WITH NAME" | "AS")
}

/// Attach to the nearest open import of `kind`, or record why that failed
fn with_open_import<F>(output: &mut FileOutput, kind: ImportKind, token_ref: TokenRef, what: &str, f: F)
where
    F: FnOnce(&mut ImportDeclaration),
{
    if let Some(import) = output.nearest_open_import_mut(kind) {
        f(import);
        return;
    }

    let span = output
        .token(token_ref)
        .map(Token::span)
        .unwrap_or_default();
    let message = format!("No open {} import for {} cell", kind, what);
    crate::log_error!(codes::mapping::STRUCTURAL_INCONSISTENCY, &message, span = span);
    output.push_diagnostic(Diagnostic::new(
        DiagnosticKind::StructuralInconsistency,
        message,
        span,
    ));
}

// ============================================================================
// PATH AND ARGUMENTS
// ============================================================================

/// First cell after the keyword: library name, resource path or variable file
pub struct ImportPathMapper {
    kind: ImportKind,
}

impl ImportPathMapper {
    pub fn new(kind: ImportKind) -> Self {
        Self { kind }
    }
}

impl SectionMapper for ImportPathMapper {
    fn name(&self) -> &'static str {
        match self.kind {
            ImportKind::Library => "library-name",
            ImportKind::Resource => "resource-path",
            ImportKind::Variables => "variables-path",
        }
    }

    fn can_apply(&self, state: Option<ParsingState>, token: &Token) -> bool {
        token.is(TokenType::Cell) && state == Some(ParsingState::keyword_state(self.kind))
    }

    fn apply(&self, token_ref: TokenRef, output: &mut FileOutput) -> ParsingState {
        with_open_import(output, self.kind, token_ref, "path", |import| {
            import.set_path(token_ref)
        });
        ParsingState::path_state(self.kind)
    }
}

/// Every further cell after the path
pub struct ImportArgumentMapper {
    kind: ImportKind,
    warn_on_unwanted: bool,
}

impl ImportArgumentMapper {
    pub fn new(kind: ImportKind, warn_on_unwanted: bool) -> Self {
        Self {
            kind,
            warn_on_unwanted,
        }
    }
}

impl SectionMapper for ImportArgumentMapper {
    fn name(&self) -> &'static str {
        match self.kind {
            ImportKind::Library => "library-argument",
            ImportKind::Resource => "resource-unwanted-argument",
            ImportKind::Variables => "variables-argument",
        }
    }

    fn can_apply(&self, state: Option<ParsingState>, token: &Token) -> bool {
        let Some(state) = state else {
            return false;
        };
        if !token.is(TokenType::Cell) {
            return false;
        }
        if self.kind == ImportKind::Library && is_alias_keyword(&token.text) {
            return false;
        }
        state == ParsingState::path_state(self.kind)
            || state == ParsingState::arguments_state(self.kind)
    }

    fn apply(&self, token_ref: TokenRef, output: &mut FileOutput) -> ParsingState {
        with_open_import(output, self.kind, token_ref, "argument", |import| {
            import.add_argument(token_ref)
        });

        if !self.kind.accepts_arguments() && self.warn_on_unwanted {
            let unwanted = output.token(token_ref).map(|token| {
                let message = format!("{} imports take no arguments: {:?}", self.kind, token.text);
                (token.span(), message)
            });
            if let Some((span, message)) = unwanted {
                log_warning!(
                    code = codes::mapping::UNWANTED_IMPORT_ARGUMENT,
                    &message,
                    span = span
                );
                output.push_diagnostic(Diagnostic::new(
                    DiagnosticKind::UnwantedImportArgument,
                    message,
                    span,
                ));
            }
        }

        ParsingState::arguments_state(self.kind)
    }
}

// ============================================================================
// LIBRARY ALIAS
// ============================================================================

pub struct LibraryAliasMapper;

impl SectionMapper for LibraryAliasMapper {
    fn name(&self) -> &'static str {
        "library-alias"
    }

    fn can_apply(&self, state: Option<ParsingState>, token: &Token) -> bool {
        token.is(TokenType::Cell)
            && is_alias_keyword(&token.text)
            && matches!(
                state,
                Some(ParsingState::LibraryImportName | ParsingState::LibraryImportArguments)
            )
    }

    fn apply(&self, token_ref: TokenRef, output: &mut FileOutput) -> ParsingState {
        with_open_import(output, ImportKind::Library, token_ref, "alias", |import| {
            import.set_alias_keyword(token_ref)
        });
        ParsingState::LibraryImportAlias
    }
}

pub struct LibraryAliasValueMapper;

impl SectionMapper for LibraryAliasValueMapper {
    fn name(&self) -> &'static str {
        "library-alias-value"
    }

    fn can_apply(&self, state: Option<ParsingState>, token: &Token) -> bool {
        token.is(TokenType::Cell) && state == Some(ParsingState::LibraryImportAlias)
    }

    fn apply(&self, token_ref: TokenRef, output: &mut FileOutput) -> ParsingState {
        with_open_import(output, ImportKind::Library, token_ref, "alias name", |import| {
            import.set_alias_name(token_ref);
        });
        ParsingState::LibraryImportAliasValue
    }
}

// ============================================================================
// COMMENTS
// ============================================================================

/// Comment cells on a declaration line belong to that declaration
pub struct CommentMapper;

impl SectionMapper for CommentMapper {
    fn name(&self) -> &'static str {
        "comment"
    }

    fn can_apply(&self, state: Option<ParsingState>, token: &Token) -> bool {
        token.is(TokenType::CommentCell) && state.is_some()
    }

    fn apply(&self, token_ref: TokenRef, output: &mut FileOutput) -> ParsingState {
        if let Some(import) = output.settings_mut().last_open_import_mut() {
            import.add_comment(token_ref);
        }
        ParsingState::Comment
    }
}
