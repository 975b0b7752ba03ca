//! Settings table recognizer
//!
//! Walks the cell stream line by line. It tracks which table the line is in,
//! opens an import declaration when a line inside the settings table starts
//! with an import keyword, and hands every further cell on that line to the
//! section mappers. At each line end the open declarations are closed and the
//! state stack is drained; a following `...` line re-opens the declaration
//! and restores its last data state.

use super::mappers::{settings_mappers, SectionMapper};
use super::state::{ParsingState, ParsingStateStack};
use crate::config::compile_time::mapping::MAX_IMPORTS_PER_FILE;
use crate::config::runtime::MappingPreferences;
use crate::logging::codes;
use crate::model::{Diagnostic, DiagnosticKind, FileOutput, ImportKind};
use crate::tokens::{Token, TokenRef, TokenType};
use crate::{log_debug, log_error, log_warning};

/// Declaration left open by the previous data line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Continuation {
    import_index: usize,
    state: ParsingState,
}

pub struct SettingsRecognizer {
    mappers: Vec<Box<dyn SectionMapper>>,
    stack: ParsingStateStack,
    preferences: MappingPreferences,
    in_settings: bool,
    /// No data cell seen yet on the current line
    at_line_start: bool,
    /// Current line starts with whitespace; only `...` counts there
    line_indented: bool,
    /// Current line belongs to an import declaration
    line_import: Option<usize>,
    continuation: Option<Continuation>,
}

impl SettingsRecognizer {
    pub fn new(preferences: MappingPreferences) -> Self {
        Self {
            mappers: settings_mappers(&preferences),
            stack: ParsingStateStack::new(),
            preferences,
            in_settings: false,
            at_line_start: true,
            line_indented: false,
            line_import: None,
            continuation: None,
        }
    }

    /// Map every cell of the attached stream into `output`
    pub fn run(&mut self, output: &mut FileOutput) {
        for index in 0..output.tokens().len() {
            let token_ref = TokenRef(index);
            let Some(token) = output.token(token_ref).cloned() else {
                break;
            };

            match token.token_type {
                TokenType::Cell if self.at_line_start => {
                    self.at_line_start = false;
                    self.first_cell(token_ref, &token, output);
                }
                TokenType::Cell | TokenType::CommentCell => {
                    if self.line_import.is_some() {
                        self.map_cell(token_ref, &token, output);
                    }
                }
                TokenType::CellSeparator if self.at_line_start => {
                    // Whitespace, or an empty leading pipe cell
                    self.line_indented = token.text.matches('|').count() != 1;
                }
                t if t.is_line_terminator() => self.end_line(output),
                _ => {}
            }
        }
        self.end_line(output);
        self.drop_continuation(output);
    }

    fn first_cell(&mut self, token_ref: TokenRef, token: &Token, output: &mut FileOutput) {
        let text = token.text.as_str();

        if text.starts_with('*') && !self.line_indented {
            self.enter_table(token_ref, text, output);
            return;
        }
        if !self.in_settings {
            return;
        }

        if text == "..." {
            self.continue_line(token, output);
            return;
        }

        // Any other setting ends whatever the previous line left open
        self.drop_continuation(output);
        if self.line_indented {
            return;
        }
        if let Some(kind) = ImportKind::from_keyword(text) {
            self.open_declaration(kind, token_ref, token, output);
        }
    }

    fn enter_table(&mut self, token_ref: TokenRef, text: &str, output: &mut FileOutput) {
        let name = text
            .trim_matches(|c: char| c == '*' || c.is_whitespace())
            .to_ascii_lowercase();
        self.in_settings = matches!(name.as_str(), "settings" | "setting");
        self.drop_continuation(output);

        if self.in_settings && output.settings().header.is_none() {
            output.settings_mut().header = Some(token_ref);
        }
        log_debug!("Table header", "name" => name, "settings" => self.in_settings);
    }

    fn continue_line(&mut self, token: &Token, output: &mut FileOutput) {
        if !self.preferences.allow_continuation_lines {
            return;
        }
        let Some(continuation) = self.continuation else {
            return;
        };

        match output.settings_mut().import_mut(continuation.import_index) {
            Some(import) => {
                import.reopen();
                self.stack.restore(continuation.state);
                self.line_import = Some(continuation.import_index);
            }
            None => {
                let message = "Continuation refers to a declaration that no longer exists";
                log_error!(codes::mapping::STRUCTURAL_INCONSISTENCY, message, span = token.span());
                output.push_diagnostic(Diagnostic::new(
                    DiagnosticKind::StructuralInconsistency,
                    message,
                    token.span(),
                ));
            }
        }
    }

    /// Forget the open declaration; one that stopped right after its alias
    /// keyword is reported
    fn drop_continuation(&mut self, output: &mut FileOutput) {
        let Some(continuation) = self.continuation.take() else {
            return;
        };
        if continuation.state != ParsingState::LibraryImportAlias {
            return;
        }

        let span = output
            .settings()
            .imports()
            .get(continuation.import_index)
            .and_then(|import| import.alias.as_ref())
            .and_then(|alias| output.token(alias.keyword))
            .map(Token::span);
        let Some(span) = span else {
            return;
        };

        let message = "Library alias keyword is not followed by a name";
        log_warning!(code = codes::mapping::MISSING_ALIAS_NAME, message, span = span);
        output.push_diagnostic(Diagnostic::new(
            DiagnosticKind::MissingAliasName,
            message,
            span,
        ));
    }

    fn open_declaration(
        &mut self,
        kind: ImportKind,
        token_ref: TokenRef,
        token: &Token,
        output: &mut FileOutput,
    ) {
        if output.settings().len() >= MAX_IMPORTS_PER_FILE {
            let message = format!("Import limit of {} reached", MAX_IMPORTS_PER_FILE);
            log_warning!(
                code = codes::mapping::IMPORT_LIMIT_EXCEEDED,
                &message,
                span = token.span()
            );
            output.push_diagnostic(Diagnostic::new(
                DiagnosticKind::ImportLimitExceeded,
                message,
                token.span(),
            ));
            return;
        }

        let index = output.settings_mut().open_import(kind, token_ref);
        self.line_import = Some(index);
        self.push_state(ParsingState::keyword_state(kind), token, output);
    }

    fn map_cell(&mut self, token_ref: TokenRef, token: &Token, output: &mut FileOutput) {
        let state = self.stack.top();
        let mut applicable = self
            .mappers
            .iter()
            .filter(|mapper| mapper.can_apply(state, token));

        let Some(mapper) = applicable.next() else {
            if token.is(TokenType::Cell) && self.preferences.report_unexpected_cells {
                let message = format!("Unexpected cell {:?} after {}", token.text, describe(state));
                log_warning!(code = codes::mapping::UNEXPECTED_CELL, &message, span = token.span());
                output.push_diagnostic(Diagnostic::new(
                    DiagnosticKind::UnexpectedCell,
                    message,
                    token.span(),
                ));
            }
            return;
        };
        debug_assert!(
            applicable.next().is_none(),
            "more than one mapper applies in state {:?}",
            state
        );

        let next = mapper.apply(token_ref, output);
        self.push_state(next, token, output);
    }

    fn push_state(&mut self, state: ParsingState, token: &Token, output: &mut FileOutput) {
        if let Err(error) = self.stack.push(state) {
            let kind = error.diagnostic_kind();
            log_error!(kind.code(), &error.to_string(),
                span = token.span(),
                "depth" => self.stack.depth()
            );
            output.push_diagnostic(Diagnostic::new(
                kind,
                error.to_string(),
                token.span(),
            ));
        }
    }

    fn end_line(&mut self, output: &mut FileOutput) {
        if let Some(import_index) = self.line_import.take() {
            self.continuation = self.stack.last_data_state().map(|state| Continuation {
                import_index,
                state,
            });
        } else if !self.at_line_start && self.in_settings {
            // A data line that opened nothing cannot be continued
            self.drop_continuation(output);
        }

        output.settings_mut().close_open_imports();
        self.stack.drain();
        self.at_line_start = true;
        self.line_indented = false;
    }
}

fn describe(state: Option<ParsingState>) -> String {
    state.map_or_else(|| "line start".to_string(), |s| s.to_string())
}
