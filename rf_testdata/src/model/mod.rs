//! File-level model: the mapped token stream, the settings table and the
//! diagnostics collected while building them

pub mod diagnostic;
pub mod imports;

pub use diagnostic::{Diagnostic, DiagnosticKind, DiagnosticSeverity, Diagnostics};
pub use imports::{ImportDeclaration, ImportKind, LibraryAlias};

use crate::tokens::{Token, TokenRef, TokenStream};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Settings table of one file
#[derive(Debug, Clone, Default, Serialize)]
pub struct SettingTable {
    /// Header cell of the first settings table, if any
    pub header: Option<TokenRef>,
    imports: Vec<ImportDeclaration>,
}

impl SettingTable {
    pub fn imports(&self) -> &[ImportDeclaration] {
        &self.imports
    }

    pub fn imports_of(&self, kind: ImportKind) -> impl Iterator<Item = &ImportDeclaration> {
        self.imports.iter().filter(move |import| import.kind == kind)
    }

    pub fn import_mut(&mut self, index: usize) -> Option<&mut ImportDeclaration> {
        self.imports.get_mut(index)
    }

    /// Open a new declaration and return its index
    pub fn open_import(&mut self, kind: ImportKind, declaration: TokenRef) -> usize {
        self.imports.push(ImportDeclaration::new(kind, declaration));
        self.imports.len() - 1
    }

    /// Most recent still-open declaration of `kind`
    pub fn nearest_open_import_mut(&mut self, kind: ImportKind) -> Option<&mut ImportDeclaration> {
        self.imports
            .iter_mut()
            .rev()
            .find(|import| import.kind == kind && import.is_open())
    }

    /// Most recent still-open declaration of any kind
    pub fn last_open_import_mut(&mut self) -> Option<&mut ImportDeclaration> {
        self.imports.iter_mut().rev().find(|import| import.is_open())
    }

    pub fn close_open_imports(&mut self) {
        for import in self.imports.iter_mut().filter(|import| import.is_open()) {
            import.close();
        }
    }

    pub fn len(&self) -> usize {
        self.imports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }
}

/// Everything the mapping stage knows about one file
#[derive(Debug, Clone, Default, Serialize)]
pub struct FileOutput {
    source_path: Option<PathBuf>,
    tokens: TokenStream,
    settings: SettingTable,
    diagnostics: Diagnostics,
}

impl FileOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Take ownership of the stream that declarations will reference
    pub fn attach_tokens(&mut self, tokens: TokenStream) {
        self.tokens = tokens;
    }

    pub fn tokens(&self) -> &TokenStream {
        &self.tokens
    }

    pub fn token(&self, token_ref: TokenRef) -> Option<&Token> {
        self.tokens.get(token_ref)
    }

    pub fn token_text(&self, token_ref: TokenRef) -> Option<&str> {
        self.token(token_ref).map(|token| token.text.as_str())
    }

    /// Rewrite a token's text in place; declarations keep pointing at it
    pub fn rewrite_token_text(&mut self, token_ref: TokenRef, text: impl Into<String>) -> bool {
        self.tokens.rewrite_text(token_ref, text.into())
    }

    pub fn settings(&self) -> &SettingTable {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut SettingTable {
        &mut self.settings
    }

    pub fn nearest_open_import_mut(&mut self, kind: ImportKind) -> Option<&mut ImportDeclaration> {
        self.settings.nearest_open_import_mut(kind)
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend_diagnostics(&mut self, diagnostics: Diagnostics) {
        self.diagnostics.extend(diagnostics);
    }

    /// Path text of a declaration
    pub fn import_path(&self, import: &ImportDeclaration) -> Option<&str> {
        import.path.and_then(|path| self.token_text(path))
    }

    /// Argument texts of a declaration, in order
    pub fn import_arguments(&self, import: &ImportDeclaration) -> Vec<&str> {
        import
            .arguments
            .iter()
            .filter_map(|&argument| self.token_text(argument))
            .collect()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenType;
    use crate::utils::Position;

    fn stream(texts: &[&str]) -> TokenStream {
        let mut offset = 0;
        let tokens = texts
            .iter()
            .map(|text| {
                let start = Position::new(offset, 1, offset as u32 + 1);
                offset += text.len();
                let end = Position::new(offset, 1, offset as u32 + 1);
                Token::new(TokenType::Cell, *text, start, end)
            })
            .collect();
        TokenStream::from_tokens(tokens)
    }

    #[test]
    fn test_nearest_open_import_by_kind() {
        let mut settings = SettingTable::default();
        let first = settings.open_import(ImportKind::Variables, TokenRef(0));
        settings.open_import(ImportKind::Library, TokenRef(1));
        let last = settings.open_import(ImportKind::Variables, TokenRef(2));

        assert_eq!(
            settings
                .nearest_open_import_mut(ImportKind::Variables)
                .unwrap()
                .declaration,
            TokenRef(2)
        );

        settings.import_mut(last).unwrap().close();
        assert_eq!(
            settings
                .nearest_open_import_mut(ImportKind::Variables)
                .unwrap()
                .declaration,
            TokenRef(0)
        );

        settings.close_open_imports();
        assert!(settings.last_open_import_mut().is_none());
        assert!(!settings.imports()[first].is_open());
        assert_eq!(settings.imports_of(ImportKind::Variables).count(), 2);
    }

    #[test]
    fn test_rewrite_keeps_reference() {
        let mut output = FileOutput::with_source_path("suite.robot");
        output.attach_tokens(stream(&["Variables", "vars.py"]));
        let index = output
            .settings_mut()
            .open_import(ImportKind::Variables, TokenRef(0));
        output.settings_mut().import_mut(index).unwrap().set_path(TokenRef(1));

        assert!(output.rewrite_token_text(TokenRef(1), "other.py"));
        let import = &output.settings().imports()[0];
        assert_eq!(output.import_path(import), Some("other.py"));
        assert_eq!(output.source_path(), Some(Path::new("suite.robot")));
    }

    #[test]
    fn test_json_output() {
        let mut output = FileOutput::new();
        output.attach_tokens(stream(&["Library", "OS"]));
        output
            .settings_mut()
            .open_import(ImportKind::Library, TokenRef(0));

        let json = output.to_json().unwrap();
        assert!(json.contains("\"Library\""));
        assert!(json.contains("\"token_type\": \"Cell\""));
    }
}
