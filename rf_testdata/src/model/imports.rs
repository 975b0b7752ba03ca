//! Import declarations held by the settings table

use crate::tokens::TokenRef;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImportKind {
    Library,
    Resource,
    Variables,
}

impl ImportKind {
    /// Recognize an import keyword cell: case-insensitive, optional trailing colon
    pub fn from_keyword(text: &str) -> Option<Self> {
        let keyword = text.trim();
        let keyword = keyword.strip_suffix(':').unwrap_or(keyword).trim_end();
        match keyword.to_ascii_lowercase().as_str() {
            "library" => Some(Self::Library),
            "resource" => Some(Self::Resource),
            "variables" => Some(Self::Variables),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Library => "Library",
            Self::Resource => "Resource",
            Self::Variables => "Variables",
        }
    }

    /// Whether extra cells after the path are meaningful for this kind
    pub fn accepts_arguments(&self) -> bool {
        !matches!(self, Self::Resource)
    }
}

impl fmt::Display for ImportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// `WITH NAME` / `AS` clause of a library import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryAlias {
    pub keyword: TokenRef,
    pub name: Option<TokenRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDeclaration {
    pub kind: ImportKind,
    /// The keyword cell that opened the declaration
    pub declaration: TokenRef,
    pub path: Option<TokenRef>,
    pub arguments: Vec<TokenRef>,
    pub alias: Option<LibraryAlias>,
    pub comments: Vec<TokenRef>,
    open: bool,
}

impl ImportDeclaration {
    pub fn new(kind: ImportKind, declaration: TokenRef) -> Self {
        Self {
            kind,
            declaration,
            path: None,
            arguments: Vec::new(),
            alias: None,
            comments: Vec::new(),
            open: true,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Re-open for a continuation line
    pub fn reopen(&mut self) {
        self.open = true;
    }

    pub fn set_path(&mut self, path: TokenRef) {
        self.path = Some(path);
    }

    pub fn add_argument(&mut self, argument: TokenRef) {
        self.arguments.push(argument);
    }

    pub fn set_alias_keyword(&mut self, keyword: TokenRef) {
        self.alias = Some(LibraryAlias {
            keyword,
            name: None,
        });
    }

    /// Returns false when no alias keyword precedes the name
    pub fn set_alias_name(&mut self, name: TokenRef) -> bool {
        match self.alias.as_mut() {
            Some(alias) => {
                alias.name = Some(name);
                true
            }
            None => false,
        }
    }

    pub fn add_comment(&mut self, comment: TokenRef) {
        self.comments.push(comment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_recognition() {
        assert_eq!(ImportKind::from_keyword("Library"), Some(ImportKind::Library));
        assert_eq!(ImportKind::from_keyword("RESOURCE"), Some(ImportKind::Resource));
        assert_eq!(ImportKind::from_keyword("variables:"), Some(ImportKind::Variables));
        assert_eq!(ImportKind::from_keyword("Variables :"), Some(ImportKind::Variables));
        assert_eq!(ImportKind::from_keyword("Documentation"), None);
        assert_eq!(ImportKind::from_keyword("Libraries"), None);
    }

    #[test]
    fn test_declaration_lifecycle() {
        let mut import = ImportDeclaration::new(ImportKind::Library, TokenRef(0));
        assert!(import.is_open());

        import.set_path(TokenRef(2));
        import.add_argument(TokenRef(4));
        assert!(!import.set_alias_name(TokenRef(8)));
        import.set_alias_keyword(TokenRef(6));
        assert!(import.set_alias_name(TokenRef(8)));
        import.close();

        assert!(!import.is_open());
        assert_eq!(import.path, Some(TokenRef(2)));
        assert_eq!(import.arguments, vec![TokenRef(4)]);
        assert_eq!(
            import.alias,
            Some(LibraryAlias {
                keyword: TokenRef(6),
                name: Some(TokenRef(8))
            })
        );
    }

    #[test]
    fn test_resource_takes_no_arguments() {
        assert!(!ImportKind::Resource.accepts_arguments());
        assert!(ImportKind::Variables.accepts_arguments());
    }
}
