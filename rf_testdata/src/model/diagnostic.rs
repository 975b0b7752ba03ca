//! Recoverable problems found while lexing or mapping
//!
//! A diagnostic never aborts a parse. The caller decides how severe each kind
//! is; `DiagnosticSeverity` is only the default reading.

use crate::config::compile_time::lexical::MAX_DIAGNOSTICS_PER_FILE;
use crate::logging::{codes, Code};
use crate::utils::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// No matcher claimed a character
    UnclassifiedCharacter,
    /// A path or argument arrived with no open import to attach to
    StructuralInconsistency,
    /// The state stack rejected a transition
    IllegalStateTransition,
    StateDepthExceeded,
    /// A cell on a declaration line that no mapper accepts
    UnexpectedCell,
    /// Resource imports take no arguments
    UnwantedImportArgument,
    ImportLimitExceeded,
    /// `WITH NAME` or `AS` with nothing after it
    MissingAliasName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

impl DiagnosticKind {
    pub fn code(&self) -> Code {
        match self {
            Self::UnclassifiedCharacter => codes::lexical::UNCLASSIFIED_CHARACTER,
            Self::StructuralInconsistency => codes::mapping::STRUCTURAL_INCONSISTENCY,
            Self::IllegalStateTransition => codes::mapping::ILLEGAL_STATE_TRANSITION,
            Self::StateDepthExceeded => codes::mapping::STATE_DEPTH_EXCEEDED,
            Self::UnexpectedCell => codes::mapping::UNEXPECTED_CELL,
            Self::UnwantedImportArgument => codes::mapping::UNWANTED_IMPORT_ARGUMENT,
            Self::ImportLimitExceeded => codes::mapping::IMPORT_LIMIT_EXCEEDED,
            Self::MissingAliasName => codes::mapping::MISSING_ALIAS_NAME,
        }
    }

    pub fn default_severity(&self) -> DiagnosticSeverity {
        match self {
            Self::UnexpectedCell | Self::UnwantedImportArgument | Self::MissingAliasName => {
                DiagnosticSeverity::Warning
            }
            _ => DiagnosticSeverity::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
        }
    }

    pub fn code(&self) -> Code {
        self.kind.code()
    }

    pub fn severity(&self) -> DiagnosticSeverity {
        self.kind.default_severity()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == DiagnosticSeverity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} at {}", self.code(), self.message, self.span.start)
    }
}

/// Bounded diagnostic list; anything past the per-file cap is only counted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
    suppressed: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic; returns false once the cap is reached
    pub fn push(&mut self, diagnostic: Diagnostic) -> bool {
        if self.items.len() >= MAX_DIAGNOSTICS_PER_FILE {
            if self.suppressed == 0 {
                crate::log_warning!(
                    code = codes::lexical::DIAGNOSTIC_LIMIT_REACHED,
                    "Diagnostic limit reached; further diagnostics are counted only",
                    span = diagnostic.span,
                    "limit" => MAX_DIAGNOSTICS_PER_FILE
                );
            }
            self.suppressed += 1;
            return false;
        }
        self.items.push(diagnostic);
        true
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.suppressed += other.suppressed;
        for diagnostic in other.items {
            self.push(diagnostic);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.items
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(move |d| d.kind == kind)
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_error)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn suppressed(&self) -> usize {
        self.suppressed
    }
}
