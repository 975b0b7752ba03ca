//! Parsing states and the state stack
//!
//! One frame is pushed per mapped cell, so the top of the stack always says
//! what may follow on the current line. Every push is checked against the
//! transition table in [`ParsingState::can_follow`].

use crate::config::compile_time::mapping::MAX_STATE_DEPTH;
use crate::model::{DiagnosticKind, ImportKind};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ParsingState {
    LibraryImport,
    LibraryImportName,
    LibraryImportArguments,
    /// After `WITH NAME` / `AS`
    LibraryImportAlias,
    LibraryImportAliasValue,
    ResourceImport,
    ResourceImportPath,
    ResourceImportUnwantedArguments,
    VariablesImport,
    VariablesImportPath,
    VariablesImportArguments,
    /// Rest of the line is comment
    Comment,
}

impl ParsingState {
    /// Transition table; `previous` is the current top of the stack
    pub fn can_follow(&self, previous: Option<ParsingState>) -> bool {
        use ParsingState::*;

        match previous {
            None => matches!(self, LibraryImport | ResourceImport | VariablesImport | Comment),
            Some(previous) => match (previous, self) {
                (_, Comment) => true,

                (LibraryImport, LibraryImportName) => true,
                (LibraryImportName | LibraryImportArguments, LibraryImportArguments) => true,
                (LibraryImportName | LibraryImportArguments, LibraryImportAlias) => true,
                (LibraryImportAlias, LibraryImportAliasValue) => true,

                (ResourceImport, ResourceImportPath) => true,
                (
                    ResourceImportPath | ResourceImportUnwantedArguments,
                    ResourceImportUnwantedArguments,
                ) => true,

                (VariablesImport, VariablesImportPath) => true,
                (VariablesImportPath | VariablesImportArguments, VariablesImportArguments) => true,

                _ => false,
            },
        }
    }

    /// State entered when the import keyword is recognized
    pub fn keyword_state(kind: ImportKind) -> Self {
        match kind {
            ImportKind::Library => Self::LibraryImport,
            ImportKind::Resource => Self::ResourceImport,
            ImportKind::Variables => Self::VariablesImport,
        }
    }

    pub fn path_state(kind: ImportKind) -> Self {
        match kind {
            ImportKind::Library => Self::LibraryImportName,
            ImportKind::Resource => Self::ResourceImportPath,
            ImportKind::Variables => Self::VariablesImportPath,
        }
    }

    pub fn arguments_state(kind: ImportKind) -> Self {
        match kind {
            ImportKind::Library => Self::LibraryImportArguments,
            ImportKind::Resource => Self::ResourceImportUnwantedArguments,
            ImportKind::Variables => Self::VariablesImportArguments,
        }
    }

    pub fn import_kind(&self) -> Option<ImportKind> {
        use ParsingState::*;

        match self {
            LibraryImport | LibraryImportName | LibraryImportArguments | LibraryImportAlias
            | LibraryImportAliasValue => Some(ImportKind::Library),
            ResourceImport | ResourceImportPath | ResourceImportUnwantedArguments => {
                Some(ImportKind::Resource)
            }
            VariablesImport | VariablesImportPath | VariablesImportArguments => {
                Some(ImportKind::Variables)
            }
            Comment => None,
        }
    }
}

impl fmt::Display for ParsingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("Illegal state transition from {} to {to}", describe(.from))]
    IllegalTransition {
        from: Option<ParsingState>,
        to: ParsingState,
    },

    #[error("State stack depth {depth} exceeds maximum {MAX_STATE_DEPTH}")]
    DepthExceeded { depth: usize },
}

fn describe(state: &Option<ParsingState>) -> String {
    state.map_or_else(|| "empty stack".to_string(), |s| s.to_string())
}

impl StateError {
    pub fn diagnostic_kind(&self) -> DiagnosticKind {
        match self {
            StateError::IllegalTransition { .. } => DiagnosticKind::IllegalStateTransition,
            StateError::DepthExceeded { .. } => DiagnosticKind::StateDepthExceeded,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParsingStateStack {
    frames: Vec<ParsingState>,
}

impl ParsingStateStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, state: ParsingState) -> Result<(), StateError> {
        if self.frames.len() >= MAX_STATE_DEPTH {
            return Err(StateError::DepthExceeded {
                depth: self.frames.len() + 1,
            });
        }
        if !state.can_follow(self.top()) {
            return Err(StateError::IllegalTransition {
                from: self.top(),
                to: state,
            });
        }
        self.frames.push(state);
        Ok(())
    }

    pub fn top(&self) -> Option<ParsingState> {
        self.frames.last().copied()
    }

    /// Most recent frame that is not a comment
    pub fn last_data_state(&self) -> Option<ParsingState> {
        self.frames
            .iter()
            .rev()
            .copied()
            .find(|state| *state != ParsingState::Comment)
    }

    /// Replace the whole stack with a single saved frame (continuation lines)
    pub fn restore(&mut self, state: ParsingState) {
        self.frames.clear();
        self.frames.push(state);
    }

    /// Empty the stack, returning the frames bottom first
    pub fn drain(&mut self) -> Vec<ParsingState> {
        std::mem::take(&mut self.frames)
    }

    pub fn snapshot(&self) -> &[ParsingState] {
        &self.frames
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_variables_transitions() {
        let mut stack = ParsingStateStack::new();
        stack.push(ParsingState::VariablesImport).unwrap();
        stack.push(ParsingState::VariablesImportPath).unwrap();
        stack.push(ParsingState::VariablesImportArguments).unwrap();
        stack.push(ParsingState::VariablesImportArguments).unwrap();

        assert_eq!(stack.depth(), 4);
        assert_eq!(stack.top(), Some(ParsingState::VariablesImportArguments));
    }

    #[test]
    fn test_arguments_require_path() {
        let mut stack = ParsingStateStack::new();
        stack.push(ParsingState::VariablesImport).unwrap();
        assert_matches!(
            stack.push(ParsingState::VariablesImportArguments),
            Err(StateError::IllegalTransition {
                from: Some(ParsingState::VariablesImport),
                to: ParsingState::VariablesImportArguments
            })
        );
    }

    #[test]
    fn test_empty_stack_accepts_only_keywords() {
        assert!(ParsingState::ResourceImport.can_follow(None));
        assert!(ParsingState::Comment.can_follow(None));
        assert!(!ParsingState::VariablesImportPath.can_follow(None));
    }

    #[test]
    fn test_library_alias_transitions() {
        use ParsingState::*;
        assert!(LibraryImportAlias.can_follow(Some(LibraryImportName)));
        assert!(LibraryImportAlias.can_follow(Some(LibraryImportArguments)));
        assert!(LibraryImportAliasValue.can_follow(Some(LibraryImportAlias)));
        assert!(!LibraryImportArguments.can_follow(Some(LibraryImportAliasValue)));
        assert!(!LibraryImportAlias.can_follow(Some(LibraryImport)));
    }

    #[test]
    fn test_comment_is_terminal() {
        use ParsingState::*;
        assert!(Comment.can_follow(Some(VariablesImportPath)));
        assert!(Comment.can_follow(Some(Comment)));
        assert!(!VariablesImportArguments.can_follow(Some(Comment)));
    }

    #[test]
    fn test_kinds_do_not_mix() {
        use ParsingState::*;
        assert!(!ResourceImportPath.can_follow(Some(VariablesImport)));
        assert!(!LibraryImportName.can_follow(Some(ResourceImport)));
    }

    #[test]
    fn test_drain_and_restore() {
        let mut stack = ParsingStateStack::new();
        stack.push(ParsingState::LibraryImport).unwrap();
        stack.push(ParsingState::LibraryImportName).unwrap();
        stack.push(ParsingState::Comment).unwrap();

        assert_eq!(stack.last_data_state(), Some(ParsingState::LibraryImportName));
        let frames = stack.drain();
        assert_eq!(frames.len(), 3);
        assert!(stack.is_empty());

        stack.restore(ParsingState::LibraryImportName);
        assert_eq!(stack.snapshot(), &[ParsingState::LibraryImportName]);
    }

    #[test]
    fn test_state_kinds() {
        assert_eq!(
            ParsingState::keyword_state(ImportKind::Resource),
            ParsingState::ResourceImport
        );
        assert_eq!(
            ParsingState::ResourceImportUnwantedArguments.import_kind(),
            Some(ImportKind::Resource)
        );
        assert_eq!(ParsingState::Comment.import_kind(), None);
    }

    #[test]
    fn test_error_messages() {
        let error = StateError::IllegalTransition {
            from: None,
            to: ParsingState::VariablesImportPath,
        };
        assert_eq!(
            error.to_string(),
            "Illegal state transition from empty stack to VariablesImportPath"
        );
        assert_eq!(
            error.diagnostic_kind(),
            DiagnosticKind::IllegalStateTransition
        );
    }
}
