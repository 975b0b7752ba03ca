//! Consolidated error codes and classification system
//!
//! Single source of truth for all codes, their metadata, and classification functions.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// File processing error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
    pub const TOO_MANY_LINES: Code = Code::new("E013");
}

/// Lexical analysis codes
pub mod lexical {
    use super::Code;

    pub const UNCLASSIFIED_CHARACTER: Code = Code::new("E020");
    pub const POSITION_INVARIANT_VIOLATION: Code = Code::new("E021");
    pub const TOO_MANY_TOKENS: Code = Code::new("E022");
    pub const BUFFER_INDEX_OUT_OF_RANGE: Code = Code::new("E023");
    pub const DIAGNOSTIC_LIMIT_REACHED: Code = Code::new("E024");
}

/// Settings mapping codes
pub mod mapping {
    use super::Code;

    pub const STRUCTURAL_INCONSISTENCY: Code = Code::new("E040");
    pub const ILLEGAL_STATE_TRANSITION: Code = Code::new("E041");
    pub const STATE_DEPTH_EXCEEDED: Code = Code::new("E042");
    pub const UNEXPECTED_CELL: Code = Code::new("E043");
    pub const UNWANTED_IMPORT_ARGUMENT: Code = Code::new("E044");
    pub const IMPORT_LIMIT_EXCEEDED: Code = Code::new("E045");
    pub const MISSING_ALIAS_NAME: Code = Code::new("E046");
}

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const CELL_GROUPING_COMPLETE: Code = Code::new("I021");
    pub const SETTINGS_MAPPING_COMPLETE: Code = Code::new("I040");
    pub const PARSE_COMPLETE: Code = Code::new("I050");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let entries = [
            // System
            ErrorMetadata::new(
                "ERR001",
                "System",
                Severity::Critical,
                false,
                true,
                "Critical internal system error",
                "File a bug report with the input that triggered it",
            ),
            ErrorMetadata::new(
                "ERR002",
                "System",
                Severity::Critical,
                false,
                true,
                "System initialization failure",
                "Check logging configuration and environment variables",
            ),
            // File processing
            ErrorMetadata::new(
                "E005",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "File not found at specified path",
                "Check file path and ensure file exists",
            ),
            ErrorMetadata::new(
                "E006",
                "FileProcessing",
                Severity::Low,
                true,
                false,
                "File does not have a known test data extension",
                "Use .robot, .resource, .txt or .tsv, or disable the extension check",
            ),
            ErrorMetadata::new(
                "E007",
                "FileProcessing",
                Severity::High,
                false,
                true,
                "File exceeds the compile-time size limit",
                "Split the file or rebuild with a larger max_file_size",
            ),
            ErrorMetadata::new(
                "E009",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "Permission denied while accessing file",
                "Check file permissions",
            ),
            ErrorMetadata::new(
                "E010",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "File is not valid UTF-8",
                "Re-encode the file as UTF-8",
            ),
            ErrorMetadata::new(
                "E011",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "I/O error while reading file",
                "Check the file system and retry",
            ),
            ErrorMetadata::new(
                "E012",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "Path is empty or does not point to a regular file",
                "Pass the path of a regular file",
            ),
            ErrorMetadata::new(
                "E013",
                "FileProcessing",
                Severity::High,
                false,
                true,
                "File exceeds the compile-time line limit",
                "Split the file or rebuild with a larger max_line_count",
            ),
            // Lexical
            ErrorMetadata::new(
                "E020",
                "Lexical",
                Severity::Low,
                true,
                false,
                "No matcher claimed the character; kept as an unknown token",
                "Check the input for control characters or unusual whitespace",
            ),
            ErrorMetadata::new(
                "E021",
                "Lexical",
                Severity::Critical,
                false,
                true,
                "Token positions are no longer contiguous or monotonic",
                "Lexer defect: file a bug report with the input",
            ),
            ErrorMetadata::new(
                "E022",
                "Lexical",
                Severity::High,
                false,
                true,
                "Token count exceeds the compile-time limit",
                "Split the file or rebuild with a larger max_token_count",
            ),
            ErrorMetadata::new(
                "E023",
                "Lexical",
                Severity::Critical,
                false,
                true,
                "Character index outside of the input buffer",
                "Caller defect: only consume indices inside the buffer",
            ),
            ErrorMetadata::new(
                "E024",
                "Lexical",
                Severity::Low,
                true,
                false,
                "Diagnostic limit reached; further diagnostics are counted only",
                "Fix the reported problems and parse again",
            ),
            // Mapping
            ErrorMetadata::new(
                "E040",
                "Mapping",
                Severity::Medium,
                true,
                false,
                "Import path or argument without an open import declaration",
                "Make sure the import keyword is the first cell of the line",
            ),
            ErrorMetadata::new(
                "E041",
                "Mapping",
                Severity::High,
                true,
                false,
                "Parsing state transition not allowed by the transition table",
                "Mapper defect: file a bug report with the input",
            ),
            ErrorMetadata::new(
                "E042",
                "Mapping",
                Severity::High,
                true,
                false,
                "Parsing state stack exceeds the compile-time depth limit",
                "Reduce the number of cells on the declaration",
            ),
            ErrorMetadata::new(
                "E043",
                "Mapping",
                Severity::Low,
                true,
                false,
                "Cell is not accepted by any mapper in the current state",
                "Remove the extra cell",
            ),
            ErrorMetadata::new(
                "E044",
                "Mapping",
                Severity::Low,
                true,
                false,
                "Resource imports do not take arguments",
                "Remove the arguments after the resource path",
            ),
            ErrorMetadata::new(
                "E045",
                "Mapping",
                Severity::High,
                true,
                false,
                "Import count exceeds the compile-time limit",
                "Split the settings table across resource files",
            ),
            ErrorMetadata::new(
                "E046",
                "Mapping",
                Severity::Low,
                true,
                false,
                "Library alias keyword is not followed by a name",
                "Add the alias name after WITH NAME or AS",
            ),
            // Success
            ErrorMetadata::new(
                "I004",
                "System",
                Severity::Low,
                true,
                false,
                "Logging system initialized",
                "No action required",
            ),
            ErrorMetadata::new(
                "I006",
                "FileProcessing",
                Severity::Low,
                true,
                false,
                "File loaded successfully",
                "Continue to lexical analysis",
            ),
            ErrorMetadata::new(
                "I020",
                "Lexical",
                Severity::Low,
                true,
                false,
                "Tokenization completed",
                "Continue to cell grouping",
            ),
            ErrorMetadata::new(
                "I021",
                "Lexical",
                Severity::Low,
                true,
                false,
                "Cell grouping completed",
                "Continue to settings mapping",
            ),
            ErrorMetadata::new(
                "I040",
                "Mapping",
                Severity::Low,
                true,
                false,
                "Settings mapping completed",
                "File output ready",
            ),
            ErrorMetadata::new(
                "I050",
                "Pipeline",
                Severity::Low,
                true,
                false,
                "Parse completed",
                "No action required",
            ),
        ];

        entries
            .into_iter()
            .map(|metadata| (metadata.code, metadata))
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get severity from code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get category from code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}
