// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProcessorPreferences {
    /// Whether to reject files without a known test-data extension
    pub require_known_extension: bool,

    /// Whether to enable detailed performance logging
    pub enable_performance_logging: bool,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            require_known_extension: env::var(env_vars::REQUIRE_KNOWN_EXTENSION)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_performance_logging: env::var(env_vars::ENABLE_PERFORMANCE_LOGGING)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalPreferences {
    /// Whether to collect per-type token counts
    pub collect_detailed_metrics: bool,

    /// Whether every unclassified character is also sent to the logger
    pub log_unclassified_characters: bool,
}

impl Default for LexicalPreferences {
    fn default() -> Self {
        Self {
            collect_detailed_metrics: env::var(env_vars::LEXICAL_DETAILED_METRICS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            log_unclassified_characters: env::var(env_vars::LEXICAL_LOG_UNCLASSIFIED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingPreferences {
    /// Whether `...` lines extend the declaration of the previous line
    pub allow_continuation_lines: bool,

    /// Whether extra cells after a Resource path produce a warning
    pub warn_on_unwanted_arguments: bool,

    /// Whether cells that no mapper accepts produce a warning
    pub report_unexpected_cells: bool,
}

impl Default for MappingPreferences {
    fn default() -> Self {
        Self {
            allow_continuation_lines: env::var(env_vars::MAPPING_ALLOW_CONTINUATION)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            warn_on_unwanted_arguments: env::var(env_vars::MAPPING_WARN_UNWANTED_ARGUMENTS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            report_unexpected_cells: env::var(env_vars::MAPPING_REPORT_UNEXPECTED_CELLS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    /// Preferred minimum log level
    pub min_log_level: LogLevel,

    /// Whether to include file context in log messages
    pub include_file_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var(env_vars::LOGGING_USE_STRUCTURED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var(env_vars::LOGGING_ENABLE_CONSOLE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            include_file_context: env::var(env_vars::LOGGING_INCLUDE_FILE_CONTEXT)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Convert to events::LogLevel
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub file_processor: FileProcessorPreferences,
    pub lexical: LexicalPreferences,
    pub mapping: MappingPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Load preferences from a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Render the active preferences as TOML
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Initialize global logging from the `[logging]` preferences.
    /// Fails if logging was already initialized.
    pub fn init_logging(&self) -> Result<(), String> {
        crate::logging::init_global_logging_with_preferences(self.logging.clone())
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // File Processor
    pub const REQUIRE_KNOWN_EXTENSION: &str = "RF_REQUIRE_KNOWN_EXTENSION";
    pub const ENABLE_PERFORMANCE_LOGGING: &str = "RF_ENABLE_PERFORMANCE_LOGGING";

    // Lexical
    pub const LEXICAL_DETAILED_METRICS: &str = "RF_LEXICAL_DETAILED_METRICS";
    pub const LEXICAL_LOG_UNCLASSIFIED: &str = "RF_LEXICAL_LOG_UNCLASSIFIED";

    // Mapping
    pub const MAPPING_ALLOW_CONTINUATION: &str = "RF_MAPPING_ALLOW_CONTINUATION";
    pub const MAPPING_WARN_UNWANTED_ARGUMENTS: &str = "RF_MAPPING_WARN_UNWANTED_ARGUMENTS";
    pub const MAPPING_REPORT_UNEXPECTED_CELLS: &str = "RF_MAPPING_REPORT_UNEXPECTED_CELLS";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "RF_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "RF_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "RF_LOGGING_MIN_LEVEL";
    pub const LOGGING_INCLUDE_FILE_CONTEXT: &str = "RF_LOGGING_INCLUDE_FILE_CONTEXT";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("WARN"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("2"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("verbose"), None);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            [mapping]
            allow_continuation_lines = false

            [logging]
            min_log_level = "Debug"
            "#,
        )
        .unwrap();

        assert!(!config.mapping.allow_continuation_lines);
        assert_eq!(config.logging.min_log_level, LogLevel::Debug);
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        assert!(RuntimeConfig::from_toml_str("[mapping\nallow = ").is_err());
    }

    #[test]
    fn test_toml_rendering_reloads() {
        let config = RuntimeConfig::default();
        let rendered = config.to_toml_string().unwrap();
        let reloaded = RuntimeConfig::from_toml_str(&rendered).unwrap();
        assert_eq!(
            reloaded.mapping.warn_on_unwanted_arguments,
            config.mapping.warn_on_unwanted_arguments
        );
    }
}
