//! Lexical analysis for tabular test data
//!
//! Character-level tokenization (position tracker, single-unit matchers and
//! the driver that runs them) followed by optional cell grouping.

pub mod cells;
pub mod driver;
pub mod matchers;
pub mod position_tracker;

use crate::config::runtime::LexicalPreferences;

pub use cells::{group_cells, LineFormat};
pub use driver::{CancellationToken, LexerDriver, LexerError, LexicalMetrics, LexicalResult};
pub use matchers::{default_matchers, MatchDecision, SingleUnitMatcher};
pub use position_tracker::PositionTracker;

/// Lex a buffer with default preferences
pub fn lex(source: &str) -> Result<LexicalResult, LexerError> {
    LexerDriver::new().lex(source)
}

pub fn lex_with_preferences(
    source: &str,
    preferences: LexicalPreferences,
) -> Result<LexicalResult, LexerError> {
    LexerDriver::with_preferences(preferences).lex(source)
}

/// Lex a buffer, stopping early if `cancellation` is triggered
pub fn lex_cancellable(
    source: &str,
    preferences: LexicalPreferences,
    cancellation: CancellationToken,
) -> Result<LexicalResult, LexerError> {
    LexerDriver::with_preferences(preferences)
        .with_cancellation(cancellation)
        .lex(source)
}

/// Check that every lexical code is registered (for system startup)
pub fn init_lexical_analysis_logging() -> Result<(), String> {
    let required = [
        crate::logging::codes::lexical::UNCLASSIFIED_CHARACTER,
        crate::logging::codes::lexical::POSITION_INVARIANT_VIOLATION,
        crate::logging::codes::lexical::TOO_MANY_TOKENS,
        crate::logging::codes::lexical::BUFFER_INDEX_OUT_OF_RANGE,
        crate::logging::codes::lexical::DIAGNOSTIC_LIMIT_REACHED,
    ];

    for code in &required {
        if crate::logging::codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Lexical error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexical_codes_registered() {
        assert!(init_lexical_analysis_logging().is_ok());
    }

    #[test]
    fn test_preferences_control_detail() {
        let preferences = LexicalPreferences {
            collect_detailed_metrics: false,
            log_unclassified_characters: false,
        };
        let result = lex_with_preferences("a b", preferences).unwrap();
        assert!(result.metrics.token_type_counts.is_empty());
        assert_eq!(result.metrics.total_tokens, 3);
    }
}
