use crate::file_processor::FileMetadata;
use crate::lexical::LexicalMetrics;
use crate::logging::codes;
use crate::model::FileOutput;
use crate::tokens::TokenStream;
use crate::utils::SourceMap;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Cell stream, settings table and all diagnostics
    pub output: FileOutput,
    /// Stream as the lexer produced it, before cell grouping
    pub raw_tokens: TokenStream,
    pub lexical_metrics: LexicalMetrics,
    /// Only set by `parse_file`
    pub file_metadata: Option<FileMetadata>,
    /// Lexing stopped early; the settings table was not mapped
    pub cancelled: bool,
    pub duration: Duration,
}

impl ParseResult {
    pub fn has_errors(&self) -> bool {
        self.output.diagnostics().has_errors()
    }

    /// Every diagnostic rendered against its source line
    pub fn render_diagnostics(&self, source: &str) -> String {
        let source_map = SourceMap::new(source.to_string());
        self.output
            .diagnostics()
            .iter()
            .map(|diagnostic| {
                let message = format!("[{}] {}", diagnostic.code(), diagnostic.message);
                source_map.format_error(&diagnostic.span, &message)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub(crate) fn log_success(&self) {
        crate::log_success!(
            codes::success::PARSE_COMPLETE,
            "Parse completed",
            "raw_tokens" => self.raw_tokens.len(),
            "cells" => self.output.tokens().len(),
            "imports" => self.output.settings().len(),
            "diagnostics" => self.output.diagnostics().len(),
            "cancelled" => self.cancelled,
            "duration_ms" => format!("{:.2}", self.duration.as_secs_f64() * 1000.0)
        );
    }
}
