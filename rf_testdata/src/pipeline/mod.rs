//! End-to-end parsing: load → lex → group cells → map settings

mod error;
mod result;

pub use error::PipelineError;
pub use result::ParseResult;

use crate::config::runtime::RuntimeConfig;
use crate::file_processor::FileProcessor;
use crate::lexical::{self, CancellationToken};
use crate::logging;
use crate::mapping;
use crate::model::FileOutput;
use std::path::Path;
use std::time::Instant;

/// Parse an in-memory buffer with default preferences
pub fn parse_source(source: &str) -> Result<ParseResult, PipelineError> {
    parse_source_with(source, &RuntimeConfig::default(), None)
}

pub fn parse_source_with(
    source: &str,
    config: &RuntimeConfig,
    cancellation: Option<CancellationToken>,
) -> Result<ParseResult, PipelineError> {
    run(source, FileOutput::new(), config, cancellation)
}

/// Load and parse a file
pub fn parse_file(path: impl AsRef<Path>) -> Result<ParseResult, PipelineError> {
    parse_file_with(path, &RuntimeConfig::default())
}

pub fn parse_file_with(
    path: impl AsRef<Path>,
    config: &RuntimeConfig,
) -> Result<ParseResult, PipelineError> {
    let path = path.as_ref();
    let file_path = path
        .to_str()
        .ok_or_else(|| PipelineError::pipeline_error("File path is not valid UTF-8"))?;

    logging::with_file_context(path.to_path_buf(), 0, || {
        crate::log_info!("Starting test data parse", "file" => file_path);

        let loaded = FileProcessor::from_preferences(&config.file_processor)
            .process_file(file_path)?;
        let output = FileOutput::with_source_path(loaded.metadata.path.clone());

        let mut result = run(&loaded.source, output, config, None)?;
        result.file_metadata = Some(loaded.metadata);
        Ok(result)
    })
}

fn run(
    source: &str,
    mut output: FileOutput,
    config: &RuntimeConfig,
    cancellation: Option<CancellationToken>,
) -> Result<ParseResult, PipelineError> {
    let started = Instant::now();

    let lexed = match cancellation {
        Some(token) => lexical::lex_cancellable(source, config.lexical.clone(), token)?,
        None => lexical::lex_with_preferences(source, config.lexical.clone())?,
    };

    // Lexer diagnostics precede mapping diagnostics
    output.extend_diagnostics(lexed.diagnostics);
    let cells = lexical::group_cells(&lexed.tokens);
    let output = if lexed.cancelled {
        output.attach_tokens(cells);
        output
    } else {
        mapping::map_settings_tokens_with_preferences(cells, output, config.mapping.clone())
    };

    let result = ParseResult {
        output,
        raw_tokens: lexed.tokens,
        lexical_metrics: lexed.metrics,
        file_metadata: None,
        cancelled: lexed.cancelled,
        duration: started.elapsed(),
    };
    result.log_success();
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DiagnosticKind, ImportKind};
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_source() {
        let result = parse_source("*** Settings ***\nLibrary  Collections\n").unwrap();

        let output = &result.output;
        let imports = output.settings().imports();
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].kind, ImportKind::Library);
        assert_eq!(output.import_path(&imports[0]), Some("Collections"));
        assert!(!result.cancelled);
        assert!(result.file_metadata.is_none());
        assert_eq!(result.raw_tokens.text(), "*** Settings ***\nLibrary  Collections\n");
    }

    #[test]
    fn test_lexer_diagnostics_are_kept() {
        let result = parse_source("*** Settings ***\nLibrary  Col\u{0007}\n").unwrap();
        assert_eq!(
            result
                .output
                .diagnostics()
                .of_kind(DiagnosticKind::UnclassifiedCharacter)
                .count(),
            1
        );
        assert!(result.has_errors());
    }

    #[test]
    fn test_render_diagnostics() {
        let source = "*** Settings ***\nResource  a.resource  extra\n";
        let result = parse_source(source).unwrap();

        let rendered = result.render_diagnostics(source);
        assert!(rendered.contains("[E044]"));
        assert!(rendered.contains("Resource  a.resource  extra"));
        assert!(rendered.contains("^"));
    }

    #[test]
    fn test_cancelled_parse_skips_mapping() {
        let token = CancellationToken::new();
        token.cancel();

        let result =
            parse_source_with("*** Settings ***\nLibrary  OS", &RuntimeConfig::default(), Some(token))
                .unwrap();
        assert!(result.cancelled);
        assert!(result.output.settings().is_empty());
    }

    #[test]
    fn test_parse_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("suite.robot");
        fs::write(&file_path, "*** Settings ***\nVariables  vars.py  dev\n").unwrap();

        let result = parse_file(&file_path).unwrap();
        let metadata = result.file_metadata.as_ref().unwrap();
        assert_eq!(metadata.line_count, 2);
        assert_eq!(result.output.source_path(), Some(metadata.path.as_path()));

        let import = &result.output.settings().imports()[0];
        assert_eq!(result.output.import_arguments(import), vec!["dev"]);
    }

    #[test]
    fn test_parse_missing_file() {
        let result = parse_file("no/such/suite.robot");
        assert_matches!(result, Err(PipelineError::FileProcessing(_)));
    }

    #[test]
    fn test_pipeline_error_code() {
        let error = PipelineError::pipeline_error("broken");
        assert_matches!(&error, PipelineError::Pipeline { message } if message == "broken");
        assert_eq!(error.error_code(), logging::codes::system::INTERNAL_ERROR);
    }
}
