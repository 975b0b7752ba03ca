//! File loading for the pipeline
//!
//! The lexer and mappers never touch the filesystem; `parse_file` goes
//! through here first.

pub mod processor;

pub use processor::{
    FileMetadata, FileProcessingResult, FileProcessor, FileProcessorError, KNOWN_EXTENSIONS,
};

/// Load a file with default settings
pub fn process_file(file_path: &str) -> Result<FileProcessingResult, FileProcessorError> {
    FileProcessor::new().process_file(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_missing_file_halts() {
        let error = process_file("does/not/exist.robot").unwrap_err();
        assert_eq!(error.error_code(), codes::file_processing::FILE_NOT_FOUND);
        assert!(error.requires_halt());
        assert!(!error.is_recoverable());
    }
}
