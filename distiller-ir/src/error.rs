//! Error types for distiller-ir
//!
//! Lowering is recoverable by default: syntax problems become `Error` nodes
//! inside the returned `File`. The variants here cover the cases where no
//! usable tree can be produced at all.

use crate::ir::{File, LanguageId};
use thiserror::Error;

/// Errors from lowering and registry operations
#[derive(Error, Debug, Clone)]
pub enum IrError {
    /// No adapter is registered for the detected language
    #[error("Unsupported language {language:?} for '{path}'")]
    UnsupportedLanguage { path: String, language: LanguageId },

    /// Parse failed, but partial results may be available
    #[error("Parse error: {message}")]
    ParseError {
        message: String,
        /// Partial lowering result (if any structure could be recovered)
        partial: Option<Box<File>>,
    },

    /// Tree-sitter specific error (grammar version mismatch, cancelled parse)
    #[error("Tree-sitter error: {0}")]
    TreeSitterError(String),
}

impl IrError {
    /// Check if this error has partial results available
    pub fn has_partial(&self) -> bool {
        matches!(self, IrError::ParseError { partial: Some(_), .. })
    }

    /// Extract partial results if available
    pub fn take_partial(self) -> Option<File> {
        match self {
            IrError::ParseError {
                partial: Some(file),
                ..
            } => Some(*file),
            _ => None,
        }
    }

    /// Create a parse error with partial results
    pub fn parse_error_with_partial(message: impl Into<String>, file: File) -> Self {
        IrError::ParseError {
            message: message.into(),
            partial: Some(Box::new(file)),
        }
    }
}

/// Result type alias for IrError
pub type Result<T> = std::result::Result<T, IrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IrError::UnsupportedLanguage {
            path: "notes.txt".to_string(),
            language: LanguageId::Unknown,
        };
        assert!(err.to_string().contains("notes.txt"));
        assert!(err.to_string().contains("Unknown"));

        let err = IrError::TreeSitterError("incompatible grammar".to_string());
        assert!(err.to_string().contains("incompatible grammar"));
    }

    #[test]
    fn test_partial_results() {
        let file = File::new("broken.py", LanguageId::Python);
        let err = IrError::parse_error_with_partial("parser returned no tree", file);

        assert!(err.has_partial());
        let partial = err.take_partial().unwrap();
        assert_eq!(partial.path, "broken.py");
    }

    #[test]
    fn test_no_partial() {
        let err = IrError::ParseError {
            message: "syntax error".to_string(),
            partial: None,
        };
        assert!(!err.has_partial());
        assert!(err.take_partial().is_none());

        let err = IrError::TreeSitterError("cancelled".to_string());
        assert!(!err.has_partial());
    }
}
