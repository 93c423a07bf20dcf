//! Error types for the converter module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during conversion.
#[derive(Debug, Error)]
pub enum ConverterError {
    /// Conversion tool not found or not a file.
    #[error("Conversion tool not found at path: {path}")]
    ToolNotFound { path: PathBuf },

    /// Source file not found.
    #[error("Source file not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// The tool exited with a non-zero status.
    #[error("Conversion failed: {reason}")]
    ToolFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// The tool reported success but no output file appeared.
    #[error("Output file was not created in {dest_dir}")]
    OutputMissing { dest_dir: PathBuf },

    /// I/O error during conversion.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConverterError {
    /// Creates a new tool failed error with stderr output.
    pub fn tool_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::ToolFailed {
            reason: reason.into(),
            stderr,
        }
    }

    /// Full diagnostic text for failure notifications and logs.
    pub fn diagnostic(&self) -> String {
        match self {
            Self::ToolFailed {
                reason,
                stderr: Some(stderr),
            } if !stderr.trim().is_empty() => {
                format!("{}: {}", reason, stderr.trim())
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_includes_stderr() {
        let err = ConverterError::tool_failed(
            "exit status 1",
            Some("afconvert: unsupported format\n".to_string()),
        );
        let diag = err.diagnostic();
        assert!(diag.contains("exit status 1"));
        assert!(diag.contains("unsupported format"));
    }

    #[test]
    fn test_diagnostic_without_stderr() {
        let err = ConverterError::OutputMissing {
            dest_dir: PathBuf::from("/out"),
        };
        assert!(err.diagnostic().contains("/out"));
    }
}
