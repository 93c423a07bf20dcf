//! Error types for the destination module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving or preparing a destination.
#[derive(Debug, Error)]
pub enum DestinationError {
    /// The configured base path does not exist.
    #[error("Destination path does not exist: {path}")]
    BaseMissing { path: PathBuf },

    /// The configured base path exists but is not a writable directory.
    #[error("Destination path is not a writable directory: {path}")]
    BaseNotWritable { path: PathBuf },

    /// The mount capability failed.
    #[error("Mount failed: {reason}")]
    MountFailed { reason: String },

    /// The mount capability did not complete within the configured limit.
    #[error("Mount did not complete within {timeout_secs} seconds")]
    MountTimeout { timeout_secs: u64 },

    /// Mode-specific configuration is missing; caught at startup by config
    /// validation, kept as a guard for direct construction.
    #[error("Destination mode '{mode}' is missing required configuration")]
    MissingConfig { mode: &'static str },

    /// Failed to create the per-session output directory.
    #[error("Failed to create session directory {path}: {source}")]
    SessionDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DestinationError::MountTimeout { timeout_secs: 30 };
        assert_eq!(err.to_string(), "Mount did not complete within 30 seconds");

        let err = DestinationError::BaseMissing {
            path: PathBuf::from("/Volumes/NAS"),
        };
        assert!(err.to_string().contains("/Volumes/NAS"));
    }
}
