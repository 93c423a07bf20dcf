//! Types for the conversion orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during orchestration.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Destination could not be resolved or prepared.
    #[error("destination error: {0}")]
    Destination(#[from] crate::destination::DestinationError),

    /// The conversion tool failed.
    #[error("conversion error: {0}")]
    Conversion(#[from] crate::converter::ConverterError),
}

/// A stabilized mix file queued for conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionJob {
    /// Path of the source mix file.
    pub source: PathBuf,
    /// Session the file belongs to; names the output subdirectory.
    pub session: String,
    /// When the file was first detected.
    pub discovered_at: DateTime<Utc>,
}

/// Current status of the orchestrator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrchestratorStatus {
    /// Jobs currently running or queued behind the concurrency limit.
    pub in_flight: usize,
    /// Jobs completed successfully since startup.
    pub succeeded: u64,
    /// Jobs that failed since startup.
    pub failed: u64,
}
