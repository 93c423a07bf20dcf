//! Mock converter for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::converter::{ConversionOutcome, Converter, ConverterError};

/// A recorded conversion call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedConversion {
    pub source: PathBuf,
    pub dest_dir: PathBuf,
    pub sample_rate: u32,
    pub success: bool,
}

/// Mock implementation of the Converter trait.
///
/// Writes a real `.m4a` file into the destination directory so placement
/// behavior can be asserted on disk, records every call, and supports error
/// injection and a configurable conversion delay.
#[derive(Debug)]
pub struct MockConverter {
    conversions: Arc<RwLock<Vec<RecordedConversion>>>,
    next_error: Arc<RwLock<Option<ConverterError>>>,
    delay: Arc<RwLock<Duration>>,
}

impl Default for MockConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConverter {
    pub fn new() -> Self {
        Self {
            conversions: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
        }
    }

    /// Get all recorded conversion calls.
    pub async fn recorded_conversions(&self) -> Vec<RecordedConversion> {
        self.conversions.read().await.clone()
    }

    /// Get the number of conversions performed.
    pub async fn conversion_count(&self) -> usize {
        self.conversions.read().await.len()
    }

    /// Make the next conversion fail with the given error.
    pub async fn set_next_error(&self, error: ConverterError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set a simulated conversion duration.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    async fn record(&self, source: &Path, dest_dir: &Path, sample_rate: u32, success: bool) {
        self.conversions.write().await.push(RecordedConversion {
            source: source.to_path_buf(),
            dest_dir: dest_dir.to_path_buf(),
            sample_rate,
            success,
        });
    }
}

#[async_trait]
impl Converter for MockConverter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        Ok(())
    }

    async fn convert(
        &self,
        source: &Path,
        dest_dir: &Path,
        sample_rate: u32,
    ) -> Result<ConversionOutcome, ConverterError> {
        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.next_error.write().await.take() {
            self.record(source, dest_dir, sample_rate, false).await;
            return Err(error);
        }

        if tokio::fs::metadata(source).await.is_err() {
            self.record(source, dest_dir, sample_rate, false).await;
            return Err(ConverterError::SourceNotFound {
                path: source.to_path_buf(),
            });
        }

        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());

        // Suffix on collision, same as the real conversion tool
        let mut output_path = dest_dir.join(format!("{stem}.m4a"));
        let mut counter = 1;
        while tokio::fs::metadata(&output_path).await.is_ok() {
            output_path = dest_dir.join(format!("{stem} {counter}.m4a"));
            counter += 1;
        }

        tokio::fs::write(&output_path, b"mock m4a data").await?;
        let output_size_bytes = tokio::fs::metadata(&output_path).await?.len();

        self.record(source, dest_dir, sample_rate, true).await;

        Ok(ConversionOutcome {
            output_path,
            output_size_bytes,
            duration_ms: delay.as_millis() as u64,
        })
    }
}
