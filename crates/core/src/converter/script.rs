//! External conversion tool driver.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, info};

use crate::util::{format_duration, format_file_size};

use super::error::ConverterError;
use super::traits::Converter;
use super::types::ConversionOutcome;

/// Drives the configured conversion tool as a child process.
///
/// The tool is invoked as `tool <source> <dest_dir> <sample_rate>` and owns
/// the output naming, including collision suffixing, so the produced file
/// is located afterwards by matching the source's stem in the destination.
pub struct ScriptConverter {
    script_path: PathBuf,
}

impl ScriptConverter {
    pub fn new(script_path: PathBuf) -> Self {
        Self { script_path }
    }

    /// Finds the newest output file in `dest_dir` whose name starts with
    /// the source stem. The tool may have uniquified the name, so an exact
    /// match cannot be assumed.
    async fn locate_output(
        dest_dir: &Path,
        stem: &str,
    ) -> Result<Option<PathBuf>, std::io::Error> {
        let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;
        let mut entries = tokio::fs::read_dir(dest_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let matches_stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.starts_with(stem))
                .unwrap_or(false);
            let is_m4a = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("m4a"))
                .unwrap_or(false);
            if !matches_stem || !is_m4a {
                continue;
            }

            let modified = entry.metadata().await?.modified()?;
            if newest.as_ref().map(|(t, _)| modified > *t).unwrap_or(true) {
                newest = Some((modified, path));
            }
        }

        Ok(newest.map(|(_, path)| path))
    }
}

#[async_trait]
impl Converter for ScriptConverter {
    fn name(&self) -> &str {
        "script"
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        let meta = tokio::fs::metadata(&self.script_path)
            .await
            .map_err(|_| ConverterError::ToolNotFound {
                path: self.script_path.clone(),
            })?;
        if !meta.is_file() {
            return Err(ConverterError::ToolNotFound {
                path: self.script_path.clone(),
            });
        }
        Ok(())
    }

    async fn convert(
        &self,
        source: &Path,
        dest_dir: &Path,
        sample_rate: u32,
    ) -> Result<ConversionOutcome, ConverterError> {
        let source_meta =
            tokio::fs::metadata(source)
                .await
                .map_err(|_| ConverterError::SourceNotFound {
                    path: source.to_path_buf(),
                })?;

        info!(
            "Starting conversion: {} ({})",
            source.display(),
            format_file_size(source_meta.len())
        );
        debug!(
            "Destination: {}, sample rate: {} Hz",
            dest_dir.display(),
            sample_rate
        );

        let start = Instant::now();
        let output = Command::new(&self.script_path)
            .arg(source)
            .arg(dest_dir)
            .arg(sample_rate.to_string())
            .output()
            .await?;

        let duration = start.elapsed();

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(ConverterError::tool_failed(
                format!("tool exited with {}", output.status),
                Some(stderr),
            ));
        }

        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let Some(output_path) = Self::locate_output(dest_dir, stem).await? else {
            return Err(ConverterError::OutputMissing {
                dest_dir: dest_dir.to_path_buf(),
            });
        };

        let output_size_bytes = tokio::fs::metadata(&output_path).await?.len();
        info!(
            "Conversion complete: {} ({}, took {})",
            output_path.display(),
            format_file_size(output_size_bytes),
            format_duration(duration)
        );

        Ok(ConversionOutcome {
            output_path,
            output_size_bytes,
            duration_ms: duration.as_millis() as u64,
        })
    }
}
