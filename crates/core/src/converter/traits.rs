//! Trait definitions for the converter module.

use async_trait::async_trait;
use std::path::Path;

use super::error::ConverterError;
use super::types::ConversionOutcome;

/// A converter that turns a stabilized mix file into its delivery format.
///
/// Contract: the implementation writes exactly one final audio file into
/// `dest_dir`, named from the source's base name (appending a
/// disambiguating suffix on collision), keeps any temporary intermediate
/// artifacts outside `dest_dir`, and is safely retryable with the same
/// arguments.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Returns the name of this converter implementation.
    fn name(&self) -> &str;

    /// Validates that the converter is properly configured and ready.
    async fn validate(&self) -> Result<(), ConverterError>;

    /// Converts `source` into `dest_dir` at the given sample rate.
    async fn convert(
        &self,
        source: &Path,
        dest_dir: &Path,
        sample_rate: u32,
    ) -> Result<ConversionOutcome, ConverterError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct NoopConverter;

    #[async_trait]
    impl Converter for NoopConverter {
        fn name(&self) -> &str {
            "noop"
        }

        async fn validate(&self) -> Result<(), ConverterError> {
            Ok(())
        }

        async fn convert(
            &self,
            source: &Path,
            dest_dir: &Path,
            _sample_rate: u32,
        ) -> Result<ConversionOutcome, ConverterError> {
            let stem = source.file_stem().and_then(|s| s.to_str()).unwrap_or("out");
            Ok(ConversionOutcome {
                output_path: dest_dir.join(format!("{stem}.m4a")),
                output_size_bytes: 0,
                duration_ms: 0,
            })
        }
    }

    #[tokio::test]
    async fn test_noop_converter_names_output_from_source() {
        let converter = NoopConverter;
        let outcome = converter
            .convert(
                Path::new("/src/mix_01.wav"),
                Path::new("/dest/SessionA"),
                48000,
            )
            .await
            .unwrap();
        assert_eq!(
            outcome.output_path,
            PathBuf::from("/dest/SessionA/mix_01.m4a")
        );
    }
}
