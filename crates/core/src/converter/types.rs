//! Types for the converter module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Result of a successful conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutcome {
    /// Where the converted file actually landed. May carry a
    /// disambiguating suffix when the plain name was taken.
    pub output_path: PathBuf,
    /// Output file size in bytes.
    pub output_size_bytes: u64,
    /// Conversion duration in milliseconds.
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serialization() {
        let outcome = ConversionOutcome {
            output_path: PathBuf::from("/out/SessionA/mix_01.m4a"),
            output_size_bytes: 1024,
            duration_ms: 2500,
        };

        let json = serde_json::to_string(&outcome).unwrap();
        let parsed: ConversionOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.output_path, outcome.output_path);
        assert_eq!(parsed.duration_ms, 2500);
    }
}
