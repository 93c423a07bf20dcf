use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::orchestrator::OrchestratorConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub source: SourceConfig,
    pub destination: DestinationConfig,
    #[serde(default)]
    pub conversion: ConversionConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

/// Where new mix files come from.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Source mode: watch a fixed set of folders or discover external drives.
    pub mode: SourceMode,

    /// Folders to watch (required when mode = "specific_folders").
    #[serde(default)]
    pub folders: Vec<PathBuf>,

    /// Name of the Pro Tools audio folder that holds bounced files.
    /// Matched case-sensitively against path components.
    #[serde(default = "default_audio_files_folder")]
    pub audio_files_folder: String,

    /// Case-insensitive prefix a file name must carry to be picked up.
    #[serde(default = "default_mix_prefix")]
    pub mix_file_prefix: String,

    /// How often to re-enumerate mounted volumes in discovery mode (seconds).
    #[serde(default = "default_volume_poll_interval")]
    pub volume_poll_interval_secs: u64,

    /// Volumes smaller than this are never watched (bytes).
    #[serde(default = "default_min_volume_capacity")]
    pub min_volume_capacity_bytes: u64,

    /// Filesystem types eligible for discovery (lowercase).
    #[serde(default = "default_allowed_filesystems")]
    pub allowed_filesystems: Vec<String>,

    /// Case-insensitive patterns that exclude a volume by mount path or name.
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,
}

/// Available source modes
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    SpecificFolders,
    AllExternalDrives,
}

fn default_audio_files_folder() -> String {
    "Audio Files".to_string()
}

fn default_mix_prefix() -> String {
    "mix".to_string()
}

fn default_volume_poll_interval() -> u64 {
    5
}

fn default_min_volume_capacity() -> u64 {
    1024 * 1024 * 1024 // 1 GiB
}

fn default_allowed_filesystems() -> Vec<String> {
    ["apfs", "hfs", "hfsx", "jhfs+", "jhfsx"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_exclude_patterns() -> Vec<String> {
    [
        r"Time Machine",
        r"\.timemachine",
        r"Backups\.backupdb",
        r"^\.Trash",
        r"^\.Spotlight",
        r"^\.fseventsd",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Where converted files end up.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DestinationConfig {
    /// Destination mode.
    pub mode: DestinationMode,

    /// Base folder inside the cloud-synced drive (required when mode = "icloud").
    #[serde(default)]
    pub icloud_path: Option<PathBuf>,

    /// Arbitrary local folder (required when mode = "custom").
    #[serde(default)]
    pub custom_path: Option<PathBuf>,

    /// Network share settings (required when mode = "nas").
    #[serde(default)]
    pub nas: Option<NasConfig>,
}

/// Available destination modes
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DestinationMode {
    Icloud,
    Nas,
    Custom,
}

impl DestinationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Icloud => "icloud",
            Self::Nas => "nas",
            Self::Custom => "custom",
        }
    }
}

/// Network share destination configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NasConfig {
    /// Share URL, e.g. "smb://nas.local/bounces".
    pub url: String,
    /// Account used for the mount/credential lookup.
    pub username: String,
    /// Expected local mount point.
    pub mount_point: PathBuf,
    /// Hard limit on how long a mount attempt may take.
    #[serde(default = "default_mount_timeout")]
    pub mount_timeout_secs: u64,
}

fn default_mount_timeout() -> u64 {
    30
}

/// Conversion and write-stability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConversionConfig {
    /// Target sample rate handed to the conversion tool (Hz).
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Seconds between file-size samples while waiting for a file to settle.
    #[serde(default = "default_stability_interval")]
    pub stability_check_interval_secs: u64,

    /// Consecutive identical size samples required before a file is processed.
    #[serde(default = "default_stability_checks")]
    pub stability_checks_required: u32,

    /// Path to the external conversion tool.
    #[serde(default = "default_script_path")]
    pub script_path: PathBuf,
}

fn default_sample_rate() -> u32 {
    48000
}

fn default_stability_interval() -> u64 {
    2
}

fn default_stability_checks() -> u32 {
    3
}

fn default_script_path() -> PathBuf {
    PathBuf::from("convert_mix.sh")
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            stability_check_interval_secs: default_stability_interval(),
            stability_checks_required: default_stability_checks(),
            script_path: default_script_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_defaults() {
        let config = ConversionConfig::default();
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.stability_check_interval_secs, 2);
        assert_eq!(config.stability_checks_required, 3);
    }

    #[test]
    fn test_source_config_defaults() {
        let toml = r#"
            mode = "specific_folders"
            folders = ["/tmp/sessions"]
        "#;
        let config: SourceConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.audio_files_folder, "Audio Files");
        assert_eq!(config.mix_file_prefix, "mix");
        assert_eq!(config.min_volume_capacity_bytes, 1024 * 1024 * 1024);
        assert!(config.allowed_filesystems.contains(&"apfs".to_string()));
    }

    #[test]
    fn test_destination_mode_round_trip() {
        let mode: DestinationMode = serde_json::from_str("\"nas\"").unwrap();
        assert_eq!(mode, DestinationMode::Nas);
        assert_eq!(mode.as_str(), "nas");
    }

    #[test]
    fn test_full_config_deserialize() {
        let toml = r#"
            [source]
            mode = "all_external_drives"

            [destination]
            mode = "custom"
            custom_path = "/tmp/out"

            [conversion]
            sample_rate = 44100
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.source.mode, SourceMode::AllExternalDrives);
        assert_eq!(config.destination.mode, DestinationMode::Custom);
        assert_eq!(config.conversion.sample_rate, 44100);
        assert_eq!(config.orchestrator.max_concurrent_jobs, 1);
    }
}
