use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("BOUNCEWATCH_").split("_"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DestinationMode, SourceMode};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[source]
mode = "specific_folders"
folders = ["/Users/me/Sessions"]

[destination]
mode = "icloud"
icloud_path = "/Users/me/iCloud/Downloads"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.source.mode, SourceMode::SpecificFolders);
        assert_eq!(config.destination.mode, DestinationMode::Icloud);
    }

    #[test]
    fn test_load_config_from_str_missing_source() {
        let toml = r#"
[destination]
mode = "custom"
custom_path = "/tmp/out"
"#;
        let result = load_config_from_str(toml);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[source]
mode = "all_external_drives"

[destination]
mode = "nas"

[destination.nas]
url = "smb://nas.local/bounces"
username = "me"
mount_point = "/Volumes/bounces"

[conversion]
stability_checks_required = 5
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.source.mode, SourceMode::AllExternalDrives);
        assert_eq!(config.conversion.stability_checks_required, 5);
        let nas = config.destination.nas.unwrap();
        assert_eq!(nas.mount_timeout_secs, 30);
    }
}
