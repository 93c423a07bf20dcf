//! Startup configuration validation.
//!
//! All errors raised here are fatal: the daemon refuses to start watching
//! with a configuration it cannot fully honor.

use super::{Config, ConfigError, DestinationMode, SourceMode};

/// Validate mode-dependent required fields.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    validate_source(config)?;
    validate_destination(config)?;
    validate_conversion(config)?;
    Ok(())
}

fn validate_source(config: &Config) -> Result<(), ConfigError> {
    let source = &config.source;

    if source.mode == SourceMode::SpecificFolders && source.folders.is_empty() {
        return Err(ConfigError::ValidationError(
            "'folders' must be specified when source mode is 'specific_folders'".to_string(),
        ));
    }

    if source.audio_files_folder.is_empty() {
        return Err(ConfigError::ValidationError(
            "'audio_files_folder' must not be empty".to_string(),
        ));
    }

    if source.mix_file_prefix.is_empty() {
        return Err(ConfigError::ValidationError(
            "'mix_file_prefix' must not be empty".to_string(),
        ));
    }

    if source.volume_poll_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "'volume_poll_interval_secs' must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_destination(config: &Config) -> Result<(), ConfigError> {
    let dest = &config.destination;

    match dest.mode {
        DestinationMode::Icloud if dest.icloud_path.is_none() => Err(ConfigError::ValidationError(
            "'icloud_path' must be specified when destination mode is 'icloud'".to_string(),
        )),
        DestinationMode::Custom if dest.custom_path.is_none() => Err(ConfigError::ValidationError(
            "'custom_path' must be specified when destination mode is 'custom'".to_string(),
        )),
        DestinationMode::Nas => {
            let Some(nas) = &dest.nas else {
                return Err(ConfigError::ValidationError(
                    "'[destination.nas]' must be specified when destination mode is 'nas'"
                        .to_string(),
                ));
            };
            if nas.url.is_empty() || nas.username.is_empty() {
                return Err(ConfigError::ValidationError(
                    "NAS url and username must not be empty".to_string(),
                ));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn validate_conversion(config: &Config) -> Result<(), ConfigError> {
    let conv = &config.conversion;

    if conv.sample_rate == 0 {
        return Err(ConfigError::ValidationError(
            "'sample_rate' must be a positive integer".to_string(),
        ));
    }

    if conv.stability_checks_required == 0 {
        return Err(ConfigError::ValidationError(
            "'stability_checks_required' must be at least 1".to_string(),
        ));
    }

    if conv.stability_check_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "'stability_check_interval_secs' must be greater than zero".to_string(),
        ));
    }

    Ok(())
}
