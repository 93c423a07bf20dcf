//! Eligibility filtering and set diffing for discovered volumes.
//!
//! Both are pure functions over descriptor sets so they can be tested
//! without real volumes.

use regex_lite::Regex;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

use crate::config::SourceConfig;

use super::types::VolumeDescriptor;

/// Whether a volume passes all discovery filters, applied in order:
/// minimum capacity, filesystem allow-list, backup flag, system flag,
/// exclusion patterns against mount path and volume name.
pub fn is_eligible(volume: &VolumeDescriptor, config: &SourceConfig) -> bool {
    if volume.capacity_bytes < config.min_volume_capacity_bytes {
        debug!(
            "Excluding {}: too small ({} bytes)",
            volume.mount_point.display(),
            volume.capacity_bytes
        );
        return false;
    }

    if !config
        .allowed_filesystems
        .iter()
        .any(|fs| fs == &volume.filesystem)
    {
        debug!(
            "Excluding {}: unsupported filesystem ({})",
            volume.mount_point.display(),
            volume.filesystem
        );
        return false;
    }

    if volume.is_backup {
        debug!(
            "Excluding {}: backup volume",
            volume.mount_point.display()
        );
        return false;
    }

    if volume.is_system {
        debug!(
            "Excluding {}: system volume",
            volume.mount_point.display()
        );
        return false;
    }

    let mount_str = volume.mount_point.to_string_lossy();
    for pattern in &config.exclude_patterns {
        // Invalid patterns are treated as non-matching rather than fatal.
        let Ok(re) = Regex::new(&format!("(?i){pattern}")) else {
            continue;
        };
        if re.is_match(&mount_str) || re.is_match(&volume.volume_name) {
            debug!(
                "Excluding {}: matches exclusion pattern '{}'",
                volume.mount_point.display(),
                pattern
            );
            return false;
        }
    }

    true
}

/// Applies [`is_eligible`] to an enumeration result, keyed by mount path.
pub fn eligible_set(
    volumes: Vec<VolumeDescriptor>,
    config: &SourceConfig,
) -> BTreeMap<PathBuf, VolumeDescriptor> {
    volumes
        .into_iter()
        .filter(|v| is_eligible(v, config))
        .map(|v| (v.mount_point.clone(), v))
        .collect()
}

/// Computes (added, removed) between two enumeration cycles by mount-path
/// identity. A volume that vanished and reappeared between polls shows up
/// in neither set; one that changed identity shows up in both.
pub fn diff(
    previous: &BTreeMap<PathBuf, VolumeDescriptor>,
    current: &BTreeMap<PathBuf, VolumeDescriptor>,
) -> (Vec<VolumeDescriptor>, Vec<VolumeDescriptor>) {
    let added = current
        .iter()
        .filter(|(path, _)| !previous.contains_key(*path))
        .map(|(_, v)| v.clone())
        .collect();

    let removed = previous
        .iter()
        .filter(|(path, _)| !current.contains_key(*path))
        .map(|(_, v)| v.clone())
        .collect();

    (added, removed)
}
