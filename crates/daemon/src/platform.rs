//! macOS wrappers for the platform-dependent capabilities.
//!
//! Volume enumeration shells out to `mount` and `df`, the mounter to
//! `osascript` (which resolves share credentials through the keychain).
//! These are thin adapters; everything decision-shaped lives in the core
//! crate behind the capability traits.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use bouncewatch_core::destination::{DestinationError, Mounter};
use bouncewatch_core::volumes::{VolumeDescriptor, VolumeEnumerator, VolumeError};
use bouncewatch_core::NasConfig;

const MOUNT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Enumerates mounted volumes by listing the volumes directory and joining
/// in filesystem type (from `mount`) and capacity (from `df -Pk`).
pub struct SystemVolumeEnumerator {
    volumes_dir: PathBuf,
}

impl SystemVolumeEnumerator {
    pub fn new() -> Self {
        Self {
            volumes_dir: PathBuf::from("/Volumes"),
        }
    }

    #[cfg(test)]
    fn with_volumes_dir(volumes_dir: PathBuf) -> Self {
        Self { volumes_dir }
    }

    async fn mount_table() -> Result<HashMap<PathBuf, MountEntry>, VolumeError> {
        let output = Command::new("mount")
            .output()
            .await
            .map_err(|e| VolumeError::EnumerationFailed {
                reason: format!("mount: {e}"),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .filter_map(parse_mount_line)
            .map(|entry| (entry.mount_point.clone(), entry))
            .collect())
    }

    async fn capacity_bytes(path: &Path) -> Option<u64> {
        let output = Command::new("df")
            .arg("-Pk")
            .arg(path)
            .output()
            .await
            .ok()?;
        parse_df_capacity(&String::from_utf8_lossy(&output.stdout))
    }
}

impl Default for SystemVolumeEnumerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VolumeEnumerator for SystemVolumeEnumerator {
    fn name(&self) -> &str {
        "system"
    }

    async fn enumerate(&self) -> Result<Vec<VolumeDescriptor>, VolumeError> {
        let mounts = Self::mount_table().await?;

        let mut entries = tokio::fs::read_dir(&self.volumes_dir).await.map_err(|e| {
            VolumeError::EnumerationFailed {
                reason: format!("{}: {e}", self.volumes_dir.display()),
            }
        })?;

        let mut volumes = Vec::new();
        while let Some(entry) = entries.next_entry().await.transpose() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable volume entry: {}", e);
                    continue;
                }
            };
            let mount_point = entry.path();

            // The boot volume appears under /Volumes as a symlink to /.
            let is_system = tokio::fs::canonicalize(&mount_point)
                .await
                .map(|real| real == Path::new("/"))
                .unwrap_or(false);

            let Some(mount) = mounts.get(&mount_point) else {
                debug!("No mount entry for {}, skipping", mount_point.display());
                continue;
            };

            let capacity_bytes = match Self::capacity_bytes(&mount_point).await {
                Some(capacity) => capacity,
                None => {
                    warn!("Could not read capacity of {}", mount_point.display());
                    continue;
                }
            };

            let volume_name = mount_point
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            volumes.push(VolumeDescriptor {
                mount_point,
                volume_name,
                filesystem: mount.filesystem.clone(),
                capacity_bytes,
                is_system,
                // Backup volumes mount with nobrowse so Finder hides them
                is_backup: mount.options.iter().any(|o| o == "nobrowse"),
            });
        }

        Ok(volumes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct MountEntry {
    mount_point: PathBuf,
    filesystem: String,
    options: Vec<String>,
}

/// Parses one line of `mount` output:
/// `/dev/disk4s1 on /Volumes/Gigs (apfs, local, nodev, nosuid)`
fn parse_mount_line(line: &str) -> Option<MountEntry> {
    let (_, rest) = line.split_once(" on ")?;
    let (mount_point, flags) = rest.rsplit_once(" (")?;
    let flags = flags.strip_suffix(')')?;

    let mut parts = flags.split(", ");
    let filesystem = parts.next()?.to_lowercase();
    let options = parts.map(|s| s.to_string()).collect();

    Some(MountEntry {
        mount_point: PathBuf::from(mount_point),
        filesystem,
        options,
    })
}

/// Extracts total capacity in bytes from `df -Pk` output (1024-byte blocks).
fn parse_df_capacity(output: &str) -> Option<u64> {
    let line = output.lines().nth(1)?;
    let blocks: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(blocks * 1024)
}

/// Mounts network shares via AppleScript's `mount volume`, which pulls
/// credentials from the keychain and prompts the user on first use.
pub struct AppleScriptMounter;

impl AppleScriptMounter {
    pub fn new() -> Self {
        Self
    }

    async fn is_mounted(mount_point: &Path) -> bool {
        tokio::fs::read_dir(mount_point).await.is_ok()
    }
}

impl Default for AppleScriptMounter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Mounter for AppleScriptMounter {
    fn name(&self) -> &str {
        "applescript"
    }

    async fn ensure_mounted(&self, config: &NasConfig) -> Result<PathBuf, DestinationError> {
        if Self::is_mounted(&config.mount_point).await {
            return Ok(config.mount_point.clone());
        }

        debug!("Mounting {} as {}", config.url, config.username);
        let script = format!("mount volume \"{}\"", config.url.replace('"', "\\\""));
        let output = Command::new("osascript")
            .arg("-e")
            .arg(&script)
            .output()
            .await
            .map_err(|e| DestinationError::MountFailed {
                reason: format!("osascript: {e}"),
            })?;

        if !output.status.success() {
            return Err(DestinationError::MountFailed {
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        // The share can take a moment to appear after osascript returns.
        // The caller enforces the overall mount timeout.
        while !Self::is_mounted(&config.mount_point).await {
            tokio::time::sleep(MOUNT_POLL_INTERVAL).await;
        }

        Ok(config.mount_point.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mount_line() {
        let entry =
            parse_mount_line("/dev/disk4s1 on /Volumes/Gigs (apfs, local, nodev, nosuid)").unwrap();
        assert_eq!(entry.mount_point, PathBuf::from("/Volumes/Gigs"));
        assert_eq!(entry.filesystem, "apfs");
        assert_eq!(entry.options, vec!["local", "nodev", "nosuid"]);
    }

    #[test]
    fn test_parse_mount_line_with_spaces_in_path() {
        let entry =
            parse_mount_line("/dev/disk5s2 on /Volumes/Session Drive (hfs, local, journaled)")
                .unwrap();
        assert_eq!(entry.mount_point, PathBuf::from("/Volumes/Session Drive"));
        assert_eq!(entry.filesystem, "hfs");
    }

    #[test]
    fn test_parse_mount_line_rejects_garbage() {
        assert!(parse_mount_line("map auto_home on /System/Volumes/Data/home").is_none());
        assert!(parse_mount_line("").is_none());
    }

    #[test]
    fn test_parse_df_capacity() {
        let output = "\
Filesystem    1024-blocks      Used Available Capacity  Mounted on
/dev/disk4s1    488245288  12345678 475899610     3%    /Volumes/Gigs
";
        assert_eq!(parse_df_capacity(output), Some(488245288 * 1024));
    }

    #[test]
    fn test_parse_df_capacity_rejects_short_output() {
        assert_eq!(parse_df_capacity("Filesystem 1024-blocks\n"), None);
        assert_eq!(parse_df_capacity(""), None);
    }

    #[tokio::test]
    async fn test_enumerate_missing_volumes_dir_fails() {
        let enumerator =
            SystemVolumeEnumerator::with_volumes_dir(PathBuf::from("/nonexistent/volumes"));
        assert!(enumerator.enumerate().await.is_err());
    }
}
