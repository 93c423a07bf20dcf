//! Trait definitions for the destination module.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::config::NasConfig;

use super::error::DestinationError;

/// Mount/credential capability for network destinations.
///
/// Implementations ensure the share described by `config` is mounted
/// (looking up credentials however the platform stores them) and return the
/// local mount path. Mounting an already-mounted share is a no-op.
#[async_trait]
pub trait Mounter: Send + Sync {
    /// Returns the name of this mounter implementation.
    fn name(&self) -> &str;

    /// Ensures the share is mounted and returns the local writable path.
    async fn ensure_mounted(&self, config: &NasConfig) -> Result<PathBuf, DestinationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedMounter(PathBuf);

    #[async_trait]
    impl Mounter for FixedMounter {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn ensure_mounted(&self, _config: &NasConfig) -> Result<PathBuf, DestinationError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_fixed_mounter() {
        let mounter = FixedMounter(PathBuf::from("/Volumes/bounces"));
        let config = NasConfig {
            url: "smb://nas.local/bounces".to_string(),
            username: "me".to_string(),
            mount_point: PathBuf::from("/Volumes/bounces"),
            mount_timeout_secs: 30,
        };
        let path = mounter.ensure_mounted(&config).await.unwrap();
        assert_eq!(path, PathBuf::from("/Volumes/bounces"));
    }
}
