//! Destination resolution and per-session output directories.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::{DestinationConfig, DestinationMode};

use super::error::DestinationError;
use super::traits::Mounter;

/// A resolved, verified destination base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub base_dir: PathBuf,
}

/// Maps the configured destination mode to a concrete writable directory.
///
/// The resolved base is cached for the process lifetime but cheaply
/// re-verified on every call, since a network mount can drop at any time.
/// Local modes fail fast on a missing or unwritable base; the NAS mode
/// delegates to the [`Mounter`] capability under a hard timeout.
pub struct DestinationResolver {
    config: DestinationConfig,
    mounter: Arc<dyn Mounter>,
    cached: Mutex<Option<PathBuf>>,
}

impl DestinationResolver {
    pub fn new(config: DestinationConfig, mounter: Arc<dyn Mounter>) -> Self {
        Self {
            config,
            mounter,
            cached: Mutex::new(None),
        }
    }

    pub fn mode(&self) -> DestinationMode {
        self.config.mode
    }

    /// Resolves and verifies the destination base directory.
    pub async fn resolve(&self) -> Result<Destination, DestinationError> {
        let mut cached = self.cached.lock().await;

        if let Some(base) = cached.as_ref() {
            if verify_writable_dir(base).await.is_ok() {
                return Ok(Destination {
                    base_dir: base.clone(),
                });
            }
            debug!(
                "Cached destination {} no longer writable, re-resolving",
                base.display()
            );
            *cached = None;
        }

        let base = match self.config.mode {
            DestinationMode::Icloud => self
                .config
                .icloud_path
                .clone()
                .ok_or(DestinationError::MissingConfig { mode: "icloud" })?,
            DestinationMode::Custom => self
                .config
                .custom_path
                .clone()
                .ok_or(DestinationError::MissingConfig { mode: "custom" })?,
            DestinationMode::Nas => {
                let nas = self
                    .config
                    .nas
                    .as_ref()
                    .ok_or(DestinationError::MissingConfig { mode: "nas" })?;
                let timeout = Duration::from_secs(nas.mount_timeout_secs);
                tokio::time::timeout(timeout, self.mounter.ensure_mounted(nas))
                    .await
                    .map_err(|_| DestinationError::MountTimeout {
                        timeout_secs: nas.mount_timeout_secs,
                    })??
            }
        };

        verify_writable_dir(&base).await?;
        info!("Destination resolved: {}", base.display());
        *cached = Some(base.clone());

        Ok(Destination { base_dir: base })
    }

    /// Resolves the destination and ensures the per-session subdirectory
    /// exists. Creation is idempotent, so concurrent first-writers for the
    /// same session are safe.
    pub async fn session_dir(&self, session: &str) -> Result<PathBuf, DestinationError> {
        let destination = self.resolve().await?;
        let dir = destination.base_dir.join(session);

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| DestinationError::SessionDirFailed {
                path: dir.clone(),
                source,
            })?;

        Ok(dir)
    }
}

/// Cheap existence/writability check run before every job.
async fn verify_writable_dir(path: &Path) -> Result<(), DestinationError> {
    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|_| DestinationError::BaseMissing {
            path: path.to_path_buf(),
        })?;

    if !meta.is_dir() || meta.permissions().readonly() {
        return Err(DestinationError::BaseNotWritable {
            path: path.to_path_buf(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NasConfig;
    use crate::testing::MockMounter;

    fn custom_config(path: &Path) -> DestinationConfig {
        DestinationConfig {
            mode: DestinationMode::Custom,
            icloud_path: None,
            custom_path: Some(path.to_path_buf()),
            nas: None,
        }
    }

    fn nas_config(mount_point: &Path, timeout_secs: u64) -> DestinationConfig {
        DestinationConfig {
            mode: DestinationMode::Nas,
            icloud_path: None,
            custom_path: None,
            nas: Some(NasConfig {
                url: "smb://nas.local/bounces".to_string(),
                username: "me".to_string(),
                mount_point: mount_point.to_path_buf(),
                mount_timeout_secs: timeout_secs,
            }),
        }
    }

    #[tokio::test]
    async fn test_custom_mode_resolves_existing_dir() {
        let temp = tempfile::tempdir().unwrap();
        let resolver =
            DestinationResolver::new(custom_config(temp.path()), Arc::new(MockMounter::new()));

        let destination = resolver.resolve().await.unwrap();
        assert_eq!(destination.base_dir, temp.path());
    }

    #[tokio::test]
    async fn test_custom_mode_fails_fast_on_missing_dir() {
        let resolver = DestinationResolver::new(
            custom_config(Path::new("/nonexistent/bouncewatch-out")),
            Arc::new(MockMounter::new()),
        );

        let result = resolver.resolve().await;
        assert!(matches!(result, Err(DestinationError::BaseMissing { .. })));
    }

    #[tokio::test]
    async fn test_nas_mode_delegates_to_mounter() {
        let temp = tempfile::tempdir().unwrap();
        let mounter = Arc::new(MockMounter::new());
        mounter.set_mount_path(temp.path().to_path_buf()).await;

        let resolver = DestinationResolver::new(nas_config(temp.path(), 30), mounter.clone());
        let destination = resolver.resolve().await.unwrap();
        assert_eq!(destination.base_dir, temp.path());
        assert_eq!(mounter.mount_count().await, 1);
    }

    #[tokio::test]
    async fn test_nas_mount_failure_surfaces() {
        let temp = tempfile::tempdir().unwrap();
        let mounter = Arc::new(MockMounter::new());
        mounter
            .set_next_error(DestinationError::MountFailed {
                reason: "authentication failed".to_string(),
            })
            .await;

        let resolver = DestinationResolver::new(nas_config(temp.path(), 30), mounter);
        let result = resolver.resolve().await;
        assert!(matches!(result, Err(DestinationError::MountFailed { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_nas_mount_timeout() {
        let temp = tempfile::tempdir().unwrap();
        let mounter = Arc::new(MockMounter::new());
        mounter.set_mount_path(temp.path().to_path_buf()).await;
        mounter.set_mount_delay(Duration::from_secs(120)).await;

        let resolver = DestinationResolver::new(nas_config(temp.path(), 1), mounter);
        let result = resolver.resolve().await;
        assert!(matches!(
            result,
            Err(DestinationError::MountTimeout { timeout_secs: 1 })
        ));
    }

    #[tokio::test]
    async fn test_resolution_cached_but_reverified() {
        let temp = tempfile::tempdir().unwrap();
        let mounter = Arc::new(MockMounter::new());
        mounter.set_mount_path(temp.path().to_path_buf()).await;

        let resolver = DestinationResolver::new(nas_config(temp.path(), 30), mounter.clone());
        resolver.resolve().await.unwrap();
        resolver.resolve().await.unwrap();

        // Second resolve reuses the cached mount, no second mount call
        assert_eq!(mounter.mount_count().await, 1);
    }

    #[tokio::test]
    async fn test_session_dir_created_idempotently() {
        let temp = tempfile::tempdir().unwrap();
        let resolver = Arc::new(DestinationResolver::new(
            custom_config(temp.path()),
            Arc::new(MockMounter::new()),
        ));

        let first = resolver.session_dir("SessionA").await.unwrap();
        let second = resolver.session_dir("SessionA").await.unwrap();
        assert_eq!(first, second);
        assert!(first.is_dir());
        assert_eq!(first, temp.path().join("SessionA"));
    }

    #[tokio::test]
    async fn test_concurrent_session_dir_creation() {
        let temp = tempfile::tempdir().unwrap();
        let resolver = Arc::new(DestinationResolver::new(
            custom_config(temp.path()),
            Arc::new(MockMounter::new()),
        ));

        let a = {
            let resolver = Arc::clone(&resolver);
            tokio::spawn(async move { resolver.session_dir("SessionA").await })
        };
        let b = {
            let resolver = Arc::clone(&resolver);
            tokio::spawn(async move { resolver.session_dir("SessionA").await })
        };

        let (a, b) = (a.await.unwrap().unwrap(), b.await.unwrap().unwrap());
        assert_eq!(a, b);
    }
}
