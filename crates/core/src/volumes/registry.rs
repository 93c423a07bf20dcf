//! Polling registry that turns volume enumeration cycles into add/remove events.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::SourceConfig;

use super::filter::{diff, eligible_set};
use super::traits::VolumeEnumerator;
use super::types::{VolumeDescriptor, VolumeEvent};

/// Periodically enumerates volumes and emits one [`VolumeEvent`] per change.
///
/// The registry owns no watch state; it only reports eligible-set membership
/// transitions. A volume that disappears and reappears between polls is
/// reported as removed-then-added on the poll where both are visible.
pub struct VolumeRegistry {
    config: SourceConfig,
    enumerator: Arc<dyn VolumeEnumerator>,
}

impl VolumeRegistry {
    pub fn new(config: SourceConfig, enumerator: Arc<dyn VolumeEnumerator>) -> Self {
        Self { config, enumerator }
    }

    /// Runs one enumeration cycle and returns the current eligible set.
    pub async fn enumerate_eligible(&self) -> BTreeMap<PathBuf, VolumeDescriptor> {
        match self.enumerator.enumerate().await {
            Ok(volumes) => eligible_set(volumes, &self.config),
            Err(e) => {
                warn!("Volume enumeration failed: {}", e);
                BTreeMap::new()
            }
        }
    }

    /// Spawns the polling loop.
    ///
    /// `initial` seeds the previous-cycle set so volumes that were already
    /// registered as watch roots at startup are not re-announced.
    pub fn spawn(
        self,
        initial: BTreeMap<PathBuf, VolumeDescriptor>,
        event_tx: mpsc::Sender<VolumeEvent>,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        let interval = Duration::from_secs(self.config.volume_poll_interval_secs);

        tokio::spawn(async move {
            info!(
                "Volume registry started (enumerator: {}, poll interval: {:?})",
                self.enumerator.name(),
                interval
            );
            let mut previous = initial;

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Volume registry received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {
                        let current = self.enumerate_eligible().await;
                        let (added, removed) = diff(&previous, &current);

                        for volume in removed {
                            debug!("Volume removed: {}", volume.mount_point.display());
                            if event_tx.send(VolumeEvent::Removed(volume)).await.is_err() {
                                return;
                            }
                        }
                        for volume in added {
                            debug!("Volume added: {}", volume.mount_point.display());
                            if event_tx.send(VolumeEvent::Added(volume)).await.is_err() {
                                return;
                            }
                        }

                        previous = current;
                    }
                }
            }
            info!("Volume registry stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockVolumeEnumerator;
    use std::time::Duration;

    fn test_config(poll_secs: u64) -> SourceConfig {
        let mut config: SourceConfig = toml::from_str(
            r#"
            mode = "all_external_drives"
        "#,
        )
        .unwrap();
        config.volume_poll_interval_secs = poll_secs;
        config
    }

    fn volume(mount: &str) -> VolumeDescriptor {
        VolumeDescriptor {
            mount_point: PathBuf::from(mount),
            volume_name: mount.rsplit('/').next().unwrap_or("v").to_string(),
            filesystem: "apfs".to_string(),
            capacity_bytes: 100 * 1024 * 1024 * 1024,
            is_system: false,
            is_backup: false,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_added_volume_emits_event() {
        let enumerator = Arc::new(MockVolumeEnumerator::new());
        let registry = VolumeRegistry::new(test_config(1), enumerator.clone());

        let (tx, mut rx) = mpsc::channel(8);
        let (shutdown_tx, _) = broadcast::channel(1);
        let handle = registry.spawn(BTreeMap::new(), tx, shutdown_tx.subscribe());

        enumerator.set_volumes(vec![volume("/Volumes/New")]).await;
        tokio::time::advance(Duration::from_secs(2)).await;

        let event = rx.recv().await.unwrap();
        assert_eq!(event, VolumeEvent::Added(volume("/Volumes/New")));

        let _ = shutdown_tx.send(());
        let _ = handle.await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_removed_then_steady_state() {
        let enumerator = Arc::new(MockVolumeEnumerator::new());
        enumerator
            .set_volumes(vec![volume("/Volumes/A"), volume("/Volumes/B")])
            .await;

        let registry = VolumeRegistry::new(test_config(1), enumerator.clone());
        let initial = registry.enumerate_eligible().await;
        assert_eq!(initial.len(), 2);

        let (tx, mut rx) = mpsc::channel(8);
        let (shutdown_tx, _) = broadcast::channel(1);
        let handle = registry.spawn(initial, tx, shutdown_tx.subscribe());

        enumerator.set_volumes(vec![volume("/Volumes/B")]).await;
        tokio::time::advance(Duration::from_secs(2)).await;

        let event = rx.recv().await.unwrap();
        assert_eq!(event, VolumeEvent::Removed(volume("/Volumes/A")));

        // Steady state produces no further events
        tokio::time::advance(Duration::from_secs(3)).await;
        assert!(rx.try_recv().is_err());

        let _ = shutdown_tx.send(());
        let _ = handle.await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_ineligible_volume_never_reported() {
        let enumerator = Arc::new(MockVolumeEnumerator::new());
        let registry = VolumeRegistry::new(test_config(1), enumerator.clone());

        let (tx, mut rx) = mpsc::channel(8);
        let (shutdown_tx, _) = broadcast::channel(1);
        let handle = registry.spawn(BTreeMap::new(), tx, shutdown_tx.subscribe());

        let mut tiny = volume("/Volumes/Tiny");
        tiny.capacity_bytes = 1024;
        enumerator.set_volumes(vec![tiny]).await;

        tokio::time::advance(Duration::from_secs(3)).await;
        assert!(rx.try_recv().is_err());

        let _ = shutdown_tx.send(());
        let _ = handle.await;
    }
}
