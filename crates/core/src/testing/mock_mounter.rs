//! Mock mounter for testing.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::config::NasConfig;
use crate::destination::{DestinationError, Mounter};

/// Mock implementation of the Mounter trait.
///
/// Returns a configurable mount path (defaulting to the configured mount
/// point), counts calls, and supports error injection and a mount delay for
/// timeout tests.
#[derive(Debug, Default)]
pub struct MockMounter {
    mount_path: Arc<RwLock<Option<PathBuf>>>,
    next_error: Arc<RwLock<Option<DestinationError>>>,
    delay: Arc<RwLock<Duration>>,
    mount_count: Arc<RwLock<usize>>,
}

impl MockMounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the path returned by successful mounts.
    pub async fn set_mount_path(&self, path: PathBuf) {
        *self.mount_path.write().await = Some(path);
    }

    /// Make the next mount fail with the given error.
    pub async fn set_next_error(&self, error: DestinationError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set a simulated mount duration.
    pub async fn set_mount_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Get the number of mount attempts made.
    pub async fn mount_count(&self) -> usize {
        *self.mount_count.read().await
    }
}

#[async_trait]
impl Mounter for MockMounter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn ensure_mounted(&self, config: &NasConfig) -> Result<PathBuf, DestinationError> {
        *self.mount_count.write().await += 1;

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        Ok(self
            .mount_path
            .read()
            .await
            .clone()
            .unwrap_or_else(|| config.mount_point.clone()))
    }
}
