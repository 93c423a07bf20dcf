//! Mock volume enumerator for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::volumes::{VolumeDescriptor, VolumeEnumerator, VolumeError};

/// Mock implementation of the VolumeEnumerator trait. Returns whatever
/// set of volumes the test last installed.
#[derive(Debug, Default)]
pub struct MockVolumeEnumerator {
    volumes: Arc<RwLock<Vec<VolumeDescriptor>>>,
    next_error: Arc<RwLock<Option<VolumeError>>>,
}

impl MockVolumeEnumerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the set of visible volumes.
    pub async fn set_volumes(&self, volumes: Vec<VolumeDescriptor>) {
        *self.volumes.write().await = volumes;
    }

    /// Make the next enumeration fail with the given error.
    pub async fn set_next_error(&self, error: VolumeError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl VolumeEnumerator for MockVolumeEnumerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn enumerate(&self) -> Result<Vec<VolumeDescriptor>, VolumeError> {
        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        Ok(self.volumes.read().await.clone())
    }
}
