//! Trait definitions for the volumes module.

use async_trait::async_trait;

use super::types::{VolumeDescriptor, VolumeError};

/// A source of currently mounted removable volumes.
///
/// Implementations wrap whatever the platform offers (diskutil on macOS,
/// the mount table elsewhere). The registry only consumes the descriptor
/// list; all filtering happens on this side of the trait.
#[async_trait]
pub trait VolumeEnumerator: Send + Sync {
    /// Returns the name of this enumerator implementation.
    fn name(&self) -> &str;

    /// Enumerates all currently mounted removable volumes.
    ///
    /// Volumes that cannot be inspected (e.g. unmounted mid-scan) are
    /// skipped, not reported as errors.
    async fn enumerate(&self) -> Result<Vec<VolumeDescriptor>, VolumeError>;
}
