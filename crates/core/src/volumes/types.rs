//! Types for the volumes module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// A mounted volume as seen during one enumeration cycle.
///
/// Descriptors are ephemeral: they are rebuilt from scratch every poll and
/// never persisted. Identity is the mount path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeDescriptor {
    /// Mount path, e.g. "/Volumes/SessionDrive".
    pub mount_point: PathBuf,
    /// Human-readable volume name.
    pub volume_name: String,
    /// Filesystem type, lowercase (e.g. "apfs", "hfs").
    pub filesystem: String,
    /// Total capacity in bytes.
    pub capacity_bytes: u64,
    /// Whether this is the boot/system volume.
    pub is_system: bool,
    /// Whether this volume is a backup target (Time Machine etc.).
    pub is_backup: bool,
}

/// A change observed between two enumeration cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeEvent {
    Added(VolumeDescriptor),
    Removed(VolumeDescriptor),
}

/// Errors from volume enumeration.
#[derive(Debug, Error)]
pub enum VolumeError {
    /// The volumes directory (or mount table) could not be read.
    #[error("failed to enumerate volumes: {reason}")]
    EnumerationFailed { reason: String },

    /// A single volume could not be inspected; the cycle continues without it.
    #[error("failed to inspect volume {mount_point}: {reason}")]
    InspectionFailed {
        mount_point: PathBuf,
        reason: String,
    },

    /// I/O error while scanning.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
