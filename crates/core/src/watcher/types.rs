//! Types shared across the watcher module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// How a watch root came to be registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootOrigin {
    /// Listed in the configuration file.
    Static,
    /// Added by the volume registry when an eligible drive appeared.
    DiscoveredVolume,
}

/// A file that passed all filters and has stopped growing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyFile {
    /// Absolute path to the stabilized mix file.
    pub path: PathBuf,
    /// Session name derived from the path.
    pub session: String,
}

/// Errors from watch root management.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The root path is not readable, so no subscription was opened.
    #[error("watch root not readable: {path}: {reason}")]
    RootNotReadable { path: PathBuf, reason: String },

    /// The filesystem-event subscription could not be opened.
    #[error("failed to watch {path}: {source}")]
    SubscriptionFailed {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}
