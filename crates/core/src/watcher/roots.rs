//! Live set of watched directory roots.
//!
//! Each active root owns one recursive filesystem-event subscription whose
//! raw create/modify paths are forwarded into a single event channel. Root
//! lifecycle is `unregistered -> active -> torn-down`; there is no paused
//! state, so a drive that disconnects and reconnects gets a fresh root and
//! loses any stability progress its files had made.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{mpsc, Mutex};
use tracing::{info, warn};

use super::filter::count_audio_folders;
use super::stability::StabilityTracker;
use super::types::{RootOrigin, WatchError};

struct WatchRoot {
    origin: RootOrigin,
    // Dropping the watcher tears down the subscription.
    _watcher: RecommendedWatcher,
}

/// Owns the set of active watch roots and their subscriptions.
///
/// All mutation goes through this manager; the rest of the engine only ever
/// sees the event channel and the status snapshots.
pub struct WatchRootManager {
    event_tx: mpsc::UnboundedSender<PathBuf>,
    tracker: Arc<StabilityTracker>,
    audio_folder: String,
    roots: Mutex<HashMap<PathBuf, WatchRoot>>,
    last_errors: Mutex<HashMap<PathBuf, String>>,
}

impl WatchRootManager {
    pub fn new(
        event_tx: mpsc::UnboundedSender<PathBuf>,
        tracker: Arc<StabilityTracker>,
        audio_folder: impl Into<String>,
    ) -> Self {
        Self {
            event_tx,
            tracker,
            audio_folder: audio_folder.into(),
            roots: Mutex::new(HashMap::new()),
            last_errors: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a root and opens its recursive subscription.
    ///
    /// Returns `Ok(false)` if the root was already active (no-op). On
    /// failure the root is not registered and the error is recorded for
    /// status reporting; the caller may retry on a later volume poll.
    pub async fn add_root(&self, path: PathBuf, origin: RootOrigin) -> Result<bool, WatchError> {
        let mut roots = self.roots.lock().await;
        if roots.contains_key(&path) {
            return Ok(false);
        }

        if let Err(e) = std::fs::read_dir(&path) {
            let err = WatchError::RootNotReadable {
                path: path.clone(),
                reason: e.to_string(),
            };
            self.record_error(&path, &err).await;
            return Err(err);
        }

        let watcher = match self.open_subscription(&path) {
            Ok(w) => w,
            Err(err) => {
                self.record_error(&path, &err).await;
                return Err(err);
            }
        };

        let audio_folders = count_audio_folders(&path, &self.audio_folder);
        info!(
            "Now watching: {} (origin: {:?}, {} existing '{}' folders)",
            path.display(),
            origin,
            audio_folders,
            self.audio_folder
        );

        self.last_errors.lock().await.remove(&path);
        roots.insert(
            path,
            WatchRoot {
                origin,
                _watcher: watcher,
            },
        );
        Ok(true)
    }

    /// Tears down a root, discarding all candidate state under it.
    ///
    /// Files already dispatched as ready are unaffected. Removing an
    /// unknown root is a no-op.
    pub async fn remove_root(&self, path: &Path) -> bool {
        let removed = self.roots.lock().await.remove(path);
        match removed {
            Some(_) => {
                let abandoned = self.tracker.abandon_under(path).await;
                info!(
                    "Stopped watching: {} ({} candidates abandoned)",
                    path.display(),
                    abandoned
                );
                true
            }
            None => false,
        }
    }

    /// Currently active roots with their origins.
    pub async fn active_roots(&self) -> Vec<(PathBuf, RootOrigin)> {
        self.roots
            .lock()
            .await
            .iter()
            .map(|(path, root)| (path.clone(), root.origin))
            .collect()
    }

    pub async fn active_count(&self) -> usize {
        self.roots.lock().await.len()
    }

    /// Last registration error per root path, for status reporting.
    pub async fn last_errors(&self) -> HashMap<PathBuf, String> {
        self.last_errors.lock().await.clone()
    }

    /// Tears down every root. Used on engine shutdown.
    pub async fn remove_all(&self) {
        let paths: Vec<PathBuf> = self.roots.lock().await.keys().cloned().collect();
        for path in paths {
            self.remove_root(&path).await;
        }
    }

    fn open_subscription(&self, path: &Path) -> Result<RecommendedWatcher, WatchError> {
        let tx = self.event_tx.clone();
        let root = path.to_path_buf();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| match result {
                Ok(event) => {
                    if matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                        for event_path in event.paths {
                            // Receiver dropped means the engine is stopping.
                            let _ = tx.send(event_path);
                        }
                    }
                }
                Err(e) => {
                    warn!("Watch error under {}: {}", root.display(), e);
                }
            },
            notify::Config::default(),
        )
        .map_err(|source| WatchError::SubscriptionFailed {
            path: path.to_path_buf(),
            source,
        })?;

        watcher
            .watch(path, RecursiveMode::Recursive)
            .map_err(|source| WatchError::SubscriptionFailed {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(watcher)
    }

    async fn record_error(&self, path: &Path, err: &WatchError) {
        warn!("Failed to add watch root: {}", err);
        self.last_errors
            .lock()
            .await
            .insert(path.to_path_buf(), err.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn manager() -> (WatchRootManager, mpsc::UnboundedReceiver<PathBuf>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (ready_tx, _ready_rx) = mpsc::channel(16);
        let tracker = Arc::new(StabilityTracker::new(
            "Audio Files",
            "mix",
            Duration::from_secs(60),
            3,
            ready_tx,
        ));
        (
            WatchRootManager::new(event_tx, tracker, "Audio Files"),
            event_rx,
        )
    }

    #[tokio::test]
    async fn test_add_root_is_idempotent() {
        let temp = tempfile::tempdir().unwrap();
        let (manager, _rx) = manager();

        assert!(manager
            .add_root(temp.path().to_path_buf(), RootOrigin::Static)
            .await
            .unwrap());
        assert!(!manager
            .add_root(temp.path().to_path_buf(), RootOrigin::Static)
            .await
            .unwrap());
        assert_eq!(manager.active_count().await, 1);
    }

    #[tokio::test]
    async fn test_add_unreadable_root_fails_and_records_error() {
        let (manager, _rx) = manager();
        let missing = PathBuf::from("/nonexistent/bouncewatch-root");

        let result = manager
            .add_root(missing.clone(), RootOrigin::DiscoveredVolume)
            .await;
        assert!(matches!(result, Err(WatchError::RootNotReadable { .. })));
        assert_eq!(manager.active_count().await, 0);
        assert!(manager.last_errors().await.contains_key(&missing));
    }

    #[tokio::test]
    async fn test_remove_unknown_root_is_noop() {
        let (manager, _rx) = manager();
        assert!(!manager.remove_root(Path::new("/never/watched")).await);
    }

    #[tokio::test]
    async fn test_remove_root_tears_down() {
        let temp = tempfile::tempdir().unwrap();
        let (manager, _rx) = manager();

        manager
            .add_root(temp.path().to_path_buf(), RootOrigin::Static)
            .await
            .unwrap();
        assert!(manager.remove_root(temp.path()).await);
        assert_eq!(manager.active_count().await, 0);

        // A later reconnect registers a fresh root
        assert!(manager
            .add_root(temp.path().to_path_buf(), RootOrigin::DiscoveredVolume)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_events_flow_from_watched_root() {
        let temp = tempfile::tempdir().unwrap();
        let (manager, mut rx) = manager();

        manager
            .add_root(temp.path().to_path_buf(), RootOrigin::Static)
            .await
            .unwrap();

        let audio_dir = temp.path().join("SessionA").join("Audio Files");
        std::fs::create_dir_all(&audio_dir).unwrap();
        // Give the backend time to attach watches to the new directories
        // before writing, so the write event is not raced away.
        tokio::time::sleep(Duration::from_millis(500)).await;
        let file = audio_dir.join("mix_01.wav");
        std::fs::write(&file, b"bounce").unwrap();

        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            let remaining = deadline - tokio::time::Instant::now();
            let event = tokio::time::timeout(remaining, rx.recv())
                .await
                .expect("no filesystem event before deadline")
                .expect("event channel closed");
            if event == file {
                break;
            }
        }
    }
}
