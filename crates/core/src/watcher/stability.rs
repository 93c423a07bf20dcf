//! Write-stability detection for candidate files.
//!
//! Pro Tools writes bounces incrementally, and a create event says nothing
//! about whether the file is complete. Each candidate gets its own sampling
//! task that re-reads the file size until it has been identical for the
//! required number of consecutive samples. Requiring a run of identical
//! samples (rather than a single no-change check) guards against momentary
//! write pauses at buffered-I/O flush boundaries.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::filter::{is_candidate, session_name};
use super::types::ReadyFile;
use crate::metrics;

/// Pure consecutive-identical-sample counter.
///
/// `record` returns true once `required` consecutive samples carried the
/// same size; any size change restarts the run at the new size.
#[derive(Debug)]
pub struct StabilityProbe {
    required: u32,
    last_size: Option<u64>,
    stable_count: u32,
}

impl StabilityProbe {
    pub fn new(required: u32) -> Self {
        Self {
            required,
            last_size: None,
            stable_count: 0,
        }
    }

    pub fn record(&mut self, size: u64) -> bool {
        if self.last_size == Some(size) {
            self.stable_count += 1;
        } else {
            self.last_size = Some(size);
            self.stable_count = 1;
        }
        self.stable_count >= self.required
    }
}

/// Tracks in-flight candidate files until they are ready or abandoned.
///
/// The tracker is the sole owner of candidate state. Per-path ordering is
/// strict: a path is observed before it can become ready or abandoned, and
/// after either outcome its candidate is gone.
pub struct StabilityTracker {
    audio_folder: String,
    mix_prefix: String,
    interval: Duration,
    checks_required: u32,
    ready_tx: mpsc::Sender<ReadyFile>,
    candidates: Arc<Mutex<HashMap<PathBuf, JoinHandle<()>>>>,
}

impl StabilityTracker {
    pub fn new(
        audio_folder: impl Into<String>,
        mix_prefix: impl Into<String>,
        interval: Duration,
        checks_required: u32,
        ready_tx: mpsc::Sender<ReadyFile>,
    ) -> Self {
        Self {
            audio_folder: audio_folder.into(),
            mix_prefix: mix_prefix.into(),
            interval,
            checks_required,
            ready_tx,
            candidates: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of candidates currently being observed.
    pub async fn observing_count(&self) -> usize {
        self.candidates.lock().await.len()
    }

    /// Starts observing a path if it passes the candidate filters.
    ///
    /// Returns true when a new observation was started. Paths already under
    /// observation, and paths failing the name/location filters, are
    /// ignored.
    pub async fn observe(&self, path: PathBuf) -> bool {
        if !is_candidate(&path, &self.audio_folder, &self.mix_prefix) {
            return false;
        }

        let Some(session) = session_name(&path, &self.audio_folder) else {
            // is_candidate guarantees an audio-folder ancestor, but the
            // folder can sit at the filesystem root with no session above it.
            warn!(
                "Could not determine session name for {}, skipping",
                path.display()
            );
            return false;
        };

        let mut candidates = self.candidates.lock().await;
        if candidates.contains_key(&path) {
            debug!("Already observing: {}", path.display());
            return false;
        }

        info!("New mix file detected: {}", path.display());

        let handle = Self::spawn_sampler(
            path.clone(),
            session,
            self.interval,
            self.checks_required,
            self.ready_tx.clone(),
            Arc::clone(&self.candidates),
        );
        candidates.insert(path, handle);
        true
    }

    /// Abandons every candidate rooted under `root`.
    ///
    /// Called when a watch root is torn down; files already dispatched as
    /// ready are unaffected. Returns the number of abandoned candidates.
    pub async fn abandon_under(&self, root: &Path) -> usize {
        let mut candidates = self.candidates.lock().await;
        let doomed: Vec<PathBuf> = candidates
            .keys()
            .filter(|p| p.starts_with(root))
            .cloned()
            .collect();

        for path in &doomed {
            if let Some(handle) = candidates.remove(path) {
                handle.abort();
                metrics::CANDIDATES_ABANDONED.inc();
                debug!("Abandoned candidate: {}", path.display());
            }
        }

        doomed.len()
    }

    /// Abandons all candidates. Used on engine shutdown.
    pub async fn abandon_all(&self) {
        let mut candidates = self.candidates.lock().await;
        for (_, handle) in candidates.drain() {
            handle.abort();
        }
    }

    fn spawn_sampler(
        path: PathBuf,
        session: String,
        interval: Duration,
        checks_required: u32,
        ready_tx: mpsc::Sender<ReadyFile>,
        candidates: Arc<Mutex<HashMap<PathBuf, JoinHandle<()>>>>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut probe = StabilityProbe::new(checks_required);

            loop {
                tokio::time::sleep(interval).await;

                let size = match tokio::fs::metadata(&path).await {
                    Ok(meta) => meta.len(),
                    Err(e) => {
                        // Expected for renamed/moved temp files; no error
                        // surfaces beyond this log line.
                        debug!("Candidate disappeared, abandoning {}: {}", path.display(), e);
                        metrics::CANDIDATES_ABANDONED.inc();
                        break;
                    }
                };

                if probe.record(size) {
                    info!("File stable: {} ({} bytes)", path.display(), size);
                    let _ = ready_tx
                        .send(ReadyFile {
                            path: path.clone(),
                            session,
                        })
                        .await;
                    break;
                }
                debug!("File still settling: {} ({} bytes)", path.display(), size);
            }

            candidates.lock().await.remove(&path);
        })
    }
}
