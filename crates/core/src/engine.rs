//! Engine assembly and lifecycle.
//!
//! Wires the watcher, stability tracker, volume registry and orchestrator
//! together over channels and owns their shutdown. Capabilities with
//! platform or external-tool dependencies (conversion, volume enumeration,
//! mounting, notifications) are injected so the whole pipeline runs under
//! test with mocks.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::{validate_config, Config, ConfigError, SourceMode};
use crate::converter::{Converter, ConverterError};
use crate::destination::{DestinationError, DestinationResolver, Mounter};
use crate::metrics;
use crate::notifier::Notifier;
use crate::orchestrator::{ConversionJob, ConversionOrchestrator, OrchestratorStatus};
use crate::volumes::{VolumeEnumerator, VolumeEvent, VolumeRegistry};
use crate::watcher::{RootOrigin, StabilityTracker, WatchRootManager};

/// Errors that abort engine startup.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The destination could not be resolved at startup.
    #[error("destination unavailable: {0}")]
    Destination(#[from] DestinationError),

    /// The conversion tool is missing or unusable.
    #[error("converter unavailable: {0}")]
    Converter(#[from] ConverterError),
}

/// Injected implementations of everything with a platform or external-tool
/// dependency.
pub struct EngineCapabilities {
    pub converter: Arc<dyn Converter>,
    pub enumerator: Arc<dyn VolumeEnumerator>,
    pub mounter: Arc<dyn Mounter>,
    pub notifier: Arc<dyn Notifier>,
}

/// Snapshot of engine state for status reporting.
#[derive(Debug, Clone)]
pub struct EngineStatus {
    /// Active watch roots with their origins.
    pub active_roots: Vec<(PathBuf, RootOrigin)>,
    /// Candidate files currently being sampled for stability.
    pub observing: usize,
    /// Conversion job counters.
    pub jobs: OrchestratorStatus,
    /// Last registration error per root path.
    pub last_root_errors: HashMap<PathBuf, String>,
}

/// A running engine. Dropping the handle does not stop the engine; call
/// [`EngineHandle::stop`] for an orderly shutdown.
pub struct EngineHandle {
    roots: Arc<WatchRootManager>,
    tracker: Arc<StabilityTracker>,
    orchestrator: Arc<ConversionOrchestrator>,
    shutdown_tx: broadcast::Sender<()>,
    tasks: Vec<JoinHandle<()>>,
}

/// Builds and starts the pipeline from a validated configuration.
pub struct Engine;

impl Engine {
    /// Starts the engine.
    ///
    /// Fails fast when the configuration is invalid, the destination cannot
    /// be resolved or the conversion tool is missing. Individual watch roots
    /// that cannot be registered are logged and skipped; the engine runs
    /// with whatever roots remain (drives may appear later in discovery
    /// mode).
    pub async fn start(
        config: Config,
        capabilities: EngineCapabilities,
    ) -> Result<EngineHandle, EngineError> {
        validate_config(&config)?;

        let resolver = Arc::new(DestinationResolver::new(
            config.destination.clone(),
            Arc::clone(&capabilities.mounter),
        ));
        let destination = resolver.resolve().await?;
        capabilities.converter.validate().await?;

        let (shutdown_tx, _) = broadcast::channel(1);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = mpsc::channel(config.orchestrator.ready_queue_size.max(1));

        let tracker = Arc::new(StabilityTracker::new(
            config.source.audio_files_folder.clone(),
            config.source.mix_file_prefix.clone(),
            std::time::Duration::from_secs(config.conversion.stability_check_interval_secs),
            config.conversion.stability_checks_required,
            ready_tx,
        ));
        let roots = Arc::new(WatchRootManager::new(
            event_tx,
            Arc::clone(&tracker),
            config.source.audio_files_folder.clone(),
        ));
        let orchestrator = Arc::new(ConversionOrchestrator::new(
            config.orchestrator.clone(),
            config.conversion.sample_rate,
            Arc::clone(&capabilities.converter),
            Arc::clone(&resolver),
            Arc::clone(&capabilities.notifier),
        ));

        let mut tasks = Vec::new();

        match config.source.mode {
            SourceMode::SpecificFolders => {
                for folder in &config.source.folders {
                    if let Err(e) = roots.add_root(folder.clone(), RootOrigin::Static).await {
                        warn!("Skipping configured folder: {}", e);
                    }
                }
            }
            SourceMode::AllExternalDrives => {
                let registry = VolumeRegistry::new(
                    config.source.clone(),
                    Arc::clone(&capabilities.enumerator),
                );
                let initial = registry.enumerate_eligible().await;
                for (mount_point, volume) in &initial {
                    match roots
                        .add_root(mount_point.clone(), RootOrigin::DiscoveredVolume)
                        .await
                    {
                        Ok(true) => {
                            info!("Watching drive '{}' at startup", volume.volume_name);
                        }
                        Ok(false) => {}
                        Err(e) => warn!("Skipping drive '{}': {}", volume.volume_name, e),
                    }
                }

                let (volume_tx, volume_rx) = mpsc::channel(16);
                tasks.push(registry.spawn(initial, volume_tx, shutdown_tx.subscribe()));
                tasks.push(Self::spawn_volume_pump(
                    volume_rx,
                    Arc::clone(&roots),
                    Arc::clone(&capabilities.notifier),
                    shutdown_tx.subscribe(),
                ));
            }
        }
        metrics::ACTIVE_ROOTS.set(roots.active_count().await as i64);

        tasks.push(Self::spawn_event_pump(
            event_rx,
            Arc::clone(&tracker),
            shutdown_tx.subscribe(),
        ));
        tasks.push(Self::spawn_ready_pump(
            ready_rx,
            Arc::clone(&orchestrator),
            shutdown_tx.subscribe(),
        ));

        let root_count = roots.active_count().await;
        info!(
            "Engine started ({} roots, destination '{}' -> {})",
            root_count,
            config.destination.mode.as_str(),
            destination.base_dir.display()
        );
        capabilities
            .notifier
            .notify(
                "BounceWatch Started",
                &format!("Watching {} folder(s)", root_count),
            )
            .await;

        Ok(EngineHandle {
            roots,
            tracker,
            orchestrator,
            shutdown_tx,
            tasks,
        })
    }

    /// Forwards raw filesystem events into the stability tracker.
    fn spawn_event_pump(
        mut event_rx: mpsc::UnboundedReceiver<PathBuf>,
        tracker: Arc<StabilityTracker>,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    event = event_rx.recv() => {
                        let Some(path) = event else { break };
                        if tracker.observe(path).await {
                            metrics::FILES_DETECTED.inc();
                        }
                    }
                }
            }
        })
    }

    /// Turns stabilized files into conversion jobs.
    fn spawn_ready_pump(
        mut ready_rx: mpsc::Receiver<crate::watcher::ReadyFile>,
        orchestrator: Arc<ConversionOrchestrator>,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    ready = ready_rx.recv() => {
                        let Some(ready) = ready else { break };
                        orchestrator
                            .submit(ConversionJob {
                                source: ready.path,
                                session: ready.session,
                                discovered_at: Utc::now(),
                            })
                            .await;
                    }
                }
            }
        })
    }

    /// Applies volume add/remove events to the watch root set.
    fn spawn_volume_pump(
        mut volume_rx: mpsc::Receiver<VolumeEvent>,
        roots: Arc<WatchRootManager>,
        notifier: Arc<dyn Notifier>,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    event = volume_rx.recv() => {
                        let Some(event) = event else { break };
                        match event {
                            VolumeEvent::Added(volume) => {
                                match roots
                                    .add_root(volume.mount_point.clone(), RootOrigin::DiscoveredVolume)
                                    .await
                                {
                                    Ok(true) => {
                                        metrics::VOLUMES_ADDED.inc();
                                        notifier
                                            .notify(
                                                "Watching New Drive",
                                                &format!("'{}' connected", volume.volume_name),
                                            )
                                            .await;
                                    }
                                    Ok(false) => {}
                                    Err(e) => {
                                        // Recorded for status; retried next poll
                                        warn!("Could not watch new drive: {}", e);
                                    }
                                }
                            }
                            VolumeEvent::Removed(volume) => {
                                if roots.remove_root(&volume.mount_point).await {
                                    metrics::VOLUMES_REMOVED.inc();
                                    notifier
                                        .notify(
                                            "Stopped Watching Drive",
                                            &format!("'{}' disconnected", volume.volume_name),
                                        )
                                        .await;
                                }
                            }
                        }
                        metrics::ACTIVE_ROOTS.set(roots.active_count().await as i64);
                    }
                }
            }
        })
    }
}

impl EngineHandle {
    /// Snapshot of current engine state.
    pub async fn status(&self) -> EngineStatus {
        EngineStatus {
            active_roots: self.roots.active_roots().await,
            observing: self.tracker.observing_count().await,
            jobs: self.orchestrator.status().await,
            last_root_errors: self.roots.last_errors().await,
        }
    }

    /// Orderly shutdown: stop intake first, then let any running conversion
    /// finish before returning.
    pub async fn stop(self) {
        info!("Stopping engine");
        let _ = self.shutdown_tx.send(());

        for task in self.tasks {
            let _ = task.await;
        }

        self.roots.remove_all().await;
        self.tracker.abandon_all().await;
        self.orchestrator.wait_idle().await;
        metrics::ACTIVE_ROOTS.set(0);

        info!("Engine stopped");
    }
}
