//! Conversion orchestrator implementation.
//!
//! Consumes stabilized mix files and drives each through conversion and
//! placement. Jobs for distinct files run under a configurable concurrency
//! limit (one by default, the conversion tool is CPU-bound); a file already
//! in flight is never submitted twice.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Semaphore};
use tracing::{debug, info, warn};

use crate::converter::{ConversionOutcome, Converter};
use crate::destination::DestinationResolver;
use crate::metrics;
use crate::notifier::Notifier;
use crate::util::{format_duration, format_file_size};

use super::config::OrchestratorConfig;
use super::types::{ConversionJob, OrchestratorError, OrchestratorStatus};

/// The conversion orchestrator. Owns the in-flight set and the worker
/// concurrency limit; each submitted job runs as its own task.
pub struct ConversionOrchestrator {
    sample_rate: u32,
    converter: Arc<dyn Converter>,
    resolver: Arc<DestinationResolver>,
    notifier: Arc<dyn Notifier>,
    in_flight: Arc<Mutex<HashSet<PathBuf>>>,
    permits: Arc<Semaphore>,
    succeeded: Arc<AtomicU64>,
    failed: Arc<AtomicU64>,
}

impl ConversionOrchestrator {
    pub fn new(
        config: OrchestratorConfig,
        sample_rate: u32,
        converter: Arc<dyn Converter>,
        resolver: Arc<DestinationResolver>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            sample_rate,
            converter,
            resolver,
            notifier,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            permits: Arc::new(Semaphore::new(config.max_concurrent_jobs.max(1))),
            succeeded: Arc::new(AtomicU64::new(0)),
            failed: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Submit a job. Returns false if the same source file is already in
    /// flight, in which case the job is dropped.
    pub async fn submit(&self, job: ConversionJob) -> bool {
        {
            let mut in_flight = self.in_flight.lock().await;
            if !in_flight.insert(job.source.clone()) {
                debug!("Already converting {}, skipping", job.source.display());
                return false;
            }
        }
        metrics::JOBS_IN_FLIGHT.inc();

        let sample_rate = self.sample_rate;
        let converter = Arc::clone(&self.converter);
        let resolver = Arc::clone(&self.resolver);
        let notifier = Arc::clone(&self.notifier);
        let in_flight = Arc::clone(&self.in_flight);
        let permits = Arc::clone(&self.permits);
        let succeeded = Arc::clone(&self.succeeded);
        let failed = Arc::clone(&self.failed);

        tokio::spawn(async move {
            // Closed only on process teardown
            let Ok(_permit) = permits.acquire_owned().await else {
                in_flight.lock().await.remove(&job.source);
                metrics::JOBS_IN_FLIGHT.dec();
                return;
            };

            let started = std::time::Instant::now();
            let result =
                Self::run_job(&job, sample_rate, converter.as_ref(), resolver.as_ref()).await;
            let elapsed = started.elapsed();

            let file_name = job
                .source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| job.source.display().to_string());

            match result {
                Ok(outcome) => {
                    succeeded.fetch_add(1, Ordering::Relaxed);
                    metrics::JOBS_TOTAL.with_label_values(&["success"]).inc();
                    metrics::JOB_DURATION
                        .with_label_values(&["success"])
                        .observe(elapsed.as_secs_f64());

                    info!(
                        "Converted {} into session '{}' ({}, {})",
                        file_name,
                        job.session,
                        format_file_size(outcome.output_size_bytes),
                        format_duration(Duration::from_millis(outcome.duration_ms)),
                    );
                    notifier
                        .notify(
                            "Mix Converted",
                            &format!("{} placed in '{}'", file_name, job.session),
                        )
                        .await;
                }
                Err(e) => {
                    failed.fetch_add(1, Ordering::Relaxed);
                    metrics::JOBS_TOTAL.with_label_values(&["failed"]).inc();
                    metrics::JOB_DURATION
                        .with_label_values(&["failed"])
                        .observe(elapsed.as_secs_f64());

                    let detail = match &e {
                        OrchestratorError::Conversion(c) => c.diagnostic(),
                        other => other.to_string(),
                    };
                    warn!(
                        "Conversion failed for {} (destination '{}'): {}",
                        job.source.display(),
                        resolver.mode().as_str(),
                        detail
                    );
                    notifier
                        .notify("Conversion Failed", &format!("{}: {}", file_name, detail))
                        .await;
                }
            }

            in_flight.lock().await.remove(&job.source);
            metrics::JOBS_IN_FLIGHT.dec();
        });

        true
    }

    /// One conversion attempt. No retries; a rewritten source file arrives
    /// as a fresh filesystem event and is submitted again.
    async fn run_job(
        job: &ConversionJob,
        sample_rate: u32,
        converter: &dyn Converter,
        resolver: &DestinationResolver,
    ) -> Result<ConversionOutcome, OrchestratorError> {
        let dest_dir = resolver.session_dir(&job.session).await?;

        let outcome = converter
            .convert(&job.source, &dest_dir, sample_rate)
            .await?;

        Self::cleanup_stray_artifacts(&dest_dir, &job.source).await;

        Ok(outcome)
    }

    /// Removes leftover temp artifacts a crashed or interrupted conversion
    /// tool may have left next to the final output.
    async fn cleanup_stray_artifacts(dest_dir: &Path, source: &Path) {
        let Some(stem) = source.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            return;
        };

        let Ok(mut entries) = tokio::fs::read_dir(dest_dir).await else {
            return;
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            let is_temp = matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("tmp") | Some("partial")
            );
            let same_stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().starts_with(&stem))
                .unwrap_or(false);

            if is_temp && same_stem {
                debug!("Removing stray artifact {}", path.display());
                if let Err(e) = tokio::fs::remove_file(&path).await {
                    warn!("Failed to remove stray artifact {}: {}", path.display(), e);
                }
            }
        }
    }

    /// Get current orchestrator status.
    pub async fn status(&self) -> OrchestratorStatus {
        OrchestratorStatus {
            in_flight: self.in_flight.lock().await.len(),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }

    /// Waits until no jobs are in flight. Used during shutdown so a running
    /// conversion can finish before the process exits.
    pub async fn wait_idle(&self) {
        loop {
            if self.in_flight.lock().await.is_empty() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DestinationConfig, DestinationMode};
    use crate::converter::ConverterError;
    use crate::testing::{MockConverter, MockMounter, MockNotifier};
    use chrono::Utc;

    fn orchestrator_for(
        dest: &Path,
        converter: Arc<MockConverter>,
        notifier: Arc<MockNotifier>,
    ) -> ConversionOrchestrator {
        let config = DestinationConfig {
            mode: DestinationMode::Custom,
            icloud_path: None,
            custom_path: Some(dest.to_path_buf()),
            nas: None,
        };
        let resolver = Arc::new(DestinationResolver::new(
            config,
            Arc::new(MockMounter::new()),
        ));
        ConversionOrchestrator::new(
            OrchestratorConfig::default(),
            48000,
            converter,
            resolver,
            notifier,
        )
    }

    fn job(source: &Path, session: &str) -> ConversionJob {
        ConversionJob {
            source: source.to_path_buf(),
            session: session.to_string(),
            discovered_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_successful_job_places_output_and_notifies() {
        let source_dir = tempfile::tempdir().unwrap();
        let dest_dir = tempfile::tempdir().unwrap();
        let source = source_dir.path().join("Mix v1.wav");
        tokio::fs::write(&source, b"wav data").await.unwrap();

        let converter = Arc::new(MockConverter::new());
        let notifier = Arc::new(MockNotifier::new());
        let orchestrator = orchestrator_for(dest_dir.path(), converter.clone(), notifier.clone());

        assert!(orchestrator.submit(job(&source, "SongA")).await);
        orchestrator.wait_idle().await;

        let status = orchestrator.status().await;
        assert_eq!(status.succeeded, 1);
        assert_eq!(status.failed, 0);

        assert!(dest_dir.path().join("SongA").join("Mix v1.m4a").is_file());

        let notifications = notifier.notifications().await;
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].0, "Mix Converted");
    }

    #[tokio::test]
    async fn test_failed_job_notifies_once_and_counts() {
        let source_dir = tempfile::tempdir().unwrap();
        let dest_dir = tempfile::tempdir().unwrap();
        let source = source_dir.path().join("Mix v1.wav");
        tokio::fs::write(&source, b"wav data").await.unwrap();

        let converter = Arc::new(MockConverter::new());
        converter
            .set_next_error(ConverterError::tool_failed(
                "encoder crashed",
                Some("segfault".to_string()),
            ))
            .await;
        let notifier = Arc::new(MockNotifier::new());
        let orchestrator = orchestrator_for(dest_dir.path(), converter.clone(), notifier.clone());

        assert!(orchestrator.submit(job(&source, "SongA")).await);
        orchestrator.wait_idle().await;

        let status = orchestrator.status().await;
        assert_eq!(status.succeeded, 0);
        assert_eq!(status.failed, 1);

        let notifications = notifier.notifications().await;
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].0, "Conversion Failed");
    }

    #[tokio::test]
    async fn test_duplicate_submission_skipped() {
        let source_dir = tempfile::tempdir().unwrap();
        let dest_dir = tempfile::tempdir().unwrap();
        let source = source_dir.path().join("Mix v1.wav");
        tokio::fs::write(&source, b"wav data").await.unwrap();

        let converter = Arc::new(MockConverter::new());
        converter.set_delay(Duration::from_millis(200)).await;
        let notifier = Arc::new(MockNotifier::new());
        let orchestrator = orchestrator_for(dest_dir.path(), converter.clone(), notifier.clone());

        assert!(orchestrator.submit(job(&source, "SongA")).await);
        assert!(!orchestrator.submit(job(&source, "SongA")).await);
        orchestrator.wait_idle().await;

        assert_eq!(converter.recorded_conversions().await.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_does_not_block_later_jobs() {
        let source_dir = tempfile::tempdir().unwrap();
        let dest_dir = tempfile::tempdir().unwrap();
        let bad = source_dir.path().join("Mix bad.wav");
        let good = source_dir.path().join("Mix good.wav");
        tokio::fs::write(&bad, b"wav data").await.unwrap();
        tokio::fs::write(&good, b"wav data").await.unwrap();

        let converter = Arc::new(MockConverter::new());
        converter
            .set_next_error(ConverterError::tool_failed("encoder crashed", None))
            .await;
        let notifier = Arc::new(MockNotifier::new());
        let orchestrator = orchestrator_for(dest_dir.path(), converter.clone(), notifier.clone());

        assert!(orchestrator.submit(job(&bad, "SongA")).await);
        orchestrator.wait_idle().await;
        assert!(orchestrator.submit(job(&good, "SongA")).await);
        orchestrator.wait_idle().await;

        let status = orchestrator.status().await;
        assert_eq!(status.succeeded, 1);
        assert_eq!(status.failed, 1);
        assert!(dest_dir.path().join("SongA").join("Mix good.m4a").is_file());
    }

    #[tokio::test]
    async fn test_two_files_share_session_directory() {
        let source_dir = tempfile::tempdir().unwrap();
        let dest_dir = tempfile::tempdir().unwrap();
        let first = source_dir.path().join("Mix v1.wav");
        let second = source_dir.path().join("Mix v2.wav");
        tokio::fs::write(&first, b"wav data").await.unwrap();
        tokio::fs::write(&second, b"wav data").await.unwrap();

        let converter = Arc::new(MockConverter::new());
        let notifier = Arc::new(MockNotifier::new());
        let orchestrator = orchestrator_for(dest_dir.path(), converter.clone(), notifier.clone());

        assert!(orchestrator.submit(job(&first, "SongA")).await);
        assert!(orchestrator.submit(job(&second, "SongA")).await);
        orchestrator.wait_idle().await;

        let session = dest_dir.path().join("SongA");
        assert!(session.join("Mix v1.m4a").is_file());
        assert!(session.join("Mix v2.m4a").is_file());
        assert_eq!(orchestrator.status().await.succeeded, 2);
    }
}
