//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Watcher (files detected, watch roots)
//! - Conversion jobs (started, completed, failed, duration)
//! - Volume discovery (volumes added/removed)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Watcher Metrics
// =============================================================================

/// Mix files detected and accepted for stability tracking.
pub static FILES_DETECTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "bouncewatch_files_detected_total",
        "Total candidate mix files detected",
    )
    .unwrap()
});

/// Candidates abandoned before stabilizing (root removed, file vanished).
pub static CANDIDATES_ABANDONED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "bouncewatch_candidates_abandoned_total",
        "Total stability candidates abandoned before becoming ready",
    )
    .unwrap()
});

/// Watch roots currently active.
pub static ACTIVE_ROOTS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "bouncewatch_active_roots",
        "Number of watch roots currently subscribed",
    )
    .unwrap()
});

// =============================================================================
// Conversion Job Metrics
// =============================================================================

/// Conversion jobs total by result.
pub static JOBS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("bouncewatch_jobs_total", "Total conversion jobs"),
        &["result"], // "success", "failed", "skipped"
    )
    .unwrap()
});

/// Conversion job duration in seconds.
pub static JOB_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "bouncewatch_job_duration_seconds",
            "Duration of conversion jobs",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]),
        &["result"],
    )
    .unwrap()
});

/// Conversion jobs currently in flight.
pub static JOBS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "bouncewatch_jobs_in_flight",
        "Number of conversion jobs currently running or queued",
    )
    .unwrap()
});

// =============================================================================
// Volume Discovery Metrics
// =============================================================================

/// Eligible volumes added by the discovery loop.
pub static VOLUMES_ADDED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "bouncewatch_volumes_added_total",
        "Total eligible volumes added as watch roots",
    )
    .unwrap()
});

/// Volumes removed by the discovery loop.
pub static VOLUMES_REMOVED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "bouncewatch_volumes_removed_total",
        "Total volumes removed from watching",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Watcher
        Box::new(FILES_DETECTED.clone()),
        Box::new(CANDIDATES_ABANDONED.clone()),
        Box::new(ACTIVE_ROOTS.clone()),
        // Jobs
        Box::new(JOBS_TOTAL.clone()),
        Box::new(JOB_DURATION.clone()),
        Box::new(JOBS_IN_FLIGHT.clone()),
        // Volumes
        Box::new(VOLUMES_ADDED.clone()),
        Box::new(VOLUMES_REMOVED.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_metrics_registrable() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }
    }
}
