//! Orchestrator configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the conversion orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Maximum conversion jobs running at once.
    /// The external conversion tool is CPU-bound, so this defaults to one;
    /// additional ready files queue behind the running job.
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,

    /// Capacity of the ready-file queue between the watcher and the
    /// orchestrator. Detection stalls if the queue fills up.
    #[serde(default = "default_ready_queue_size")]
    pub ready_queue_size: usize,
}

fn default_max_concurrent_jobs() -> usize {
    1
}

fn default_ready_queue_size() -> usize {
    64
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: default_max_concurrent_jobs(),
            ready_queue_size: default_ready_queue_size(),
        }
    }
}
