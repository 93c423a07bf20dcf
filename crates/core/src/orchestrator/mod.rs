//! Conversion job orchestration.
//!
//! Takes ready files from the watcher and runs each through the converter
//! and destination resolver under a concurrency limit, announcing the
//! outcome through the notifier. One attempt per detection; a file that is
//! rewritten later shows up as a new event and gets a new job.

mod config;
mod runner;
mod types;

pub use config::OrchestratorConfig;
pub use runner::ConversionOrchestrator;
pub use types::{ConversionJob, OrchestratorError, OrchestratorStatus};
