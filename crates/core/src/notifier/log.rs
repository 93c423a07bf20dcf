//! Log-only notification delivery.

use async_trait::async_trait;
use tracing::info;

use super::traits::Notifier;

/// Writes notifications to the log instead of a desktop surface. Used on
/// platforms without a notification center and as a headless fallback.
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn notify(&self, title: &str, message: &str) {
        info!("[notification] {}: {}", title, message);
    }
}
