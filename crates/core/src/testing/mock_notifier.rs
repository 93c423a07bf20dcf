//! Mock notifier for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::notifier::Notifier;

/// Mock implementation of the Notifier trait. Records every notification
/// as a `(title, message)` pair.
#[derive(Debug, Default)]
pub struct MockNotifier {
    notifications: Arc<RwLock<Vec<(String, String)>>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded notifications.
    pub async fn notifications(&self) -> Vec<(String, String)> {
        self.notifications.read().await.clone()
    }

    /// Get the number of notifications delivered.
    pub async fn notification_count(&self) -> usize {
        self.notifications.read().await.len()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    fn name(&self) -> &str {
        "mock"
    }

    async fn notify(&self, title: &str, message: &str) {
        self.notifications
            .write()
            .await
            .push((title.to_string(), message.to_string()));
    }
}
