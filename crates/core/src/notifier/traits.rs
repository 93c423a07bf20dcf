//! Trait definitions for the notifier module.

use async_trait::async_trait;

/// User-facing notification capability.
///
/// Notifications are fire-and-forget. Implementations must swallow delivery
/// failures (logging them at warn level) so a broken notification path can
/// never stall or fail a conversion job.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Returns the name of this notifier implementation.
    fn name(&self) -> &str;

    /// Delivers a notification with the given title and message.
    async fn notify(&self, title: &str, message: &str);
}
