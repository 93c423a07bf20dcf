//! macOS notification delivery via `osascript`.

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use super::traits::Notifier;

const OSASCRIPT_TIMEOUT: Duration = Duration::from_secs(5);

/// Delivers notifications through the macOS Notification Center by shelling
/// out to `osascript`. Any failure is logged and discarded.
pub struct OsaScriptNotifier;

impl OsaScriptNotifier {
    pub fn new() -> Self {
        Self
    }

    fn script(title: &str, message: &str) -> String {
        format!(
            "display notification \"{}\" with title \"{}\"",
            escape(message),
            escape(title)
        )
    }
}

impl Default for OsaScriptNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Escapes characters that would break out of an AppleScript string literal.
fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[async_trait]
impl Notifier for OsaScriptNotifier {
    fn name(&self) -> &str {
        "osascript"
    }

    async fn notify(&self, title: &str, message: &str) {
        let script = Self::script(title, message);
        let result = tokio::time::timeout(
            OSASCRIPT_TIMEOUT,
            Command::new("osascript").arg("-e").arg(&script).output(),
        )
        .await;

        match result {
            Ok(Ok(output)) if output.status.success() => {
                debug!("Notification delivered: {}", title);
            }
            Ok(Ok(output)) => {
                warn!(
                    "osascript exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                );
            }
            Ok(Err(e)) => {
                warn!("Failed to run osascript: {}", e);
            }
            Err(_) => {
                warn!("osascript timed out after {:?}", OSASCRIPT_TIMEOUT);
            }
        }
    }
}
