//! Fire-and-forget user notifications.
//!
//! Jobs and lifecycle events announce themselves through the [`Notifier`]
//! capability. Delivery failures are logged and dropped; nothing in the
//! pipeline depends on a notification going through.

mod log;
mod osascript;
mod traits;

pub use log::LogNotifier;
pub use osascript::OsaScriptNotifier;
pub use traits::Notifier;
