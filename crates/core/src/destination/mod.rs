//! Destination resolution for converted output.
//!
//! Maps the configured destination mode (iCloud folder, NAS share or a
//! custom directory) to a verified writable base directory and hands out
//! per-session subdirectories. Network shares are mounted through the
//! [`Mounter`] capability; tests substitute `testing::MockMounter`.

mod error;
mod resolver;
mod traits;

pub use error::DestinationError;
pub use resolver::{Destination, DestinationResolver};
pub use traits::Mounter;
