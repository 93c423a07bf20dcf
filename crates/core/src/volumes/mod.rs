//! Removable-volume discovery.
//!
//! Enumerates mounted volumes through the [`VolumeEnumerator`] capability,
//! filters them down to the eligible set (capacity, filesystem, backup and
//! system exclusions, name patterns) and diffs successive cycles into
//! add/remove events for the watch root manager.

mod filter;
mod registry;
mod traits;
mod types;

pub use filter::{diff, eligible_set, is_eligible};
pub use registry::VolumeRegistry;
pub use traits::VolumeEnumerator;
pub use types::{VolumeDescriptor, VolumeError, VolumeEvent};
