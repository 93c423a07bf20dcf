//! Filesystem watching: root management and write-stability detection.
//!
//! The [`WatchRootManager`] keeps one recursive subscription per active
//! root and funnels raw create/modify paths into a channel. The
//! [`StabilityTracker`] turns those raw paths into at-most-one
//! [`ReadyFile`] per candidate once its size has stopped changing.

mod filter;
mod roots;
mod stability;
mod types;

pub use filter::{
    count_audio_folders, in_audio_folder, is_audio_file, is_candidate, is_mix_file, session_name,
};
pub use roots::WatchRootManager;
pub use stability::{StabilityProbe, StabilityTracker};
pub use types::{ReadyFile, RootOrigin, WatchError};
