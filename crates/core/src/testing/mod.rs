//! Mock implementations for testing.
//!
//! Each mock records its calls and supports error injection so components
//! can be exercised without the external conversion tool, a real mount or
//! the platform volume APIs.

mod mock_converter;
mod mock_mounter;
mod mock_notifier;
mod mock_volumes;

pub use mock_converter::{MockConverter, RecordedConversion};
pub use mock_mounter::MockMounter;
pub use mock_notifier::MockNotifier;
pub use mock_volumes::MockVolumeEnumerator;
