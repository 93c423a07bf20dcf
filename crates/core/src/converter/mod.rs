//! Converter capability for transcoding stabilized mix files.
//!
//! The engine treats conversion as an opaque path-in/dir-out contract: the
//! [`Converter`] receives a source file, a destination directory and a
//! target sample rate, and is expected to leave exactly one final audio
//! file in the destination. [`ScriptConverter`] drives the external
//! conversion tool; tests substitute `testing::MockConverter`.

mod error;
mod script;
mod traits;
mod types;

pub use error::ConverterError;
pub use script::ScriptConverter;
pub use traits::Converter;
pub use types::ConversionOutcome;
