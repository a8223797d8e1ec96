//! propkit Standard Library
//!
//! Small utilities used around the engine: text codecs, random strings,
//! human-readable durations and logging initialisation.

#![warn(missing_docs)]

pub mod codec;
pub mod duration;
pub mod logger;
pub mod random;

pub use codec::{Codec, CodecError};
pub use duration::{format_duration, parse_duration, DurationError};
pub use random::RandomError;
