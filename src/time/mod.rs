//! Clock text handling
//!
//! Conversions between duration text ("HH:MM:SS"), millisecond durations, and
//! display components.

pub mod codec;

pub use self::codec::{format, parse_duration, to_components, to_millis};
