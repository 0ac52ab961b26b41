//! Schedule compilation
//!
//! Expands parsed directives into concrete announcements and merges them into
//! one deduplicated, descending-ordered schedule for a countdown run.

pub mod builder;
pub mod generator;
pub mod message;

pub use self::builder::Schedule;
pub use self::generator::expand;
