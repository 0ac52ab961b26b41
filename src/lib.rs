//! Calldown: countdown announcement scheduling with speech lead-time compensation
//!
//! This library compiles a compact textual notation ("1/2 30s last20 allLast10") into
//! a time-ordered schedule of spoken messages, then dispatches those messages while a
//! countdown runs so that speech completion aligns with the intended instant.
#![allow(dead_code)]
pub mod core;

pub mod dispatch;
pub mod notation;
pub mod schedule;
pub mod time;

// Re-export commonly used items
pub use core::{Error, Result};
pub use dispatch::{DispatchEvent, Dispatcher, DispatcherConfig, LeadTable};
pub use schedule::Schedule;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
