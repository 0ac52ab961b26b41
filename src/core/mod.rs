//! Core types and constants for the countdown scheduler
//!
//! This module contains the fundamental building blocks used throughout the library.

pub mod error;
pub mod serde;
pub mod types;

pub use self::error::{Error, Result};
pub use self::types::{
    Announcement,
    DirectiveKind,
    Edge,
    IntervalDirective,
    MergeOrder,
    TimeComponents,
    TimeUnit,
};

/// Milliseconds in one hour
pub const HOUR_MS: u64 = 3_600_000;

/// Milliseconds in one minute
pub const MINUTE_MS: u64 = 60_000;

/// Milliseconds in one second
pub const SECOND_MS: u64 = 1_000;

/// Milliseconds in one tenth of a second
pub const TENTH_MS: u64 = 100;

/// Countdown durations are clamped to 24 hours
pub const MAX_DURATION_MS: u64 = 86_400_000;

/// Minimum spacing between accepted announcement offsets
pub const CLOSENESS_WINDOW_MS: u64 = 5_000;

/// Offsets at or below this remain dense; the closeness filter does not apply
pub const DENSE_ZONE_MS: u64 = 30_000;

/// Announcements further than this from the live clock are dropped unspoken
pub const STALE_WINDOW_MS: u64 = 2_000;

/// Default dispatcher tick cadence in milliseconds
pub const DEFAULT_TICK_MS: u64 = 20;
