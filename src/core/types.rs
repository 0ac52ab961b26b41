use serde::{Serialize, Deserialize};

use super::{HOUR_MS, MINUTE_MS, SECOND_MS, TENTH_MS};

/// Unit of a time-based notation token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
}

impl TimeUnit {
    /// Returns the unit's length in milliseconds
    pub fn millis(&self) -> u64 {
        match self {
            TimeUnit::Seconds => SECOND_MS,
            TimeUnit::Minutes => MINUTE_MS,
            TimeUnit::Hours => HOUR_MS,
        }
    }

    /// Returns the singular English word for this unit
    pub fn word(&self) -> &'static str {
        match self {
            TimeUnit::Seconds => "second",
            TimeUnit::Minutes => "minute",
            TimeUnit::Hours => "hour",
        }
    }
}

/// Which edge of the countdown a directive's offsets are measured from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edge {
    /// No edge keyword; symmetric or default-last behavior
    None,
    /// Measured from the start of the countdown
    First,
    /// Measured from the end of the countdown
    Last,
}

/// The class of announcements a directive describes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectiveKind {
    /// Announcements anchored to absolute time marks
    Time {
        /// How many units per mark
        quantity: u64,
        /// The unit the quantity is expressed in
        unit: TimeUnit,
    },
    /// Announcements at fractional marks of the total duration
    Fraction {
        /// Number of equal parts the duration is divided into (2..=10)
        denominator: u64,
    },
}

/// One parsed unit of the notation grammar
///
/// Immutable once parsed; dispatch works on expanded copies, never on the
/// canonical directive list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalDirective {
    /// Time-based or fraction-based announcement class
    pub kind: DirectiveKind,
    /// Edge the offsets are measured from
    pub relative: Edge,
    /// Announce at every instance of the unit (both ends for symmetric tokens)
    pub repeat_all: bool,
    /// Fixed-cadence repeat instead of one-shot
    pub every: bool,
    /// Repeat count or fraction numerator; 0 when `every` derives the cadence
    pub multiplier: u64,
    /// Original matched token, kept for diagnostics
    pub source: String,
}

/// A single scheduled message
///
/// The offset is a remaining-time value: the message should finish being
/// spoken when the countdown clock reads `offset_ms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    /// Remaining time at which the message should complete
    pub offset_ms: u64,
    /// The human phrase to speak or display
    pub message: String,
}

impl Announcement {
    /// Creates a new announcement
    pub fn new(offset_ms: u64, message: impl Into<String>) -> Self {
        Announcement {
            offset_ms,
            message: message.into(),
        }
    }
}

/// Expansion priority when merging directives into one schedule
///
/// Determines which of two near-colliding offsets survives the closeness
/// filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MergeOrder {
    /// Fraction directives expand first and win collisions
    #[default]
    FractionFirst,
    /// Time directives expand first and win collisions
    TimeFirst,
    /// Strict token-appearance order
    TokenOrder,
}

/// Clock reading decomposed into display fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeComponents {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub tenths: u64,
}

impl TimeComponents {
    /// Decomposes a millisecond duration via the fixed multiplier table
    pub fn from_millis(ms: u64) -> Self {
        TimeComponents {
            hours: ms / HOUR_MS,
            minutes: (ms % HOUR_MS) / MINUTE_MS,
            seconds: (ms % MINUTE_MS) / SECOND_MS,
            tenths: (ms % SECOND_MS) / TENTH_MS,
        }
    }

    /// Recomposes into milliseconds; inverse of [`TimeComponents::from_millis`]
    /// up to sub-tenth truncation
    pub fn to_millis(&self) -> u64 {
        self.hours * HOUR_MS
            + self.minutes * MINUTE_MS
            + self.seconds * SECOND_MS
            + self.tenths * TENTH_MS
    }
}
