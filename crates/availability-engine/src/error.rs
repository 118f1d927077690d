//! Error types for availability-engine operations.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AvailabilityError {
    /// A range whose start is not strictly before its end.
    #[error("Invalid range: start {start} is not before end {end}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// A sequence that must be sorted by start time is not. `index` is the
    /// position of the first element that starts before its predecessor.
    #[error("Input not sorted by start time at index {index}")]
    UnsortedInput { index: usize },

    #[error("Invalid slot size: {0} minutes")]
    InvalidSlotSize(u32),

    /// Grid hours must satisfy `start_mins <= end_mins <= 1440`.
    #[error("Invalid grid hours: {start_mins}..{end_mins} minutes after midnight")]
    InvalidGridHours { start_mins: u32, end_mins: u32 },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("{instant} is not on a slot boundary")]
    NotSlotAligned { instant: DateTime<Utc> },

    #[error("Cannot make a booking in the past: {start}")]
    BookingInPast { start: DateTime<Utc> },
}

pub type Result<T> = std::result::Result<T, AvailabilityError>;
