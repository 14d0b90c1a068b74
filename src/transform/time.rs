//! Reference calendar decomposition for the time dimension
//!
//! The time transform decomposes timestamps inside the warehouse; this is
//! the in-process definition of what that decomposition must produce for a
//! given epoch value, used to pin the SQL's semantics.

use chrono::{DateTime, Datelike, Timelike, Utc};

/// The calendar fields of one time-dimension row.
///
/// Conventions: the epoch value is interpreted as UTC seconds, `week` is
/// the ISO 8601 week number, and `weekday` counts from Sunday = 0 to match
/// the warehouse's weekday extraction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeParts {
    pub start_time: DateTime<Utc>,
    pub hour: u32,
    pub day: u32,
    pub week: u32,
    pub month: u32,
    pub year: i32,
    pub weekday: u32,
}

impl TimeParts {
    /// Decompose an epoch-seconds value.
    ///
    /// Returns `None` for values outside the representable timestamp range.
    pub fn from_epoch_seconds(ts: i64) -> Option<Self> {
        let start_time = DateTime::<Utc>::from_timestamp(ts, 0)?;
        Some(Self {
            hour: start_time.hour(),
            day: start_time.day(),
            week: start_time.iso_week().week(),
            month: start_time.month(),
            year: start_time.year(),
            weekday: start_time.weekday().num_days_from_sunday(),
            start_time,
        })
    }
}
