//! Display formatting for backend timestamps.

use std::fmt::Display;

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};

use super::Timestamp;
use crate::{DomainError, DomainResult};

const DATE_FORMAT: &str = "%-m/%-d/%Y";
const DATETIME_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Formats the date part of a timestamp in the local timezone.
///
/// Output depends on the machine's timezone setting.
#[must_use]
pub fn format_timestamp(timestamp: &Timestamp) -> String {
    format_timestamp_in(timestamp, &Local)
}

/// Formats the date part of a timestamp in `tz`, e.g. `1/5/2024`.
#[must_use]
pub fn format_timestamp_in<Tz>(timestamp: &Timestamp, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    timestamp
        .to_date_time()
        .with_timezone(tz)
        .format(DATE_FORMAT)
        .to_string()
}

/// Formats date and time of a timestamp in the local timezone.
#[must_use]
pub fn format_datetime(timestamp: &Timestamp) -> String {
    format_datetime_in(timestamp, &Local)
}

/// Formats date and time of a timestamp in `tz`, e.g. `1/5/2024, 3:04:05 PM`.
#[must_use]
pub fn format_datetime_in<Tz>(timestamp: &Timestamp, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    timestamp
        .to_date_time()
        .with_timezone(tz)
        .format(DATETIME_FORMAT)
        .to_string()
}

/// Converts Unix epoch seconds to a calendar date.
///
/// # Errors
///
/// Returns `TimestampOutOfRange` if the offset from the epoch cannot be
/// represented.
pub fn to_date_time(secs: i64) -> DomainResult<DateTime<Utc>> {
    TimeDelta::try_seconds(secs)
        .and_then(|offset| DateTime::UNIX_EPOCH.checked_add_signed(offset))
        .ok_or_else(|| DomainError::TimestampOutOfRange(format!("{secs}s")))
}
