//! Document-store timestamp value.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::{DomainError, DomainResult};

/// Earliest instant the document store accepts (`0001-01-01T00:00:00Z`).
const MIN_SECONDS: i64 = -62_135_596_800;
/// Latest whole second the document store accepts (`9999-12-31T23:59:59Z`).
const MAX_SECONDS: i64 = 253_402_300_799;

/// A point in time as stored by the document backend.
///
/// Backend timestamps carry seconds and nanoseconds since the Unix epoch
/// and are limited to years 1 through 9999. Values are range-checked on
/// construction, so converting to a calendar date never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "DateTime<Utc>", into = "DateTime<Utc>")]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp from seconds and nanoseconds since the epoch.
    ///
    /// # Errors
    ///
    /// Returns `TimestampOutOfRange` if `nanos` is not below one second or
    /// the instant is outside the supported range.
    pub fn new(seconds: i64, nanos: u32) -> DomainResult<Self> {
        if nanos >= 1_000_000_000 {
            return Err(DomainError::TimestampOutOfRange(format!(
                "nanoseconds must be below 1e9, got {nanos}"
            )));
        }
        let value = DateTime::from_timestamp(seconds, nanos).ok_or_else(|| {
            DomainError::TimestampOutOfRange(format!("{seconds}s {nanos}ns"))
        })?;
        Self::from_date_time(value)
    }

    /// Creates a timestamp from milliseconds since the epoch.
    ///
    /// # Errors
    ///
    /// Returns `TimestampOutOfRange` if the instant is outside the
    /// supported range.
    pub fn from_millis(millis: i64) -> DomainResult<Self> {
        let value = DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| DomainError::TimestampOutOfRange(format!("{millis}ms")))?;
        Self::from_date_time(value)
    }

    /// Wraps a calendar date.
    ///
    /// # Errors
    ///
    /// Returns `TimestampOutOfRange` outside years 1 through 9999.
    pub fn from_date_time(value: DateTime<Utc>) -> DomainResult<Self> {
        let seconds = value.timestamp();
        if (MIN_SECONDS..=MAX_SECONDS).contains(&seconds) {
            Ok(Self(value))
        } else {
            Err(DomainError::TimestampOutOfRange(
                value.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            ))
        }
    }

    /// The current instant.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Whole seconds since the epoch.
    #[must_use]
    pub fn seconds(&self) -> i64 {
        self.0.timestamp()
    }

    /// Sub-second part in nanoseconds.
    #[must_use]
    pub fn nanoseconds(&self) -> u32 {
        self.0.timestamp_subsec_nanos()
    }

    /// Milliseconds since the epoch, truncating sub-millisecond precision.
    #[must_use]
    pub fn to_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// The timestamp as a UTC calendar date.
    #[must_use]
    pub const fn to_date_time(&self) -> DateTime<Utc> {
        self.0
    }

    /// RFC 3339 representation, as used on the document-store wire.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }

    /// Parses an RFC 3339 string.
    ///
    /// # Errors
    ///
    /// Returns `TimestampOutOfRange` for unparsable or out-of-range input.
    pub fn parse_rfc3339(value: &str) -> DomainResult<Self> {
        let parsed = DateTime::parse_from_rfc3339(value)
            .map_err(|e| DomainError::TimestampOutOfRange(format!("{value}: {e}")))?;
        Self::from_date_time(parsed.with_timezone(&Utc))
    }
}

impl TryFrom<DateTime<Utc>> for Timestamp {
    type Error = DomainError;

    fn try_from(value: DateTime<Utc>) -> Result<Self, Self::Error> {
        Self::from_date_time(value)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(value: Timestamp) -> Self {
        value.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

/// Returns the whole-second Unix time of a backend timestamp.
#[must_use]
pub fn timestamp_to_unix(timestamp: &Timestamp) -> i64 {
    timestamp.seconds()
}

/// Converts whole Unix seconds into a backend timestamp.
///
/// The conversion goes through milliseconds, so
/// `timestamp_to_unix(&unix_to_timestamp(n)?) == n` for every supported `n`.
///
/// # Errors
///
/// Returns `TimestampOutOfRange` if `unix` is outside the supported range.
pub fn unix_to_timestamp(unix: i64) -> DomainResult<Timestamp> {
    let millis = unix
        .checked_mul(1000)
        .ok_or_else(|| DomainError::TimestampOutOfRange(format!("{unix}s")))?;
    Timestamp::from_millis(millis)
}
