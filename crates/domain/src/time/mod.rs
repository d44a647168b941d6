//! Backend timestamps and the date helpers built on them.
//!
//! All conversions are pure. The display formatters are the only
//! functions whose output depends on the executing environment, since
//! they render in the local timezone.

mod format;
mod timestamp;
mod trial;

pub use format::{
    format_datetime, format_datetime_in, format_timestamp, format_timestamp_in, to_date_time,
};
pub use timestamp::{Timestamp, timestamp_to_unix, unix_to_timestamp};
pub use trial::{MIN_TRIAL_PERIOD_DAYS, calculate_trial_end_unix_timestamp};
