//! Trial period arithmetic.

use chrono::{DateTime, Utc};

/// Trials shorter than this many days do not get an explicit end date.
pub const MIN_TRIAL_PERIOD_DAYS: i64 = 2;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Computes the Unix second at which a trial of `trial_period_days` ends.
///
/// Returns `None` when no trial length is given or it is shorter than
/// [`MIN_TRIAL_PERIOD_DAYS`]. The end is `now + (days + 1)` days, the extra
/// day being a grace period, floored to a whole second. Returns `None` if
/// the result overflows.
#[must_use]
pub fn calculate_trial_end_unix_timestamp(
    trial_period_days: Option<i64>,
    now: DateTime<Utc>,
) -> Option<i64> {
    let days = trial_period_days.filter(|days| *days >= MIN_TRIAL_PERIOD_DAYS)?;
    let offset = days.checked_add(1)?.checked_mul(MILLIS_PER_DAY)?;
    let end_millis = now.timestamp_millis().checked_add(offset)?;
    Some(end_millis.div_euclid(1000))
}
