//! Clock port for time-related operations

use chrono::{DateTime, Utc};

use brawl_domain::calculate_trial_end_unix_timestamp;

/// Port for getting the current time.
///
/// Registration timestamps and trial end dates read the time through this
/// port so tests can pin it.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Unix second at which a trial of `trial_period_days` started now ends.
    ///
    /// `None` for missing or sub-two-day trials.
    fn trial_end(&self, trial_period_days: Option<i64>) -> Option<i64> {
        calculate_trial_end_unix_timestamp(trial_period_days, self.now())
    }
}
