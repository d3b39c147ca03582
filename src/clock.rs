//! Wall-clock source used to stamp every stored row.
//!
//! Rows are ordered by their timestamp string, so all writers go through a
//! [`Clock`] rather than calling `Utc::now()` directly. Tests swap in a
//! [`FixedClock`] to control ordering.

use std::sync::Mutex;

use chrono::{DateTime, Duration, SecondsFormat, Utc};

// ---

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// ISO-8601 UTC with millisecond precision, e.g. `2024-10-14T03:37:58.123Z`.
    ///
    /// Fixed width, so lexicographic order equals time order.
    fn timestamp(&self) -> String {
        format_timestamp(self.now())
    }
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    // ---
    at: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    // ---
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { at: Mutex::new(at) }
    }

    pub fn advance(&self, by: Duration) {
        let mut at = self.lock();
        *at += by;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        // A poisoned lock still holds a valid timestamp.
        self.at.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.lock()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_format_matches_iso_millis() {
        // ---
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 10, 14, 3, 37, 58).unwrap());
        assert_eq!(clock.timestamp(), "2024-10-14T03:37:58.000Z");
    }

    #[test]
    fn test_fixed_clock_advances() {
        // ---
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let before = clock.timestamp();
        clock.advance(Duration::milliseconds(1500));
        let after = clock.timestamp();

        assert_eq!(after, "2024-01-01T00:00:01.500Z");
        assert!(before < after, "timestamps must sort in time order");
    }

    #[test]
    fn test_timestamps_sort_across_digit_boundaries() {
        // ---
        let early = format_timestamp(Utc.with_ymd_and_hms(2024, 9, 30, 23, 59, 59).unwrap());
        let late = format_timestamp(Utc.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).unwrap());
        assert!(early < late);
    }
}
