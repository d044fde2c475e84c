// src/common/clock.rs

use super::hal_traits::Clock;
use chrono::{Days, NaiveDateTime};
use core::cell::Cell;

#[cfg(feature = "std")]
use chrono::Local;

/// Wall clock backed by the host's local time zone.
#[cfg(feature = "std")]
#[derive(Debug, Copy, Clone, Default)]
pub struct SystemClock;

#[cfg(feature = "std")]
impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock that always reports the same instant until moved. Handy for replaying
/// fixture logs and for tests.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Cell<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        FixedClock { now: Cell::new(now) }
    }

    pub fn set(&self, now: NaiveDateTime) {
        self.now.set(now);
    }

    /// Moves the clock forward by whole days, keeping the time of day.
    pub fn advance_days(&self, days: u64) {
        let next = self.now.get() + Days::new(days);
        self.now.set(next);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_fixed_clock_advances_by_days() {
        let start = NaiveDate::from_ymd_opt(2025, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 0)
            .unwrap();
        let clock = FixedClock::new(start);
        assert_eq!(clock.now(), start);
        clock.advance_days(1);
        assert_eq!(clock.now().date(), NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    }
}
