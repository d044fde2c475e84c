// src/station/day_boundary.rs

use super::Station;
use crate::common::hal_traits::Clock;
use crate::store::StationStore;
use chrono::NaiveDate;
use log::info;

impl<S, C, const N: usize> Station<S, C, N>
where
    S: StationStore,
    C: Clock,
{
    /// Clock-tick entry point: resets the counters if the calendar day has changed
    /// since they were last valid. Returns `true` if a reset happened.
    pub fn check_day_boundary(&mut self) -> bool {
        let today = self.clock.now().date();
        self.roll_over_if_needed(today)
    }

    /// Zeroes all counters, moves the day marker to `today` and persists, in that order.
    /// No-op when the marker already matches.
    pub(super) fn roll_over_if_needed(&mut self, today: NaiveDate) -> bool {
        if self.day_marker == today {
            return false;
        }
        info!(
            "Day changed {} -> {}, auto-reset counters (were {:?})",
            self.day_marker, today, self.snapshot.counters
        );
        self.snapshot.counters.reset();
        self.day_marker = today;
        self.persist_counters();
        true
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use crate::common::{Counters, FixedClock};
    use crate::station::Station;
    use crate::store::{CounterRecord, MemoryStore};
    use chrono::{NaiveDate, NaiveDateTime};

    fn evening() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 17)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap()
    }

    #[test]
    fn test_tick_on_same_day_is_noop() {
        let clock = FixedClock::new(evening());
        let mut st: Station<MemoryStore, &FixedClock> = Station::load(MemoryStore::new(), &clock);
        st.handle_line("OK");
        let writes = st.store().counter_writes;
        assert!(!st.check_day_boundary());
        assert_eq!(st.counters(), Counters::new(1, 0));
        assert_eq!(st.store().counter_writes, writes);
    }

    #[test]
    fn test_tick_after_midnight_resets_and_persists() {
        let clock = FixedClock::new(evening());
        let mut st: Station<MemoryStore, &FixedClock> = Station::load(MemoryStore::new(), &clock);
        st.handle_line("OK");
        st.handle_line("NG");

        clock.advance_days(1);
        assert!(st.check_day_boundary());
        let tomorrow = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(st.counters(), Counters::ZERO);
        assert_eq!(st.day_marker(), tomorrow);
        assert_eq!(st.store().counter, Some(CounterRecord::new(Counters::ZERO, tomorrow)));
        // Second tick the same day does nothing
        assert!(!st.check_day_boundary());
    }

    #[test]
    fn test_reset_completes_before_verdict_increment() {
        let clock = FixedClock::new(evening());
        let mut st: Station<MemoryStore, &FixedClock> = Station::load(MemoryStore::new(), &clock);
        for _ in 0..3 {
            st.handle_line("OK");
        }

        // No clock tick between midnight and the next verdict
        clock.advance_days(1);
        let passed = st.handle_line("OK data=1").unwrap();
        assert_eq!(passed.counters, Counters::new(1, 0));
        assert!(passed.code.ends_with("LAJ0001"));
        let tomorrow = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(
            st.store().counter,
            Some(CounterRecord::new(Counters::new(1, 0), tomorrow))
        );
    }
}
