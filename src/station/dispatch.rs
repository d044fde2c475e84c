// src/station/dispatch.rs

use super::{Station, UnitPassed};
use crate::common::{
    build_traceability_code, event::sensor_tokens, hal_traits::Clock, DateCodes, ProtocolEvent,
    SensorFlags, StatusLabel,
};
use crate::store::{ResultEntry, StationStore};
use alloc::string::ToString;
use chrono::NaiveDateTime;
use log::{debug, info, warn};

impl<S, C, const N: usize> Station<S, C, N>
where
    S: StationStore,
    C: Clock,
{
    /// Applies one protocol event.
    ///
    /// Returns `Some` exactly once per Pass event. For Pass and Fail the order is fixed:
    /// day-boundary check, sensor reset, payload, increment, persist, then (Pass only)
    /// code generation. The code therefore embeds the post-increment OK count.
    pub fn handle_event(&mut self, event: &ProtocolEvent) -> Option<UnitPassed> {
        match event {
            ProtocolEvent::Start => {
                self.set_label(StatusLabel::Testing);
                None
            }
            ProtocolEvent::Waiting => {
                self.set_label(StatusLabel::Wait);
                None
            }
            ProtocolEvent::Pass { payload } => {
                let now = self.begin_verdict(StatusLabel::Ok, payload.as_deref());
                self.snapshot.counters.record_pass();
                self.persist_counters();

                let code = build_traceability_code(
                    &DateCodes::from_date(now.date()),
                    &self.identity.vendor_code,
                    &self.part,
                    self.snapshot.counters.ok(),
                );
                info!("Unit passed: {}", code);
                self.last_code = Some(code.clone());
                self.journal(now, StatusLabel::Ok);
                Some(UnitPassed { code, counters: self.snapshot.counters })
            }
            ProtocolEvent::Fail { payload } => {
                let now = self.begin_verdict(StatusLabel::Ng, payload.as_deref());
                if let Some(payload) = payload {
                    self.snapshot.sensors = SensorFlags::from_tokens(sensor_tokens(payload));
                }
                self.snapshot.counters.record_fail();
                self.persist_counters();
                info!("Unit failed, sensors {:?}", self.snapshot.sensors.as_slice());
                self.journal(now, StatusLabel::Ng);
                None
            }
            ProtocolEvent::Unknown { raw } => {
                debug!("Unclassified line: {:?}", raw);
                None
            }
        }
    }

    fn set_label(&mut self, label: StatusLabel) {
        self.snapshot.label = label;
        self.snapshot.sensors.clear();
    }

    /// Common prefix of Pass and Fail. A pending day rollover completes before the
    /// caller increments anything.
    fn begin_verdict(&mut self, label: StatusLabel, payload: Option<&str>) -> NaiveDateTime {
        let now = self.clock.now();
        self.roll_over_if_needed(now.date());
        self.set_label(label);
        if let Some(reading) = payload {
            self.snapshot.adc_reading = Some(reading.to_string());
        }
        now
    }

    fn journal(&mut self, timestamp: NaiveDateTime, status: StatusLabel) {
        let serial = match status {
            StatusLabel::Ok => self.last_code.as_deref(),
            _ => None,
        };
        let entry = ResultEntry {
            timestamp,
            adc_reading: self.snapshot.adc_reading.as_deref(),
            status,
            serial,
        };
        if let Err(e) = self.store.append_result(&entry) {
            warn!("Could not append {} result to journal: {:?}", status, e);
            self.persistence_degraded = true;
        }
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use crate::common::{classify, Counters, FixedClock, SensorFlags, StatusLabel};
    use crate::station::Station;
    use crate::store::MemoryStore;
    use chrono::{NaiveDate, NaiveDateTime};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 17)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap()
    }

    fn station() -> Station<MemoryStore, FixedClock> {
        Station::load(MemoryStore::new(), FixedClock::new(now()))
    }

    #[test]
    fn test_start_and_waiting_clear_sensors() {
        let mut st = station();
        st.handle_line("NG data=1,1,1,1,1");
        assert!(st.snapshot().sensors.any());

        st.handle_line("START");
        assert_eq!(st.snapshot().label, StatusLabel::Testing);
        assert!(!st.snapshot().sensors.any());

        st.handle_line("NG data=1,0,0,0,0");
        st.handle_line("waiting for unit");
        assert_eq!(st.snapshot().label, StatusLabel::Wait);
        assert_eq!(st.snapshot().sensors, SensorFlags::cleared());
        // Start/Waiting never touch the counters
        assert_eq!(st.counters(), Counters::new(0, 2));
    }

    #[test]
    fn test_fail_maps_sensor_tokens() {
        let mut st = station();
        assert_eq!(st.handle_line("NG data=0,1,0,0,1"), None);
        let snap = st.snapshot();
        assert_eq!(snap.label, StatusLabel::Ng);
        assert_eq!(snap.sensors.as_slice(), &[false, true, false, false, true]);
        assert_eq!(snap.adc_reading.as_deref(), Some("0,1,0,0,1"));
        assert_eq!((snap.counters.ok(), snap.counters.ng(), snap.counters.total()), (0, 1, 1));
        assert_eq!(st.traceability_code(), None);
    }

    #[test]
    fn test_fail_empty_tokens_are_dropped() {
        let mut st = station();
        st.handle_line("NG data: 1, ,1");
        assert_eq!(st.snapshot().sensors.as_slice(), &[true, true, false, false, false]);
    }

    #[test]
    fn test_fail_without_payload_clears_sensors() {
        let mut st = station();
        st.handle_line("NG data=1,1,1,1,1");
        st.handle_line("NG");
        assert_eq!(st.snapshot().sensors, SensorFlags::cleared());
        assert_eq!(st.counters().ng(), 2);
    }

    #[test]
    fn test_pass_exposes_reading_and_clears_sensors() {
        let mut st = station();
        st.handle_line("NG data=1,0,0,0,0");
        let passed = st.handle_line("ok Data=2048").unwrap();
        assert_eq!(passed.counters, Counters::new(1, 1));
        let snap = st.snapshot();
        assert_eq!(snap.label, StatusLabel::Ok);
        assert_eq!(snap.adc_reading.as_deref(), Some("2048"));
        assert!(!snap.sensors.any());
    }

    #[test]
    fn test_unknown_changes_nothing() {
        let mut st = station();
        st.handle_line("OK");
        let before = st.snapshot().clone();
        let writes = st.store().counter_writes;

        assert_eq!(st.handle_event(&classify("DEBUG:boot")), None);
        assert_eq!(st.snapshot(), &before);
        assert_eq!(st.store().counter_writes, writes);
        assert_eq!(st.store().results.len(), 1);
    }

    #[test]
    fn test_every_verdict_is_persisted_and_journaled() {
        let mut st = station();
        let writes = st.store().counter_writes;
        st.handle_line("OK data=1990");
        st.handle_line("NG data=0,0,1");
        st.handle_line("START");
        assert_eq!(st.store().counter_writes, writes + 2);

        let results = &st.store().results;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].status, StatusLabel::Ok);
        assert_eq!(results[0].adc_reading.as_deref(), Some("1990"));
        assert_eq!(results[0].serial.as_deref(), st.traceability_code());
        assert_eq!(results[0].timestamp, now());
        assert_eq!(results[1].status, StatusLabel::Ng);
        assert_eq!(results[1].serial, None);
    }

    #[test]
    fn test_code_embeds_post_increment_count() {
        let mut st = station();
        for _ in 0..9 {
            st.handle_line("OK");
        }
        let passed = st.handle_line("OK").unwrap();
        assert!(passed.code.ends_with("LAH0010"));
    }
}
