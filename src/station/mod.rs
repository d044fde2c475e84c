// src/station/mod.rs

// Declare the helper sub-modules (each adds an `impl Station` block)
mod day_boundary;
mod dispatch;

use crate::common::{
    event::classify, hal_traits::Clock, timing::DEFAULT_SENSOR_COUNT, ConfigMap, Counters,
    DateCodes, StationIdentity, StatusSnapshot,
};
use crate::store::{CounterRecord, StationStore};
use alloc::string::{String, ToString};
use chrono::NaiveDate;
use log::{info, warn};

/// Emitted once per Pass event, after counters were persisted and the code was built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitPassed {
    /// Freshly built traceability code (QR payload).
    pub code: String,
    /// Counters including this unit.
    pub counters: Counters,
}

/// The result state machine of a test station.
///
/// Consumes protocol events, keeps the status snapshot and the daily counters, and
/// writes every counter change through to the store. Store failures never stop the
/// machine: they are logged and [`Station::is_persistence_degraded`] turns true until a
/// write succeeds again.
#[derive(Debug)]
pub struct Station<S, C, const N: usize = DEFAULT_SENSOR_COUNT>
where
    S: StationStore,
    C: Clock,
{
    store: S,
    clock: C,
    config: ConfigMap,
    identity: StationIdentity,
    part: String,
    snapshot: StatusSnapshot<N>,
    day_marker: NaiveDate,
    last_code: Option<String>,
    persistence_degraded: bool,
}

impl<S, C, const N: usize> Station<S, C, N>
where
    S: StationStore,
    C: Clock,
{
    /// Loads configuration and counters from `store`.
    ///
    /// Counters stamped with another day than today (or with no day at all) are reset
    /// to zero and the reset is persisted immediately.
    pub fn load(mut store: S, clock: C) -> Self {
        let today = clock.now().date();
        let mut persistence_degraded = false;

        let config = store.read_config().unwrap_or_else(|e| {
            warn!("Could not read configuration: {:?}", e);
            persistence_degraded = true;
            ConfigMap::new()
        });
        let identity = StationIdentity::from_config(&config);

        let stored = store.read_counter_record().unwrap_or_else(|e| {
            warn!("Could not read counters, starting from zero: {:?}", e);
            persistence_degraded = true;
            None
        });

        let mut station = Station {
            store,
            clock,
            part: identity.part_code.clone(),
            config,
            identity,
            snapshot: StatusSnapshot::default(),
            day_marker: today,
            last_code: None,
            persistence_degraded,
        };

        match stored {
            Some(record) if record.is_valid_for(today) => {
                station.snapshot.counters = record.counters;
            }
            Some(record) => {
                info!(
                    "Counters dated {:?} are stale on {}, resetting",
                    record.date, today
                );
                station.persist_counters();
            }
            None if !station.persistence_degraded => station.persist_counters(),
            None => {}
        }
        station
    }

    /// Classifies one received line and handles it.
    pub fn handle_line(&mut self, line: &str) -> Option<UnitPassed> {
        let event = classify(line);
        self.handle_event(&event)
    }

    // --- Read-only views for the presentation layer ---

    pub fn snapshot(&self) -> &StatusSnapshot<N> {
        &self.snapshot
    }

    pub fn counters(&self) -> Counters {
        self.snapshot.counters
    }

    /// Code built for the most recent passing unit, kept until the next Pass.
    pub fn traceability_code(&self) -> Option<&str> {
        self.last_code.as_deref()
    }

    /// Day the in-memory counters belong to.
    pub fn day_marker(&self) -> NaiveDate {
        self.day_marker
    }

    /// Date codes for the live clock display.
    pub fn date_codes(&self) -> DateCodes {
        DateCodes::from_date(self.clock.now().date())
    }

    pub fn identity(&self) -> &StationIdentity {
        &self.identity
    }

    /// Configuration as loaded, plus every value updated since.
    pub fn config(&self) -> &ConfigMap {
        &self.config
    }

    /// Part token used in traceability codes.
    pub fn part(&self) -> &str {
        &self.part
    }

    pub fn is_persistence_degraded(&self) -> bool {
        self.persistence_degraded
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    // --- Operator actions ---

    /// Switches the part token used for subsequent codes. The token is taken as given;
    /// checking it against the list of known parts is the caller's business.
    pub fn select_part(&mut self, part: &str) {
        self.part = part.trim().to_string();
        info!("Part selected: {}", self.part);
    }

    /// Upserts one configuration value and refreshes the identity view.
    ///
    /// The in-memory identity is updated even if the store rejects the write.
    pub fn update_config(&mut self, key: &str, value: &str) -> Result<(), S::Error> {
        let result = self.store.upsert_config_value(key, value);
        if let Err(e) = &result {
            warn!("Could not save config value {:?}: {:?}", key, e);
            self.persistence_degraded = true;
        }
        self.config.upsert(key, value);
        self.identity = StationIdentity::from_config(&self.config);
        result
    }

    // --- Persistence helpers ---

    fn persist_counters(&mut self) {
        let record = CounterRecord::new(self.snapshot.counters, self.day_marker);
        match self.store.write_counter_record(&record) {
            Ok(()) => self.persistence_degraded = false,
            Err(e) => {
                warn!("Could not persist counters {:?}: {:?}", record.counters, e);
                self.persistence_degraded = true;
            }
        }
    }
}
