// src/store/mod.rs

// Declare the sub-modules
mod memory;
#[cfg(feature = "std")]
pub mod file;

pub use memory::{MemoryStore, MemoryStoreError, StoredResult};
#[cfg(feature = "std")]
pub use file::{FileStore, StoreError};

use crate::common::{ConfigMap, Counters, StatusLabel};
use chrono::{NaiveDate, NaiveDateTime};
use core::fmt::Debug;

/// Counters as persisted, together with the day they are valid for.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CounterRecord {
    pub counters: Counters,
    /// Day the counters belong to. `None` for records written without a date,
    /// which are always treated as stale.
    pub date: Option<NaiveDate>,
}

impl CounterRecord {
    pub fn new(counters: Counters, date: NaiveDate) -> Self {
        CounterRecord { counters, date: Some(date) }
    }

    /// Whether the record may be used as-is on `today`.
    pub fn is_valid_for(&self, today: NaiveDate) -> bool {
        self.date == Some(today)
    }
}

/// One tested unit as written to the daily result journal.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ResultEntry<'a> {
    pub timestamp: NaiveDateTime,
    pub adc_reading: Option<&'a str>,
    pub status: StatusLabel,
    /// Traceability code for passing units.
    pub serial: Option<&'a str>,
}

/// Durable state behind the station: counters, key/value configuration and the
/// result journal.
///
/// Implementations are used from a single logical thread; no internal locking is expected.
pub trait StationStore {
    /// Associated error type for storage failures.
    type Error: Debug;

    /// Last written counter record, or `None` if nothing was ever stored.
    fn read_counter_record(&mut self) -> Result<Option<CounterRecord>, Self::Error>;

    /// Replaces the counter record. Counters and date are written together.
    fn write_counter_record(&mut self, record: &CounterRecord) -> Result<(), Self::Error>;

    /// Whole configuration. A missing configuration is an empty map, not an error.
    fn read_config(&mut self) -> Result<ConfigMap, Self::Error>;

    /// Updates one key (case-insensitive match) or appends it, keeping every other key.
    fn upsert_config_value(&mut self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Appends one tested unit to the result journal.
    ///
    /// The default implementation keeps no journal.
    fn append_result(&mut self, _entry: &ResultEntry<'_>) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<S: StationStore + ?Sized> StationStore for &mut S {
    type Error = S::Error;

    fn read_counter_record(&mut self) -> Result<Option<CounterRecord>, Self::Error> {
        (**self).read_counter_record()
    }

    fn write_counter_record(&mut self, record: &CounterRecord) -> Result<(), Self::Error> {
        (**self).write_counter_record(record)
    }

    fn read_config(&mut self) -> Result<ConfigMap, Self::Error> {
        (**self).read_config()
    }

    fn upsert_config_value(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
        (**self).upsert_config_value(key, value)
    }

    fn append_result(&mut self, entry: &ResultEntry<'_>) -> Result<(), Self::Error> {
        (**self).append_result(entry)
    }
}
