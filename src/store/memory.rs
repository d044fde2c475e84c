// src/store/memory.rs

use super::{CounterRecord, ResultEntry, StationStore};
use crate::common::{ConfigMap, StatusLabel};
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use chrono::NaiveDateTime;

/// Error returned by [`MemoryStore`] once writes have been switched off.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryStoreError {
    #[error("store is read-only")]
    WriteRejected,
}

/// Owned copy of a journal row kept by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResult {
    pub timestamp: NaiveDateTime,
    pub adc_reading: Option<String>,
    pub status: StatusLabel,
    pub serial: Option<String>,
}

/// Store that keeps everything in RAM.
///
/// Used on targets without a filesystem and for exercising the state machine;
/// `reject_writes` simulates a full disk or a locked file.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub counter: Option<CounterRecord>,
    pub config: ConfigMap,
    pub results: Vec<StoredResult>,
    pub counter_writes: usize,
    reject_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_counter(mut self, record: CounterRecord) -> Self {
        self.counter = Some(record);
        self
    }

    pub fn with_config(mut self, config: ConfigMap) -> Self {
        self.config = config;
        self
    }

    /// Makes every subsequent write fail with [`MemoryStoreError::WriteRejected`].
    pub fn reject_writes(&mut self, reject: bool) {
        self.reject_writes = reject;
    }

    fn check_writable(&self) -> Result<(), MemoryStoreError> {
        if self.reject_writes {
            Err(MemoryStoreError::WriteRejected)
        } else {
            Ok(())
        }
    }
}

impl StationStore for MemoryStore {
    type Error = MemoryStoreError;

    fn read_counter_record(&mut self) -> Result<Option<CounterRecord>, Self::Error> {
        Ok(self.counter)
    }

    fn write_counter_record(&mut self, record: &CounterRecord) -> Result<(), Self::Error> {
        self.check_writable()?;
        self.counter = Some(*record);
        self.counter_writes += 1;
        Ok(())
    }

    fn read_config(&mut self) -> Result<ConfigMap, Self::Error> {
        Ok(self.config.clone())
    }

    fn upsert_config_value(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.check_writable()?;
        self.config.upsert(key, value);
        Ok(())
    }

    fn append_result(&mut self, entry: &ResultEntry<'_>) -> Result<(), Self::Error> {
        self.check_writable()?;
        self.results.push(StoredResult {
            timestamp: entry.timestamp,
            adc_reading: entry.adc_reading.map(ToString::to_string),
            status: entry.status,
            serial: entry.serial.map(ToString::to_string),
        });
        Ok(())
    }
}
