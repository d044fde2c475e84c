// src/store/file.rs

//! CSV-file persistence, laid out next to the station executable:
//!
//! * `config.csv` - `key,value` rows
//! * `data.csv` - `OK,0005` / `NG,0002` / `Total,0007` / `Date,2026-10-17`
//! * `data/adc_data_YYYY-MM-DD.csv` - one journal row per tested unit

use super::{CounterRecord, ResultEntry, StationStore};
use crate::common::{ConfigMap, Counters};
use chrono::NaiveDate;
use log::{debug, warn};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::string::{String, ToString};
use std::vec::Vec;
use std::{format, vec};

const CONFIG_FILE: &str = "config.csv";
const COUNTER_FILE: &str = "data.csv";
const JOURNAL_DIR: &str = "data";
const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Column headers of the daily result journal.
pub const JOURNAL_HEADER: [&str; 6] = ["No.", "Date", "Time", "ADC Value", "Status", "S/N"];

/// Errors from the file-backed store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A counter row could not be interpreted.
    #[error("invalid counter record at line {line}: {reason}")]
    InvalidRecord { line: u64, reason: &'static str },
}

/// Station state kept as CSV files under one directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn counter_path(&self) -> PathBuf {
        self.root.join(COUNTER_FILE)
    }

    /// Journal file for `date`.
    pub fn journal_path(&self, date: NaiveDate) -> PathBuf {
        self.root
            .join(JOURNAL_DIR)
            .join(format!("adc_data_{}.csv", date.format(DATE_FORMAT)))
    }

    fn write_config(&self, config: &ConfigMap) -> Result<(), StoreError> {
        write_atomically(&self.config_path(), |wtr| {
            for (key, value) in config.iter() {
                wtr.write_record([key, value])?;
            }
            Ok(())
        })
    }
}

impl StationStore for FileStore {
    type Error = StoreError;

    fn read_counter_record(&mut self) -> Result<Option<CounterRecord>, Self::Error> {
        let Some(mut rdr) = open_reader(&self.counter_path())? else {
            return Ok(None);
        };

        let (mut ok, mut ng, mut total, mut date) = (None, None, None, None);
        for result in rdr.records() {
            let record = result?;
            let line = record.position().map_or(0, |p| p.line());
            let (Some(key), Some(value)) = (record.get(0), record.get(1)) else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "OK" => ok = Some(parse_count(value, line)?),
                "NG" => ng = Some(parse_count(value, line)?),
                "Total" => total = Some(parse_count(value, line)?),
                "Date" => {
                    date = Some(NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
                        StoreError::InvalidRecord { line, reason: "date is not YYYY-MM-DD" }
                    })?)
                }
                other => debug!("Ignoring counter row {:?}", other),
            }
        }

        let counters = Counters::new(ok.unwrap_or(0), ng.unwrap_or(0));
        if total.is_some_and(|t| t != counters.total()) {
            warn!(
                "Stored total {:?} does not match OK+NG {}; using OK+NG",
                total,
                counters.total()
            );
        }
        Ok(Some(CounterRecord { counters, date }))
    }

    fn write_counter_record(&mut self, record: &CounterRecord) -> Result<(), Self::Error> {
        let c = record.counters;
        write_atomically(&self.counter_path(), |wtr| {
            wtr.write_record(["OK", format!("{:04}", c.ok()).as_str()])?;
            wtr.write_record(["NG", format!("{:04}", c.ng()).as_str()])?;
            wtr.write_record(["Total", format!("{:04}", c.total()).as_str()])?;
            if let Some(date) = record.date {
                wtr.write_record(["Date", date.format(DATE_FORMAT).to_string().as_str()])?;
            }
            Ok(())
        })
    }

    fn read_config(&mut self) -> Result<ConfigMap, Self::Error> {
        let Some(mut rdr) = open_reader(&self.config_path())? else {
            return Ok(ConfigMap::new());
        };
        let mut rows = Vec::new();
        for result in rdr.records() {
            rows.push(result?);
        }
        Ok(ConfigMap::from_rows(rows.iter()))
    }

    fn upsert_config_value(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
        let mut config = self.read_config()?;
        config.upsert(key, value);
        self.write_config(&config)
    }

    fn append_result(&mut self, entry: &ResultEntry<'_>) -> Result<(), Self::Error> {
        let date = entry.timestamp.date();
        let path = self.journal_path(date);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let existing = read_journal_rows(&path)?;
        let mut row_count = existing.as_ref().map_or(0, |j| j.rows.len());
        if let Some(journal) = existing.filter(|j| !j.header_ok) {
            debug!("Upgrading journal header in {}", path.display());
            let rows = upgrade_rows(journal.rows, date);
            row_count = rows.len();
            write_atomically(&path, |wtr| {
                wtr.write_record(JOURNAL_HEADER)?;
                for row in &rows {
                    wtr.write_record(row)?;
                }
                Ok(())
            })?;
        }

        let write_header = fs::metadata(&path).map_or(true, |m| m.len() == 0);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(file);
        if write_header {
            wtr.write_record(JOURNAL_HEADER)?;
        }
        wtr.write_record([
            (row_count + 1).to_string(),
            date.format(DATE_FORMAT).to_string(),
            entry.timestamp.format(TIME_FORMAT).to_string(),
            entry.adc_reading.unwrap_or_default().to_string(),
            entry.status.as_str().to_string(),
            entry.serial.unwrap_or_default().to_string(),
        ])?;
        wtr.flush()?;
        Ok(())
    }
}

// --- Internal helpers ---

fn open_reader(path: &Path) -> Result<Option<csv::Reader<File>>, StoreError> {
    match File::open(path) {
        Ok(file) => Ok(Some(
            csv::ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_reader(file),
        )),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_count(value: &str, line: u64) -> Result<u32, StoreError> {
    value
        .parse()
        .map_err(|_| StoreError::InvalidRecord { line, reason: "count is not a number" })
}

/// Writes through a sibling temp file and renames it over `path`, so readers never
/// observe a half-written file.
fn write_atomically<F>(path: &Path, fill: F) -> Result<(), StoreError>
where
    F: FnOnce(&mut csv::Writer<File>) -> Result<(), csv::Error>,
{
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let file = File::create(&tmp_path)?;
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(file);
    fill(&mut wtr)?;
    let file = wtr.into_inner().map_err(|e| StoreError::Io(e.into_error()))?;
    file.sync_all()?;
    drop(file);
    fs::rename(&tmp_path, path)?;
    Ok(())
}

struct JournalRows {
    header_ok: bool,
    rows: Vec<Vec<String>>,
}

fn read_journal_rows(path: &Path) -> Result<Option<JournalRows>, StoreError> {
    let Some(mut rdr) = open_reader(path)? else {
        return Ok(None);
    };
    let mut records = rdr.records();
    let header_ok = match records.next() {
        Some(header) => {
            let header = header?;
            header.len() == JOURNAL_HEADER.len()
                && header
                    .iter()
                    .zip(JOURNAL_HEADER)
                    .all(|(h, want)| h.trim().eq_ignore_ascii_case(want))
        }
        // Empty file: a header is written with the first row
        None => true,
    };
    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(ToString::to_string).collect());
    }
    Ok(Some(JournalRows { header_ok, rows }))
}

/// Maps rows written by older station versions onto the six journal columns.
///
/// Four columns (`No., Time, ADC Value, Result`) gain the file's date and an empty S/N;
/// five columns gain an empty S/N; anything else is padded or cut to six.
fn upgrade_rows(rows: Vec<Vec<String>>, date: NaiveDate) -> Vec<Vec<String>> {
    let date = date.format(DATE_FORMAT).to_string();
    rows.into_iter()
        .map(|mut row| match row.len() {
            4 => vec![
                row[0].clone(),
                date.clone(),
                row[1].clone(),
                row[2].clone(),
                row[3].clone(),
                String::new(),
            ],
            _ => {
                row.resize(JOURNAL_HEADER.len(), String::new());
                row
            }
        })
        .collect()
}
