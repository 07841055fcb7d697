//! Append-only run history.
//!
//! The driver hands one [`StepRecord`] per step to a [`HistorySink`]. A sink
//! failure is reported back to the driver, which logs it and keeps running;
//! history is never allowed to stop the simulation.
//!
//! [`CsvHistoryWriter`] writes the semicolon-separated report file.
//! [`MemoryHistory`] keeps records in memory.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use meltdown_types::StepRecord;

/// Header line of the CSV report.
pub const CSV_HEADER: &str = "step;settlement_count;reactor_count;wind_direction;total_population;total_energy_demand;active_reactors";

/// Errors raised by history sinks.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// Writing to the underlying output failed.
    #[error("history I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Creating the report file failed.
    #[error("failed to create history file {}: {source}", path.display())]
    Create {
        /// The file that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// Destination for per-step history records.
pub trait HistorySink: Send {
    /// Append one record.
    fn record(&mut self, record: &StepRecord) -> Result<(), HistoryError>;

    /// Flush buffered output. The default does nothing.
    fn finish(&mut self) -> Result<(), HistoryError> {
        Ok(())
    }
}

/// Sink that discards every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHistory;

impl HistorySink for NullHistory {
    fn record(&mut self, _record: &StepRecord) -> Result<(), HistoryError> {
        Ok(())
    }
}

/// Sink that keeps every record in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    records: Vec<StepRecord>,
}

impl MemoryHistory {
    /// Create an empty history.
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Records received so far, in step order.
    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }
}

impl HistorySink for MemoryHistory {
    fn record(&mut self, record: &StepRecord) -> Result<(), HistoryError> {
        self.records.push(*record);
        Ok(())
    }
}

/// Semicolon-separated history writer.
///
/// The header is written on construction, so even a run with no steps
/// leaves a well-formed file. Each record is flushed as it is written.
#[derive(Debug)]
pub struct CsvHistoryWriter<W: Write> {
    out: W,
    rows: u64,
}

impl<W: Write> CsvHistoryWriter<W> {
    /// Wrap `out` and write the header line.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Io`] if the header cannot be written.
    pub fn new(mut out: W) -> Result<Self, HistoryError> {
        writeln!(out, "{CSV_HEADER}")?;
        Ok(Self { out, rows: 0 })
    }

    /// Number of records written.
    pub const fn rows(&self) -> u64 {
        self.rows
    }

    /// Consume the writer and return the underlying output.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl CsvHistoryWriter<BufWriter<File>> {
    /// Create a timestamped report file in `dir`, creating the directory if
    /// needed.
    ///
    /// Returns the writer and the path of the new file.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Create`] if the directory or file cannot be
    /// created, or [`HistoryError::Io`] if the header cannot be written.
    pub fn create_in<Tz>(dir: &Path, at: &DateTime<Tz>) -> Result<(Self, PathBuf), HistoryError>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let path = dir.join(history_file_name(at));
        fs::create_dir_all(dir).map_err(|source| HistoryError::Create {
            path: dir.to_path_buf(),
            source,
        })?;
        let file = File::create(&path).map_err(|source| HistoryError::Create {
            path: path.clone(),
            source,
        })?;
        let writer = Self::new(BufWriter::new(file))?;
        Ok((writer, path))
    }
}

impl<W: Write + Send> HistorySink for CsvHistoryWriter<W> {
    fn record(&mut self, record: &StepRecord) -> Result<(), HistoryError> {
        writeln!(self.out, "{}", format_record(record))?;
        self.out.flush()?;
        self.rows = self.rows.saturating_add(1);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), HistoryError> {
        self.out.flush()?;
        Ok(())
    }
}

/// Report file name for a run started at `at`: `report_YYYY-MM-DD_HH-MM-SS.csv`.
pub fn history_file_name<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    at.format("report_%Y-%m-%d_%H-%M-%S.csv").to_string()
}

/// One CSV row, without the trailing newline. Demand is printed with two
/// decimals.
pub fn format_record(record: &StepRecord) -> String {
    format!(
        "{};{};{};{};{};{:.2};{}",
        record.step,
        record.settlement_count,
        record.reactor_count,
        record.wind_direction.label(),
        record.total_population,
        record.total_energy_demand,
        record.active_reactor_count,
    )
}
