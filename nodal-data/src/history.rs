//! Append-only run history stored as CSV.
//!
//! The file starts with the header
//! `Date,Total_Orders,Selected_Orders,Nodal_Cost,Courier_Saving,Net_Profit,Status,Notes`
//! and gains one row per run.

use camino::{Utf8Path, Utf8PathBuf};
use chrono::NaiveDate;
use nodal_core::{HistoryRecord, RunStatus};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::table;

/// Default history location, relative to the working directory.
pub const DEFAULT_HISTORY_PATH: &str = "data/nodal_history.csv";

/// Errors raised by [`HistoryLog`].
#[derive(Debug, Error)]
pub enum HistoryLogError {
    /// The log could not be read or written.
    #[error("failed to access history log {path}")]
    Io {
        /// Log path.
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A record could not be encoded.
    #[error("failed to encode history record")]
    Encode(#[source] csv::Error),
    /// A stored row is not a valid record.
    #[error("history log {path} line {line} is not a valid record")]
    Decode {
        /// Log path.
        path: Utf8PathBuf,
        /// One-based line number, or zero when unknown.
        line: u64,
        #[source]
        source: csv::Error,
    },
}

/// Column layout of the history file.
#[derive(Debug, Serialize, Deserialize)]
struct HistoryRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Total_Orders")]
    total_orders: usize,
    #[serde(rename = "Selected_Orders")]
    selected_orders: usize,
    #[serde(rename = "Nodal_Cost")]
    nodal_cost: f64,
    #[serde(rename = "Courier_Saving")]
    courier_saving: f64,
    #[serde(rename = "Net_Profit")]
    net_profit: f64,
    #[serde(rename = "Status")]
    status: RunStatus,
    #[serde(rename = "Notes")]
    notes: String,
}

impl From<&HistoryRecord> for HistoryRow {
    fn from(record: &HistoryRecord) -> Self {
        Self {
            date: record.date,
            total_orders: record.pool_size,
            selected_orders: record.selected_count,
            nodal_cost: record.cost,
            courier_saving: record.savings,
            net_profit: record.profit,
            status: record.status,
            notes: record.note.clone(),
        }
    }
}

impl From<HistoryRow> for HistoryRecord {
    fn from(row: HistoryRow) -> Self {
        Self {
            date: row.date,
            pool_size: row.total_orders,
            selected_count: row.selected_orders,
            cost: row.nodal_cost,
            savings: row.courier_saving,
            profit: row.net_profit,
            status: row.status,
            note: row.notes,
        }
    }
}

/// Run history file with one [`HistoryRecord`] per row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryLog {
    path: Utf8PathBuf,
}

impl HistoryLog {
    /// Use the log at `path`; nothing is touched until the first call.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the log.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Append `record`, creating the file, its header and its directories on
    /// first use.
    ///
    /// # Errors
    /// Returns [`HistoryLogError`] when the record cannot be encoded or the
    /// file cannot be written.
    pub fn append(&self, record: &HistoryRecord) -> Result<(), HistoryLogError> {
        let exists = nodal_fs::is_regular_file(&self.path).map_err(|source| self.io_error(source))?;
        let row = table::to_csv(&[HistoryRow::from(record)], !exists)
            .map_err(HistoryLogError::Encode)?;
        nodal_fs::append_utf8_file(&self.path, &row).map_err(|source| self.io_error(source))?;
        log::info!(
            "logged {} run with profit {:.2} to {}",
            record.status,
            record.profit,
            self.path
        );
        Ok(())
    }

    /// Every record in the log, oldest first. A missing log is empty.
    ///
    /// # Errors
    /// Returns [`HistoryLogError`] when the file cannot be read or a row is
    /// malformed.
    pub fn records(&self) -> Result<Vec<HistoryRecord>, HistoryLogError> {
        let exists = nodal_fs::is_regular_file(&self.path).map_err(|source| self.io_error(source))?;
        if !exists {
            return Ok(Vec::new());
        }
        let text = nodal_fs::read_utf8_file(&self.path).map_err(|source| self.io_error(source))?;
        let mut reader = csv::Reader::from_reader(text.as_bytes());
        reader
            .deserialize::<HistoryRow>()
            .map(|row| {
                row.map(HistoryRecord::from)
                    .map_err(|source| HistoryLogError::Decode {
                        path: self.path.clone(),
                        line: source.position().map_or(0, csv::Position::line),
                        source,
                    })
            })
            .collect()
    }

    fn io_error(&self, source: std::io::Error) -> HistoryLogError {
        HistoryLogError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_PATH)
    }
}
