//! Data access for the Nodal decision engine.
//!
//! Responsibilities:
//! - Load daily order manifests into validated [`nodal_core::Order`] values.
//! - Resolve depot routes through the Distance Matrix HTTP backend.
//! - Export driver dispatch lists and keep the run history log.
//!
//! Boundaries:
//! - Do not encode decision rules (they live in `nodal-core`).
//! - Keep credentials out of logs, errors and `Debug` output.

pub mod dispatch;
pub mod history;
pub mod manifest;
pub mod routing;
mod table;

pub use dispatch::{
    DispatchEntry, DispatchError, dispatch_entries, dispatch_file_name, write_dispatch_list,
};
pub use history::{DEFAULT_HISTORY_PATH, HistoryLog, HistoryLogError};
pub use manifest::{
    Manifest, ManifestError, ManifestFormat, SkipReason, SkippedRecord, load_manifest,
    parse_manifest,
};
