//! Driver dispatch lists for accepted van runs.
//!
//! A list is a CSV file with the columns
//! `order_id,postcode,weight_kg,volume_m3,quantity`, in loading order.

use camino::{Utf8Path, Utf8PathBuf};
use chrono::NaiveDateTime;
use nodal_core::SelectionResult;
use serde::Serialize;
use thiserror::Error;

use crate::table;

/// Errors raised while exporting a dispatch list.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Only accepted runs have a dispatch list.
    #[error("region {region} has no accepted van run to dispatch")]
    NotAccepted {
        /// Region code.
        region: String,
    },
    /// The list could not be encoded.
    #[error("failed to encode dispatch list")]
    Encode(#[source] csv::Error),
    /// The list could not be written.
    #[error("failed to write dispatch list {path}")]
    Write {
        /// Target path.
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One line of the driver's list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchEntry<'a> {
    /// Order identifier.
    pub order_id: &'a str,
    /// Delivery postcode.
    pub postcode: &'a str,
    /// Row weight in kilograms.
    pub weight_kg: f64,
    /// Row volume in cubic metres.
    pub volume_m3: f64,
    /// Number of items.
    pub quantity: u32,
}

/// Entries for every order on the van, in loading order.
#[must_use]
pub fn dispatch_entries(selection: &SelectionResult) -> Vec<DispatchEntry<'_>> {
    selection
        .orders()
        .iter()
        .map(|routed| DispatchEntry {
            order_id: routed.order.id(),
            postcode: routed.order.postcode(),
            weight_kg: routed.order.weight(),
            volume_m3: routed.order.volume(),
            quantity: routed.order.quantity(),
        })
        .collect()
}

/// File name for a region's list, e.g. `dispatch_NW_20250314_0745.csv`.
#[must_use]
pub fn dispatch_file_name(region: &str, at: NaiveDateTime) -> String {
    format!("dispatch_{region}_{}.csv", at.format("%Y%m%d_%H%M"))
}

/// Write the dispatch list for `selection` into `dir`.
///
/// Returns the path written.
///
/// # Errors
/// Returns [`DispatchError::NotAccepted`] for a rejected selection, or an
/// encoding or IO error.
pub fn write_dispatch_list(
    dir: &Utf8Path,
    region: &str,
    at: NaiveDateTime,
    selection: &SelectionResult,
) -> Result<Utf8PathBuf, DispatchError> {
    if !selection.is_accepted() {
        return Err(DispatchError::NotAccepted {
            region: region.to_owned(),
        });
    }
    let body = table::to_csv(&dispatch_entries(selection), true).map_err(DispatchError::Encode)?;
    let path = dir.join(dispatch_file_name(region, at));
    nodal_fs::write_utf8_file(&path, &body).map_err(|source| DispatchError::Write {
        path: path.clone(),
        source,
    })?;
    log::info!(
        "wrote {} dispatch entries to {path}",
        selection.orders().len()
    );
    Ok(path)
}
