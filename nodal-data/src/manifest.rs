//! Carrier manifest ingestion.
//!
//! Manifests arrive as CSV exports or JSON arrays of flat records whose
//! column names follow each carrier's own naming. Names are lowercased and
//! trimmed, then mapped to the canonical fields through [`COLUMN_ALIASES`].
//! Numbers may be numeric cells or numeric strings; anything unparseable
//! falls back to the field default.
//!
//! Per-item weight and injected volume are scaled by the row's item count.
//! When the heaviest row exceeds [`GRAMS_THRESHOLD`] the whole manifest is
//! assumed to be in grams.

use std::collections::HashMap;

use camino::{Utf8Path, Utf8PathBuf};
use nodal_core::{Order, OrderError};
use serde_json::Value;
use thiserror::Error;

/// Weight above which a manifest is taken to be in grams.
pub const GRAMS_THRESHOLD: f64 = 500.0;

/// Volume assumed for one item when the manifest has no volume column.
pub const DEFAULT_ITEM_VOLUME_M3: f64 = 0.1;

/// Carrier column names accepted for each canonical field, in priority order.
///
/// The canonical name itself is always accepted first.
pub const COLUMN_ALIASES: [(&str, &[&str]); 5] = [
    (
        "order_id",
        &[
            "consignment number",
            "barcode",
            "tracking number",
            "manifest number",
        ],
    ),
    (
        "courier_cost_gbp",
        &[
            "consignment price",
            "total rate",
            "charge",
            "price",
            "invoice rate",
        ],
    ),
    (
        "postcode",
        &[
            "delivery post code",
            "destination postcode",
            "postcode",
            "delivery postcode",
        ],
    ),
    (
        "weight_kg",
        &[
            "consignment weight",
            "weight",
            "parcel weight",
            "actual weight",
        ],
    ),
    (
        "quantity",
        &["number of items", "pieces", "qty", "count", "item count"],
    ),
];

/// Canonical row-total volume column.
const VOLUME_TOTAL_KEY: &str = "volume_m3";

/// Per-item volume column used by EVRi manifests.
const VOLUME_PER_ITEM_KEY: &str = "volume";

/// Layout of a manifest file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    /// Comma-separated export with a header row.
    Csv,
    /// JSON array of flat records.
    Json,
}

impl ManifestFormat {
    /// Format named by the extension of `path`, ignoring case.
    ///
    /// # Errors
    /// Returns [`ManifestError::UnsupportedFormat`] for anything other than
    /// `.csv` or `.json`.
    pub fn from_path(path: &Utf8Path) -> Result<Self, ManifestError> {
        match path.extension().map(str::to_ascii_lowercase).as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::Json),
            _ => Err(ManifestError::UnsupportedFormat {
                path: path.to_owned(),
            }),
        }
    }
}

/// Errors raised while loading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The file extension names no known manifest layout.
    #[error("unsupported manifest {path}; expected a .csv or .json file")]
    UnsupportedFormat {
        /// Manifest path.
        path: Utf8PathBuf,
    },
    /// The manifest file could not be read.
    #[error("failed to read manifest {path}")]
    Read {
        /// Manifest path.
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The manifest is not valid JSON.
    #[error("manifest is not valid JSON")]
    Parse(#[source] serde_json::Error),
    /// The CSV header row could not be read.
    #[error("manifest has no readable CSV header")]
    Csv(#[source] csv::Error),
    /// The manifest is not an array of records.
    #[error("manifest must be a JSON array of records")]
    NotAnArray,
}

/// A record that could not become an [`Order`].
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    /// Zero-based record position, not counting a CSV header row.
    pub index: usize,
    /// Why the record was dropped.
    pub reason: SkipReason,
}

/// Reasons for dropping a manifest record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkipReason {
    /// The record is not a JSON object.
    #[error("record is not an object")]
    NotAnObject,
    /// The CSV row has more cells than the header names.
    #[error("row has {found} cells but the header names {expected}")]
    ExtraCells {
        /// Cells on the row.
        found: usize,
        /// Columns in the header.
        expected: usize,
    },
    /// The CSV row could not be read.
    #[error("row is unreadable: {detail}")]
    Unreadable {
        /// Reader error text.
        detail: String,
    },
    /// No recognised identifier column.
    #[error("record has no order identifier")]
    MissingId,
    /// No recognised postcode column.
    #[error("record has no postcode")]
    MissingPostcode,
    /// The values did not form a valid order.
    #[error(transparent)]
    Invalid(#[from] OrderError),
}

/// Orders read from one manifest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    /// Valid orders in manifest order.
    pub orders: Vec<Order>,
    /// Records that were dropped.
    pub skipped: Vec<SkippedRecord>,
    /// Whether weights were converted from grams.
    pub weights_in_grams: bool,
}

/// Read and normalize the manifest at `path`.
///
/// The layout is chosen by [`ManifestFormat::from_path`].
///
/// # Errors
/// Returns [`ManifestError`] when the extension is unknown, the file cannot
/// be read or its structure is malformed. Individual bad records are
/// skipped, not reported as errors.
pub fn load_manifest(path: &Utf8Path) -> Result<Manifest, ManifestError> {
    let format = ManifestFormat::from_path(path)?;
    let text = nodal_fs::read_utf8_file(path).map_err(|source| ManifestError::Read {
        path: path.to_owned(),
        source,
    })?;
    let manifest = parse_manifest(&text, format)?;
    log::info!(
        "loaded {} orders from {path} ({} skipped)",
        manifest.orders.len(),
        manifest.skipped.len()
    );
    Ok(manifest)
}

/// Normalize a manifest held in memory.
///
/// # Errors
/// For JSON, returns [`ManifestError::Parse`] for malformed input and
/// [`ManifestError::NotAnArray`] when the top level is not an array. For
/// CSV, returns [`ManifestError::Csv`] when the header row is unreadable.
///
/// # Examples
/// ```
/// use nodal_data::manifest::{ManifestFormat, parse_manifest};
///
/// # fn main() -> Result<(), nodal_data::manifest::ManifestError> {
/// let csv = "Consignment Number,Consignment Price,Delivery Post Code,Consignment Weight,Number of Items\n\
///            DX1,12.50,nw1 6xe,2400,2\n";
/// let manifest = parse_manifest(csv, ManifestFormat::Csv)?;
/// let order = &manifest.orders[0];
/// assert_eq!(order.postcode(), "NW1 6XE");
/// assert!((order.weight() - 4.8).abs() < 1e-9);
/// assert!((order.volume() - 0.2).abs() < 1e-9);
/// # Ok(())
/// # }
/// ```
pub fn parse_manifest(text: &str, format: ManifestFormat) -> Result<Manifest, ManifestError> {
    match format {
        ManifestFormat::Csv => parse_csv(text),
        ManifestFormat::Json => parse_json(text),
    }
}

fn parse_json(json: &str) -> Result<Manifest, ManifestError> {
    let value: Value = serde_json::from_str(json).map_err(ManifestError::Parse)?;
    let Value::Array(records) = value else {
        return Err(ManifestError::NotAnArray);
    };
    let rows = records
        .iter()
        .enumerate()
        .map(|(index, record)| (index, RawRow::extract(record)));
    Ok(normalize(rows))
}

fn parse_csv(text: &str) -> Result<Manifest, ManifestError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .map_err(ManifestError::Csv)?
        .iter()
        .map(str::to_owned)
        .collect();
    let rows = reader.records().enumerate().map(|(index, record)| {
        let row = match record {
            Ok(record) if record.len() > headers.len() => Err(SkipReason::ExtraCells {
                found: record.len(),
                expected: headers.len(),
            }),
            Ok(record) => {
                let cells: Vec<Value> = record
                    .iter()
                    .map(|cell| Value::String(cell.to_owned()))
                    .collect();
                RawRow::from_fields(&field_map(
                    headers.iter().map(String::as_str).zip(cells.iter()),
                ))
            }
            Err(err) => Err(SkipReason::Unreadable {
                detail: err.to_string(),
            }),
        };
        (index, row)
    });
    Ok(normalize(rows))
}

/// Apply unit conversion to extracted rows and collect the orders.
fn normalize(rows: impl Iterator<Item = (usize, Result<RawRow, SkipReason>)>) -> Manifest {
    let mut skipped = Vec::new();
    let mut extracted = Vec::new();
    for (index, row) in rows {
        match row {
            Ok(row) => extracted.push((index, row)),
            Err(reason) => skipped.push(SkippedRecord { index, reason }),
        }
    }

    let heaviest = extracted
        .iter()
        .map(|(_, row)| row.weight)
        .fold(0.0, f64::max);
    let weights_in_grams = heaviest > GRAMS_THRESHOLD;
    if weights_in_grams {
        log::info!("heaviest row weighs {heaviest}; treating manifest weights as grams");
    }

    let mut orders = Vec::with_capacity(extracted.len());
    for (index, row) in extracted {
        match row.into_order(weights_in_grams) {
            Ok(order) => orders.push(order),
            Err(err) => skipped.push(SkippedRecord {
                index,
                reason: SkipReason::Invalid(err),
            }),
        }
    }

    skipped.sort_by_key(|record| record.index);
    for record in &skipped {
        log::warn!("skipping manifest record {}: {}", record.index, record.reason);
    }
    Manifest {
        orders,
        skipped,
        weights_in_grams,
    }
}

/// Column names lowercased and trimmed; the first column of a name wins.
fn field_map<'a>(
    pairs: impl IntoIterator<Item = (&'a str, &'a Value)>,
) -> HashMap<String, &'a Value> {
    let mut fields = HashMap::new();
    for (name, value) in pairs {
        fields.entry(name.trim().to_lowercase()).or_insert(value);
    }
    fields
}

/// Volume column found on a record.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Volume {
    /// Whole-row volume, used as is.
    RowTotal(f64),
    /// Volume of one item, scaled by quantity.
    PerItem(f64),
}

/// Field values of one record before unit conversion.
#[derive(Debug)]
struct RawRow {
    id: String,
    courier_cost: f64,
    postcode: String,
    weight: f64,
    quantity: u32,
    volume: Volume,
}

impl RawRow {
    fn extract(record: &Value) -> Result<Self, SkipReason> {
        let Value::Object(map) = record else {
            return Err(SkipReason::NotAnObject);
        };
        Self::from_fields(&field_map(map.iter().map(|(key, value)| (key.as_str(), value))))
    }

    fn from_fields(fields: &HashMap<String, &Value>) -> Result<Self, SkipReason> {
        let id = text(lookup(fields, "order_id")).ok_or(SkipReason::MissingId)?;
        let postcode = text(lookup(fields, "postcode")).ok_or(SkipReason::MissingPostcode)?;
        let quantity = quantity(lookup(fields, "quantity"));
        let volume = match number(fields.get(VOLUME_TOTAL_KEY).copied()) {
            Some(total) => Volume::RowTotal(total),
            None => Volume::PerItem(
                number(fields.get(VOLUME_PER_ITEM_KEY).copied()).unwrap_or(DEFAULT_ITEM_VOLUME_M3),
            ),
        };

        Ok(Self {
            id,
            courier_cost: number(lookup(fields, "courier_cost_gbp")).unwrap_or(0.0),
            postcode,
            weight: number(lookup(fields, "weight_kg")).unwrap_or(0.0),
            quantity,
            volume,
        })
    }

    fn into_order(self, weights_in_grams: bool) -> Result<Order, OrderError> {
        let items = f64::from(self.quantity);
        let unit_weight = if weights_in_grams {
            self.weight / 1000.0
        } else {
            self.weight
        };
        let volume = match self.volume {
            Volume::RowTotal(total) => total,
            Volume::PerItem(each) => each * items,
        };
        Order::new(
            self.id,
            self.courier_cost,
            &self.postcode,
            unit_weight * items,
            volume,
            self.quantity,
        )
    }
}

/// First value present under `canonical` or one of its aliases.
fn lookup<'a>(fields: &HashMap<String, &'a Value>, canonical: &str) -> Option<&'a Value> {
    if let Some(value) = fields.get(canonical) {
        return Some(*value);
    }
    COLUMN_ALIASES
        .iter()
        .find(|(name, _)| *name == canonical)
        .and_then(|(_, aliases)| aliases.iter().find_map(|alias| fields.get(*alias)))
        .copied()
}

fn text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_owned(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn number(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

/// Item count; missing or unparseable counts default to one.
fn quantity(value: Option<&Value>) -> u32 {
    match number(value) {
        Some(count) if count >= 0.0 && count.fract() == 0.0 && count <= f64::from(u32::MAX) => {
            count as u32
        }
        Some(count) => {
            log::warn!("unusable item count {count}; assuming 1");
            1
        }
        None => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn json_manifest(json: &str) -> Result<Manifest, ManifestError> {
        parse_manifest(json, ManifestFormat::Json)
    }

    fn single(json: &str) -> Order {
        let manifest = json_manifest(json).expect("valid manifest");
        assert_eq!(manifest.orders.len(), 1, "skipped: {:?}", manifest.skipped);
        manifest.orders.into_iter().next().expect("one order")
    }

    #[rstest]
    fn canonical_columns_are_used_as_is() {
        let order = single(
            r#"[{"order_id":"A1","courier_cost_gbp":9.5,"postcode":"B1 1AA",
                "weight_kg":3.0,"volume_m3":0.4,"quantity":2}]"#,
        );
        assert_eq!(order.id(), "A1");
        assert!((order.courier_cost() - 9.5).abs() < 1e-9);
        assert!((order.weight() - 6.0).abs() < 1e-9);
        assert!((order.volume() - 0.4).abs() < 1e-9);
        assert_eq!(order.quantity(), 2);
    }

    #[rstest]
    #[case("Consignment Number", "Total Rate", "Destination Postcode", "Parcel Weight", "Pieces")]
    #[case(" BARCODE ", "Invoice Rate", "Delivery Postcode", "Actual Weight", "Item Count")]
    #[case("Tracking Number", "Charge", "Postcode", "Weight", "Qty")]
    fn carrier_aliases_are_recognised(
        #[case] id: &str,
        #[case] cost: &str,
        #[case] postcode: &str,
        #[case] weight: &str,
        #[case] quantity: &str,
    ) {
        let json = format!(
            r#"[{{"{id}":"X9","{cost}":"14.20","{postcode}":" le1 1aa ","{weight}":"2.5","{quantity}":3}}]"#
        );
        let order = single(&json);
        assert_eq!(order.id(), "X9");
        assert_eq!(order.postcode(), "LE1 1AA");
        assert!((order.courier_cost() - 14.2).abs() < 1e-9);
        assert!((order.weight() - 7.5).abs() < 1e-9);
        assert_eq!(order.quantity(), 3);
    }

    #[rstest]
    fn earlier_alias_wins() {
        let order = single(
            r#"[{"Tracking Number":"later","Consignment Number":"first","Postcode":"B1 1AA"}]"#,
        );
        assert_eq!(order.id(), "first");
    }

    #[rstest]
    fn heavy_manifest_is_converted_from_grams() {
        let manifest = json_manifest(
            r#"[{"order_id":"a","postcode":"B1 1AA","weight_kg":1200},
                {"order_id":"b","postcode":"B1 1AB","weight_kg":300,"quantity":2}]"#,
        )
        .expect("valid manifest");
        assert!(manifest.weights_in_grams);
        assert!((manifest.orders[0].weight() - 1.2).abs() < 1e-9);
        assert!((manifest.orders[1].weight() - 0.6).abs() < 1e-9);
    }

    #[rstest]
    fn light_manifest_stays_in_kilograms() {
        let manifest = json_manifest(r#"[{"order_id":"a","postcode":"B1 1AA","weight_kg":500}]"#)
            .expect("valid manifest");
        assert!(!manifest.weights_in_grams);
        assert!((manifest.orders[0].weight() - 500.0).abs() < 1e-9);
    }

    #[rstest]
    #[case(r#""volume":0.25,"quantity":4"#, 1.0)]
    #[case(r#""quantity":3"#, 0.3)]
    #[case(r#""volume_m3":0.5,"quantity":3"#, 0.5)]
    #[case(r#""volume":"n/a""#, 0.1)]
    fn volume_defaults_and_scaling(#[case] fields: &str, #[case] expected: f64) {
        let json = format!(r#"[{{"order_id":"a","postcode":"B1 1AA",{fields}}}]"#);
        let order = single(&json);
        assert!((order.volume() - expected).abs() < 1e-9);
    }

    #[rstest]
    #[case(r#""quantity":"lots""#, 1)]
    #[case(r#""quantity":2.5"#, 1)]
    #[case(r#""quantity":"4""#, 4)]
    fn unparseable_numbers_fall_back(#[case] fields: &str, #[case] expected: u32) {
        let json = format!(
            r#"[{{"order_id":"a","postcode":"B1 1AA","courier_cost_gbp":"£3",{fields}}}]"#
        );
        let order = single(&json);
        assert_eq!(order.quantity(), expected);
        assert_eq!(order.courier_cost(), 0.0);
    }

    #[rstest]
    fn bad_records_are_skipped_in_order() {
        let manifest = json_manifest(
            r#"[{"postcode":"B1 1AA"},
                {"order_id":"ok","postcode":"B1 1AA"},
                "junk",
                {"order_id":"no-postcode","postcode":"  "},
                {"order_id":"none","postcode":"B1 1AA","quantity":0},
                {"order_id":"neg","postcode":"B1 1AA","weight_kg":-2}]"#,
        )
        .expect("valid manifest");
        assert_eq!(manifest.orders.len(), 1);
        let reasons: Vec<_> = manifest
            .skipped
            .iter()
            .map(|s| (s.index, s.reason.clone()))
            .collect();
        assert_eq!(reasons[0], (0, SkipReason::MissingId));
        assert_eq!(reasons[1], (2, SkipReason::NotAnObject));
        assert_eq!(reasons[2], (3, SkipReason::MissingPostcode));
        assert!(matches!(
            reasons[3],
            (4, SkipReason::Invalid(OrderError::ZeroItems { .. }))
        ));
        assert!(matches!(
            reasons[4],
            (5, SkipReason::Invalid(OrderError::InvalidMeasure { .. }))
        ));
    }

    #[rstest]
    fn numeric_identifiers_are_accepted() {
        let order = single(r#"[{"Barcode":40012345,"Postcode":"DY1 1AB"}]"#);
        assert_eq!(order.id(), "40012345");
    }

    #[rstest]
    #[case("{}")]
    #[case("42")]
    fn top_level_must_be_an_array(#[case] json: &str) {
        assert!(matches!(json_manifest(json), Err(ManifestError::NotAnArray)));
    }

    #[rstest]
    fn malformed_json_is_an_error() {
        assert!(matches!(json_manifest("[{"), Err(ManifestError::Parse(_))));
    }

    #[rstest]
    fn dx_csv_export_is_normalized() {
        let manifest = parse_manifest(
            "Consignment Number,Consignment Price,Delivery Post Code,Consignment Weight,Number of Items\n\
             DX-1,42.10,nw1 6xe,1800,2\n\
             DX-2,\"1,050.00\",NW3 2QG,600,\n",
            ManifestFormat::Csv,
        )
        .expect("valid manifest");
        assert!(manifest.weights_in_grams);
        assert_eq!(manifest.orders.len(), 2);
        let first = &manifest.orders[0];
        assert_eq!(first.id(), "DX-1");
        assert_eq!(first.postcode(), "NW1 6XE");
        assert!((first.weight() - 3.6).abs() < 1e-9);
        assert!((first.volume() - 0.2).abs() < 1e-9);
        let second = &manifest.orders[1];
        assert_eq!(second.quantity(), 1);
        assert_eq!(second.courier_cost(), 0.0);
    }

    #[rstest]
    fn evri_csv_volume_is_per_item() {
        let manifest = parse_manifest(
            " BARCODE ,Total Rate,Destination Postcode,Weight,Pieces,Volume\n\
             EV-9,8.40,LE1 1AA,2.5,3,0.05\n",
            ManifestFormat::Csv,
        )
        .expect("valid manifest");
        let order = &manifest.orders[0];
        assert_eq!(order.id(), "EV-9");
        assert!((order.weight() - 7.5).abs() < 1e-9);
        assert!((order.volume() - 0.15).abs() < 1e-9);
    }

    #[rstest]
    fn csv_rows_are_skipped_like_json_records() {
        let manifest = parse_manifest(
            "order_id,postcode,courier_cost_gbp\n\
             ,B1 1AA,3\n\
             A1,B1 1AB,4\n\
             A2,B1 1AC,5,surplus\n\
             A3\n",
            ManifestFormat::Csv,
        )
        .expect("valid manifest");
        assert_eq!(manifest.orders.len(), 1);
        let reasons: Vec<_> = manifest
            .skipped
            .iter()
            .map(|s| (s.index, s.reason.clone()))
            .collect();
        assert_eq!(
            reasons,
            vec![
                (0, SkipReason::MissingId),
                (
                    2,
                    SkipReason::ExtraCells {
                        found: 4,
                        expected: 3
                    }
                ),
                (3, SkipReason::MissingPostcode),
            ]
        );
    }

    #[rstest]
    fn empty_csv_has_no_orders() {
        let manifest = parse_manifest("", ManifestFormat::Csv).expect("empty manifest");
        assert!(manifest.orders.is_empty());
        assert!(manifest.skipped.is_empty());
    }

    #[rstest]
    #[case("orders.csv", Some(ManifestFormat::Csv))]
    #[case("ORDERS.CSV", Some(ManifestFormat::Csv))]
    #[case("orders.json", Some(ManifestFormat::Json))]
    #[case("orders.xlsx", None)]
    #[case("orders", None)]
    fn format_follows_extension(#[case] path: &str, #[case] expected: Option<ManifestFormat>) {
        let format = ManifestFormat::from_path(Utf8Path::new(path));
        match expected {
            Some(format_expected) => assert_eq!(format.ok(), Some(format_expected)),
            None => assert!(matches!(
                format,
                Err(ManifestError::UnsupportedFormat { .. })
            )),
        }
    }
}
