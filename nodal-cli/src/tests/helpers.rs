//! Test helpers for building manifests and stubbing route lookups.

use crate::CliError;
use crate::analyse::{AnalyseConfig, RoutingBackendBuilder};
use camino::{Utf8Path, Utf8PathBuf};
use nodal_core::RoutingBackend;
use nodal_core::test_support::StubRoutingBackend;
use tempfile::TempDir;

/// Three profitable NW orders, one low-value B order and one record without
/// an identifier.
pub(super) const MANIFEST: &str = r#"[
  {"Consignment Number": "C-101", "Consignment Price": 120, "Delivery Post Code": "NW1 6XE", "Consignment Weight": 18, "Number of Items": 1},
  {"Consignment Number": "C-102", "Consignment Price": 95, "Delivery Post Code": "NW3 2QG", "Consignment Weight": 22, "Number of Items": 2},
  {"Consignment Number": "C-103", "Consignment Price": 80, "Delivery Post Code": "NW1 6XE", "Consignment Weight": 9, "Number of Items": 1},
  {"Consignment Number": "C-201", "Consignment Price": 14, "Delivery Post Code": "B37 7GT", "Consignment Weight": 4, "Number of Items": 1},
  {"Consignment Number": "", "Consignment Price": 30, "Delivery Post Code": "LE1 1AA", "Consignment Weight": 5}
]"#;

/// The orders of [`MANIFEST`] as a DX-style CSV export.
pub(super) const MANIFEST_CSV: &str = "\
Consignment Number,Consignment Price,Delivery Post Code,Consignment Weight,Number of Items
C-101,120,NW1 6XE,18,1
C-102,95,NW3 2QG,22,2
C-103,80,NW1 6XE,9,1
C-201,14,B37 7GT,4,1
,30,LE1 1AA,5,
";

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    let text = std::str::from_utf8(contents).expect("utf-8 contents");
    nodal_fs::write_utf8_file(path, text).expect("write test file");
}

/// Temporary directory holding the same manifest as JSON and as CSV.
pub(super) struct Workspace {
    _tmp: TempDir,
    pub(super) root: Utf8PathBuf,
    pub(super) manifest: Utf8PathBuf,
    pub(super) csv_manifest: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let tmp = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
        let manifest = root.join("manifest.json");
        write_utf8(&manifest, MANIFEST.as_bytes());
        let csv_manifest = root.join("manifest.csv");
        write_utf8(&csv_manifest, MANIFEST_CSV.as_bytes());
        Self {
            _tmp: tmp,
            root,
            manifest,
            csv_manifest,
        }
    }
}

/// Routes for every postcode in [`MANIFEST`].
pub(super) fn stub_backend() -> StubRoutingBackend {
    StubRoutingBackend::new()
        .with_traffic_route("NW1 6XE", 130_000.0, 5_400.0, 6_300.0)
        .with_route("NW3 2QG", 128_000.0, 5_300.0)
        .with_route("B37 7GT", 72_420.0, 3_600.0)
        .with_route("LE1 1AA", 140_000.0, 6_000.0)
}

/// Builder that hands out [`stub_backend`] and never needs an API key.
pub(super) struct StubBackendBuilder;

impl RoutingBackendBuilder for StubBackendBuilder {
    fn build(&self, _config: &AnalyseConfig) -> Result<Box<dyn RoutingBackend>, CliError> {
        Ok(Box::new(stub_backend()))
    }
}
