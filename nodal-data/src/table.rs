//! CSV encoding shared by the dispatch list and the history log.

use std::io;

use serde::Serialize;

/// Encode `rows` as CSV text, led by a header row when `with_header` is set.
pub(crate) fn to_csv<T: Serialize>(rows: &[T], with_header: bool) -> Result<String, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(with_header)
        .from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|err| csv::Error::from(io::Error::new(io::ErrorKind::InvalidData, err)))
}
