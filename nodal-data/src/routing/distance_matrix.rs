//! Response types for the Google Distance Matrix API.
//!
//! Only the fields needed for a single origin and destination are modelled.
//!
//! See: <https://developers.google.com/maps/documentation/distance-matrix/distance-matrix>

use serde::Deserialize;

/// Top-level Distance Matrix response.
#[derive(Debug, Deserialize)]
pub struct MatrixResponse {
    /// Request status, `"OK"` on success.
    ///
    /// Common failures are `"INVALID_REQUEST"`, `"OVER_QUERY_LIMIT"`,
    /// `"REQUEST_DENIED"` and `"UNKNOWN_ERROR"`.
    pub status: String,

    /// Explanation accompanying a failed status.
    pub error_message: Option<String>,

    /// One row per origin.
    #[serde(default)]
    pub rows: Vec<MatrixRow>,
}

impl MatrixResponse {
    /// Check if the request as a whole succeeded.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == "OK"
    }

    /// The element for the first origin and first destination.
    #[must_use]
    pub fn first_element(&self) -> Option<&MatrixElement> {
        self.rows.first()?.elements.first()
    }
}

/// Results for one origin.
#[derive(Debug, Deserialize)]
pub struct MatrixRow {
    /// One element per destination.
    #[serde(default)]
    pub elements: Vec<MatrixElement>,
}

/// Route between one origin and one destination.
#[derive(Debug, Deserialize)]
pub struct MatrixElement {
    /// Element status, e.g. `"OK"`, `"NOT_FOUND"` or `"ZERO_RESULTS"`.
    pub status: String,
    /// Road distance in metres.
    pub distance: Option<Measure>,
    /// Free-flow drive time in seconds.
    pub duration: Option<Measure>,
    /// Traffic-aware drive time in seconds; present when a departure time
    /// was requested.
    pub duration_in_traffic: Option<Measure>,
}

impl MatrixElement {
    /// Check if a route was found.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == "OK"
    }
}

/// A value with its human-readable rendering.
#[derive(Debug, Deserialize)]
pub struct Measure {
    /// Value in metres or seconds.
    pub value: f64,
}
