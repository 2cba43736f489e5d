//! Postcode normalization and region extraction.
//!
//! Postcodes are compared in a canonical form: surrounding whitespace removed
//! and letters uppercased. A region is the leading run of one or two ASCII
//! letters (the UK postcode area), e.g. `"NW"` for `"nw1 6xe"`.

/// Return the canonical form of `postcode`.
///
/// # Examples
/// ```
/// use nodal_core::postcode::normalize_postcode;
///
/// assert_eq!(normalize_postcode("  b37 7gt "), "B37 7GT");
/// ```
#[must_use]
pub fn normalize_postcode(postcode: &str) -> String {
    postcode.trim().to_uppercase()
}

/// Extract the region code (postcode area) from `postcode`.
///
/// Returns `None` when the normalized postcode does not start with a letter.
///
/// # Examples
/// ```
/// use nodal_core::postcode::region_code;
///
/// assert_eq!(region_code("NW1 6XE").as_deref(), Some("NW"));
/// assert_eq!(region_code("b37 7gt").as_deref(), Some("B"));
/// assert_eq!(region_code("123"), None);
/// ```
#[must_use]
pub fn region_code(postcode: &str) -> Option<String> {
    let area: String = normalize_postcode(postcode)
        .chars()
        .take_while(char::is_ascii_alphabetic)
        .take(2)
        .collect();
    if area.is_empty() { None } else { Some(area) }
}
