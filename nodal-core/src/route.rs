//! Road data from the depot to a postcode.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Road distance and drive time from the depot to one postcode.
///
/// Values are rounded to two decimal places when produced by
/// [`RouteDataProvider`](crate::RouteDataProvider).
///
/// # Examples
/// ```
/// use nodal_core::RouteData;
///
/// let route = RouteData::new(81.37, 92.5);
/// assert_eq!(route.distance_miles, 81.37);
/// assert_eq!(route.duration_minutes, 92.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteData {
    /// Road distance in miles.
    pub distance_miles: f64,
    /// Drive time in minutes, traffic-aware where available.
    pub duration_minutes: f64,
}

impl RouteData {
    /// Construct route data from a distance and a duration.
    #[must_use]
    pub const fn new(distance_miles: f64, duration_minutes: f64) -> Self {
        Self {
            distance_miles,
            duration_minutes,
        }
    }
}
