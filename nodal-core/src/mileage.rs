//! Route length estimation without a routing solver.
//!
//! A van route is modelled as a stem (depot to region and back) plus a local
//! loop whose length grows linearly with the number of drops. Summing
//! point-to-point distances instead would count the stem once per stop.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{count_as_f64, round_to_hundredths};

/// Average distance between neighbouring drops in dense delivery areas, in
/// miles.
pub const DEFAULT_LOCAL_DROP_DENSITY: f64 = 1.2;

/// Stem-plus-loop mileage heuristic.
///
/// # Examples
/// ```
/// use nodal_core::RouteMileageEstimator;
///
/// let estimator = RouteMileageEstimator::default();
/// assert_eq!(estimator.estimate(10.0, 1), 21.2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteMileageEstimator {
    local_drop_density: f64,
}

impl Default for RouteMileageEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_LOCAL_DROP_DENSITY)
    }
}

impl RouteMileageEstimator {
    /// Build an estimator with a custom inter-drop distance.
    #[must_use]
    pub const fn new(local_drop_density: f64) -> Self {
        Self { local_drop_density }
    }

    /// Miles added per drop.
    #[must_use]
    pub const fn local_drop_density(&self) -> f64 {
        self.local_drop_density
    }

    /// Estimated total route length in miles, rounded to two decimals.
    ///
    /// `anchor_distance` is the furthest depot-to-stop distance of the region.
    #[must_use]
    pub fn estimate(&self, anchor_distance: f64, stop_count: usize) -> f64 {
        let stem = anchor_distance * 2.0;
        round_to_hundredths(stem + count_as_f64(stop_count) * self.local_drop_density)
    }
}
