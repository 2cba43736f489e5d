//! Core decision engine for Nodal van routing.
//!
//! Given a bounded daily pool of courier orders, the engine decides whether
//! running an owned van into one postcode region is cheaper than paying the
//! courier, and which orders the van should carry.
//!
//! The flow is: [`OrderPool`] → [`RegionalDecisionPipeline`] (route lookups
//! through a cached, quota-bounded [`RouteDataProvider`]) → [`OrderSelector`]
//! (greedy capacity fill priced by the [`CostModel`]) → [`SelectionResult`].
//!
//! Constructors validate their inputs and return `Result`; business outcomes
//! such as an unprofitable region are values, not errors.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod capacity;
mod cost;
mod history;
mod mileage;
mod order;
mod pipeline;
mod pool;
pub mod postcode;
mod report;
mod route;
pub mod routing;
mod selector;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use capacity::{
    CapacityBudget, CapacityError, DEFAULT_VAN_PAYLOAD_KG, DEFAULT_VAN_VOLUME_M3,
    UTILIZATION_RATIO, VanSpec,
};
pub use cost::{
    CongestionZones, CostModel, CostModelError, CostRates, DEFAULT_FUEL_PRICE_PER_LITRE,
    LITRES_PER_GALLON, LONDON_CONGESTION_PREFIXES,
};
pub use history::{HistoryRecord, RunStatus};
pub use mileage::{DEFAULT_LOCAL_DROP_DENSITY, RouteMileageEstimator};
pub use order::{Order, OrderError, RoutedOrder};
pub use pipeline::{DEFAULT_MAX_LOOKUPS_PER_REGION, RegionalDecision, RegionalDecisionPipeline};
pub use pool::{DEFAULT_POOL_LIMIT, DEFAULT_TOP_REGIONS, OrderPool, RegionSummary};
pub use report::{DRIVING_LIMIT_HOURS, DecisionReport, shift_hours};
pub use route::RouteData;
pub use routing::{
    BackendRoute, ProviderConfig, ProviderConfigError, RouteDataProvider, RoutingBackend,
    RoutingError,
};
pub use selector::{Economics, OrderSelector, Rejection, SelectionResult, Verdict};

/// Round to two decimal places, as used for miles, minutes and money.
pub(crate) fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A count as `f64`, saturating at `u32::MAX`.
pub(crate) fn count_as_f64(count: usize) -> f64 {
    f64::from(u32::try_from(count).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(80.776_23, 80.78)]
    #[case(91.2, 91.2)]
    #[case(-1.234, -1.23)]
    #[case(0.0, 0.0)]
    fn rounds_to_two_places(#[case] value: f64, #[case] expected: f64) {
        assert!((round_to_hundredths(value) - expected).abs() < 1e-9);
    }

    #[rstest]
    #[case(0, 0.0)]
    #[case(7, 7.0)]
    #[case(usize::MAX, f64::from(u32::MAX))]
    fn counts_saturate_at_u32_max(#[case] count: usize, #[case] expected: f64) {
        assert_eq!(count_as_f64(count), expected);
    }
}
