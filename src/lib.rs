//! Facade crate for the Nodal van-route decision engine.
//!
//! This crate re-exports the core decision types and exposes the HTTP routing
//! backend behind the `http` feature flag.

#![forbid(unsafe_code)]

pub use nodal_core::{
    BackendRoute, CapacityBudget, CongestionZones, CostModel, CostRates, DecisionReport,
    Economics, HistoryRecord, Order, OrderPool, OrderSelector, RegionSummary, RegionalDecision,
    RegionalDecisionPipeline, Rejection, RouteData, RouteDataProvider, RouteMileageEstimator,
    RoutedOrder, RoutingBackend, RoutingError, RunStatus, SelectionResult, VanSpec, Verdict,
};

#[cfg(feature = "http")]
pub use nodal_data::routing::{HttpRoutingBackend, HttpRoutingBackendConfig};
