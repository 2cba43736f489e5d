//! Route data for delivery postcodes.
//!
//! The [`RoutingBackend`] trait abstracts the external mapping service that
//! measures the road from the depot to a postcode. [`RouteDataProvider`]
//! wraps a backend with a lookup cache and a hard quota so a run never
//! spends more calls than configured.
//!
//! Lookup failures are values, not errors: an unresolved postcode simply
//! drops its orders from consideration.

mod backend;
mod error;
mod provider;

pub use backend::{BackendRoute, RoutingBackend};
pub use error::RoutingError;
pub use provider::{
    DEFAULT_DAILY_QUOTA, DEFAULT_DEPOT_POSTCODE, MILES_PER_METRE, ProviderConfig,
    ProviderConfigError, RouteDataProvider,
};
