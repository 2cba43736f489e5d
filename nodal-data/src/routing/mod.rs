//! HTTP routing backends.
//!
//! This module provides [`HttpRoutingBackend`], an implementation of
//! [`nodal_core::RoutingBackend`] backed by the Google Distance Matrix API.
//! Each lookup asks for a single depot-to-postcode driving route with a
//! pessimistic traffic model, departing now.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use nodal_core::RouteDataProvider;
//! use nodal_data::routing::{HttpRoutingBackend, HttpRoutingBackendConfig};
//!
//! let config = HttpRoutingBackendConfig::new("my-api-key")
//!     .with_timeout(Duration::from_secs(5))
//!     .with_user_agent("dispatch-desk/1.0");
//! let backend = HttpRoutingBackend::with_config(config)?;
//!
//! let mut provider = RouteDataProvider::new(backend);
//! if let Some(route) = provider.resolve("NW1 6XE") {
//!     println!("{} miles", route.distance_miles);
//! }
//! # Ok::<(), nodal_data::routing::BackendBuildError>(())
//! ```

mod distance_matrix;
mod provider;

pub use provider::{
    BackendBuildError, DEFAULT_BASE_URL, DEFAULT_USER_AGENT, HttpRoutingBackend,
    HttpRoutingBackendConfig,
};
