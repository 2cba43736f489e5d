//! Routing backend trait and its raw response type.

use super::error::RoutingError;

/// Raw depot-to-destination figures returned by a routing backend.
///
/// Units are the backend's linear units: metres and seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackendRoute {
    /// Road distance in metres.
    pub distance_metres: f64,
    /// Free-flow drive time in seconds.
    pub duration_seconds: f64,
    /// Traffic-aware drive time in seconds, when the backend supplies it.
    pub duration_in_traffic_seconds: Option<f64>,
}

/// Look up road distance and drive time between two places.
///
/// Implementations should ask for a pessimistic, traffic-aware estimate so
/// that van costs are not underestimated. Any failure is reported as a
/// [`RoutingError`]; callers treat it as "no data" for that destination.
///
/// # Examples
///
/// ```rust
/// use nodal_core::{BackendRoute, RoutingBackend, RoutingError};
///
/// struct FixedBackend;
///
/// impl RoutingBackend for FixedBackend {
///     fn lookup(&self, _origin: &str, destination: &str) -> Result<BackendRoute, RoutingError> {
///         if destination.is_empty() {
///             return Err(RoutingError::NoRoute {
///                 destination: destination.to_owned(),
///                 status: "NOT_FOUND".to_owned(),
///             });
///         }
///         Ok(BackendRoute {
///             distance_metres: 16_093.44,
///             duration_seconds: 1_200.0,
///             duration_in_traffic_seconds: None,
///         })
///     }
/// }
///
/// let route = FixedBackend.lookup("NN15 6NL", "NW1 6XE")?;
/// assert_eq!(route.duration_seconds, 1_200.0);
/// # Ok::<(), RoutingError>(())
/// ```
pub trait RoutingBackend {
    /// Return the route from `origin` to `destination`.
    fn lookup(&self, origin: &str, destination: &str) -> Result<BackendRoute, RoutingError>;
}

impl<B: RoutingBackend + ?Sized> RoutingBackend for Box<B> {
    fn lookup(&self, origin: &str, destination: &str) -> Result<BackendRoute, RoutingError> {
        (**self).lookup(origin, destination)
    }
}

impl<B: RoutingBackend + ?Sized> RoutingBackend for &B {
    fn lookup(&self, origin: &str, destination: &str) -> Result<BackendRoute, RoutingError> {
        (**self).lookup(origin, destination)
    }
}
