//! Deterministic doubles and builders for unit and behaviour tests.
//!
//! Only compiled for this crate's own tests or with the `test-support` feature.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::{BackendRoute, Order, RouteData, RoutedOrder, RoutingBackend, RoutingError};

/// In-memory `RoutingBackend` with canned answers per destination.
///
/// Unknown destinations fail with [`RoutingError::NoRoute`]. Every call is
/// recorded so tests can assert on quota and cache behaviour.
#[derive(Debug, Default)]
pub struct StubRoutingBackend {
    answers: HashMap<String, Result<BackendRoute, RoutingError>>,
    calls: RefCell<Vec<(String, String)>>,
}

impl StubRoutingBackend {
    /// Create a backend with no known destinations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `destination` with free-flow figures only.
    #[must_use]
    pub fn with_route(self, destination: &str, metres: f64, seconds: f64) -> Self {
        self.with_answer(
            destination,
            Ok(BackendRoute {
                distance_metres: metres,
                duration_seconds: seconds,
                duration_in_traffic_seconds: None,
            }),
        )
    }

    /// Answer `destination` with free-flow and traffic-aware figures.
    #[must_use]
    pub fn with_traffic_route(
        self,
        destination: &str,
        metres: f64,
        seconds: f64,
        traffic_seconds: f64,
    ) -> Self {
        self.with_answer(
            destination,
            Ok(BackendRoute {
                distance_metres: metres,
                duration_seconds: seconds,
                duration_in_traffic_seconds: Some(traffic_seconds),
            }),
        )
    }

    /// Fail every lookup of `destination` with `error`.
    #[must_use]
    pub fn with_error(self, destination: &str, error: RoutingError) -> Self {
        self.with_answer(destination, Err(error))
    }

    fn with_answer(mut self, destination: &str, answer: Result<BackendRoute, RoutingError>) -> Self {
        self.answers
            .insert(destination.trim().to_uppercase(), answer);
        self
    }

    /// Total number of lookups made.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Number of lookups made for `destination`.
    #[must_use]
    pub fn calls_for(&self, destination: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|(_, dest)| dest == destination)
            .count()
    }

    /// Origins of every lookup, in call order.
    #[must_use]
    pub fn origins(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|(origin, _)| origin.clone())
            .collect()
    }
}

impl RoutingBackend for StubRoutingBackend {
    fn lookup(&self, origin: &str, destination: &str) -> Result<BackendRoute, RoutingError> {
        self.calls
            .borrow_mut()
            .push((origin.to_owned(), destination.to_owned()));
        self.answers
            .get(destination)
            .cloned()
            .unwrap_or_else(|| {
                Err(RoutingError::NoRoute {
                    destination: destination.to_owned(),
                    status: "NOT_FOUND".to_owned(),
                })
            })
    }
}

/// Build a valid single-item order.
///
/// # Panics
/// Panics when the arguments do not form a valid order.
#[must_use]
pub fn order(id: &str, courier_cost: f64, postcode: &str, weight: f64, volume: f64) -> Order {
    Order::new(id, courier_cost, postcode, weight, volume, 1)
        .unwrap_or_else(|err| panic!("test order {id} is invalid: {err}"))
}

/// Build an order already routed `distance_miles` from the depot.
///
/// # Panics
/// Panics when the arguments do not form a valid order.
#[must_use]
pub fn routed_order(
    id: &str,
    courier_cost: f64,
    postcode: &str,
    weight: f64,
    volume: f64,
    distance_miles: f64,
) -> RoutedOrder {
    RoutedOrder::new(
        order(id, courier_cost, postcode, weight, volume),
        RouteData::new(distance_miles, distance_miles * 1.5),
    )
}
