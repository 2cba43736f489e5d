//! Delivery orders entering the decision engine.
//!
//! Orders arrive from ingestion already scaled by item quantity. The engine
//! never mutates them; routing data is attached by wrapping an order in a
//! [`RoutedOrder`].

#[cfg(feature = "serde")]
use serde::Serialize;
use thiserror::Error;

use crate::postcode::normalize_postcode;
use crate::route::RouteData;

/// A single consignment that could travel by courier or by van.
///
/// # Examples
/// ```
/// use nodal_core::Order;
///
/// # fn main() -> Result<(), nodal_core::OrderError> {
/// let order = Order::new("DX-1001", 42.5, "nw1 6xe", 12.0, 0.2, 2)?;
/// assert_eq!(order.postcode(), "NW1 6XE");
/// assert_eq!(order.quantity(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Order {
    id: String,
    courier_cost: f64,
    postcode: String,
    weight: f64,
    volume: f64,
    quantity: u32,
}

/// Errors returned by [`Order::new`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrderError {
    /// The identifier was blank.
    #[error("order identifier must not be empty")]
    MissingId,
    /// The postcode was blank.
    #[error("order {id} has no postcode")]
    MissingPostcode {
        /// Identifier of the affected order.
        id: String,
    },
    /// A numeric field was negative, NaN or infinite.
    #[error("order {id} has invalid {field}: {value}")]
    InvalidMeasure {
        /// Identifier of the affected order.
        id: String,
        /// Name of the offending field.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// The item count was zero.
    #[error("order {id} must contain at least one item")]
    ZeroItems {
        /// Identifier of the affected order.
        id: String,
    },
}

impl Order {
    /// Validate and construct an [`Order`].
    ///
    /// The postcode is stored in normalized form and a negative zero measure
    /// is stored as zero. `weight` (kg) and `volume` (m³) must already
    /// include the item `quantity`.
    ///
    /// # Errors
    /// Returns [`OrderError`] when the identifier or postcode is blank, a
    /// measure is negative or not finite, or `quantity` is zero.
    pub fn new(
        id: impl Into<String>,
        courier_cost: f64,
        postcode: &str,
        weight: f64,
        volume: f64,
        quantity: u32,
    ) -> Result<Self, OrderError> {
        let id = id.into().trim().to_owned();
        if id.is_empty() {
            return Err(OrderError::MissingId);
        }
        let postcode = normalize_postcode(postcode);
        if postcode.is_empty() {
            return Err(OrderError::MissingPostcode { id });
        }
        for (field, value) in [
            ("courier cost", courier_cost),
            ("weight", weight),
            ("volume", volume),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(OrderError::InvalidMeasure { id, field, value });
            }
        }
        if quantity == 0 {
            return Err(OrderError::ZeroItems { id });
        }
        Ok(Self {
            id,
            courier_cost: courier_cost + 0.0,
            postcode,
            weight: weight + 0.0,
            volume: volume + 0.0,
            quantity,
        })
    }

    /// Unique identifier within the pool.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Price the courier would charge for this order, in GBP.
    #[must_use]
    pub const fn courier_cost(&self) -> f64 {
        self.courier_cost
    }

    /// Normalized destination postcode.
    #[must_use]
    pub fn postcode(&self) -> &str {
        &self.postcode
    }

    /// Total weight in kilograms.
    #[must_use]
    pub const fn weight(&self) -> f64 {
        self.weight
    }

    /// Total volume in cubic metres.
    #[must_use]
    pub const fn volume(&self) -> f64 {
        self.volume
    }

    /// Number of items in the consignment.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }
}

/// An order whose postcode has been resolved to road data.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RoutedOrder {
    /// The underlying order.
    pub order: Order,
    /// Depot-to-postcode road data.
    pub route: RouteData,
}

impl RoutedOrder {
    /// Attach `route` to `order`.
    #[must_use]
    pub const fn new(order: Order, route: RouteData) -> Self {
        Self { order, route }
    }

    /// Road distance from the depot in miles.
    #[must_use]
    pub const fn distance_miles(&self) -> f64 {
        self.route.distance_miles
    }
}
