//! The bounded daily pool of orders and its regional breakdown.

use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::Order;
use crate::postcode::region_code;

/// Default number of orders kept in a daily pool.
pub const DEFAULT_POOL_LIMIT: usize = 400;

/// Default number of regions listed by [`OrderPool::top_regions`].
pub const DEFAULT_TOP_REGIONS: usize = 5;

/// Aggregate courier spend for one postcode region.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RegionSummary {
    /// Region code, e.g. `NW` or `B`.
    pub region: String,
    /// Orders in the pool bound for this region.
    pub order_count: usize,
    /// Sum of their courier costs in GBP.
    pub total_courier_value: f64,
}

/// Orders considered for today's van run.
///
/// The pool keeps at most `limit` orders, in manifest order. Regional
/// analysis always runs against an explicitly built pool.
///
/// # Examples
/// ```
/// use nodal_core::{Order, OrderPool};
///
/// # fn main() -> Result<(), nodal_core::OrderError> {
/// let orders = vec![
///     Order::new("A", 30.0, "NW1 6XE", 5.0, 0.1, 1)?,
///     Order::new("B", 80.0, "B37 7GT", 5.0, 0.1, 1)?,
///     Order::new("C", 25.0, "NW3 2QG", 5.0, 0.1, 1)?,
/// ];
/// let pool = OrderPool::new(orders, 400);
/// let top = pool.top_regions(1);
/// assert_eq!(top[0].region, "B");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderPool {
    orders: Vec<Order>,
}

impl OrderPool {
    /// Keep the first `limit` of `orders`.
    #[must_use]
    pub fn new(orders: impl IntoIterator<Item = Order>, limit: usize) -> Self {
        let orders: Vec<Order> = orders.into_iter().take(limit).collect();
        log::info!("order pool holds {} orders (limit {limit})", orders.len());
        Self { orders }
    }

    /// Orders in the pool.
    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Number of orders kept.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Whether the pool holds no orders.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Orders whose postcode falls in `region`.
    ///
    /// `region` is normalized like a postcode, so `" nw "` matches `NW1 6XE`
    /// but not `N1 9GU`.
    pub fn in_region<'a>(&'a self, region: &str) -> impl Iterator<Item = &'a Order> + use<'a> {
        let wanted = region_code(region);
        self.orders.iter().filter(move |order| {
            wanted.is_some() && region_code(order.postcode()) == wanted
        })
    }

    /// The `n` regions with the highest total courier spend.
    ///
    /// Ties keep the order in which regions first appear. Orders without a
    /// region code are ignored.
    #[must_use]
    pub fn top_regions(&self, n: usize) -> Vec<RegionSummary> {
        let mut summaries: Vec<RegionSummary> = Vec::new();
        for order in &self.orders {
            let Some(region) = region_code(order.postcode()) else {
                continue;
            };
            match summaries.iter_mut().find(|s| s.region == region) {
                Some(summary) => {
                    summary.order_count += 1;
                    summary.total_courier_value += order.courier_cost();
                }
                None => summaries.push(RegionSummary {
                    region,
                    order_count: 1,
                    total_courier_value: order.courier_cost(),
                }),
            }
        }
        summaries.sort_by(|a, b| {
            b.total_courier_value
                .partial_cmp(&a.total_courier_value)
                .unwrap_or(Ordering::Equal)
        });
        summaries.truncate(n);
        summaries
    }
}
