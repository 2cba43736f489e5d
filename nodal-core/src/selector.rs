//! Greedy van loading with a profitability gate.
//!
//! Orders are admitted in descending courier-cost order while they fit the
//! capacity budget. There is no backtracking: a skipped order is never
//! reconsidered, so the outcome is easy to audit but not optimal. The whole
//! load is then priced with the [`CostModel`] and discarded unless the van
//! costs no more than the courier charges it replaces.

use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{CapacityBudget, CongestionZones, CostModel, RouteMileageEstimator, RoutedOrder};

/// Van cost set against the courier charges it would save.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Economics {
    /// Estimated van operating cost in GBP.
    pub cost: f64,
    /// Courier charges avoided by the admitted orders, in GBP.
    pub savings: f64,
}

impl Economics {
    /// Savings minus cost; negative for a losing route.
    #[must_use]
    pub fn profit(&self) -> f64 {
        self.savings - self.cost
    }

    /// Whether the van costs no more than the courier charges it replaces.
    #[must_use]
    pub fn is_profitable(&self) -> bool {
        self.cost <= self.savings
    }
}

/// Why a region was not given a van.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "reason", rename_all = "snake_case"))]
pub enum Rejection {
    /// There were no routed candidates to consider.
    NoCandidates,
    /// No single candidate fitted the capacity budget.
    NoneAdmitted,
    /// The admitted load would cost more than it saves.
    Unprofitable {
        /// Estimated length of the discarded route.
        total_route_miles: f64,
        /// Cost and savings of the discarded load.
        economics: Economics,
    },
}

/// Outcome of a selection.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "verdict", rename_all = "snake_case"))]
pub enum Verdict {
    /// The van route is worth running.
    Accepted(Economics),
    /// The region stays with the courier.
    Rejected(Rejection),
}

/// Orders chosen for the van, their route length and the verdict.
///
/// A rejected result never carries orders and reports zero miles.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SelectionResult {
    orders: Vec<RoutedOrder>,
    total_route_miles: f64,
    verdict: Verdict,
}

impl SelectionResult {
    /// Build a rejected result.
    #[must_use]
    pub const fn rejected(reason: Rejection) -> Self {
        Self {
            orders: Vec::new(),
            total_route_miles: 0.0,
            verdict: Verdict::Rejected(reason),
        }
    }

    const fn accepted(orders: Vec<RoutedOrder>, total_route_miles: f64, economics: Economics) -> Self {
        Self {
            orders,
            total_route_miles,
            verdict: Verdict::Accepted(economics),
        }
    }

    /// Admitted orders in admission order.
    #[must_use]
    pub fn orders(&self) -> &[RoutedOrder] {
        &self.orders
    }

    /// Estimated length of the whole van route in miles.
    #[must_use]
    pub const fn total_route_miles(&self) -> f64 {
        self.total_route_miles
    }

    /// Accept or reject decision.
    #[must_use]
    pub const fn verdict(&self) -> &Verdict {
        &self.verdict
    }

    /// Whether the van route was accepted.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self.verdict, Verdict::Accepted(_))
    }

    /// Economics of the accepted route, if any.
    #[must_use]
    pub const fn economics(&self) -> Option<&Economics> {
        match &self.verdict {
            Verdict::Accepted(economics) => Some(economics),
            Verdict::Rejected(_) => None,
        }
    }
}

/// Chooses which routed orders go on the van.
///
/// # Examples
/// ```
/// use nodal_core::{CapacityBudget, Order, OrderSelector, RouteData, RoutedOrder};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let selector = OrderSelector::default();
/// let budget = CapacityBudget::new(9.6, 1500.0)?;
/// let order = Order::new("A1", 400.0, "B37 7GT", 20.0, 0.5, 1)?;
/// let candidates = vec![RoutedOrder::new(order, RouteData::new(45.0, 60.0))];
///
/// let result = selector.select(&candidates, &budget);
/// assert!(result.is_accepted());
/// assert_eq!(result.total_route_miles(), 91.2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderSelector {
    cost_model: CostModel,
    estimator: RouteMileageEstimator,
    zones: CongestionZones,
}

impl OrderSelector {
    /// Build a selector from its pricing components.
    #[must_use]
    pub const fn new(
        cost_model: CostModel,
        estimator: RouteMileageEstimator,
        zones: CongestionZones,
    ) -> Self {
        Self {
            cost_model,
            estimator,
            zones,
        }
    }

    /// Cost model used to price loads.
    #[must_use]
    pub const fn cost_model(&self) -> &CostModel {
        &self.cost_model
    }

    /// Mutable access to the cost model, e.g. to update the fuel price.
    pub const fn cost_model_mut(&mut self) -> &mut CostModel {
        &mut self.cost_model
    }

    /// Mileage estimator used for route length.
    #[must_use]
    pub const fn estimator(&self) -> &RouteMileageEstimator {
        &self.estimator
    }

    /// Congestion zone table.
    #[must_use]
    pub const fn zones(&self) -> &CongestionZones {
        &self.zones
    }

    /// Select the van load for `candidates` under `budget`.
    ///
    /// The anchor distance for the mileage estimate is the furthest candidate,
    /// admitted or not. The congestion surcharge considers admitted orders
    /// only.
    #[must_use]
    pub fn select(&self, candidates: &[RoutedOrder], budget: &CapacityBudget) -> SelectionResult {
        if candidates.is_empty() {
            return SelectionResult::rejected(Rejection::NoCandidates);
        }

        let admitted = admit_by_value(candidates, budget);
        if admitted.is_empty() {
            log::debug!(
                "none of {} candidates fit the capacity budget",
                candidates.len()
            );
            return SelectionResult::rejected(Rejection::NoneAdmitted);
        }

        let anchor_distance = candidates
            .iter()
            .map(RoutedOrder::distance_miles)
            .fold(0.0_f64, f64::max);
        let total_route_miles = self.estimator.estimate(anchor_distance, admitted.len());
        let has_congestion_zone_stop = self
            .zones
            .any(admitted.iter().map(|routed| routed.order.postcode()));
        let economics = Economics {
            cost: self
                .cost_model
                .cost(total_route_miles, has_congestion_zone_stop),
            savings: admitted
                .iter()
                .map(|routed| routed.order.courier_cost())
                .sum(),
        };

        if !economics.is_profitable() {
            log::debug!(
                "van cost {:.2} exceeds courier savings {:.2}; rejecting load",
                economics.cost,
                economics.savings
            );
            return SelectionResult::rejected(Rejection::Unprofitable {
                total_route_miles,
                economics,
            });
        }

        let orders = admitted.into_iter().cloned().collect();
        SelectionResult::accepted(orders, total_route_miles, economics)
    }
}

/// Greedy fill in descending courier-cost order; ties keep input order.
fn admit_by_value<'a>(
    candidates: &'a [RoutedOrder],
    budget: &CapacityBudget,
) -> Vec<&'a RoutedOrder> {
    let mut ranked: Vec<&RoutedOrder> = candidates.iter().collect();
    ranked.sort_by(|a, b| {
        b.order
            .courier_cost()
            .partial_cmp(&a.order.courier_cost())
            .unwrap_or(Ordering::Equal)
    });

    let mut volume = 0.0;
    let mut weight = 0.0;
    let mut admitted = Vec::new();
    for routed in ranked {
        let next_volume = volume + routed.order.volume();
        let next_weight = weight + routed.order.weight();
        if budget.admits(next_volume, next_weight) {
            volume = next_volume;
            weight = next_weight;
            admitted.push(routed);
        }
    }
    admitted
}
