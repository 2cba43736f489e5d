//! Regional decision pipeline: filter, route, select.

use std::collections::{HashMap, HashSet};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::postcode::{normalize_postcode, region_code};
use crate::{
    CapacityBudget, Order, OrderPool, OrderSelector, Rejection, RouteData, RouteDataProvider,
    RoutedOrder, RoutingBackend, SelectionResult,
};

/// Default cap on distinct postcodes looked up for one region.
pub const DEFAULT_MAX_LOOKUPS_PER_REGION: usize = 150;

/// Everything learned while analysing one region.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RegionalDecision {
    /// Normalized region code.
    pub region: String,
    /// Orders in the pool the region was drawn from.
    pub pool_size: usize,
    /// Pool orders bound for the region.
    pub candidate_count: usize,
    /// Candidates that received route data.
    pub routed_count: usize,
    /// Postcodes that were looked up but could not be resolved.
    pub unresolved_postcodes: Vec<String>,
    /// Postcodes beyond the per-region lookup cap; never looked up.
    pub deferred_postcodes: Vec<String>,
    /// Selector outcome.
    pub selection: SelectionResult,
}

impl RegionalDecision {
    /// Whether a van route was accepted.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        self.selection.is_accepted()
    }
}

/// Decides, region by region, whether a van beats the courier.
///
/// The pipeline owns the [`RouteDataProvider`], so its cache and quota carry
/// over between regions analysed with the same pipeline.
///
/// # Examples
/// ```
/// use nodal_core::{
///     BackendRoute, CapacityBudget, Order, OrderPool, OrderSelector, RegionalDecisionPipeline,
///     RouteDataProvider, RoutingBackend, RoutingError,
/// };
///
/// struct FlatBackend;
///
/// impl RoutingBackend for FlatBackend {
///     fn lookup(&self, _origin: &str, _destination: &str) -> Result<BackendRoute, RoutingError> {
///         Ok(BackendRoute {
///             distance_metres: 72_420.0,
///             duration_seconds: 3_600.0,
///             duration_in_traffic_seconds: None,
///         })
///     }
/// }
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut pipeline = RegionalDecisionPipeline::new(
///     RouteDataProvider::new(FlatBackend),
///     OrderSelector::default(),
///     CapacityBudget::new(9.6, 1500.0)?,
/// );
/// let pool = OrderPool::new(vec![Order::new("A1", 400.0, "B37 7GT", 20.0, 0.5, 1)?], 400);
///
/// let decision = pipeline.analyse(&pool, "b");
/// assert_eq!(decision.region, "B");
/// assert!(decision.is_accepted());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RegionalDecisionPipeline<B> {
    provider: RouteDataProvider<B>,
    selector: OrderSelector,
    budget: CapacityBudget,
    max_lookups_per_region: usize,
}

impl<B: RoutingBackend> RegionalDecisionPipeline<B> {
    /// Assemble a pipeline with the default per-region lookup cap.
    #[must_use]
    pub const fn new(
        provider: RouteDataProvider<B>,
        selector: OrderSelector,
        budget: CapacityBudget,
    ) -> Self {
        Self {
            provider,
            selector,
            budget,
            max_lookups_per_region: DEFAULT_MAX_LOOKUPS_PER_REGION,
        }
    }

    /// Override the per-region lookup cap.
    #[must_use]
    pub const fn with_max_lookups_per_region(mut self, max: usize) -> Self {
        self.max_lookups_per_region = max;
        self
    }

    /// Route provider, e.g. to inspect quota use.
    #[must_use]
    pub const fn provider(&self) -> &RouteDataProvider<B> {
        &self.provider
    }

    /// Order selector.
    #[must_use]
    pub const fn selector(&self) -> &OrderSelector {
        &self.selector
    }

    /// Mutable selector, e.g. to update the fuel price between runs.
    pub const fn selector_mut(&mut self) -> &mut OrderSelector {
        &mut self.selector
    }

    /// Van capacity budget.
    #[must_use]
    pub const fn budget(&self) -> &CapacityBudget {
        &self.budget
    }

    /// Per-region lookup cap.
    #[must_use]
    pub const fn max_lookups_per_region(&self) -> usize {
        self.max_lookups_per_region
    }

    /// Analyse `region` within `pool`.
    ///
    /// Distinct candidate postcodes are resolved in first-appearance order up
    /// to the lookup cap. Orders whose postcode is unresolved or deferred do
    /// not reach the selector. A region with no candidates is rejected without
    /// any backend call.
    pub fn analyse(&mut self, pool: &OrderPool, region: &str) -> RegionalDecision {
        let label = region_code(region).unwrap_or_else(|| normalize_postcode(region));
        let candidates: Vec<&Order> = pool.in_region(region).collect();
        log::info!(
            "analysing region {label}: {} of {} pooled orders",
            candidates.len(),
            pool.len()
        );

        if candidates.is_empty() {
            return RegionalDecision {
                region: label,
                pool_size: pool.len(),
                candidate_count: 0,
                routed_count: 0,
                unresolved_postcodes: Vec::new(),
                deferred_postcodes: Vec::new(),
                selection: SelectionResult::rejected(Rejection::NoCandidates),
            };
        }

        let mut seen = HashSet::new();
        let postcodes: Vec<&str> = candidates
            .iter()
            .map(|order| order.postcode())
            .filter(|postcode| seen.insert(*postcode))
            .collect();
        let cap = self.max_lookups_per_region.min(postcodes.len());
        let (to_resolve, deferred) = postcodes.split_at(cap);
        if !deferred.is_empty() {
            log::warn!(
                "region {label}: {} postcodes exceed the lookup cap of {} and are skipped",
                deferred.len(),
                self.max_lookups_per_region
            );
        }

        let mut routes: HashMap<&str, RouteData> = HashMap::new();
        let mut unresolved = Vec::new();
        for postcode in to_resolve {
            match self.provider.resolve(postcode) {
                Some(route) => {
                    routes.insert(*postcode, route);
                }
                None => unresolved.push((*postcode).to_owned()),
            }
        }

        let routed: Vec<RoutedOrder> = candidates
            .iter()
            .filter_map(|order| {
                routes
                    .get(order.postcode())
                    .map(|route| RoutedOrder::new((*order).clone(), *route))
            })
            .collect();
        log::debug!(
            "region {label}: {} routed orders, {} unresolved postcodes",
            routed.len(),
            unresolved.len()
        );

        let selection = self.selector.select(&routed, &self.budget);
        RegionalDecision {
            region: label,
            pool_size: pool.len(),
            candidate_count: candidates.len(),
            routed_count: routed.len(),
            unresolved_postcodes: unresolved,
            deferred_postcodes: deferred.iter().map(|pc| (*pc).to_owned()).collect(),
            selection,
        }
    }
}
