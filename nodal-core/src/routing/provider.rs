//! Cached, quota-bounded route lookups from the depot.

use std::collections::HashMap;

use thiserror::Error;

use crate::postcode::normalize_postcode;
use crate::route::RouteData;
use crate::round_to_hundredths;

use super::backend::{BackendRoute, RoutingBackend};

/// Default depot postcode (Kettering warehouse).
pub const DEFAULT_DEPOT_POSTCODE: &str = "NN15 6NL";

/// Default ceiling on backend lookups for the provider's lifetime.
pub const DEFAULT_DAILY_QUOTA: u32 = 3000;

/// Miles per metre.
pub const MILES_PER_METRE: f64 = 0.000_621_371;

/// Settings for [`RouteDataProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Origin postcode for every lookup.
    pub depot: String,
    /// Maximum number of backend lookups.
    pub daily_quota: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            depot: DEFAULT_DEPOT_POSTCODE.to_owned(),
            daily_quota: DEFAULT_DAILY_QUOTA,
        }
    }
}

impl ProviderConfig {
    /// Set the depot postcode.
    #[must_use]
    pub fn with_depot(mut self, depot: impl Into<String>) -> Self {
        self.depot = depot.into();
        self
    }

    /// Set the lookup quota.
    #[must_use]
    pub const fn with_daily_quota(mut self, daily_quota: u32) -> Self {
        self.daily_quota = daily_quota;
        self
    }
}

/// Errors returned by [`RouteDataProvider::with_config`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderConfigError {
    /// The depot postcode was blank.
    #[error("depot postcode must not be empty")]
    MissingDepot,
}

/// Counts backend lookups against a fixed ceiling.
///
/// The counter only grows. Resetting it per calendar day is left to the
/// owner, e.g. by building a fresh provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LookupQuota {
    limit: u32,
    used: u32,
}

impl LookupQuota {
    const fn new(limit: u32) -> Self {
        Self { limit, used: 0 }
    }

    const fn is_exhausted(&self) -> bool {
        self.used >= self.limit
    }

    const fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.used)
    }

    /// Record one lookup; returns `false` without counting when exhausted.
    const fn try_consume(&mut self) -> bool {
        if self.is_exhausted() {
            return false;
        }
        self.used += 1;
        true
    }
}

/// Resolves postcodes to [`RouteData`] through a [`RoutingBackend`].
///
/// Successful lookups are cached for the provider's lifetime and never
/// consume quota again. Failed lookups are not cached. Once the quota is
/// spent, unseen postcodes resolve to `None` while cached ones still resolve.
///
/// # Examples
/// ```
/// use nodal_core::{BackendRoute, RouteDataProvider, RoutingBackend, RoutingError};
///
/// struct FlatBackend;
///
/// impl RoutingBackend for FlatBackend {
///     fn lookup(&self, _origin: &str, _destination: &str) -> Result<BackendRoute, RoutingError> {
///         Ok(BackendRoute {
///             distance_metres: 130_000.0,
///             duration_seconds: 5_400.0,
///             duration_in_traffic_seconds: None,
///         })
///     }
/// }
///
/// let mut provider = RouteDataProvider::new(FlatBackend);
///
/// let first = provider.resolve("nw1 6xe");
/// let second = provider.resolve("NW1 6XE ");
/// assert_eq!(first, second);
/// assert_eq!(provider.quota_used(), 1);
/// ```
#[derive(Debug)]
pub struct RouteDataProvider<B> {
    backend: B,
    depot: String,
    quota: LookupQuota,
    cache: HashMap<String, RouteData>,
    exhaustion_reported: bool,
}

impl<B: RoutingBackend> RouteDataProvider<B> {
    /// Build a provider with the default depot and quota.
    pub fn new(backend: B) -> Self {
        let config = ProviderConfig::default();
        Self::from_parts(backend, config.depot, config.daily_quota)
    }

    /// Build a provider with explicit settings.
    ///
    /// # Errors
    /// Returns [`ProviderConfigError::MissingDepot`] when the depot postcode
    /// is blank.
    pub fn with_config(backend: B, config: ProviderConfig) -> Result<Self, ProviderConfigError> {
        let depot = normalize_postcode(&config.depot);
        if depot.is_empty() {
            return Err(ProviderConfigError::MissingDepot);
        }
        Ok(Self::from_parts(backend, depot, config.daily_quota))
    }

    fn from_parts(backend: B, depot: String, daily_quota: u32) -> Self {
        Self {
            backend,
            depot,
            quota: LookupQuota::new(daily_quota),
            cache: HashMap::new(),
            exhaustion_reported: false,
        }
    }

    /// Resolve `postcode` to road data from the depot.
    ///
    /// Returns `None` when the postcode is blank, the quota is exhausted, or
    /// the backend fails or returns unusable figures.
    pub fn resolve(&mut self, postcode: &str) -> Option<RouteData> {
        let key = normalize_postcode(postcode);
        if key.is_empty() {
            return None;
        }
        if let Some(cached) = self.cache.get(&key) {
            return Some(*cached);
        }
        if !self.quota.try_consume() {
            if !self.exhaustion_reported {
                log::warn!(
                    "routing lookup quota of {} reached; unseen postcodes will not be resolved",
                    self.quota.limit
                );
                self.exhaustion_reported = true;
            }
            return None;
        }

        let route = match self.backend.lookup(&self.depot, &key) {
            Ok(raw) => raw,
            Err(err) => {
                log::warn!("routing lookup for {key} failed: {err}");
                return None;
            }
        };
        let Some(data) = to_route_data(route) else {
            log::warn!("routing lookup for {key} returned unusable figures: {route:?}");
            return None;
        };
        self.cache.insert(key, data);
        Some(data)
    }

    /// Cached data for `postcode`, without contacting the backend.
    #[must_use]
    pub fn cached(&self, postcode: &str) -> Option<RouteData> {
        self.cache.get(&normalize_postcode(postcode)).copied()
    }

    /// Number of backend lookups attempted so far.
    #[must_use]
    pub const fn quota_used(&self) -> u32 {
        self.quota.used
    }

    /// Backend lookups still allowed.
    #[must_use]
    pub const fn quota_remaining(&self) -> u32 {
        self.quota.remaining()
    }

    /// Configured lookup ceiling.
    #[must_use]
    pub const fn daily_quota(&self) -> u32 {
        self.quota.limit
    }

    /// Number of cached postcodes.
    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Normalized depot postcode.
    #[must_use]
    pub fn depot(&self) -> &str {
        &self.depot
    }

    /// Underlying backend.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }
}

/// Convert raw backend figures to miles and minutes.
///
/// Prefers the traffic-aware duration. Negative or non-finite figures are
/// rejected.
fn to_route_data(route: BackendRoute) -> Option<RouteData> {
    let seconds = route
        .duration_in_traffic_seconds
        .unwrap_or(route.duration_seconds);
    let usable = |value: f64| value.is_finite() && value >= 0.0;
    if !usable(route.distance_metres) || !usable(seconds) {
        return None;
    }
    Some(RouteData::new(
        round_to_hundredths(route.distance_metres * MILES_PER_METRE),
        round_to_hundredths(seconds / 60.0),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::RoutingError;
    use crate::test_support::StubRoutingBackend;
    use rstest::{fixture, rstest};

    #[fixture]
    fn backend() -> StubRoutingBackend {
        StubRoutingBackend::new()
            .with_route("NW1 6XE", 130_000.0, 5_400.0)
            .with_traffic_route("B37 7GT", 100_000.0, 3_600.0, 4_500.0)
    }

    #[rstest]
    fn converts_metres_and_prefers_traffic_duration(backend: StubRoutingBackend) {
        let mut provider = RouteDataProvider::new(backend);
        let route = provider.resolve("B37 7GT").expect("resolved");
        assert!((route.distance_miles - 62.14).abs() < 1e-9);
        assert!((route.duration_minutes - 75.0).abs() < 1e-9);
    }

    #[rstest]
    fn falls_back_to_free_flow_duration(backend: StubRoutingBackend) {
        let mut provider = RouteDataProvider::new(backend);
        let route = provider.resolve("NW1 6XE").expect("resolved");
        assert!((route.distance_miles - 80.78).abs() < 1e-9);
        assert!((route.duration_minutes - 90.0).abs() < 1e-9);
    }

    #[rstest]
    fn repeat_lookups_hit_cache(backend: StubRoutingBackend) {
        let mut provider = RouteDataProvider::new(backend);
        let first = provider.resolve("nw1 6xe");
        let second = provider.resolve("NW1 6XE");
        assert_eq!(first, second);
        assert_eq!(provider.quota_used(), 1);
        assert_eq!(provider.backend().calls(), 1);
        assert_eq!(provider.cache_len(), 1);
    }

    #[rstest]
    fn blank_postcode_consumes_nothing(backend: StubRoutingBackend) {
        let mut provider = RouteDataProvider::new(backend);
        assert!(provider.resolve("   ").is_none());
        assert_eq!(provider.quota_used(), 0);
    }

    #[rstest]
    fn failures_are_not_cached_but_consume_quota(backend: StubRoutingBackend) {
        let backend = backend.with_error(
            "ZZ1 1ZZ",
            RoutingError::NoRoute {
                destination: "ZZ1 1ZZ".into(),
                status: "NOT_FOUND".into(),
            },
        );
        let mut provider = RouteDataProvider::new(backend);
        assert!(provider.resolve("ZZ1 1ZZ").is_none());
        assert!(provider.resolve("ZZ1 1ZZ").is_none());
        assert_eq!(provider.quota_used(), 2);
        assert_eq!(provider.cache_len(), 0);
    }

    #[rstest]
    fn malformed_figures_resolve_to_none(backend: StubRoutingBackend) {
        let backend = backend.with_route("LE1 1AA", -5.0, 60.0);
        let mut provider = RouteDataProvider::new(backend);
        assert!(provider.resolve("LE1 1AA").is_none());
        assert!(provider.cached("LE1 1AA").is_none());
    }

    #[rstest]
    fn exhausted_quota_serves_only_cached(backend: StubRoutingBackend) {
        let config = ProviderConfig::default().with_daily_quota(1);
        let mut provider = RouteDataProvider::with_config(backend, config).expect("config");
        assert!(provider.resolve("NW1 6XE").is_some());
        assert!(provider.resolve("B37 7GT").is_none());
        assert!(provider.resolve("NW1 6XE").is_some());
        assert_eq!(provider.quota_used(), 1);
        assert_eq!(provider.quota_remaining(), 0);
        assert_eq!(provider.backend().calls(), 1);
    }

    #[rstest]
    fn lookups_originate_at_depot(backend: StubRoutingBackend) {
        let config = ProviderConfig::default().with_depot(" le1 1aa ");
        let mut provider = RouteDataProvider::with_config(backend, config).expect("config");
        provider.resolve("NW1 6XE");
        assert_eq!(provider.depot(), "LE1 1AA");
        assert_eq!(
            provider.backend().origins(),
            vec!["LE1 1AA".to_owned()]
        );
    }

    #[rstest]
    fn blank_depot_is_rejected(backend: StubRoutingBackend) {
        let config = ProviderConfig::default().with_depot("  ");
        let err = RouteDataProvider::with_config(backend, config).expect_err("blank depot");
        assert_eq!(err, ProviderConfigError::MissingDepot);
    }
}
