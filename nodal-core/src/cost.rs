//! Van operating cost model.
//!
//! A day on the road costs a fixed amount (driver, insurance, maintenance)
//! plus fuel proportional to the estimated mileage. Routes touching a
//! congestion zone pay a flat surcharge, and the total is inflated by a
//! safety margin so the estimate errs on the expensive side.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::postcode::normalize_postcode;

/// Litres in one imperial gallon.
pub const LITRES_PER_GALLON: f64 = 4.546;

/// Default diesel price in GBP per litre.
pub const DEFAULT_FUEL_PRICE_PER_LITRE: f64 = 1.45;

/// Postcode prefixes treated as central-London congestion zones.
pub const LONDON_CONGESTION_PREFIXES: [&str; 8] =
    ["EC", "WC", "E1", "N1", "NW1", "SE1", "SW1", "W1"];

/// Daily rates and multipliers feeding the [`CostModel`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CostRates {
    /// Driver pay for one day, in GBP.
    pub driver_daily_rate: f64,
    /// Vehicle insurance for one day, in GBP.
    pub insurance_daily: f64,
    /// Maintenance allowance for one day, in GBP.
    pub maintenance_buffer: f64,
    /// Flat charge when any stop lies in a congestion zone, in GBP.
    pub congestion_surcharge: f64,
    /// Multiplier applied to the subtotal; must exceed one.
    pub safety_margin: f64,
    /// Van fuel economy in miles per imperial gallon.
    pub van_mpg: f64,
}

impl Default for CostRates {
    fn default() -> Self {
        Self {
            driver_daily_rate: 140.0,
            insurance_daily: 15.0,
            maintenance_buffer: 10.0,
            congestion_surcharge: 15.0,
            safety_margin: 1.10,
            van_mpg: 30.0,
        }
    }
}

/// Errors returned when configuring a [`CostModel`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CostModelError {
    /// A monetary amount was negative, NaN or infinite.
    #[error("{field} must be a finite, non-negative amount (got {value})")]
    InvalidAmount {
        /// Name of the offending rate.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// Fuel economy was zero, negative or not finite.
    #[error("van fuel economy must be positive (got {0} mpg)")]
    InvalidFuelEconomy(f64),
    /// The safety margin would not inflate the estimate.
    #[error("safety margin must be greater than 1 (got {0})")]
    InvalidSafetyMargin(f64),
}

/// Converts estimated route mileage into a total operating cost.
///
/// # Examples
/// ```
/// use nodal_core::CostModel;
///
/// let model = CostModel::default();
/// let inner_city = model.cost(100.0, true);
/// let suburban = model.cost(100.0, false);
/// assert!(inner_city > suburban);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CostModel {
    rates: CostRates,
    fuel_price_per_litre: f64,
    fuel_per_mile: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        let rates = CostRates::default();
        Self {
            rates,
            fuel_price_per_litre: DEFAULT_FUEL_PRICE_PER_LITRE,
            fuel_per_mile: fuel_per_mile(DEFAULT_FUEL_PRICE_PER_LITRE, rates.van_mpg),
        }
    }
}

impl CostModel {
    /// Validate `rates` and build a model for the given fuel price.
    ///
    /// # Errors
    /// Returns [`CostModelError`] when a rate or the fuel price is negative or
    /// not finite, the fuel economy is not positive, or the safety margin is
    /// not greater than one.
    pub fn new(rates: CostRates, fuel_price_per_litre: f64) -> Result<Self, CostModelError> {
        for (field, value) in [
            ("driver daily rate", rates.driver_daily_rate),
            ("insurance", rates.insurance_daily),
            ("maintenance buffer", rates.maintenance_buffer),
            ("congestion surcharge", rates.congestion_surcharge),
        ] {
            check_amount(field, value)?;
        }
        if !rates.van_mpg.is_finite() || rates.van_mpg <= 0.0 {
            return Err(CostModelError::InvalidFuelEconomy(rates.van_mpg));
        }
        if !rates.safety_margin.is_finite() || rates.safety_margin <= 1.0 {
            return Err(CostModelError::InvalidSafetyMargin(rates.safety_margin));
        }
        check_amount("fuel price", fuel_price_per_litre)?;
        Ok(Self {
            rates,
            fuel_price_per_litre,
            fuel_per_mile: fuel_per_mile(fuel_price_per_litre, rates.van_mpg),
        })
    }

    /// Update the fuel price and recompute the per-mile fuel cost.
    ///
    /// # Errors
    /// Returns [`CostModelError::InvalidAmount`] when the price is negative or
    /// not finite; the model is left unchanged in that case.
    pub fn set_fuel_price(&mut self, fuel_price_per_litre: f64) -> Result<(), CostModelError> {
        check_amount("fuel price", fuel_price_per_litre)?;
        self.fuel_price_per_litre = fuel_price_per_litre;
        self.fuel_per_mile = fuel_per_mile(fuel_price_per_litre, self.rates.van_mpg);
        Ok(())
    }

    /// Rates the model was built with.
    #[must_use]
    pub const fn rates(&self) -> &CostRates {
        &self.rates
    }

    /// Current fuel price in GBP per litre.
    #[must_use]
    pub const fn fuel_price_per_litre(&self) -> f64 {
        self.fuel_price_per_litre
    }

    /// Fuel cost of one mile in GBP.
    #[must_use]
    pub const fn fuel_per_mile(&self) -> f64 {
        self.fuel_per_mile
    }

    /// Mileage-independent cost of running the van for a day.
    #[must_use]
    pub fn fixed_cost(&self) -> f64 {
        self.rates.driver_daily_rate + self.rates.insurance_daily + self.rates.maintenance_buffer
    }

    /// Total operating cost for a route of `total_miles`.
    #[must_use]
    pub fn cost(&self, total_miles: f64, has_congestion_zone_stop: bool) -> f64 {
        let mut subtotal = self.fixed_cost() + total_miles * self.fuel_per_mile;
        if has_congestion_zone_stop {
            subtotal += self.rates.congestion_surcharge;
        }
        subtotal * self.rates.safety_margin
    }
}

fn fuel_per_mile(fuel_price_per_litre: f64, van_mpg: f64) -> f64 {
    fuel_price_per_litre * LITRES_PER_GALLON / van_mpg
}

fn check_amount(field: &'static str, value: f64) -> Result<(), CostModelError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(CostModelError::InvalidAmount { field, value })
    }
}

/// High-density postcode prefixes that trigger the congestion surcharge.
///
/// Matching is a plain prefix test against the normalized postcode, so
/// `"E1"` also matches `"E14 5AB"`.
///
/// # Examples
/// ```
/// use nodal_core::CongestionZones;
///
/// let zones = CongestionZones::default();
/// assert!(zones.contains("sw1a 1aa"));
/// assert!(!zones.contains("NN15 6NL"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CongestionZones {
    prefixes: Vec<String>,
}

impl Default for CongestionZones {
    fn default() -> Self {
        Self::new(LONDON_CONGESTION_PREFIXES)
    }
}

impl CongestionZones {
    /// Build a zone table from explicit prefixes.
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            prefixes: prefixes
                .into_iter()
                .map(|prefix| normalize_postcode(prefix.as_ref()))
                .filter(|prefix| !prefix.is_empty())
                .collect(),
        }
    }

    /// Whether `postcode` falls within any zone.
    #[must_use]
    pub fn contains(&self, postcode: &str) -> bool {
        let normalized = normalize_postcode(postcode);
        self.prefixes
            .iter()
            .any(|prefix| normalized.starts_with(prefix.as_str()))
    }

    /// Whether any of `postcodes` falls within a zone.
    pub fn any<'a, I>(&self, postcodes: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        postcodes.into_iter().any(|postcode| self.contains(postcode))
    }
}
