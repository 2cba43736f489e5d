//! Van capacity limits for a single run.
//!
//! The usable volume is deliberately lower than the declared load space to
//! leave room for pallets and irregular loading. Payload is used as rated.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Share of the declared load volume that can be filled in practice.
pub const UTILIZATION_RATIO: f64 = 0.80;

/// Declared load space of the default van, in cubic metres.
pub const DEFAULT_VAN_VOLUME_M3: f64 = 12.0;

/// Declared payload rating of the default van, in kilograms.
pub const DEFAULT_VAN_PAYLOAD_KG: f64 = 1500.0;

/// Declared physical specification of a van.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VanSpec {
    /// Declared load volume in cubic metres.
    pub volume_m3: f64,
    /// Declared payload rating in kilograms.
    pub payload_kg: f64,
}

impl Default for VanSpec {
    fn default() -> Self {
        Self {
            volume_m3: DEFAULT_VAN_VOLUME_M3,
            payload_kg: DEFAULT_VAN_PAYLOAD_KG,
        }
    }
}

/// Errors returned when building a [`CapacityBudget`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CapacityError {
    /// A limit was negative, NaN or infinite.
    #[error("{field} must be a finite, non-negative number (got {value})")]
    InvalidLimit {
        /// Name of the offending limit.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },
}

/// Volume and weight limits applied by the order selector.
///
/// # Examples
/// ```
/// use nodal_core::{CapacityBudget, VanSpec};
///
/// # fn main() -> Result<(), nodal_core::CapacityError> {
/// let budget = CapacityBudget::for_van(VanSpec::default())?;
/// assert!((budget.volume_limit() - 9.6).abs() < 1e-9);
/// assert_eq!(budget.weight_limit(), 1500.0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CapacityBudget {
    volume_limit: f64,
    weight_limit: f64,
}

impl CapacityBudget {
    /// Construct a budget from explicit limits.
    ///
    /// # Errors
    /// Returns [`CapacityError::InvalidLimit`] when either limit is negative
    /// or not finite.
    pub fn new(volume_limit: f64, weight_limit: f64) -> Result<Self, CapacityError> {
        check_limit("volume limit", volume_limit)?;
        check_limit("weight limit", weight_limit)?;
        Ok(Self {
            volume_limit,
            weight_limit,
        })
    }

    /// Derive a budget from a van specification.
    ///
    /// The volume limit is the declared volume scaled by
    /// [`UTILIZATION_RATIO`]; the payload is used unchanged.
    ///
    /// # Errors
    /// Returns [`CapacityError::InvalidLimit`] when the van spec holds a
    /// negative or non-finite value.
    pub fn for_van(spec: VanSpec) -> Result<Self, CapacityError> {
        check_limit("van volume", spec.volume_m3)?;
        check_limit("van payload", spec.payload_kg)?;
        Self::new(spec.volume_m3 * UTILIZATION_RATIO, spec.payload_kg)
    }

    /// Maximum total volume in cubic metres.
    #[must_use]
    pub const fn volume_limit(&self) -> f64 {
        self.volume_limit
    }

    /// Maximum total weight in kilograms.
    #[must_use]
    pub const fn weight_limit(&self) -> f64 {
        self.weight_limit
    }

    /// Whether a load of `volume` and `weight` fits within both limits.
    #[must_use]
    pub fn admits(&self, volume: f64, weight: f64) -> bool {
        volume <= self.volume_limit && weight <= self.weight_limit
    }
}

fn check_limit(field: &'static str, value: f64) -> Result<(), CapacityError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(CapacityError::InvalidLimit { field, value })
    }
}
