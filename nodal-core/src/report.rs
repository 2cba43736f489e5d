//! Operational summary of a regional decision.

use std::fmt;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{RegionalDecision, Rejection, Verdict, count_as_f64, round_to_hundredths};

/// Average van speed used to turn miles into driving hours.
pub const AVERAGE_SPEED_MPH: f64 = 25.0;

/// Time allowed per drop, in hours.
pub const HOURS_PER_STOP: f64 = 0.05;

/// Longest shift one driver may legally drive, in hours.
pub const DRIVING_LIMIT_HOURS: f64 = 9.0;

/// Estimated shift length for `route_miles` with `stops` drops.
#[must_use]
pub fn shift_hours(route_miles: f64, stops: usize) -> f64 {
    route_miles / AVERAGE_SPEED_MPH + count_as_f64(stops) * HOURS_PER_STOP
}

/// Figures a dispatcher needs to confirm or reject a van run.
///
/// Monetary fields and hours are rounded to two decimal places. A rejected
/// decision reports zeros, apart from `rejection`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct DecisionReport {
    /// Region code.
    pub region: String,
    /// Orders in the daily pool.
    pub pool_size: usize,
    /// Whether the van run was accepted.
    pub accepted: bool,
    /// Orders loaded onto the van.
    pub orders_in_van: usize,
    /// Estimated route length in miles.
    pub route_miles: f64,
    /// Estimated shift length in hours, including drops.
    pub shift_hours: f64,
    /// Courier charges avoided, in GBP.
    pub courier_savings: f64,
    /// Van operating cost, in GBP.
    pub van_cost: f64,
    /// Savings minus cost, in GBP.
    pub net_profit: f64,
    /// Whether the shift exceeds the single-driver limit.
    pub exceeds_driving_limit: bool,
    /// Why the region stays with the courier, when rejected.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub rejection: Option<Rejection>,
}

impl DecisionReport {
    /// Summarise `decision`.
    ///
    /// Cost and savings are taken from the verdict so the report agrees with
    /// the profitability gate.
    #[must_use]
    pub fn from_decision(decision: &RegionalDecision) -> Self {
        let selection = &decision.selection;
        let (economics, rejection) = match selection.verdict() {
            Verdict::Accepted(economics) => (Some(*economics), None),
            Verdict::Rejected(reason) => (None, Some(*reason)),
        };
        let stops = selection.orders().len();
        let route_miles = selection.total_route_miles();
        let hours = if economics.is_some() {
            shift_hours(route_miles, stops)
        } else {
            0.0
        };
        let (savings, cost) = economics.map_or((0.0, 0.0), |e| (e.savings, e.cost));

        Self {
            region: decision.region.clone(),
            pool_size: decision.pool_size,
            accepted: economics.is_some(),
            orders_in_van: stops,
            route_miles: round_to_hundredths(route_miles),
            shift_hours: round_to_hundredths(hours),
            courier_savings: round_to_hundredths(savings),
            van_cost: round_to_hundredths(cost),
            net_profit: round_to_hundredths(savings - cost),
            exceeds_driving_limit: hours > DRIVING_LIMIT_HOURS,
            rejection,
        }
    }
}

impl fmt::Display for DecisionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.accepted {
            return write!(
                f,
                "{}: no profitable route in a pool of {}",
                self.region, self.pool_size
            );
        }
        writeln!(f, "{} operational plan", self.region)?;
        writeln!(f, "pool size:       {}", self.pool_size)?;
        writeln!(f, "orders in van:   {}", self.orders_in_van)?;
        writeln!(f, "route estimate:  {:.2} miles", self.route_miles)?;
        writeln!(f, "shift estimate:  {:.1} hours", self.shift_hours)?;
        writeln!(f, "courier saved:   £{:.2}", self.courier_savings)?;
        writeln!(f, "van cost:        £{:.2}", self.van_cost)?;
        write!(f, "net profit:      £{:.2}", self.net_profit)?;
        if self.exceeds_driving_limit {
            write!(f, "\nwarning: shift exceeds the single-driver limit")?;
        }
        Ok(())
    }
}
