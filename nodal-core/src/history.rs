//! Daily run records for later profit tracking.

use std::fmt;

use chrono::NaiveDate;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{RegionalDecision, round_to_hundredths};

/// Whether the dispatcher ran the van.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum RunStatus {
    /// The van route was dispatched.
    Used,
    /// The region stayed with the courier.
    Rejected,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Used => "USED",
            Self::Rejected => "REJECTED",
        })
    }
}

/// One line of the run history.
///
/// Van cost is only booked for a `USED` run that carried orders; otherwise
/// it is zero and the profit equals the savings on paper.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HistoryRecord {
    /// Day of the run.
    pub date: NaiveDate,
    /// Orders in the pool.
    pub pool_size: usize,
    /// Orders selected for the van.
    pub selected_count: usize,
    /// Van operating cost in GBP.
    pub cost: f64,
    /// Courier charges avoided in GBP.
    pub savings: f64,
    /// Savings minus cost in GBP.
    pub profit: f64,
    /// Dispatcher's decision.
    pub status: RunStatus,
    /// Free-text note, e.g. the driver's name.
    pub note: String,
}

impl HistoryRecord {
    /// Record the outcome of `decision` on `date`.
    #[must_use]
    pub fn from_decision(
        date: NaiveDate,
        decision: &RegionalDecision,
        status: RunStatus,
        note: impl Into<String>,
    ) -> Self {
        let selection = &decision.selection;
        let selected_count = selection.orders().len();
        let savings = round_to_hundredths(
            selection
                .orders()
                .iter()
                .map(|routed| routed.order.courier_cost())
                .sum(),
        );
        let cost = match (status, selection.economics()) {
            (RunStatus::Used, Some(economics)) if selected_count > 0 => {
                round_to_hundredths(economics.cost)
            }
            _ => 0.0,
        };
        Self {
            date,
            pool_size: decision.pool_size,
            selected_count,
            cost,
            savings,
            profit: round_to_hundredths(savings - cost),
            status,
            note: note.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::routed_order;
    use crate::{CapacityBudget, OrderSelector};
    use rstest::{fixture, rstest};

    #[fixture]
    fn accepted() -> RegionalDecision {
        let budget = CapacityBudget::new(9.6, 1500.0).expect("valid budget");
        let candidates = vec![
            routed_order("A1", 250.0, "B37 7GT", 20.0, 0.5, 45.0),
            routed_order("A2", 150.5, "B37 7GU", 20.0, 0.5, 45.0),
        ];
        RegionalDecision {
            region: "B".into(),
            pool_size: 310,
            candidate_count: 2,
            routed_count: 2,
            unresolved_postcodes: Vec::new(),
            deferred_postcodes: Vec::new(),
            selection: OrderSelector::default().select(&candidates, &budget),
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date")
    }

    #[rstest]
    fn used_run_books_van_cost(accepted: RegionalDecision) {
        let record = HistoryRecord::from_decision(day(), &accepted, RunStatus::Used, "Sam");
        assert_eq!(record.selected_count, 2);
        assert!((record.savings - 400.5).abs() < 1e-9);
        assert!(record.cost > 0.0);
        assert!((record.profit - round_to_hundredths(record.savings - record.cost)).abs() < 1e-9);
        assert_eq!(record.note, "Sam");
    }

    #[rstest]
    fn rejected_run_books_no_cost(accepted: RegionalDecision) {
        let record = HistoryRecord::from_decision(day(), &accepted, RunStatus::Rejected, "");
        assert_eq!(record.cost, 0.0);
        assert_eq!(record.profit, record.savings);
    }

    #[rstest]
    #[case(RunStatus::Used, "USED")]
    #[case(RunStatus::Rejected, "REJECTED")]
    fn status_displays_in_capitals(#[case] status: RunStatus, #[case] expected: &str) {
        assert_eq!(status.to_string(), expected);
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn record_serializes_status_in_capitals(accepted: RegionalDecision) {
        let record = HistoryRecord::from_decision(day(), &accepted, RunStatus::Used, "");
        let json = serde_json::to_value(&record).expect("serialize");
        assert_eq!(json["status"], "USED");
        assert_eq!(json["date"], "2025-03-14");
    }
}
