//! Shared test harness modules for the Nodal CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;

mod analyse_unit;
mod helpers;
mod regions_unit;
