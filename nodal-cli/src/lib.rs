//! Command-line interface for the Nodal van-route decision engine.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod analyse;
mod error;
mod regions;

pub use error::CliError;

use analyse::{AnalyseArgs, run_analyse};
use regions::{RegionsArgs, run_regions};

pub(crate) const ARG_MANIFEST: &str = "manifest";
pub(crate) const ARG_REGION: &str = "region";
pub(crate) const ARG_API_KEY: &str = "api-key";
pub(crate) const ARG_BASE_URL: &str = "base-url";
pub(crate) const ARG_POOL_LIMIT: &str = "pool-limit";
pub(crate) const ARG_TOP: &str = "top";
pub(crate) const ARG_FUEL_PRICE: &str = "fuel-price";
pub(crate) const ARG_VAN_VOLUME: &str = "van-volume";
pub(crate) const ARG_VAN_PAYLOAD: &str = "van-payload";
pub(crate) const ARG_DAILY_QUOTA: &str = "daily-quota";
pub(crate) const ARG_MAX_LOOKUPS: &str = "max-lookups-per-region";
pub(crate) const ARG_DEPOT: &str = "depot";
pub(crate) const ARG_DISPATCH_DIR: &str = "dispatch-dir";
pub(crate) const ARG_HISTORY_LOG: &str = "history-log";
pub(crate) const ARG_NOTE: &str = "note";
pub(crate) const ENV_REGIONS_MANIFEST: &str = "NODAL_CMDS_REGIONS_MANIFEST";
pub(crate) const ENV_ANALYSE_MANIFEST: &str = "NODAL_CMDS_ANALYSE_MANIFEST";
pub(crate) const ENV_ANALYSE_REGION: &str = "NODAL_CMDS_ANALYSE_REGION";
pub(crate) const ENV_ANALYSE_API_KEY: &str = "NODAL_CMDS_ANALYSE_API_KEY";

/// Run the Nodal CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when argument parsing, configuration, loading the
/// manifest, routing or writing any output fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Regions(args) => run_regions(args),
        Command::Analyse(args) => run_analyse(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "nodal",
    about = "Decide whether today's orders justify running the van",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rank postcode regions in a manifest by courier spend.
    Regions(RegionsArgs),
    /// Load a van for one region and decide whether the run pays.
    Analyse(AnalyseArgs),
}

#[cfg(test)]
mod tests;
