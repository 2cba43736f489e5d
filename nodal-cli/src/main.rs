//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "nodal_core=info,nodal_data=info,nodal_cli=info";

fn main() {
    init_logging();
    if let Err(err) = nodal_cli::run() {
        eprintln!("nodal: {err}");
        std::process::exit(1);
    }
}

/// Send `log` records from the library crates to stderr.
fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
