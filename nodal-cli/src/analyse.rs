//! Analyse command implementation for the Nodal CLI.

use std::fmt;
use std::io::Write;

use camino::Utf8PathBuf;
use chrono::{Local, NaiveDateTime};
use clap::Parser;
use nodal_core::{
    CapacityBudget, DEFAULT_MAX_LOOKUPS_PER_REGION, DEFAULT_POOL_LIMIT, DecisionReport,
    HistoryRecord, OrderPool, OrderSelector, ProviderConfig, RegionalDecision,
    RegionalDecisionPipeline, RouteDataProvider, RoutingBackend, RunStatus, VanSpec,
};
use nodal_data::routing::{DEFAULT_BASE_URL, HttpRoutingBackend, HttpRoutingBackendConfig};
use nodal_data::{HistoryLog, load_manifest, write_dispatch_list};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::regions::{require_existing, write_json};
use crate::{
    ARG_API_KEY, ARG_BASE_URL, ARG_DAILY_QUOTA, ARG_DEPOT, ARG_DISPATCH_DIR, ARG_FUEL_PRICE,
    ARG_HISTORY_LOG, ARG_MANIFEST, ARG_MAX_LOOKUPS, ARG_NOTE, ARG_POOL_LIMIT, ARG_REGION,
    ARG_VAN_PAYLOAD, ARG_VAN_VOLUME, CliError, ENV_ANALYSE_API_KEY, ENV_ANALYSE_MANIFEST,
    ENV_ANALYSE_REGION,
};

/// CLI arguments for the `analyse` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Load a carrier manifest, resolve road distances from the \
                 depot for one postcode region, fill the van greedily by \
                 courier value and print whether the run beats the courier. \
                 Accepted runs can be exported as a dispatch list and every \
                 run can be appended to the history log.",
    about = "Decide whether to run the van into one region"
)]
#[ortho_config(prefix = "NODAL")]
pub(crate) struct AnalyseArgs {
    /// Path to the carrier manifest (`.csv` or `.json`).
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) manifest: Option<Utf8PathBuf>,
    /// Postcode region to analyse, e.g. `NW`.
    #[arg(long = ARG_REGION, value_name = "code")]
    #[serde(default)]
    pub(crate) region: Option<String>,
    /// Distance Matrix API key.
    #[arg(long = ARG_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    /// Base URL of the Distance Matrix service.
    #[arg(long = ARG_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) base_url: Option<String>,
    /// Diesel price in GBP per litre.
    #[arg(long = ARG_FUEL_PRICE, value_name = "gbp")]
    #[serde(default)]
    pub(crate) fuel_price: Option<f64>,
    /// Declared van load volume in cubic metres.
    #[arg(long = ARG_VAN_VOLUME, value_name = "m3")]
    #[serde(default)]
    pub(crate) van_volume: Option<f64>,
    /// Van payload in kilograms.
    #[arg(long = ARG_VAN_PAYLOAD, value_name = "kg")]
    #[serde(default)]
    pub(crate) van_payload: Option<f64>,
    /// Maximum number of orders taken from the manifest.
    #[arg(long = ARG_POOL_LIMIT, value_name = "count")]
    #[serde(default)]
    pub(crate) pool_limit: Option<usize>,
    /// Ceiling on route lookups for this run.
    #[arg(long = ARG_DAILY_QUOTA, value_name = "count")]
    #[serde(default)]
    pub(crate) daily_quota: Option<u32>,
    /// Ceiling on distinct postcodes looked up in the region.
    #[arg(long = ARG_MAX_LOOKUPS, value_name = "count")]
    #[serde(default)]
    pub(crate) max_lookups_per_region: Option<usize>,
    /// Depot postcode every route starts from.
    #[arg(long = ARG_DEPOT, value_name = "postcode")]
    #[serde(default)]
    pub(crate) depot: Option<String>,
    /// Directory receiving the dispatch list of an accepted run.
    #[arg(long = ARG_DISPATCH_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) dispatch_dir: Option<Utf8PathBuf>,
    /// CSV history log to append this run to.
    #[arg(long = ARG_HISTORY_LOG, value_name = "path")]
    #[serde(default)]
    pub(crate) history_log: Option<Utf8PathBuf>,
    /// Free-text note stored with the history record.
    #[arg(long = ARG_NOTE, value_name = "text")]
    #[serde(default)]
    pub(crate) note: Option<String>,
}

impl AnalyseArgs {
    pub(crate) fn into_config(self) -> Result<AnalyseConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        AnalyseConfig::try_from(merged)
    }
}

/// Resolved `analyse` command configuration.
#[derive(Clone, PartialEq)]
pub(crate) struct AnalyseConfig {
    pub(crate) manifest: Utf8PathBuf,
    pub(crate) region: String,
    pub(crate) api_key: Option<String>,
    pub(crate) base_url: String,
    pub(crate) fuel_price: Option<f64>,
    pub(crate) van: VanSpec,
    pub(crate) pool_limit: usize,
    pub(crate) provider: ProviderConfig,
    pub(crate) max_lookups_per_region: usize,
    pub(crate) dispatch_dir: Option<Utf8PathBuf>,
    pub(crate) history_log: Option<Utf8PathBuf>,
    pub(crate) note: String,
}

impl fmt::Debug for AnalyseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyseConfig")
            .field("manifest", &self.manifest)
            .field("region", &self.region)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("fuel_price", &self.fuel_price)
            .field("van", &self.van)
            .field("pool_limit", &self.pool_limit)
            .field("provider", &self.provider)
            .field("max_lookups_per_region", &self.max_lookups_per_region)
            .field("dispatch_dir", &self.dispatch_dir)
            .field("history_log", &self.history_log)
            .field("note", &self.note)
            .finish()
    }
}

impl TryFrom<AnalyseArgs> for AnalyseConfig {
    type Error = CliError;

    fn try_from(args: AnalyseArgs) -> Result<Self, Self::Error> {
        let manifest = args.manifest.ok_or(CliError::MissingArgument {
            field: ARG_MANIFEST,
            env: ENV_ANALYSE_MANIFEST,
        })?;
        let region = args
            .region
            .filter(|region| !region.trim().is_empty())
            .ok_or(CliError::MissingArgument {
                field: ARG_REGION,
                env: ENV_ANALYSE_REGION,
            })?;

        let defaults = VanSpec::default();
        let van = VanSpec {
            volume_m3: args.van_volume.unwrap_or(defaults.volume_m3),
            payload_kg: args.van_payload.unwrap_or(defaults.payload_kg),
        };
        let mut provider = ProviderConfig::default();
        if let Some(depot) = args.depot {
            provider = provider.with_depot(depot);
        }
        if let Some(quota) = args.daily_quota {
            provider = provider.with_daily_quota(quota);
        }

        Ok(Self {
            manifest,
            region: region.trim().to_uppercase(),
            api_key: args.api_key,
            base_url: args.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            fuel_price: args.fuel_price,
            van,
            pool_limit: args.pool_limit.unwrap_or(DEFAULT_POOL_LIMIT),
            provider,
            max_lookups_per_region: args
                .max_lookups_per_region
                .unwrap_or(DEFAULT_MAX_LOOKUPS_PER_REGION),
            dispatch_dir: args.dispatch_dir,
            history_log: args.history_log,
            note: args.note.unwrap_or_default(),
        })
    }
}

/// Builds the routing backend for the current analyse invocation.
pub(super) trait RoutingBackendBuilder {
    fn build(&self, config: &AnalyseConfig) -> Result<Box<dyn RoutingBackend>, CliError>;
}

pub(super) struct HttpRoutingBackendBuilder;

impl RoutingBackendBuilder for HttpRoutingBackendBuilder {
    fn build(&self, config: &AnalyseConfig) -> Result<Box<dyn RoutingBackend>, CliError> {
        let api_key = config.api_key.clone().ok_or(CliError::MissingArgument {
            field: ARG_API_KEY,
            env: ENV_ANALYSE_API_KEY,
        })?;
        let backend_config =
            HttpRoutingBackendConfig::new(api_key).with_base_url(config.base_url.clone());
        let backend = HttpRoutingBackend::with_config(backend_config).map_err(|source| {
            CliError::BuildRoutingBackend {
                base_url: config.base_url.clone(),
                source,
            }
        })?;
        Ok(Box::new(backend))
    }
}

pub(super) fn run_analyse(args: AnalyseArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    let builder = HttpRoutingBackendBuilder;
    run_analyse_with(args, &builder, &mut stdout, Local::now().naive_local())
}

pub(super) fn run_analyse_with(
    args: AnalyseArgs,
    builder: &dyn RoutingBackendBuilder,
    writer: &mut dyn Write,
    now: NaiveDateTime,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let decision = decide(&config, builder)?;
    let dispatched = record_outcome(&config, &decision, now)?;
    if dispatched {
        log::info!("dispatch list written for region {}", decision.region);
    }
    write_json(writer, &DecisionReport::from_decision(&decision))
}

fn decide(
    config: &AnalyseConfig,
    builder: &dyn RoutingBackendBuilder,
) -> Result<RegionalDecision, CliError> {
    require_existing(&config.manifest, ARG_MANIFEST)?;
    let manifest = load_manifest(&config.manifest)?;
    let pool = OrderPool::new(manifest.orders, config.pool_limit);

    let budget = CapacityBudget::for_van(config.van)?;
    let mut selector = OrderSelector::default();
    if let Some(price) = config.fuel_price {
        selector.cost_model_mut().set_fuel_price(price)?;
    }
    let backend = builder.build(config)?;
    let provider = RouteDataProvider::with_config(backend, config.provider.clone())?;

    let mut pipeline = RegionalDecisionPipeline::new(provider, selector, budget)
        .with_max_lookups_per_region(config.max_lookups_per_region);
    let decision = pipeline.analyse(&pool, &config.region);
    log::info!(
        "region {}: {} of {} pooled orders loaded, {} route lookups used",
        decision.region,
        decision.selection.orders().len(),
        decision.pool_size,
        pipeline.provider().quota_used()
    );
    Ok(decision)
}

/// Write the dispatch list and history record requested by `config`.
///
/// Returns whether a dispatch list was written.
fn record_outcome(
    config: &AnalyseConfig,
    decision: &RegionalDecision,
    now: NaiveDateTime,
) -> Result<bool, CliError> {
    let dispatched = match &config.dispatch_dir {
        Some(dir) if decision.is_accepted() => {
            write_dispatch_list(dir, &decision.region, now, &decision.selection)?;
            true
        }
        _ => false,
    };
    if let Some(path) = &config.history_log {
        let status = if dispatched {
            RunStatus::Used
        } else {
            RunStatus::Rejected
        };
        let record = HistoryRecord::from_decision(now.date(), decision, status, config.note.clone());
        HistoryLog::new(path.clone()).append(&record)?;
    }
    Ok(dispatched)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<AnalyseConfig, CliError> {
    let merged = AnalyseArgs::merge_from_layers(layers).map_err(CliError::from)?;
    AnalyseConfig::try_from(merged)
}
