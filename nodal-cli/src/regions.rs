//! Regions command implementation for the Nodal CLI.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use nodal_core::{DEFAULT_POOL_LIMIT, DEFAULT_TOP_REGIONS, OrderPool, RegionSummary};
use nodal_data::load_manifest;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{ARG_MANIFEST, ARG_POOL_LIMIT, ARG_TOP, CliError, ENV_REGIONS_MANIFEST};

/// CLI arguments for the `regions` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Load a carrier manifest, keep the first orders up to the \
                 pool limit and list the postcode regions with the highest \
                 courier spend.",
    about = "List the most valuable regions in a manifest"
)]
#[ortho_config(prefix = "NODAL")]
pub(crate) struct RegionsArgs {
    /// Path to the carrier manifest (`.csv` or `.json`).
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) manifest: Option<Utf8PathBuf>,
    /// Maximum number of orders taken from the manifest.
    #[arg(long = ARG_POOL_LIMIT, value_name = "count")]
    #[serde(default)]
    pub(crate) pool_limit: Option<usize>,
    /// Number of regions to list.
    #[arg(long = ARG_TOP, value_name = "count")]
    #[serde(default)]
    pub(crate) top: Option<usize>,
}

impl RegionsArgs {
    pub(crate) fn into_config(self) -> Result<RegionsConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RegionsConfig::try_from(merged)
    }
}

/// Resolved `regions` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RegionsConfig {
    pub(crate) manifest: Utf8PathBuf,
    pub(crate) pool_limit: usize,
    pub(crate) top: usize,
}

impl TryFrom<RegionsArgs> for RegionsConfig {
    type Error = CliError;

    fn try_from(args: RegionsArgs) -> Result<Self, Self::Error> {
        let manifest = args.manifest.ok_or(CliError::MissingArgument {
            field: ARG_MANIFEST,
            env: ENV_REGIONS_MANIFEST,
        })?;
        Ok(Self {
            manifest,
            pool_limit: args.pool_limit.unwrap_or(DEFAULT_POOL_LIMIT),
            top: args.top.unwrap_or(DEFAULT_TOP_REGIONS),
        })
    }
}

/// Check that `path` names an existing regular file.
pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match nodal_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

pub(super) fn run_regions(args: RegionsArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_regions_with(args, &mut stdout)
}

pub(super) fn run_regions_with(args: RegionsArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let summaries = rank_regions(&config)?;
    write_json(writer, &summaries)
}

fn rank_regions(config: &RegionsConfig) -> Result<Vec<RegionSummary>, CliError> {
    require_existing(&config.manifest, ARG_MANIFEST)?;
    let manifest = load_manifest(&config.manifest)?;
    let pool = OrderPool::new(manifest.orders, config.pool_limit);
    Ok(pool.top_regions(config.top))
}

/// Pretty-print `value` as JSON followed by a newline.
pub(crate) fn write_json<T: Serialize + ?Sized>(
    writer: &mut dyn Write,
    value: &T,
) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<RegionsConfig, CliError> {
    let merged = RegionsArgs::merge_from_layers(layers).map_err(CliError::from)?;
    RegionsConfig::try_from(merged)
}
