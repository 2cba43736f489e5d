//! Error types emitted by the Nodal CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use nodal_core::{CapacityError, CostModelError, ProviderConfigError};
use nodal_data::routing::BackendBuildError;
use nodal_data::{DispatchError, HistoryLogError, ManifestError};
use thiserror::Error;

/// Errors emitted by the Nodal CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The manifest could not be loaded.
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    /// The van dimensions are unusable.
    #[error("invalid van specification: {0}")]
    Capacity(#[from] CapacityError),
    /// The fuel price or cost rates are unusable.
    #[error("invalid cost model: {0}")]
    CostModel(#[from] CostModelError),
    /// The route provider configuration is unusable.
    #[error("invalid routing configuration: {0}")]
    ProviderConfig(#[from] ProviderConfigError),
    /// Constructing the routing backend failed.
    #[error("failed to build routing backend for {base_url:?}: {source}")]
    BuildRoutingBackend {
        base_url: String,
        #[source]
        source: BackendBuildError,
    },
    /// Exporting the dispatch list failed.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    /// Appending to the run history failed.
    #[error(transparent)]
    History(#[from] HistoryLogError),
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
