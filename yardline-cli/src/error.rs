//! Error types emitted by the Yardline CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use yardline_core::{CostModelError, GeocodeError, OptimizeError};
use yardline_data::mapbox::ProviderBuildError;

/// Errors emitted by the Yardline CLI.
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
    /// The requested operation requires a missing compile-time feature.
    #[error("{action} requires the `{feature}` feature to be enabled")]
    MissingFeature {
        feature: &'static str,
        action: &'static str,
    },
    /// A numeric option was outside its accepted range.
    #[error("{field} must be at least {minimum}, got {value}")]
    OutOfRange {
        field: &'static str,
        minimum: u64,
        value: u64,
    },
    /// The travel matrix source was not recognised.
    #[error("unknown matrix source {value:?} (expected `haversine` or `mapbox`)")]
    UnknownMatrixSource { value: String },
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
    /// Opening the plan file failed.
    #[error("failed to open plan at {path:?}: {source}")]
    OpenPlan {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Plan JSON could not be decoded.
    #[error("failed to parse plan JSON at {path:?}: {source}")]
    ParsePlan {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The plan's cost inputs did not resolve to a usable cost model.
    #[error("cost inputs in {path:?} are invalid: {source}")]
    InvalidCostInputs {
        path: Utf8PathBuf,
        #[source]
        source: CostModelError,
    },
    /// Constructing the Mapbox matrix provider failed.
    #[error("failed to build Mapbox matrix provider: {0}")]
    BuildMatrixProvider(#[source] ProviderBuildError),
    /// Constructing the Mapbox geocoder failed.
    #[error("failed to build Mapbox geocoder: {0}")]
    BuildGeocoder(#[source] ProviderBuildError),
    /// The optimizer rejected or failed the plan.
    #[error("optimization failed: {source}")]
    Optimize { source: OptimizeError },
    /// The address could not be geocoded.
    #[error("failed to geocode {address:?}: {source}")]
    Geocode {
        address: String,
        #[source]
        source: GeocodeError,
    },
    /// Serializing command output failed.
    #[error("failed to serialize output: {0}")]
    SerializeOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
