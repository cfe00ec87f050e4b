//! Optimize command implementation for the Yardline CLI.

use std::io::Write;
use std::str::FromStr;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use yardline_core::{
    CostModel, DEFAULT_TIME_LIMIT, HaversineProvider, Optimizer, OptimizerConfig, RouteResult,
    RoutingSolver, TravelMatrixProvider,
};
use yardline_data::mapbox::{MapboxConfig, MapboxMatrixProvider};

use crate::fs::file_is_file;
use crate::plan::load_plan;
use crate::{
    ARG_MAPBOX_BASE_URL, ARG_MAPBOX_PROFILE, ARG_MAPBOX_TOKEN, ARG_MATRIX,
    ARG_MAX_CONCURRENT_REQUESTS, ARG_MAX_COORDS_PER_REQUEST, ARG_MAX_GENERATIONS, ARG_PLAN,
    ARG_TIME_LIMIT_SECS, CliError, ENV_PLAN, write_json,
};

/// CLI arguments for the `optimize` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Plan one route per day for the stops in a JSON plan file. \
                 Stops are only visited when their revenue outweighs the \
                 driving and labor they add. Travel times come from a \
                 straight-line estimate or the Mapbox Directions Matrix API.",
    about = "Plan profit-maximising routes for a plan file"
)]
#[ortho_config(prefix = "YARDLINE")]
pub(crate) struct OptimizeArgs {
    /// Path to a JSON plan file.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) plan_path: Option<Utf8PathBuf>,
    /// Travel matrix source: `haversine` (default) or `mapbox`.
    #[arg(long = ARG_MATRIX, value_name = "source")]
    #[serde(default)]
    pub(crate) matrix: Option<String>,
    /// Mapbox access token; falls back to `MAPBOX_ACCESS_TOKEN`.
    #[arg(long = ARG_MAPBOX_TOKEN, value_name = "token")]
    #[serde(default)]
    pub(crate) mapbox_token: Option<String>,
    /// Mapbox API host; falls back to `MAPBOX_BASE_URL`.
    #[arg(long = ARG_MAPBOX_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) mapbox_base_url: Option<String>,
    /// Directions Matrix profile; falls back to `MAPBOX_MATRIX_PROFILE`.
    #[arg(long = ARG_MAPBOX_PROFILE, value_name = "profile")]
    #[serde(default)]
    pub(crate) mapbox_profile: Option<String>,
    /// Coordinates sent in one matrix request.
    #[arg(long = ARG_MAX_COORDS_PER_REQUEST, value_name = "count")]
    #[serde(default)]
    pub(crate) max_coords_per_request: Option<usize>,
    /// Matrix requests allowed in flight at once.
    #[arg(long = ARG_MAX_CONCURRENT_REQUESTS, value_name = "count")]
    #[serde(default)]
    pub(crate) max_concurrent_requests: Option<usize>,
    /// Wall-clock limit for the route search in seconds.
    #[arg(long = ARG_TIME_LIMIT_SECS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) time_limit_secs: Option<u64>,
    /// Upper bound on search generations.
    #[arg(long = ARG_MAX_GENERATIONS, value_name = "count")]
    #[serde(default)]
    pub(crate) max_generations: Option<usize>,
}

impl OptimizeArgs {
    pub(crate) fn into_config(self) -> Result<OptimizeConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        OptimizeConfig::try_from(merged)
    }
}

/// Where travel distances and times come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum MatrixSource {
    /// Great-circle distance at the plan's average speed.
    #[default]
    Haversine,
    /// Mapbox Directions Matrix API.
    Mapbox,
}

impl FromStr for MatrixSource {
    type Err = CliError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "haversine" => Ok(Self::Haversine),
            "mapbox" => Ok(Self::Mapbox),
            _ => Err(CliError::UnknownMatrixSource {
                value: value.to_owned(),
            }),
        }
    }
}

/// Resolved `optimize` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OptimizeConfig {
    /// Path to the JSON plan file.
    pub(crate) plan_path: Utf8PathBuf,
    /// Travel matrix source.
    pub(crate) matrix: MatrixSource,
    /// Mapbox settings, used when `matrix` is [`MatrixSource::Mapbox`].
    pub(crate) mapbox: MapboxConfig,
    /// Solver wall-clock limit.
    pub(crate) time_limit: Duration,
    /// Optional generation cap passed to the solver.
    pub(crate) max_generations: Option<usize>,
}

impl OptimizeConfig {
    /// Combine merged arguments with Mapbox settings read from elsewhere.
    pub(crate) fn resolve(args: OptimizeArgs, mapbox: MapboxConfig) -> Result<Self, CliError> {
        let plan_path = args.plan_path.ok_or(CliError::MissingArgument {
            field: ARG_PLAN,
            env: ENV_PLAN,
        })?;
        let matrix = args
            .matrix
            .as_deref()
            .map(MatrixSource::from_str)
            .transpose()?
            .unwrap_or_default();
        let time_limit = match args.time_limit_secs {
            Some(0) => {
                return Err(CliError::OutOfRange {
                    field: ARG_TIME_LIMIT_SECS,
                    minimum: 1,
                    value: 0,
                });
            }
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_TIME_LIMIT,
        };

        let mut mapbox = mapbox;
        if let Some(token) = args.mapbox_token {
            mapbox = mapbox.with_access_token(token);
        }
        if let Some(base_url) = args.mapbox_base_url {
            mapbox = mapbox.with_base_url(base_url);
        }
        if let Some(profile) = args.mapbox_profile {
            mapbox = mapbox.with_profile(profile);
        }
        if let Some(limit) = args.max_coords_per_request {
            mapbox = mapbox.with_max_coordinates_per_request(limit);
        }
        if let Some(limit) = args.max_concurrent_requests {
            mapbox = mapbox.with_max_concurrent_requests(limit);
        }

        Ok(Self {
            plan_path,
            matrix,
            mapbox,
            time_limit,
            max_generations: args.max_generations,
        })
    }

    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.plan_path, ARG_PLAN)
    }
}

impl TryFrom<OptimizeArgs> for OptimizeConfig {
    type Error = CliError;

    fn try_from(args: OptimizeArgs) -> Result<Self, Self::Error> {
        Self::resolve(args, MapboxConfig::from_env())
    }
}

fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match file_is_file(path) {
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

/// Builds the matrix provider and solver for the current invocation.
pub(super) trait OptimizerBuilder {
    fn provider(
        &self,
        config: &OptimizeConfig,
        cost_model: &CostModel,
    ) -> Result<Box<dyn TravelMatrixProvider>, CliError>;

    fn solver(&self, config: &OptimizeConfig) -> Result<Box<dyn RoutingSolver>, CliError>;
}

pub(super) struct DefaultOptimizerBuilder;

impl OptimizerBuilder for DefaultOptimizerBuilder {
    fn provider(
        &self,
        config: &OptimizeConfig,
        cost_model: &CostModel,
    ) -> Result<Box<dyn TravelMatrixProvider>, CliError> {
        match config.matrix {
            MatrixSource::Haversine => Ok(Box::new(HaversineProvider::for_cost_model(cost_model))),
            MatrixSource::Mapbox => {
                let provider = MapboxMatrixProvider::new(config.mapbox.clone())
                    .map_err(CliError::BuildMatrixProvider)?;
                Ok(Box::new(provider))
            }
        }
    }

    #[cfg(feature = "solver-vrp")]
    fn solver(&self, _config: &OptimizeConfig) -> Result<Box<dyn RoutingSolver>, CliError> {
        Ok(Box::new(yardline_solver_vrp::VrpSolver::new()))
    }

    #[cfg(not(feature = "solver-vrp"))]
    fn solver(&self, _config: &OptimizeConfig) -> Result<Box<dyn RoutingSolver>, CliError> {
        Err(CliError::MissingFeature {
            feature: "solver-vrp",
            action: "optimize",
        })
    }
}

pub(super) fn run_optimize(args: OptimizeArgs) -> Result<(), CliError> {
    // Unlocked: the solve thread must be able to reach stdout while we wait on it.
    let mut stdout = std::io::stdout();
    let builder = DefaultOptimizerBuilder;
    run_optimize_with(args, &builder, &mut stdout)
}

pub(super) fn run_optimize_with(
    args: OptimizeArgs,
    builder: &dyn OptimizerBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let routes = execute_optimize(&config, builder)?;
    write_json(writer, &routes)
}

pub(super) fn execute_optimize(
    config: &OptimizeConfig,
    builder: &dyn OptimizerBuilder,
) -> Result<Vec<RouteResult>, CliError> {
    let plan = load_plan(&config.plan_path)?;
    let request =
        plan.into_request(config.time_limit)
            .map_err(|source| CliError::InvalidCostInputs {
                path: config.plan_path.clone(),
                source,
            })?;
    tracing::info!(
        stops = request.stops.len(),
        days = request.day_count,
        matrix = ?config.matrix,
        "optimizing plan {}",
        config.plan_path
    );

    let provider = builder.provider(config, &request.cost_model)?;
    let solver = builder.solver(config)?;
    let optimizer = Optimizer::with_config(
        provider,
        solver,
        OptimizerConfig {
            max_generations: config.max_generations,
            ..OptimizerConfig::default()
        },
    );
    let routes = optimizer
        .optimize(&request)
        .map_err(|source| CliError::Optimize { source })?;

    let visited: usize = routes.iter().map(|route| route.stops.len()).sum();
    tracing::info!(
        visited,
        offered = request.stops.len(),
        "planned {} routes",
        routes.len()
    );
    Ok(routes)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<OptimizeConfig, CliError> {
    let merged = OptimizeArgs::merge_from_layers(layers).map_err(CliError::from)?;
    OptimizeConfig::resolve(merged, MapboxConfig::default())
}
