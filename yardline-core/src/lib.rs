//! Core domain types and pipeline for the Yardline routing engine.
//!
//! Yardline plans multi-day service routes that maximise profit: revenue
//! collected at visited stops minus the vehicle and labor cost of reaching
//! them. A stop is skipped whenever visiting it costs more than it earns.
//!
//! Responsibilities:
//! - Validate stops and derive per-mile and per-minute rates ([`cost`]).
//! - Describe travel between nodes ([`matrix`]) and estimate it offline.
//! - Formulate the prize-collecting model ([`model`]) for a
//!   [`RoutingSolver`].
//! - Run the solver off-thread and check its answer ([`orchestrate`]).
//! - Price the chosen routes ([`assemble`]) and expose a single entry point
//!   ([`Optimizer`]).
//!
//! Boundaries:
//! - No network access; road-network matrices and geocoding live in
//!   `yardline-data`.
//! - No solver search; implementations live in solver crates.
//!
//! Invariants:
//! - Money and distance use fixed-point arithmetic and round only when
//!   reported.
//! - No state is retained between runs.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod assemble;
pub mod cost;
pub mod distance;
pub mod geocode;
pub mod matrix;
pub mod model;
pub mod optimize;
pub mod orchestrate;
pub mod solver;
pub mod stop;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use assemble::{RouteResult, StopResult, assemble_routes};
pub use cost::{
    CompanyCostDefaults, CostInputs, CostModel, CostModelError, CostModelParams,
    DEFAULT_AVERAGE_SPEED_MPH, DEFAULT_FUEL_EFFICIENCY_MPG, VehicleCosts, round_to_cent,
    to_cents,
};
pub use distance::{Distance, METERS_PER_MILE, seconds_to_minutes};
pub use geocode::{GeocodeError, Geocoder};
pub use matrix::{HaversineProvider, Leg, MatrixError, TravelMatrix, TravelMatrixProvider};
pub use model::{
    DEFAULT_DAY_TIME_BUDGET_MINUTES, DEFAULT_SLACK_MINUTES, DEPOT, FormulationError,
    RoutingModel, UNREACHABLE,
};
pub use optimize::{
    DEFAULT_MISSING_CELL_WARNING_RATIO, OptimizeError, OptimizeRequest, Optimizer,
    OptimizerConfig, RequestError,
};
pub use orchestrate::SolveOrchestrator;
pub use solver::{
    DEFAULT_TIME_LIMIT, RouteAssignment, RoutingSolver, SearchParameters, SolveError,
};
pub use stop::{Stop, StopError, is_valid_coordinate};
