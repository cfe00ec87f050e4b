//! Facade crate for the Yardline route planner.
//!
//! This crate re-exports the core domain types and exposes the Mapbox
//! clients and the `vrp-core` solver behind feature flags.

#![forbid(unsafe_code)]

pub use yardline_core::{
    CompanyCostDefaults, CostInputs, CostModel, CostModelError, CostModelParams, Distance,
    GeocodeError, Geocoder, HaversineProvider, Leg, MatrixError, OptimizeError, OptimizeRequest,
    Optimizer, OptimizerConfig, RouteAssignment, RouteResult, RoutingModel, RoutingSolver,
    SearchParameters, SolveError, Stop, StopResult, TravelMatrix, TravelMatrixProvider,
    VehicleCosts,
};

#[cfg(feature = "mapbox")]
pub use yardline_data::mapbox::{MapboxConfig, MapboxGeocoder, MapboxMatrixProvider};

#[cfg(feature = "solver-vrp")]
pub use yardline_solver_vrp::{VrpSolver, VrpSolverConfig};
