//! Caller-facing entry point tying the routing pipeline together.

use std::collections::HashSet;
use std::time::Duration;

use geo::Coord;
use thiserror::Error;

use crate::assemble::{RouteResult, assemble_routes};
use crate::cost::CostModel;
use crate::matrix::{MatrixError, TravelMatrixProvider};
use crate::model::{DEFAULT_DAY_TIME_BUDGET_MINUTES, FormulationError, RoutingModel};
use crate::orchestrate::SolveOrchestrator;
use crate::solver::{DEFAULT_TIME_LIMIT, RoutingSolver, SearchParameters, SolveError};
use crate::stop::{Stop, StopError, is_valid_coordinate};

/// Fraction of absent matrix cells above which a warning is logged.
pub const DEFAULT_MISSING_CELL_WARNING_RATIO: f64 = 0.1;

/// Problems with an [`OptimizeRequest`] detected before any work starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// At least one day is required.
    #[error("day count must be at least one")]
    NoDays,
    /// The per-day time budget must be positive.
    #[error("day time budget must be greater than zero minutes")]
    ZeroTimeBudget,
    /// The depot coordinate is not a valid longitude/latitude pair.
    #[error("depot has an invalid coordinate")]
    InvalidDepot,
    /// A stop failed validation.
    #[error(transparent)]
    Stop(#[from] StopError),
    /// Two stops share an identifier.
    #[error("stop identifier {id} appears more than once")]
    DuplicateStopId {
        /// The repeated identifier.
        id: String,
    },
}

/// Errors returned by [`Optimizer::optimize`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptimizeError {
    /// The request was rejected before any work started.
    #[error("invalid optimisation request: {0}")]
    Request(#[from] RequestError),
    /// The travel matrix could not be produced.
    #[error("failed to build travel matrix: {0}")]
    Matrix(#[from] MatrixError),
    /// The routing model could not be built.
    #[error("failed to formulate routing model: {0}")]
    Formulation(#[from] FormulationError),
    /// The solver failed or found nothing feasible.
    #[error(transparent)]
    Solve(#[from] SolveError),
}

/// A single optimisation run.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use geo::Coord;
/// use yardline_core::{CostModel, CostModelParams, OptimizeRequest};
///
/// # fn main() -> Result<(), yardline_core::CostModelError> {
/// let request = OptimizeRequest::new(
///     Coord { x: -97.74, y: 30.27 },
///     Vec::new(),
///     CostModel::new(CostModelParams::default())?,
/// )
/// .with_day_count(3)
/// .with_time_limit(Duration::from_secs(5));
/// assert_eq!(request.day_time_budget, 480);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeRequest {
    /// Start and end of every route.
    pub depot: Coord<f64>,
    /// Candidate visits.
    pub stops: Vec<Stop>,
    /// Vehicle and labor rates.
    pub cost_model: CostModel,
    /// Number of days, one route each.
    pub day_count: u32,
    /// Minutes available per day.
    pub day_time_budget: u32,
    /// Wall-clock limit for the solver.
    pub time_limit: Duration,
}

impl OptimizeRequest {
    /// A one-day request with the default budget and time limit.
    #[must_use]
    pub fn new(depot: Coord<f64>, stops: Vec<Stop>, cost_model: CostModel) -> Self {
        Self {
            depot,
            stops,
            cost_model,
            day_count: 1,
            day_time_budget: DEFAULT_DAY_TIME_BUDGET_MINUTES,
            time_limit: DEFAULT_TIME_LIMIT,
        }
    }

    /// Set the number of days.
    #[must_use]
    pub fn with_day_count(mut self, day_count: u32) -> Self {
        self.day_count = day_count;
        self
    }

    /// Set the per-day time budget in minutes.
    #[must_use]
    pub fn with_day_time_budget(mut self, minutes: u32) -> Self {
        self.day_time_budget = minutes;
        self
    }

    /// Set the solver time limit.
    #[must_use]
    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }

    fn validate(&self) -> Result<(), RequestError> {
        if self.day_count == 0 {
            return Err(RequestError::NoDays);
        }
        if self.day_time_budget == 0 {
            return Err(RequestError::ZeroTimeBudget);
        }
        if !is_valid_coordinate(self.depot) {
            return Err(RequestError::InvalidDepot);
        }
        let mut seen = HashSet::with_capacity(self.stops.len());
        for stop in &self.stops {
            stop.validate()?;
            if !seen.insert(stop.id.as_str()) {
                return Err(RequestError::DuplicateStopId {
                    id: stop.id.clone(),
                });
            }
        }
        Ok(())
    }

    fn points(&self) -> Vec<Coord<f64>> {
        std::iter::once(self.depot)
            .chain(self.stops.iter().map(|s| s.location))
            .collect()
    }
}

/// Tuning for [`Optimizer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizerConfig {
    /// Warn when more than this fraction of off-diagonal cells is absent.
    pub missing_cell_warning_ratio: f64,
    /// Optional cap on solver generations, applied on top of the time limit.
    pub max_generations: Option<usize>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            missing_cell_warning_ratio: DEFAULT_MISSING_CELL_WARNING_RATIO,
            max_generations: None,
        }
    }
}

/// Plan profit-maximising routes from a matrix provider and a solver.
///
/// The optimizer holds no state between runs.
#[derive(Debug, Clone)]
pub struct Optimizer<P, S> {
    provider: P,
    orchestrator: SolveOrchestrator<S>,
    config: OptimizerConfig,
}

impl<P, S> Optimizer<P, S>
where
    P: TravelMatrixProvider,
    S: RoutingSolver,
{
    /// Combine a matrix provider and a solver with the default config.
    pub fn new(provider: P, solver: S) -> Self {
        Self::with_config(provider, solver, OptimizerConfig::default())
    }

    /// Combine a matrix provider and a solver.
    pub fn with_config(provider: P, solver: S, config: OptimizerConfig) -> Self {
        Self {
            provider,
            orchestrator: SolveOrchestrator::new(solver),
            config,
        }
    }

    /// Borrow the matrix provider.
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Plan one route per day, sorted by descending profit.
    ///
    /// With no stops, returns one empty route per day without consulting the
    /// provider or the solver.
    ///
    /// # Errors
    ///
    /// Returns [`OptimizeError::Request`] for invalid input, and otherwise
    /// wraps the first failing stage.
    pub fn optimize(&self, request: &OptimizeRequest) -> Result<Vec<RouteResult>, OptimizeError> {
        request.validate()?;
        if request.stops.is_empty() {
            log::info!("no stops to route; returning {} empty days", request.day_count);
            return Ok((0..request.day_count as usize)
                .map(RouteResult::empty)
                .collect());
        }

        let matrix = self.provider.travel_matrix(&request.points())?;
        let missing = matrix.missing_fraction();
        if missing > self.config.missing_cell_warning_ratio {
            log::warn!(
                "{} of {} travel matrix cells are missing ({:.1}%); affected stops are treated as unreachable",
                matrix.missing_cells(),
                matrix.size() * matrix.size().saturating_sub(1),
                missing * 100.0
            );
        }

        let model = RoutingModel::formulate(
            &matrix,
            &request.stops,
            &request.cost_model,
            request.day_count,
            request.day_time_budget,
        )?;

        let mut params = SearchParameters::default().with_time_limit(request.time_limit);
        if let Some(generations) = self.config.max_generations {
            params = params.with_max_generations(generations);
        }
        let assignment = self.orchestrator.run(&model, &params)?;

        let routes = assemble_routes(&assignment, &matrix, &request.stops, &request.cost_model);
        log::info!(
            "planned {} of {} stops over {} days",
            routes.iter().map(|r| r.stops.len()).sum::<usize>(),
            request.stops.len(),
            request.day_count
        );
        Ok(routes)
    }
}
