//! `VrpSolver` implementation backed by `vrp-core`.

use std::time::Instant;

use yardline_core::{RouteAssignment, RoutingModel, RoutingSolver, SearchParameters, SolveError};

use crate::polish::polish;
use crate::vrp::VrpSolveContext;

/// Configuration for [`VrpSolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VrpSolverConfig {
    /// Upper bound on `vrp-core` generations when the search parameters do
    /// not set one.
    pub max_generations: usize,
    /// Run the deterministic drop/insert pass after the search.
    pub polish: bool,
}

impl Default for VrpSolverConfig {
    fn default() -> Self {
        Self {
            max_generations: 200,
            polish: true,
        }
    }
}

/// Native solver using `vrp-core` to search for high-profit routes.
///
/// Stops that cannot be served within a day are never offered to the
/// search. With no servable stops the solver returns one empty route per day
/// without starting `vrp-core`.
///
/// # Examples
/// ```rust
/// use yardline_core::{Optimizer, HaversineProvider};
/// use yardline_solver_vrp::VrpSolver;
///
/// let optimizer = Optimizer::new(HaversineProvider::default(), VrpSolver::default());
/// # let _ = optimizer;
/// ```
#[derive(Debug, Clone, Default)]
pub struct VrpSolver {
    config: VrpSolverConfig,
}

impl VrpSolver {
    /// Construct a solver using default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a solver with explicit configuration.
    #[must_use]
    pub const fn with_config(config: VrpSolverConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &VrpSolverConfig {
        &self.config
    }
}

impl RoutingSolver for VrpSolver {
    fn solve(
        &self,
        model: &RoutingModel,
        params: &SearchParameters,
    ) -> Result<RouteAssignment, SolveError> {
        let started_at = Instant::now();
        let stops = servable_stops(model);
        if stops.is_empty() {
            log::debug!("no servable stops; returning {} empty days", model.day_count());
            return Ok(RouteAssignment::empty(model.day_count()));
        }

        let context = VrpSolveContext::new(&self.config, params);
        let searched = context.solve(model, &stops)?;
        let searched_objective = model.objective(&searched);
        let assignment = if self.config.polish {
            polish(model, searched)
        } else {
            searched
        };

        log::info!(
            "vrp solve visited {} of {} stops in {:?} (objective {} -> {})",
            assignment.visited().count(),
            model.stop_count(),
            started_at.elapsed(),
            searched_objective,
            model.objective(&assignment)
        );
        Ok(assignment)
    }
}

fn servable_stops(model: &RoutingModel) -> Vec<usize> {
    (1..model.node_count())
        .filter(|node| model.is_servable(*node))
        .collect()
}
