use std::time::Duration;

use thiserror::Error;

use crate::model::RoutingModel;

/// Default wall-clock limit for a single solve.
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(15);

/// Search settings passed to a [`RoutingSolver`].
///
/// # Examples
/// ```rust
/// use std::time::Duration;
/// use yardline_core::SearchParameters;
///
/// let params = SearchParameters::default().with_time_limit(Duration::from_secs(2));
/// assert_eq!(params.time_limit, Duration::from_secs(2));
/// assert!(params.max_generations.is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParameters {
    /// Wall-clock limit for the search.
    pub time_limit: Duration,
    /// Optional cap on metaheuristic generations.
    pub max_generations: Option<usize>,
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            time_limit: DEFAULT_TIME_LIMIT,
            max_generations: None,
        }
    }
}

impl SearchParameters {
    /// Replace the time limit.
    #[must_use]
    pub const fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }

    /// Cap the number of generations.
    #[must_use]
    pub const fn with_max_generations(mut self, max_generations: usize) -> Self {
        self.max_generations = Some(max_generations);
        self
    }
}

/// Node sequences chosen by a solver, one per day.
///
/// Routes list stop nodes only; the depot is implied at both ends. A stop
/// absent from every route is skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteAssignment {
    /// Ordered stop nodes per day.
    pub routes: Vec<Vec<usize>>,
}

impl RouteAssignment {
    /// An assignment visiting nothing on each of `day_count` days.
    #[must_use]
    pub fn empty(day_count: usize) -> Self {
        Self {
            routes: vec![Vec::new(); day_count],
        }
    }

    /// Stop nodes visited on any day.
    pub fn visited(&self) -> impl Iterator<Item = usize> + '_ {
        self.routes.iter().flatten().copied()
    }
}

/// Errors returned by [`RoutingSolver::solve`] and the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// No assignment satisfies the time budget on every day.
    #[error("no feasible solution for {day_count} days of {day_time_budget} minutes")]
    NoFeasibleSolution {
        /// Requested number of days.
        day_count: usize,
        /// Requested minutes per day.
        day_time_budget: u32,
    },
    /// The solver backend failed.
    #[error("routing solver failed: {message}")]
    Backend {
        /// Backend error text.
        message: String,
    },
    /// The solver thread panicked.
    #[error("routing solver panicked: {message}")]
    Panicked {
        /// Panic payload, if it was a string.
        message: String,
    },
    /// The solver returned routes that do not fit the model.
    #[error("routing solver returned an invalid assignment: {message}")]
    InvalidAssignment {
        /// What was wrong with the assignment.
        message: String,
    },
    /// The solver could not be started.
    #[error("failed to dispatch routing solver: {message}")]
    Dispatch {
        /// Spawn error text.
        message: String,
    },
}

/// Choose which stops to visit on which day, and in what order.
///
/// Implementations minimise [`RoutingModel::objective`]: the arc costs of
/// every route plus the penalty of each skipped stop. Each route must fit
/// [`RoutingModel::day_time_budget`].
/// Solvers must be `Send + Sync` to operate safely across threads.
pub trait RoutingSolver: Send + Sync {
    /// Solve `model`, stopping no later than `params.time_limit`.
    fn solve(
        &self,
        model: &RoutingModel,
        params: &SearchParameters,
    ) -> Result<RouteAssignment, SolveError>;
}

impl<T: RoutingSolver + ?Sized> RoutingSolver for &T {
    fn solve(
        &self,
        model: &RoutingModel,
        params: &SearchParameters,
    ) -> Result<RouteAssignment, SolveError> {
        (**self).solve(model, params)
    }
}

impl<T: RoutingSolver + ?Sized> RoutingSolver for Box<T> {
    fn solve(
        &self,
        model: &RoutingModel,
        params: &SearchParameters,
    ) -> Result<RouteAssignment, SolveError> {
        (**self).solve(model, params)
    }
}
