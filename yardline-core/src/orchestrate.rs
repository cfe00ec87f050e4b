//! Run a [`RoutingSolver`] off the calling thread and check what it returns.

use std::any::Any;
use std::thread;

use crate::model::{DEPOT, RoutingModel};
use crate::solver::{RouteAssignment, RoutingSolver, SearchParameters, SolveError};

const SOLVER_THREAD_NAME: &str = "yardline-solve";

/// Dispatches solves onto a dedicated thread and validates the result.
///
/// The solver borrows the model for the duration of a scoped thread, so the
/// calling thread only blocks on the join. A panic in the solver is reported
/// as [`SolveError::Panicked`] rather than unwinding into the caller.
///
/// # Examples
///
/// ```rust
/// use yardline_core::{
///     RouteAssignment, RoutingModel, RoutingSolver, SearchParameters, SolveError,
///     SolveOrchestrator,
/// };
///
/// struct SkipEverything;
///
/// impl RoutingSolver for SkipEverything {
///     fn solve(
///         &self,
///         model: &RoutingModel,
///         _params: &SearchParameters,
///     ) -> Result<RouteAssignment, SolveError> {
///         Ok(RouteAssignment::empty(model.day_count()))
///     }
/// }
///
/// let orchestrator = SolveOrchestrator::new(SkipEverything);
/// # let _ = orchestrator;
/// ```
#[derive(Debug, Clone)]
pub struct SolveOrchestrator<S> {
    solver: S,
}

impl<S: RoutingSolver> SolveOrchestrator<S> {
    /// Wrap `solver`.
    pub const fn new(solver: S) -> Self {
        Self { solver }
    }

    /// Borrow the wrapped solver.
    pub const fn solver(&self) -> &S {
        &self.solver
    }

    /// Solve `model` and return an assignment with one route per day.
    ///
    /// # Errors
    ///
    /// Returns [`SolveError::Dispatch`] when the thread cannot start,
    /// [`SolveError::Panicked`] when the solver panics, any error the solver
    /// reports, [`SolveError::InvalidAssignment`] for out-of-range or repeated
    /// stops, and [`SolveError::NoFeasibleSolution`] when a route exceeds the
    /// day budget.
    pub fn run(
        &self,
        model: &RoutingModel,
        params: &SearchParameters,
    ) -> Result<RouteAssignment, SolveError> {
        log::debug!(
            "dispatching solve of {} stops with a {:?} limit",
            model.stop_count(),
            params.time_limit
        );
        let outcome = thread::scope(|scope| -> Result<RouteAssignment, SolveError> {
            let handle = thread::Builder::new()
                .name(SOLVER_THREAD_NAME.to_owned())
                .spawn_scoped(scope, move || self.solver.solve(model, params))
                .map_err(|err| SolveError::Dispatch {
                    message: err.to_string(),
                })?;
            handle.join().map_err(|payload| SolveError::Panicked {
                message: panic_message(payload.as_ref()),
            })?
        })?;
        validate(model, outcome)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned())
}

fn validate(
    model: &RoutingModel,
    mut assignment: RouteAssignment,
) -> Result<RouteAssignment, SolveError> {
    let day_count = model.day_count();
    if assignment.routes.len() > day_count {
        return Err(SolveError::InvalidAssignment {
            message: format!(
                "{} routes returned for {day_count} days",
                assignment.routes.len()
            ),
        });
    }

    let mut seen = vec![false; model.node_count()];
    for node in assignment.visited() {
        if node == DEPOT || node >= model.node_count() {
            return Err(SolveError::InvalidAssignment {
                message: format!("node {node} is not a stop"),
            });
        }
        if std::mem::replace(&mut seen[node], true) {
            return Err(SolveError::InvalidAssignment {
                message: format!("stop node {node} is visited more than once"),
            });
        }
    }

    if assignment
        .routes
        .iter()
        .any(|route| !model.is_route_feasible(route))
    {
        return Err(SolveError::NoFeasibleSolution {
            day_count,
            day_time_budget: model.day_time_budget(),
        });
    }

    assignment.routes.resize_with(day_count, Vec::new);
    Ok(assignment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::{CostModel, CostModelParams};
    use crate::distance::Distance;
    use crate::matrix::{Leg, TravelMatrix};
    use crate::stop::Stop;
    use crate::test_support::ScriptedSolver;
    use geo::Coord;
    use rstest::{fixture, rstest};
    use rust_decimal_macros::dec;

    #[fixture]
    fn model() -> RoutingModel {
        let leg = Some(Leg::new(Distance::from_milli_miles(1_000), 60));
        let matrix = TravelMatrix::from_rows(vec![
            vec![Some(Leg::ZERO), leg, leg],
            vec![leg, Some(Leg::ZERO), leg],
            vec![leg, leg, Some(Leg::ZERO)],
        ])
        .expect("square");
        let stops = vec![
            Stop::new("a", Coord { x: 0.0, y: 0.0 }, dec!(50), 0).expect("stop"),
            Stop::new("b", Coord { x: 0.0, y: 0.0 }, dec!(50), 0).expect("stop"),
        ];
        let costs = CostModel::new(CostModelParams::default()).expect("costs");
        RoutingModel::formulate(&matrix, &stops, &costs, 2, 150).expect("model")
    }

    #[rstest]
    fn pads_routes_to_day_count(model: RoutingModel) {
        let orchestrator = SolveOrchestrator::new(ScriptedSolver::returning(vec![vec![2]]));
        let assignment = orchestrator
            .run(&model, &SearchParameters::default())
            .expect("valid assignment");
        assert_eq!(assignment.routes, vec![vec![2], Vec::new()]);
    }

    #[rstest]
    #[case(vec![vec![0]])]
    #[case(vec![vec![3]])]
    #[case(vec![vec![1], vec![1]])]
    #[case(vec![vec![1], vec![], vec![2]])]
    fn rejects_invalid_assignments(model: RoutingModel, #[case] routes: Vec<Vec<usize>>) {
        let orchestrator = SolveOrchestrator::new(ScriptedSolver::returning(routes));
        let err = orchestrator
            .run(&model, &SearchParameters::default())
            .expect_err("invalid assignment");
        assert!(matches!(err, SolveError::InvalidAssignment { .. }), "{err:?}");
    }

    #[rstest]
    fn over_budget_route_is_infeasible(model: RoutingModel) {
        // Three one-hour legs exceed the 150 minute budget.
        let orchestrator = SolveOrchestrator::new(ScriptedSolver::returning(vec![vec![1, 2]]));
        let result = orchestrator.run(&model, &SearchParameters::default());
        assert_eq!(
            result,
            Err(SolveError::NoFeasibleSolution {
                day_count: 2,
                day_time_budget: 150
            })
        );
    }

    #[rstest]
    fn solver_errors_pass_through(model: RoutingModel) {
        let backend = SolveError::Backend {
            message: "boom".into(),
        };
        let orchestrator = SolveOrchestrator::new(ScriptedSolver::failing(backend.clone()));
        assert_eq!(
            orchestrator.run(&model, &SearchParameters::default()),
            Err(backend)
        );
    }

    #[rstest]
    fn panics_are_reported(model: RoutingModel) {
        let orchestrator = SolveOrchestrator::new(ScriptedSolver::panicking("solver exploded"));
        let err = orchestrator
            .run(&model, &SearchParameters::default())
            .expect_err("panic surfaces as error");
        assert_eq!(
            err,
            SolveError::Panicked {
                message: "solver exploded".into()
            }
        );
    }

    #[rstest]
    fn solver_runs_on_named_thread(model: RoutingModel) {
        let orchestrator = SolveOrchestrator::new(ScriptedSolver::returning(Vec::new()));
        orchestrator
            .run(&model, &SearchParameters::default())
            .expect("empty assignment");
        assert_eq!(
            orchestrator.solver().last_thread_name().as_deref(),
            Some(SOLVER_THREAD_NAME)
        );
    }
}
