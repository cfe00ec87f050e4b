//! `vrp-core` modelling helpers for `VrpSolver`.
//!
//! This module converts a [`RoutingModel`] into a `vrp-core` problem with one
//! vehicle per day, runs the metaheuristic, and maps each tour back to a day.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use vrp_core::models::common::{Location, Profile};
use vrp_core::models::problem::{TravelTime, VehicleIdDimension};
use vrp_core::models::solution::Route as VrpRoute;
use vrp_core::prelude::*;
use vrp_core::utils::{Environment, InfoLogger};
use yardline_core::{DEPOT, RouteAssignment, RoutingModel, SearchParameters, SolveError};

use crate::solver::VrpSolverConfig;

custom_dimension!(JobRevenue typeof Cost);

/// Arc costs (cents) and durations (seconds) in row-major node order.
struct ArcTable {
    size: usize,
    costs: Vec<Cost>,
    seconds: Vec<f64>,
}

impl ArcTable {
    #[expect(
        clippy::cast_precision_loss,
        reason = "arc costs and transit times are capped far below 2^53"
    )]
    #[expect(
        clippy::float_arithmetic,
        reason = "vrp-core schedules in floating-point seconds"
    )]
    fn from_model(model: &RoutingModel) -> Self {
        let size = model.node_count();
        let mut costs = Vec::with_capacity(size * size);
        let mut seconds = Vec::with_capacity(size * size);
        for from in 0..size {
            for to in 0..size {
                costs.push(model.arc_cost(from, to) as f64);
                seconds.push(model.transit_minutes(from, to) as f64 * 60.0);
            }
        }
        Self {
            size,
            costs,
            seconds,
        }
    }

    fn lookup(values: &[f64], size: usize, from: Location, to: Location) -> f64 {
        let result = (from < size && to < size)
            .then(|| values.get(from * size + to).copied())
            .flatten();
        debug_assert!(
            result.is_some(),
            "Arc table lookup failed: from={from}, to={to}"
        );
        result.unwrap_or(0.0)
    }

    fn cost(&self, from: Location, to: Location) -> Cost {
        Self::lookup(&self.costs, self.size, from, to)
    }

    fn seconds(&self, from: Location, to: Location) -> f64 {
        Self::lookup(&self.seconds, self.size, from, to)
    }
}

/// Minimises route cost minus collected revenue.
///
/// Leaving a stop out forfeits its revenue, which is the prize-collecting
/// penalty up to a constant.
struct ProfitObjective {
    arcs: Arc<ArcTable>,
}

impl ProfitObjective {
    #[expect(
        clippy::float_arithmetic,
        reason = "objective values are floating-point cents"
    )]
    fn route_fitness(&self, route: &VrpRoute) -> Cost {
        let locations: Vec<Location> = route
            .tour
            .all_activities()
            .map(|activity| activity.place.location)
            .collect();
        let travel: Cost = locations
            .windows(2)
            .filter_map(|pair| match pair {
                [from, to] => Some(self.arcs.cost(*from, *to)),
                _ => None,
            })
            .sum();
        let revenue: Cost = route.tour.jobs().map(job_revenue).sum();
        travel - revenue
    }
}

impl FeatureObjective for ProfitObjective {
    fn fitness(&self, solution: &InsertionContext) -> Cost {
        solution
            .solution
            .routes
            .iter()
            .map(|route_ctx| self.route_fitness(route_ctx.route()))
            .sum()
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "insertion deltas are floating-point cents"
    )]
    fn estimate(&self, move_ctx: &MoveContext<'_>) -> Cost {
        match move_ctx {
            MoveContext::Route { job, .. } => -job_revenue(job),
            MoveContext::Activity { activity_ctx, .. } => {
                let prev = activity_ctx.prev.place.location;
                let target = activity_ctx.target.place.location;
                match activity_ctx.next {
                    Some(next) => {
                        let next = next.place.location;
                        self.arcs.cost(prev, target) + self.arcs.cost(target, next)
                            - self.arcs.cost(prev, next)
                    }
                    None => self.arcs.cost(prev, target),
                }
            }
        }
    }
}

fn job_revenue(job: &Job) -> Cost {
    job.dimens().get_job_revenue().copied().unwrap_or(0.0)
}

fn define_goal(
    transport: Arc<dyn TransportCost>,
    arcs: Arc<ArcTable>,
) -> GenericResult<GoalContext> {
    let profit_feature = FeatureBuilder::default()
        .with_name("maximize-profit")
        .with_objective(ProfitObjective { arcs })
        .build()?;

    let transport_feature = TransportFeatureBuilder::new("min-arc-cost")
        .set_transport_cost(transport)
        .set_time_constrained(true)
        .build_minimize_distance()?;

    GoalContextBuilder::with_features(&[profit_feature, transport_feature])?.build()
}

struct ProblemSpec<'a> {
    model: &'a RoutingModel,
    stops: &'a [usize],
    transport: Arc<dyn TransportCost>,
    goal: GoalContext,
}

fn vehicle_id(day: usize) -> String {
    format!("day-{}", day + 1)
}

#[expect(
    clippy::cast_precision_loss,
    reason = "penalties are cents well below 2^53"
)]
fn define_problem(spec: ProblemSpec<'_>) -> GenericResult<Problem> {
    let ProblemSpec {
        model,
        stops,
        transport,
        goal,
    } = spec;

    let jobs = stops
        .iter()
        .map(|node| {
            let revenue = model.penalty(*node) as Cost;
            SingleBuilder::default()
                .id(format!("stop{node}").as_str())
                .dimension(|dimens| {
                    dimens.set_job_revenue(revenue);
                })
                .location(*node)?
                .build_as_job()
        })
        .collect::<Result<Vec<_>, _>>()?;

    let budget = Duration::from_secs(u64::from(model.day_time_budget()) * 60).as_secs_f64();
    let vehicles = (0..model.day_count())
        .map(|day| {
            VehicleBuilder::default()
                .id(vehicle_id(day).as_str())
                .add_detail(
                    VehicleDetailBuilder::default()
                        .set_start_location(DEPOT)
                        .set_start_time(0.0)
                        .set_end_location(DEPOT)
                        .set_end_time(budget)
                        .build()?,
                )
                .build()
        })
        .collect::<Result<Vec<_>, _>>()?;

    ProblemBuilder::default()
        .add_jobs(jobs.into_iter())
        .add_vehicles(vehicles.into_iter())
        .with_goal(goal)
        .with_transport_cost(transport)
        .build()
}

/// Exposes the arc table as both distance and duration.
///
/// Distance is the arc cost in cents so the transport objective minimises
/// money rather than miles. Duration is transit time in seconds, which bounds
/// each vehicle by the day budget.
struct ArcTransportCost {
    arcs: Arc<ArcTable>,
}

impl TransportCost for ArcTransportCost {
    fn distance(
        &self,
        _route: &VrpRoute,
        from: Location,
        to: Location,
        _departure: TravelTime,
    ) -> Cost {
        self.arcs.cost(from, to)
    }

    fn duration(
        &self,
        _route: &VrpRoute,
        from: Location,
        to: Location,
        _departure: TravelTime,
    ) -> f64 {
        self.arcs.seconds(from, to)
    }

    fn distance_approx(&self, _profile: &Profile, from: usize, to: usize) -> f64 {
        self.arcs.cost(from, to)
    }

    fn duration_approx(&self, _profile: &Profile, from: usize, to: usize) -> f64 {
        self.arcs.seconds(from, to)
    }
}

/// Search environment whose telemetry goes to the `log` facade.
///
/// The default `vrp-core` logger prints to stdout.
fn search_environment() -> Arc<Environment> {
    let logger: InfoLogger =
        Arc::new(|message: &str| log::debug!(target: "vrp_core", "{message}"));
    Arc::new(Environment {
        logger,
        ..Environment::default()
    })
}

fn backend(stage: &str, err: &impl std::fmt::Display) -> SolveError {
    SolveError::Backend {
        message: format!("{stage}: {err}"),
    }
}

/// Context for running a `vrp-core` solve with shared inputs.
pub(super) struct VrpSolveContext<'a> {
    config: &'a VrpSolverConfig,
    params: &'a SearchParameters,
}

impl<'a> VrpSolveContext<'a> {
    /// Create a new solve context.
    pub(super) const fn new(config: &'a VrpSolverConfig, params: &'a SearchParameters) -> Self {
        Self { config, params }
    }

    /// Solve over the given stop nodes and return one route per day.
    pub(super) fn solve(
        &self,
        model: &RoutingModel,
        stops: &[usize],
    ) -> Result<RouteAssignment, SolveError> {
        let arcs = Arc::new(ArcTable::from_model(model));
        let transport: Arc<dyn TransportCost> = Arc::new(ArcTransportCost { arcs: arcs.clone() });
        let goal = define_goal(transport.clone(), arcs).map_err(|err| backend("goal", &err))?;
        let problem_spec = ProblemSpec {
            model,
            stops,
            transport,
            goal,
        };
        let problem =
            Arc::new(define_problem(problem_spec).map_err(|err| backend("problem", &err))?);

        let max_time =
            usize::try_from(self.params.time_limit.as_secs().max(1)).unwrap_or(usize::MAX);
        let max_generations = self
            .params
            .max_generations
            .unwrap_or(self.config.max_generations);
        let vrp_config = VrpConfigBuilder::new(problem.clone())
            .set_environment(search_environment())
            .prebuild()
            .map_err(|err| backend("config", &err))?
            .with_max_time(Some(max_time))
            .with_max_generations(Some(max_generations))
            .build()
            .map_err(|err| backend("config", &err))?;

        log::debug!(
            "searching {} stops over {} days for at most {max_time}s or {max_generations} generations",
            stops.len(),
            model.day_count()
        );
        let solution = vrp_core::solver::Solver::new(problem, vrp_config)
            .solve()
            .map_err(|err| backend("search", &err))?;

        let days: HashMap<String, usize> = (0..model.day_count())
            .map(|day| (vehicle_id(day), day))
            .collect();
        let mut assignment = RouteAssignment::empty(model.day_count());
        for route in &solution.routes {
            let vehicle = route
                .actor
                .vehicle
                .dimens
                .get_vehicle_id()
                .cloned()
                .unwrap_or_default();
            let Some(slot) = days
                .get(&vehicle)
                .and_then(|day| assignment.routes.get_mut(*day))
            else {
                return Err(SolveError::Backend {
                    message: format!("solution used unknown vehicle {vehicle:?}"),
                });
            };
            slot.extend(
                route
                    .tour
                    .all_activities()
                    .map(|activity| activity.place.location)
                    .filter(|location| *location != DEPOT),
            );
        }
        Ok(assignment)
    }
}
