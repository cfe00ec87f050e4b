//! Behavioural tests for the end-to-end optimizer using rstest-bdd.

mod support;

use std::cell::RefCell;

use geo::Coord;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use rust_decimal::Decimal;
use yardline_core::{
    CostModel, OptimizeError, OptimizeRequest, Optimizer, RouteResult, Stop, TravelMatrix,
};

use support::{ExhaustiveSolver, StaticMatrix, flat_rates, leg};

/// World state for optimizer scenarios.
#[derive(Debug, Default)]
struct PlanWorld {
    stops: RefCell<Vec<Stop>>,
    matrix: RefCell<Option<TravelMatrix>>,
    cost_model: RefCell<Option<CostModel>>,
    result: RefCell<Option<Result<Vec<RouteResult>, OptimizeError>>>,
}

impl PlanWorld {
    fn routes(&self) -> Vec<RouteResult> {
        self.result
            .borrow()
            .clone()
            .expect("optimizer should have run")
            .expect("optimizer should succeed")
    }
}

#[fixture]
fn world() -> PlanWorld {
    PlanWorld::default()
}

fn stop(id: &str, revenue: Decimal, service_minutes: u32) -> Stop {
    Stop::new(id, Coord { x: 0.0, y: 0.0 }, revenue, service_minutes).expect("valid stop")
}

#[given("a stop {miles} miles from the depot earning {revenue} with {service} minutes of service")]
fn given_single_stop(world: &PlanWorld, miles: u64, revenue: Decimal, service: u32) {
    world.stops.replace(vec![stop("only", revenue, service)]);
    world.matrix.replace(Some(
        TravelMatrix::from_rows(vec![
            vec![leg(0, 0), leg(miles, 0)],
            vec![leg(miles, 0), leg(0, 0)],
        ])
        .expect("square matrix"),
    ));
}

#[given("two stops with no route between them")]
fn given_disconnected_pair(world: &PlanWorld) {
    world.stops.replace(vec![
        stop("left", Decimal::from(200), 10),
        stop("right", Decimal::from(150), 10),
    ]);
    world.matrix.replace(Some(
        TravelMatrix::from_rows(vec![
            vec![leg(0, 0), leg(5, 10), leg(5, 10)],
            vec![leg(5, 10), leg(0, 0), None],
            vec![leg(5, 10), None, leg(0, 0)],
        ])
        .expect("square matrix"),
    ));
}

#[given("no stops")]
fn given_no_stops(world: &PlanWorld) {
    world.stops.replace(Vec::new());
    world.matrix.replace(Some(TravelMatrix::empty(1)));
}

#[given("travel costs {per_mile} per mile and {per_minute} per minute")]
fn given_rates(world: &PlanWorld, per_mile: Decimal, per_minute: Decimal) {
    world
        .cost_model
        .replace(Some(flat_rates(per_mile, per_minute)));
}

fn plan(world: &PlanWorld, days: u32) {
    let matrix = world.matrix.borrow().clone().expect("matrix should be set");
    let cost_model = world
        .cost_model
        .borrow()
        .clone()
        .expect("rates should be set");
    let request = OptimizeRequest::new(
        Coord { x: 0.0, y: 0.0 },
        world.stops.borrow().clone(),
        cost_model,
    )
    .with_day_count(days);
    let optimizer = Optimizer::new(StaticMatrix(matrix), ExhaustiveSolver);
    world.result.replace(Some(optimizer.optimize(&request)));
}

#[when("the optimizer plans {days} day")]
fn when_plan_one(world: &PlanWorld, days: u32) {
    plan(world, days);
}

#[when("the optimizer plans {days} days")]
fn when_plan_many(world: &PlanWorld, days: u32) {
    plan(world, days);
}

#[then("the stop is visited")]
fn then_visited(world: &PlanWorld) {
    let routes = world.routes();
    assert_eq!(routes[0].stops.len(), 1, "routes: {routes:?}");
}

#[then("no stop is visited")]
fn then_skipped(world: &PlanWorld) {
    let routes = world.routes();
    assert!(routes.iter().all(|r| r.stops.is_empty()), "routes: {routes:?}");
}

#[then("exactly one stop is visited")]
fn then_exactly_one(world: &PlanWorld) {
    let routes = world.routes();
    let visited: usize = routes.iter().map(|r| r.stops.len()).sum();
    assert_eq!(visited, 1, "routes: {routes:?}");
}

#[then("the best route earns a profit of {profit}")]
fn then_profit(world: &PlanWorld, profit: Decimal) {
    let routes = world.routes();
    assert_eq!(routes[0].total_profit, profit);
}

#[then("{count} empty routes are returned")]
fn then_empty_routes(world: &PlanWorld, count: usize) {
    let routes = world.routes();
    assert_eq!(routes.len(), count);
    assert!(routes.iter().all(|r| r.stops.is_empty()));
}

#[scenario(path = "tests/features/optimize.feature", index = 0)]
fn profitable_stop_is_visited(world: PlanWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/optimize.feature", index = 1)]
fn unprofitable_stop_is_skipped(world: PlanWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/optimize.feature", index = 2)]
fn missing_pair_is_never_driven(world: PlanWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/optimize.feature", index = 3)]
fn empty_plan_returns_empty_days(world: PlanWorld) {
    let _ = world;
}
