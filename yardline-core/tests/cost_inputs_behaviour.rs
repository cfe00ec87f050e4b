//! Behavioural tests for `CostInputs::resolve`.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use rust_decimal::Decimal;
use yardline_core::{CompanyCostDefaults, CostInputs, CostModel, CostModelError};

#[derive(Debug, Default)]
struct CostWorld {
    inputs: RefCell<CostInputs>,
    resolved: RefCell<Option<Result<CostModel, CostModelError>>>,
}

#[fixture]
fn world() -> CostWorld {
    CostWorld::default()
}

#[given("company defaults of {gas} per gallon and {labor} per hour")]
fn given_company(world: &CostWorld, gas: Decimal, labor: Decimal) {
    world.inputs.borrow_mut().company = CompanyCostDefaults {
        gas_price_per_gallon: gas,
        labor_cost_per_hour: labor,
    };
}

#[given("a vehicle doing {mpg} miles per gallon")]
fn given_vehicle(world: &CostWorld, mpg: Decimal) {
    world.inputs.borrow_mut().vehicle.fuel_efficiency_mpg = Some(mpg);
}

#[given("a vehicle with no recorded efficiency")]
fn given_vehicle_without_efficiency(world: &CostWorld) {
    world.inputs.borrow_mut().vehicle.fuel_efficiency_mpg = None;
}

#[given("a plan gas price of {gas} and a crew rate of {labor}")]
fn given_overrides(world: &CostWorld, gas: Decimal, labor: Decimal) {
    let mut inputs = world.inputs.borrow_mut();
    inputs.gas_price_override = Some(gas);
    inputs.labor_rate_override = Some(labor);
}

#[when("the cost inputs are resolved")]
fn when_resolved(world: &CostWorld) {
    let resolved = world.inputs.borrow().resolve();
    world.resolved.replace(Some(resolved));
}

fn model(world: &CostWorld) -> CostModel {
    world
        .resolved
        .borrow()
        .clone()
        .expect("inputs should be resolved")
        .expect("resolution should succeed")
}

#[then("the cost per mile is {expected}")]
fn then_cost_per_mile(world: &CostWorld, expected: Decimal) {
    assert_eq!(model(world).cost_per_mile(), expected);
}

#[then("the labor cost per minute is {expected}")]
fn then_labor_per_minute(world: &CostWorld, expected: Decimal) {
    assert_eq!(model(world).labor_cost_per_minute(), expected);
}

#[scenario(path = "tests/features/cost_inputs.feature", index = 0)]
fn overrides_win(world: CostWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/cost_inputs.feature", index = 1)]
fn company_defaults_apply(world: CostWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/cost_inputs.feature", index = 2)]
fn efficiency_falls_back(world: CostWorld) {
    let _ = world;
}
