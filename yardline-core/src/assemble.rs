//! Turn a solver assignment into priced routes.

use rust_decimal::Decimal;

use crate::cost::{CostModel, round_to_cent};
use crate::distance::Distance;
use crate::matrix::{Leg, TravelMatrix};
use crate::model::DEPOT;
use crate::solver::RouteAssignment;
use crate::stop::Stop;

/// One visited stop within a [`RouteResult`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StopResult {
    /// Identifier of the visited stop.
    pub location_id: String,
    /// Position in the route, starting at 1.
    pub order: usize,
    /// Revenue collected at the stop.
    pub revenue: Decimal,
    /// Miles driven from the previous node.
    pub segment_miles: Decimal,
    /// Minutes driven from the previous node.
    pub segment_drive_minutes: u32,
    /// Minutes spent on site.
    pub service_minutes: u32,
}

/// A single day's route with its totals.
///
/// Totals include the final leg back to the depot, which has no
/// [`StopResult`]. Money is rounded to the cent and
/// `total_profit == total_revenue - total_cost` holds exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteResult {
    /// Zero-based day index.
    pub day: usize,
    /// Visited stops in order.
    pub stops: Vec<StopResult>,
    /// Miles driven, depot to depot.
    pub total_miles: Decimal,
    /// Minutes driven, depot to depot.
    pub total_drive_minutes: u32,
    /// Minutes spent on site.
    pub total_service_minutes: u32,
    /// Revenue collected.
    pub total_revenue: Decimal,
    /// Vehicle and labor cost.
    pub total_cost: Decimal,
    /// Revenue minus cost.
    pub total_profit: Decimal,
}

impl RouteResult {
    /// A route that visits nothing.
    #[must_use]
    pub fn empty(day: usize) -> Self {
        Self {
            day,
            stops: Vec::new(),
            total_miles: Decimal::ZERO,
            total_drive_minutes: 0,
            total_service_minutes: 0,
            total_revenue: round_to_cent(Decimal::ZERO),
            total_cost: round_to_cent(Decimal::ZERO),
            total_profit: round_to_cent(Decimal::ZERO),
        }
    }

    /// Total minutes driving and on site.
    #[must_use]
    pub const fn total_minutes(&self) -> u32 {
        self.total_drive_minutes.saturating_add(self.total_service_minutes)
    }
}

fn leg_or_zero(matrix: &TravelMatrix, day: usize, from: usize, to: usize) -> Leg {
    matrix.leg(from, to).unwrap_or_else(|| {
        log::warn!("day {day}: no travel data for leg {from} -> {to}; counting it as zero");
        Leg::ZERO
    })
}

/// Price every route in `assignment` and sort by descending profit.
///
/// Node `i` of a route refers to `stops[i - 1]`. Nodes outside that range are
/// skipped with a warning; the orchestrator rejects such assignments before
/// they get here.
///
/// Cost is `miles × cost_per_mile + (drive + service minutes) ×
/// labor_cost_per_minute`, rounded to the cent once per route. Ties keep day
/// order.
#[must_use]
pub fn assemble_routes(
    assignment: &RouteAssignment,
    matrix: &TravelMatrix,
    stops: &[Stop],
    cost_model: &CostModel,
) -> Vec<RouteResult> {
    let mut routes: Vec<RouteResult> = assignment
        .routes
        .iter()
        .enumerate()
        .map(|(day, route)| assemble_route(day, route, matrix, stops, cost_model))
        .collect();
    routes.sort_by(|a, b| b.total_profit.cmp(&a.total_profit));
    routes
}

fn assemble_route(
    day: usize,
    route: &[usize],
    matrix: &TravelMatrix,
    stops: &[Stop],
    cost_model: &CostModel,
) -> RouteResult {
    let mut visits = Vec::with_capacity(route.len());
    let mut distance = Distance::ZERO;
    let mut drive_minutes = 0_u32;
    let mut service_minutes = 0_u32;
    let mut revenue = Decimal::ZERO;
    let mut previous = DEPOT;

    for &node in route {
        let Some(stop) = node.checked_sub(1).and_then(|i| stops.get(i)) else {
            log::warn!("day {day}: ignoring unknown node {node}");
            continue;
        };
        let leg = leg_or_zero(matrix, day, previous, node);
        distance = distance + leg.distance;
        drive_minutes = drive_minutes.saturating_add(leg.minutes);
        service_minutes = service_minutes.saturating_add(stop.service_minutes);
        revenue += stop.revenue;
        visits.push(StopResult {
            location_id: stop.id.clone(),
            order: visits.len() + 1,
            revenue: stop.revenue,
            segment_miles: leg.distance.as_miles(),
            segment_drive_minutes: leg.minutes,
            service_minutes: stop.service_minutes,
        });
        previous = node;
    }

    if visits.is_empty() {
        return RouteResult::empty(day);
    }

    let home = leg_or_zero(matrix, day, previous, DEPOT);
    distance = distance + home.distance;
    drive_minutes = drive_minutes.saturating_add(home.minutes);

    let total_miles = distance.as_miles();
    let elapsed = Decimal::from(drive_minutes) + Decimal::from(service_minutes);
    let total_cost = round_to_cent(
        total_miles * cost_model.cost_per_mile() + elapsed * cost_model.labor_cost_per_minute(),
    );
    let total_revenue = round_to_cent(revenue);

    RouteResult {
        day,
        stops: visits,
        total_miles,
        total_drive_minutes: drive_minutes,
        total_service_minutes: service_minutes,
        total_revenue,
        total_cost,
        total_profit: total_revenue - total_cost,
    }
}
