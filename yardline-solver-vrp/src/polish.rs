//! Deterministic refinement of a solver's routes.
//!
//! The pass repeatedly applies the single best improving move:
//!
//! - **drop**: remove a stop whose removal saves more arc cost than its
//!   penalty;
//! - **insert**: add an unvisited, servable stop at the cheapest position on
//!   any day where the insertion costs less than its penalty.
//!
//! Every applied move strictly lowers [`RoutingModel::objective`] and keeps
//! each route feasible, so the pass terminates.

use yardline_core::{RouteAssignment, RoutingModel};

/// Upper bound on applied moves.
pub const MAX_POLISH_MOVES: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Move {
    Drop { day: usize, position: usize },
    Insert { day: usize, position: usize, node: usize },
}

/// Refine `assignment` against `model` until no drop or insert improves it.
///
/// Routes are padded or truncated to [`RoutingModel::day_count`] first.
///
/// # Examples
/// ```rust
/// use geo::Coord;
/// use rust_decimal::Decimal;
/// use yardline_core::{
///     CostModel, CostModelParams, Distance, Leg, RouteAssignment, RoutingModel, Stop,
///     TravelMatrix,
/// };
/// use yardline_solver_vrp::polish;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let leg = Some(Leg::new(Distance::from_milli_miles(1_000), 2));
/// let matrix = TravelMatrix::from_rows(vec![
///     vec![Some(Leg::ZERO), leg],
///     vec![leg, Some(Leg::ZERO)],
/// ])?;
/// let stop = Stop::new("near", Coord { x: 0.0, y: 0.0 }, Decimal::from(50), 0)?;
/// let cost_model = CostModel::new(CostModelParams::default())?;
/// let model = RoutingModel::formulate(&matrix, &[stop], &cost_model, 1, 480)?;
///
/// let polished = polish(&model, RouteAssignment::empty(1));
/// assert_eq!(polished.routes, vec![vec![1]]);
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn polish(model: &RoutingModel, assignment: RouteAssignment) -> RouteAssignment {
    let mut routes = assignment.routes;
    routes.resize_with(model.day_count(), Vec::new);

    let mut applied = 0;
    while applied < MAX_POLISH_MOVES {
        let Some((step, gain)) = best_drop(model, &routes).or_else(|| best_insert(model, &routes))
        else {
            break;
        };
        log::trace!("polish move {step:?} gains {gain} cents");
        apply(&mut routes, step);
        applied += 1;
    }
    if applied == MAX_POLISH_MOVES {
        log::warn!("polish stopped after {MAX_POLISH_MOVES} moves");
    } else if applied > 0 {
        log::debug!("polish applied {applied} moves");
    }
    RouteAssignment { routes }
}

fn apply(routes: &mut [Vec<usize>], step: Move) {
    match step {
        Move::Drop { day, position } => {
            if let Some(route) = routes.get_mut(day)
                && position < route.len()
            {
                route.remove(position);
            }
        }
        Move::Insert {
            day,
            position,
            node,
        } => {
            if let Some(route) = routes.get_mut(day)
                && position <= route.len()
            {
                route.insert(position, node);
            }
        }
    }
}

fn best_drop(model: &RoutingModel, routes: &[Vec<usize>]) -> Option<(Move, i64)> {
    let mut best: Option<(Move, i64)> = None;
    for (day, route) in routes.iter().enumerate() {
        let current = model.route_cost(route);
        for (position, node) in route.iter().enumerate() {
            let mut shorter = route.clone();
            shorter.remove(position);
            if !model.is_route_feasible(&shorter) {
                continue;
            }
            let saving = current.saturating_sub(model.route_cost(&shorter));
            let gain = saving.saturating_sub(model.penalty(*node));
            if gain > 0 && best.is_none_or(|(_, top)| gain > top) {
                best = Some((Move::Drop { day, position }, gain));
            }
        }
    }
    best
}

fn best_insert(model: &RoutingModel, routes: &[Vec<usize>]) -> Option<(Move, i64)> {
    let mut visited = vec![false; model.node_count()];
    for node in routes.iter().flatten() {
        if let Some(seen) = visited.get_mut(*node) {
            *seen = true;
        }
    }

    let mut best: Option<(Move, i64)> = None;
    let candidates = (1..model.node_count())
        .filter(|node| model.is_servable(*node) && !visited.get(*node).copied().unwrap_or(true));
    for node in candidates {
        for (day, route) in routes.iter().enumerate() {
            let current = model.route_cost(route);
            for position in 0..=route.len() {
                let mut longer = route.clone();
                longer.insert(position, node);
                if !model.is_route_feasible(&longer) {
                    continue;
                }
                let added = model.route_cost(&longer).saturating_sub(current);
                let gain = model.penalty(node).saturating_sub(added);
                if gain > 0 && best.is_none_or(|(_, top)| gain > top) {
                    best = Some((
                        Move::Insert {
                            day,
                            position,
                            node,
                        },
                        gain,
                    ));
                }
            }
        }
    }
    best
}
