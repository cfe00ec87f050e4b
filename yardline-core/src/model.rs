//! Integer routing model handed to a [`RoutingSolver`](crate::RoutingSolver).
//!
//! The model prices every ordered node pair in whole cents and minutes. A
//! stop may be left out of every route at a penalty equal to its revenue, so
//! a solver minimising `Σ arc costs + Σ penalties of skipped stops` maximises
//! profit.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::cost::{CostModel, to_cents};
use crate::matrix::TravelMatrix;
use crate::solver::RouteAssignment;
use crate::stop::Stop;

/// Cost and time given to node pairs with no known route.
pub const UNREACHABLE: i64 = 1_000_000_000;

/// Default per-day time budget in minutes.
pub const DEFAULT_DAY_TIME_BUDGET_MINUTES: u32 = 480;

/// Waiting time a route may absorb at a node, in minutes.
pub const DEFAULT_SLACK_MINUTES: u32 = 30;

/// Node index of the depot.
pub const DEPOT: usize = 0;

/// Errors returned by [`RoutingModel::formulate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulationError {
    /// The matrix does not cover the depot plus every stop.
    #[error("travel matrix has {actual} nodes but {expected} were expected")]
    MatrixSizeMismatch {
        /// Depot plus stop count.
        expected: usize,
        /// Matrix size.
        actual: usize,
    },
    /// At least one day is required.
    #[error("day count must be at least one")]
    NoDays,
    /// The per-day time budget must be positive.
    #[error("day time budget must be greater than zero minutes")]
    ZeroTimeBudget,
}

/// Square table of integer values indexed by node pair.
#[derive(Debug, Clone, PartialEq, Eq)]
struct NodeTable {
    size: usize,
    values: Vec<i64>,
}

impl NodeTable {
    fn new(size: usize) -> Self {
        Self {
            size,
            values: vec![0; size * size],
        }
    }

    fn get(&self, from: usize, to: usize) -> i64 {
        if from >= self.size || to >= self.size {
            return UNREACHABLE;
        }
        self.values[from * self.size + to]
    }

    fn set(&mut self, from: usize, to: usize, value: i64) {
        self.values[from * self.size + to] = value;
    }
}

/// Prize-collecting routing problem over a depot, stops and days.
///
/// Node 0 is the depot and node `i` is `stops[i - 1]`. Each day is one
/// vehicle leaving and returning to the depot within the day budget.
///
/// The per-node waiting slack ([`Self::slack_minutes`]) is informational.
/// Stops carry no time windows, so a vehicle never arrives early and never
/// waits; route feasibility and cost ignore the slack. It is kept for
/// solvers that schedule against time windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingModel {
    day_count: usize,
    day_time_budget: u32,
    slack_minutes: u32,
    labor_cents_per_minute: Decimal,
    travel_cents: NodeTable,
    transit_minutes: NodeTable,
    arc_costs: NodeTable,
    reachable: Vec<bool>,
    penalties: Vec<i64>,
    servable: Vec<bool>,
}

impl RoutingModel {
    /// Build the model from a travel matrix and the stops it covers.
    ///
    /// For every ordered pair `(i, j)`:
    ///
    /// - travel cost is `round(miles × cost_per_mile × 100)` cents;
    /// - transit is drive minutes plus the service minutes of `j`;
    /// - arc cost adds `round(labor cents per minute × transit)`.
    ///
    /// Absent cells get [`UNREACHABLE`] for cost, transit and arc cost.
    ///
    /// # Errors
    ///
    /// Returns [`FormulationError::NoDays`], [`FormulationError::ZeroTimeBudget`]
    /// or [`FormulationError::MatrixSizeMismatch`].
    pub fn formulate(
        matrix: &TravelMatrix,
        stops: &[Stop],
        cost_model: &CostModel,
        day_count: u32,
        day_time_budget: u32,
    ) -> Result<Self, FormulationError> {
        if day_count == 0 {
            return Err(FormulationError::NoDays);
        }
        if day_time_budget == 0 {
            return Err(FormulationError::ZeroTimeBudget);
        }
        let size = stops.len() + 1;
        if matrix.size() != size {
            return Err(FormulationError::MatrixSizeMismatch {
                expected: size,
                actual: matrix.size(),
            });
        }

        let cost_per_mile = cost_model.cost_per_mile();
        let labor_per_minute = cost_model.labor_cost_per_minute();
        let service = |node: usize| -> u32 {
            node.checked_sub(1)
                .and_then(|i| stops.get(i))
                .map_or(0, |s| s.service_minutes)
        };

        let mut travel_cents = NodeTable::new(size);
        let mut transit_minutes = NodeTable::new(size);
        let mut arc_costs = NodeTable::new(size);
        let mut reachable = vec![true; size * size];
        for from in 0..size {
            for to in 0..size {
                if from == to {
                    continue;
                }
                let Some(leg) = matrix.leg(from, to) else {
                    travel_cents.set(from, to, UNREACHABLE);
                    transit_minutes.set(from, to, UNREACHABLE);
                    arc_costs.set(from, to, UNREACHABLE);
                    reachable[from * size + to] = false;
                    continue;
                };
                let transit = i64::from(leg.minutes) + i64::from(service(to));
                let travel = to_cents(leg.distance.as_miles() * cost_per_mile);
                let labor = to_cents(labor_per_minute * Decimal::from(transit));
                travel_cents.set(from, to, travel);
                transit_minutes.set(from, to, transit.min(UNREACHABLE));
                arc_costs.set(from, to, travel.saturating_add(labor).min(UNREACHABLE));
            }
        }

        let mut penalties = vec![0; size];
        for (node, stop) in stops.iter().enumerate().map(|(i, s)| (i + 1, s)) {
            penalties[node] = to_cents(stop.revenue);
        }

        let budget = i64::from(day_time_budget);
        let servable: Vec<bool> = (0..size)
            .map(|node| {
                node == DEPOT
                    || (reachable[node] && reachable[node * size]
                        && transit_minutes
                            .get(DEPOT, node)
                            .saturating_add(transit_minutes.get(node, DEPOT))
                            <= budget)
            })
            .collect();

        let model = Self {
            day_count: day_count as usize,
            day_time_budget,
            slack_minutes: DEFAULT_SLACK_MINUTES,
            labor_cents_per_minute: cost_model.labor_cents_per_minute(),
            travel_cents,
            transit_minutes,
            arc_costs,
            reachable,
            penalties,
            servable,
        };
        for node in model.unservable_stops() {
            log::warn!(
                "stop {} cannot be served from the depot within {day_time_budget} minutes",
                stops[node - 1].id
            );
        }
        log::debug!(
            "formulated routing model with {} stops over {day_count} days",
            stops.len()
        );
        Ok(model)
    }

    /// Override the waiting slack allowed at each node.
    ///
    /// Informational only; see the type-level docs.
    #[must_use]
    pub fn with_slack_minutes(mut self, slack_minutes: u32) -> Self {
        self.slack_minutes = slack_minutes;
        self
    }

    /// Number of nodes including the depot.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.travel_cents.size
    }

    /// Number of stops.
    #[must_use]
    pub const fn stop_count(&self) -> usize {
        self.node_count() - 1
    }

    /// Number of days, one vehicle each.
    #[must_use]
    pub const fn day_count(&self) -> usize {
        self.day_count
    }

    /// Time budget per day in minutes.
    #[must_use]
    pub const fn day_time_budget(&self) -> u32 {
        self.day_time_budget
    }

    /// Waiting slack per node in minutes.
    ///
    /// Not read by [`Self::is_route_feasible`] or [`Self::route_minutes`].
    #[must_use]
    pub const fn slack_minutes(&self) -> u32 {
        self.slack_minutes
    }

    /// Labor cost weighting applied to elapsed route minutes.
    #[must_use]
    pub const fn labor_cents_per_minute(&self) -> Decimal {
        self.labor_cents_per_minute
    }

    /// Vehicle cost of driving `from → to`, in cents.
    #[must_use]
    pub fn travel_cost(&self, from: usize, to: usize) -> i64 {
        self.travel_cents.get(from, to)
    }

    /// Drive minutes `from → to` plus the service minutes at `to`.
    #[must_use]
    pub fn transit_minutes(&self, from: usize, to: usize) -> i64 {
        self.transit_minutes.get(from, to)
    }

    /// Travel cost plus labor for the transit `from → to`, in cents.
    #[must_use]
    pub fn arc_cost(&self, from: usize, to: usize) -> i64 {
        self.arc_costs.get(from, to)
    }

    /// Whether the matrix held a leg for `from → to`.
    #[must_use]
    pub fn is_reachable(&self, from: usize, to: usize) -> bool {
        let size = self.node_count();
        from < size && to < size && self.reachable[from * size + to]
    }

    /// Penalty for leaving `node` unvisited, in cents. Zero for the depot.
    #[must_use]
    pub fn penalty(&self, node: usize) -> i64 {
        self.penalties.get(node).copied().unwrap_or(0)
    }

    /// Whether `node` can be visited alone within one day's budget.
    #[must_use]
    pub fn is_servable(&self, node: usize) -> bool {
        self.servable.get(node).copied().unwrap_or(false)
    }

    /// Stop nodes whose depot round trip does not fit a single day.
    #[must_use]
    pub fn unservable_stops(&self) -> Vec<usize> {
        (1..self.node_count())
            .filter(|node| !self.is_servable(*node))
            .collect()
    }

    fn legs<'a>(route: &'a [usize]) -> impl Iterator<Item = (usize, usize)> + 'a {
        let path = std::iter::once(DEPOT)
            .chain(route.iter().copied())
            .chain(std::iter::once(DEPOT));
        path.clone().zip(path.skip(1))
    }

    /// Elapsed minutes of a route from the depot back to the depot.
    ///
    /// An empty route takes zero minutes.
    #[must_use]
    pub fn route_minutes(&self, route: &[usize]) -> i64 {
        if route.is_empty() {
            return 0;
        }
        Self::legs(route).fold(0_i64, |acc, (from, to)| {
            acc.saturating_add(self.transit_minutes(from, to))
        })
    }

    /// Sum of arc costs of a route from the depot back to the depot.
    #[must_use]
    pub fn route_cost(&self, route: &[usize]) -> i64 {
        if route.is_empty() {
            return 0;
        }
        Self::legs(route).fold(0_i64, |acc, (from, to)| {
            acc.saturating_add(self.arc_cost(from, to))
        })
    }

    /// Whether the route fits the day budget and uses only known legs.
    #[must_use]
    pub fn is_route_feasible(&self, route: &[usize]) -> bool {
        Self::legs(route).all(|(from, to)| route.is_empty() || self.is_reachable(from, to))
            && self.route_minutes(route) <= i64::from(self.day_time_budget)
    }

    /// Minimised objective: route costs plus penalties of skipped stops.
    #[must_use]
    pub fn objective(&self, assignment: &RouteAssignment) -> i64 {
        let mut visited = vec![false; self.node_count()];
        let mut total = 0_i64;
        for route in &assignment.routes {
            for node in route {
                if let Some(seen) = visited.get_mut(*node) {
                    *seen = true;
                }
            }
            total = total.saturating_add(self.route_cost(route));
        }
        (1..self.node_count())
            .filter(|node| !visited[*node])
            .fold(total, |acc, node| acc.saturating_add(self.penalty(node)))
    }
}
