//! Shared helpers for the core integration tests.
//!
//! [`ExhaustiveSolver`] enumerates every feasible assignment, so tests can
//! check the optimizer against the true optimum on small instances.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use geo::Coord;
use rust_decimal::Decimal;
use yardline_core::{
    CostModel, CostModelParams, Distance, Leg, MatrixError, RouteAssignment, RoutingModel,
    RoutingSolver, SearchParameters, SolveError, TravelMatrix, TravelMatrixProvider,
};

/// Solver that searches all assignments. Only usable for a handful of stops.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExhaustiveSolver;

impl RoutingSolver for ExhaustiveSolver {
    fn solve(
        &self,
        model: &RoutingModel,
        _params: &SearchParameters,
    ) -> Result<RouteAssignment, SolveError> {
        let mut search = Search {
            model,
            routes: vec![Vec::new()],
            visited: vec![false; model.node_count()],
            best: None,
        };
        search.explore();
        search
            .best
            .map(|(_, routes)| RouteAssignment { routes })
            .ok_or(SolveError::NoFeasibleSolution {
                day_count: model.day_count(),
                day_time_budget: model.day_time_budget(),
            })
    }
}

struct Search<'a> {
    model: &'a RoutingModel,
    routes: Vec<Vec<usize>>,
    visited: Vec<bool>,
    best: Option<(i64, Vec<Vec<usize>>)>,
}

impl Search<'_> {
    fn explore(&mut self) {
        let objective = self.model.objective(&RouteAssignment {
            routes: self.routes.clone(),
        });
        if self.best.as_ref().is_none_or(|(best, _)| objective < *best) {
            self.best = Some((objective, self.routes.clone()));
        }

        let day = self.routes.len() - 1;
        for node in 1..self.model.node_count() {
            if self.visited[node] {
                continue;
            }
            self.routes[day].push(node);
            if self.model.is_route_feasible(&self.routes[day]) {
                self.visited[node] = true;
                self.explore();
                self.visited[node] = false;
            }
            self.routes[day].pop();
        }

        if self.routes.len() < self.model.day_count() && !self.routes[day].is_empty() {
            self.routes.push(Vec::new());
            self.explore();
            self.routes.pop();
        }
    }
}

/// Provider returning a preset matrix when the point count matches.
#[derive(Debug, Clone)]
pub struct StaticMatrix(pub TravelMatrix);

impl TravelMatrixProvider for StaticMatrix {
    fn travel_matrix(&self, points: &[Coord<f64>]) -> Result<TravelMatrix, MatrixError> {
        if points.is_empty() {
            return Err(MatrixError::EmptyInput);
        }
        Ok(self.0.clone())
    }
}

/// A leg of `miles` whole miles taking `minutes`.
pub fn leg(miles: u64, minutes: u32) -> Option<Leg> {
    Some(Leg::new(Distance::from_milli_miles(miles * 1000), minutes))
}

/// Cost model charging exactly `per_mile` dollars per mile and `per_minute`
/// dollars per minute.
pub fn flat_rates(per_mile: Decimal, per_minute: Decimal) -> CostModel {
    CostModel::new(CostModelParams {
        maintenance_cost_per_mile: per_mile,
        labor_cost_per_hour: per_minute * Decimal::from(60),
        ..CostModelParams::default()
    })
    .expect("non-negative rates")
}
