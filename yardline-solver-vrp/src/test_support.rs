//! Test-only utilities for `yardline-solver-vrp`.
//!
//! The helpers in this module are available to unit tests and behavioural
//! tests. They are gated behind the `test-support` feature (and `cfg(test)`).

use geo::Coord;
use rust_decimal::Decimal;
use yardline_core::{
    CostModel, CostModelParams, Distance, Leg, RoutingModel, Stop, TravelMatrix,
};

/// Drive minutes per mile in [`line_matrix`] (30 mph).
pub const MINUTES_PER_MILE: u32 = 2;

/// Construct a [`Stop`] at the origin.
///
/// # Panics
///
/// Panics when `id` is empty or `revenue` is negative.
///
/// # Examples
/// ```rust
/// use rust_decimal::Decimal;
/// use yardline_solver_vrp::test_support::stop;
///
/// let stop = stop("lawn", Decimal::from(40), 15);
/// assert_eq!(stop.service_minutes, 15);
/// ```
#[must_use]
#[expect(
    clippy::expect_used,
    reason = "test helpers fail loudly on invalid fixtures"
)]
pub fn stop(id: &str, revenue: Decimal, service_minutes: u32) -> Stop {
    Stop::new(id, Coord { x: 0.0, y: 0.0 }, revenue, service_minutes).expect("valid stop")
}

/// Matrix for nodes placed along a straight road at whole-mile positions.
///
/// Node `i` sits at `positions[i]`. Every pair is connected and driving takes
/// [`MINUTES_PER_MILE`] minutes per mile.
///
/// # Examples
/// ```rust
/// use yardline_solver_vrp::test_support::line_matrix;
///
/// let matrix = line_matrix(&[0, 4, 10]);
/// let leg = matrix.leg(1, 2).unwrap();
/// assert_eq!(leg.distance.milli_miles(), 6_000);
/// assert_eq!(leg.minutes, 12);
/// ```
#[must_use]
pub fn line_matrix(positions: &[u64]) -> TravelMatrix {
    let mut matrix = TravelMatrix::empty(positions.len());
    for (from, a) in positions.iter().enumerate() {
        for (to, b) in positions.iter().enumerate() {
            let miles = a.abs_diff(*b);
            let minutes = u32::try_from(miles)
                .unwrap_or(u32::MAX)
                .saturating_mul(MINUTES_PER_MILE);
            let leg = Leg::new(Distance::from_milli_miles(miles * 1_000), minutes);
            matrix.set(from, to, Some(leg));
        }
    }
    matrix
}

/// Cost model charging exactly `per_mile` dollars per mile and `per_minute`
/// dollars per minute.
///
/// # Panics
///
/// Panics when either rate is negative.
#[must_use]
#[expect(
    clippy::expect_used,
    reason = "test helpers fail loudly on invalid fixtures"
)]
pub fn flat_rates(per_mile: Decimal, per_minute: Decimal) -> CostModel {
    CostModel::new(CostModelParams {
        maintenance_cost_per_mile: per_mile,
        labor_cost_per_hour: per_minute * Decimal::from(60),
        ..CostModelParams::default()
    })
    .expect("non-negative rates")
}

/// Formulate a model for stops on a line with the depot at `positions[0]`.
///
/// # Panics
///
/// Panics when the inputs do not form a valid model.
#[must_use]
#[expect(
    clippy::expect_used,
    reason = "test helpers fail loudly on invalid fixtures"
)]
pub fn line_model(
    positions: &[u64],
    stops: &[Stop],
    cost_model: &CostModel,
    day_count: u32,
    day_time_budget: u32,
) -> RoutingModel {
    RoutingModel::formulate(
        &line_matrix(positions),
        stops,
        cost_model,
        day_count,
        day_time_budget,
    )
    .expect("valid routing model")
}
