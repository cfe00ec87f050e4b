//! Benchmark support utilities for the VRP solver.
//!
//! Provides deterministic clustered stop sets and the routing models built
//! from them, so benchmark runs are reproducible.

use geo::Coord;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use rust_decimal::Decimal;
use yardline_core::{
    CostModel, CostModelParams, HaversineProvider, RoutingModel, Stop, TravelMatrixProvider,
};

/// Seed for deterministic random number generation in benchmarks.
pub const BENCHMARK_SEED: u64 = 42;

/// Number of neighbourhood clusters.
const CLUSTER_COUNT: usize = 5;

/// Standard deviation around cluster centres in degrees (about 1 km).
const CLUSTER_SPREAD: f64 = 0.01;

/// Side of the square holding cluster centres in degrees (about 30 km).
const AREA_SIZE: f64 = 0.3;

/// Depot position, roughly central Austin.
pub const DEPOT: Coord<f64> = Coord { x: -97.74, y: 30.27 };

/// Generate `count` stops spread over neighbourhood clusters.
///
/// Revenue ranges from $20 to $200 and service time from 10 to 45 minutes.
#[must_use]
pub fn generate_clustered_stops(count: usize, seed: u64) -> Vec<Stop> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let spread = Normal::new(0.0, CLUSTER_SPREAD).ok();

    #[expect(clippy::float_arithmetic, reason = "Required for coordinate offset")]
    let centres: Vec<Coord<f64>> = (0..CLUSTER_COUNT)
        .map(|_| Coord {
            x: DEPOT.x + rng.gen_range(-AREA_SIZE..AREA_SIZE) / 2.0,
            y: DEPOT.y + rng.gen_range(-AREA_SIZE..AREA_SIZE) / 2.0,
        })
        .collect();

    (0..count)
        .filter_map(|i| {
            #[expect(
                clippy::integer_division_remainder_used,
                reason = "Modulo for cyclic assignment is intentional"
            )]
            let centre = centres.get(i % CLUSTER_COUNT).copied().unwrap_or(DEPOT);
            let (dx, dy) = spread.map_or((0.0, 0.0), |normal| {
                (normal.sample(&mut rng), normal.sample(&mut rng))
            });
            #[expect(clippy::float_arithmetic, reason = "Required for coordinate offset")]
            let location = Coord {
                x: centre.x + dx,
                y: centre.y + dy,
            };
            let revenue = Decimal::new(rng.gen_range(2_000_i64..20_000), 2);
            let service = rng.gen_range(10_u32..=45);
            Stop::new(format!("stop-{i}"), location, revenue, service).ok()
        })
        .collect()
}

/// Cost model for a pickup truck with a two-person crew.
///
/// # Panics
///
/// Never; the rates are constant and valid.
#[must_use]
#[expect(clippy::expect_used, reason = "constant rates are always valid")]
pub fn benchmark_cost_model() -> CostModel {
    CostModel::new(CostModelParams {
        gas_price_per_gallon: Decimal::new(329, 2),
        fuel_efficiency_mpg: Decimal::from(16),
        maintenance_cost_per_mile: Decimal::new(12, 2),
        depreciation_cost_per_mile: Decimal::new(15, 2),
        labor_cost_per_hour: Decimal::from(36),
        ..CostModelParams::default()
    })
    .expect("valid benchmark rates")
}

/// Formulate a model for `stops` using great-circle estimates.
///
/// # Panics
///
/// Panics when the generated coordinates are invalid.
#[must_use]
#[expect(clippy::expect_used, reason = "generated inputs are always valid")]
pub fn build_model(stops: &[Stop], day_count: u32, day_time_budget: u32) -> RoutingModel {
    let cost_model = benchmark_cost_model();
    let points: Vec<Coord<f64>> = std::iter::once(DEPOT)
        .chain(stops.iter().map(|stop| stop.location))
        .collect();
    let matrix = HaversineProvider::for_cost_model(&cost_model)
        .travel_matrix(&points)
        .expect("valid coordinates");
    RoutingModel::formulate(&matrix, stops, &cost_model, day_count, day_time_budget)
        .expect("valid model")
}
