//! Great-circle travel estimates.

use geo::{Coord, Distance as _, Haversine, Point};
use rust_decimal::Decimal;

use crate::cost::{CostModel, CostModelError, DEFAULT_AVERAGE_SPEED_MPH};
use crate::distance::Distance;
use crate::stop::is_valid_coordinate;

use super::error::MatrixError;
use super::provider::{Leg, TravelMatrix, TravelMatrixProvider};

/// Estimate legs from straight-line distance at a constant speed.
///
/// Distances are great-circle miles truncated to thousandths; drive time is
/// `ceil(miles / speed × 60)`. The result is symmetric with a zero diagonal
/// and never contains absent cells.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use yardline_core::{HaversineProvider, TravelMatrixProvider};
///
/// let provider = HaversineProvider::default();
/// let matrix = provider
///     .travel_matrix(&[Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 1.0 }])
///     .expect("valid points");
/// let leg = matrix.leg(0, 1).expect("estimated");
/// assert_eq!(leg.distance.milli_miles(), 69_093);
/// assert_eq!(leg.minutes, 166);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HaversineProvider {
    average_speed_mph: Decimal,
}

impl Default for HaversineProvider {
    fn default() -> Self {
        Self {
            average_speed_mph: DEFAULT_AVERAGE_SPEED_MPH,
        }
    }
}

impl HaversineProvider {
    /// Create an estimator travelling at `average_speed_mph`.
    ///
    /// # Errors
    ///
    /// Returns [`CostModelError::NonPositiveSpeed`] when the speed is zero or
    /// negative.
    pub fn new(average_speed_mph: Decimal) -> Result<Self, CostModelError> {
        if average_speed_mph <= Decimal::ZERO {
            return Err(CostModelError::NonPositiveSpeed {
                value: average_speed_mph,
            });
        }
        Ok(Self { average_speed_mph })
    }

    /// Create an estimator using the speed configured on `model`.
    #[must_use]
    pub const fn for_cost_model(model: &CostModel) -> Self {
        Self {
            average_speed_mph: model.average_speed_mph(),
        }
    }

    /// Speed used for drive-time estimates.
    #[must_use]
    pub const fn average_speed_mph(&self) -> Decimal {
        self.average_speed_mph
    }

    fn estimate(&self, from: Coord<f64>, to: Coord<f64>) -> Leg {
        let meters = Haversine.distance(Point::from(from), Point::from(to));
        let distance = Distance::from_meters(meters);
        let minutes = distance
            .drive_minutes_at(self.average_speed_mph)
            .unwrap_or(u32::MAX);
        Leg::new(distance, minutes)
    }
}

impl TravelMatrixProvider for HaversineProvider {
    fn travel_matrix(&self, points: &[Coord<f64>]) -> Result<TravelMatrix, MatrixError> {
        if points.is_empty() {
            return Err(MatrixError::EmptyInput);
        }
        if let Some(index) = points.iter().position(|p| !is_valid_coordinate(*p)) {
            return Err(MatrixError::InvalidCoordinate { index });
        }

        let n = points.len();
        let mut cells = vec![vec![Some(Leg::ZERO); n]; n];
        for (i, from) in points.iter().enumerate() {
            for (j, to) in points.iter().enumerate().skip(i + 1) {
                let leg = Some(self.estimate(*from, *to));
                cells[i][j] = leg;
                cells[j][i] = leg;
            }
        }
        TravelMatrix::from_rows(cells)
    }
}
