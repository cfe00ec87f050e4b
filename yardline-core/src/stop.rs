//! Service visits that a route may collect.

use geo::Coord;
use rust_decimal::Decimal;
use thiserror::Error;

/// A customer location that may be visited for revenue.
///
/// `location.x` holds the longitude and `location.y` the latitude, in
/// degrees.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use rust_decimal::Decimal;
/// use yardline_core::Stop;
///
/// # fn main() -> Result<(), yardline_core::StopError> {
/// let stop = Stop::new("lawn-17", Coord { x: -97.74, y: 30.27 }, Decimal::from(45), 20)?;
/// assert_eq!(stop.latitude(), 30.27);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stop {
    /// Caller-supplied location identifier.
    pub id: String,
    /// Geographic position.
    pub location: Coord<f64>,
    /// Revenue collected when the stop is visited.
    pub revenue: Decimal,
    /// Expected time on site in minutes.
    pub service_minutes: u32,
}

/// Errors returned by [`Stop::new`] and [`Stop::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StopError {
    /// The identifier was empty.
    #[error("stop identifier must not be empty")]
    EmptyId,
    /// Revenue was negative.
    #[error("stop {id} has negative revenue {revenue}")]
    NegativeRevenue {
        /// Identifier of the offending stop.
        id: String,
        /// The rejected revenue.
        revenue: Decimal,
    },
    /// Coordinates were not finite or lay outside the valid range.
    #[error("stop {id} has an invalid coordinate")]
    InvalidCoordinate {
        /// Identifier of the offending stop.
        id: String,
    },
}

impl Stop {
    /// Validate and construct a [`Stop`].
    ///
    /// # Errors
    ///
    /// See [`Stop::validate`].
    pub fn new(
        id: impl Into<String>,
        location: Coord<f64>,
        revenue: Decimal,
        service_minutes: u32,
    ) -> Result<Self, StopError> {
        let stop = Self {
            id: id.into(),
            location,
            revenue,
            service_minutes,
        };
        stop.validate()?;
        Ok(stop)
    }

    /// Check the invariants of a stop, e.g. one decoded from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`StopError::EmptyId`], [`StopError::NegativeRevenue`] or
    /// [`StopError::InvalidCoordinate`].
    pub fn validate(&self) -> Result<(), StopError> {
        if self.id.trim().is_empty() {
            return Err(StopError::EmptyId);
        }
        if self.revenue < Decimal::ZERO {
            return Err(StopError::NegativeRevenue {
                id: self.id.clone(),
                revenue: self.revenue,
            });
        }
        if !is_valid_coordinate(self.location) {
            return Err(StopError::InvalidCoordinate {
                id: self.id.clone(),
            });
        }
        Ok(())
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.location.y
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.location.x
    }
}

/// Whether `coord` is a finite longitude/latitude pair within range.
#[must_use]
pub fn is_valid_coordinate(coord: Coord<f64>) -> bool {
    coord.x.is_finite()
        && coord.y.is_finite()
        && (-180.0..=180.0).contains(&coord.x)
        && (-90.0..=90.0).contains(&coord.y)
}
