//! Vehicle operating cost model.
//!
//! [`CostModel`] turns fuel, maintenance, depreciation and labor inputs into
//! the two rates the rest of the engine consumes: a cost per mile and a labor
//! cost per minute. Both are derived with decimal arithmetic so the objective
//! handed to the solver and the profit reported to callers agree to the cent.
//!
//! [`CostInputs`] is the single construction path used by callers that hold
//! layered settings (plan overrides, crew rates, company defaults and vehicle
//! specifications).

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Fuel efficiency used when a vehicle reports none, or a non-positive value.
pub const DEFAULT_FUEL_EFFICIENCY_MPG: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

/// Average travel speed assumed by the geometric estimator.
pub const DEFAULT_AVERAGE_SPEED_MPH: Decimal = Decimal::from_parts(25, 0, 0, false, 0);

const MINUTES_PER_HOUR: Decimal = Decimal::from_parts(60, 0, 0, false, 0);
const CENTS_PER_DOLLAR: Decimal = Decimal::ONE_HUNDRED;

/// Errors returned by [`CostModel::new`] and [`CostInputs::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CostModelError {
    /// Fuel efficiency must be strictly positive.
    #[error("fuel efficiency must be greater than zero, got {value}")]
    NonPositiveEfficiency {
        /// The rejected efficiency in miles per gallon.
        value: Decimal,
    },
    /// A monetary rate was negative.
    #[error("{field} must not be negative, got {value}")]
    NegativeRate {
        /// Name of the offending input.
        field: &'static str,
        /// The rejected value.
        value: Decimal,
    },
    /// Average speed must be strictly positive.
    #[error("average speed must be greater than zero, got {value}")]
    NonPositiveSpeed {
        /// The rejected speed in miles per hour.
        value: Decimal,
    },
}

/// Raw inputs for [`CostModel::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostModelParams {
    /// Fuel price in dollars per gallon.
    pub gas_price_per_gallon: Decimal,
    /// Fuel efficiency in miles per gallon.
    pub fuel_efficiency_mpg: Decimal,
    /// Maintenance cost in dollars per mile.
    pub maintenance_cost_per_mile: Decimal,
    /// Depreciation cost in dollars per mile.
    pub depreciation_cost_per_mile: Decimal,
    /// Crew labor cost in dollars per hour.
    pub labor_cost_per_hour: Decimal,
    /// Average speed in miles per hour, used only for geometric estimates.
    pub average_speed_mph: Decimal,
}

impl Default for CostModelParams {
    fn default() -> Self {
        Self {
            gas_price_per_gallon: Decimal::ZERO,
            fuel_efficiency_mpg: DEFAULT_FUEL_EFFICIENCY_MPG,
            maintenance_cost_per_mile: Decimal::ZERO,
            depreciation_cost_per_mile: Decimal::ZERO,
            labor_cost_per_hour: Decimal::ZERO,
            average_speed_mph: DEFAULT_AVERAGE_SPEED_MPH,
        }
    }
}

/// Validated vehicle and crew cost rates.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use yardline_core::{CostModel, CostModelParams};
///
/// # fn main() -> Result<(), yardline_core::CostModelError> {
/// let model = CostModel::new(CostModelParams {
///     gas_price_per_gallon: Decimal::new(350, 2),
///     fuel_efficiency_mpg: Decimal::from(14),
///     maintenance_cost_per_mile: Decimal::new(10, 2),
///     labor_cost_per_hour: Decimal::from(30),
///     ..CostModelParams::default()
/// })?;
/// assert_eq!(model.cost_per_mile(), Decimal::new(35, 2));
/// assert_eq!(model.labor_cost_per_minute(), Decimal::new(5, 1));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CostModel {
    gas_price_per_gallon: Decimal,
    fuel_efficiency_mpg: Decimal,
    maintenance_cost_per_mile: Decimal,
    depreciation_cost_per_mile: Decimal,
    labor_cost_per_hour: Decimal,
    average_speed_mph: Decimal,
}

impl CostModel {
    /// Validate `params` and construct a model.
    ///
    /// # Errors
    ///
    /// Returns [`CostModelError::NonPositiveEfficiency`] when the efficiency
    /// is zero or negative, [`CostModelError::NonPositiveSpeed`] for a
    /// non-positive speed and [`CostModelError::NegativeRate`] for any
    /// negative price or rate.
    pub fn new(params: CostModelParams) -> Result<Self, CostModelError> {
        if params.fuel_efficiency_mpg <= Decimal::ZERO {
            return Err(CostModelError::NonPositiveEfficiency {
                value: params.fuel_efficiency_mpg,
            });
        }
        if params.average_speed_mph <= Decimal::ZERO {
            return Err(CostModelError::NonPositiveSpeed {
                value: params.average_speed_mph,
            });
        }
        for (field, value) in [
            ("gas price per gallon", params.gas_price_per_gallon),
            ("maintenance cost per mile", params.maintenance_cost_per_mile),
            ("depreciation cost per mile", params.depreciation_cost_per_mile),
            ("labor cost per hour", params.labor_cost_per_hour),
        ] {
            if value < Decimal::ZERO {
                return Err(CostModelError::NegativeRate { field, value });
            }
        }
        Ok(Self {
            gas_price_per_gallon: params.gas_price_per_gallon,
            fuel_efficiency_mpg: params.fuel_efficiency_mpg,
            maintenance_cost_per_mile: params.maintenance_cost_per_mile,
            depreciation_cost_per_mile: params.depreciation_cost_per_mile,
            labor_cost_per_hour: params.labor_cost_per_hour,
            average_speed_mph: params.average_speed_mph,
        })
    }

    /// Dollars spent per mile driven: fuel, maintenance and depreciation.
    #[must_use]
    pub fn cost_per_mile(&self) -> Decimal {
        self.gas_price_per_gallon / self.fuel_efficiency_mpg
            + self.maintenance_cost_per_mile
            + self.depreciation_cost_per_mile
    }

    /// Dollars of crew labor per elapsed minute.
    #[must_use]
    pub fn labor_cost_per_minute(&self) -> Decimal {
        self.labor_cost_per_hour / MINUTES_PER_HOUR
    }

    /// Labor cost per minute expressed in cents, unrounded.
    #[must_use]
    pub fn labor_cents_per_minute(&self) -> Decimal {
        self.labor_cost_per_minute() * CENTS_PER_DOLLAR
    }

    /// Average speed assumed when estimating drive time from distance.
    #[must_use]
    pub const fn average_speed_mph(&self) -> Decimal {
        self.average_speed_mph
    }

    /// Fuel efficiency in miles per gallon.
    #[must_use]
    pub const fn fuel_efficiency_mpg(&self) -> Decimal {
        self.fuel_efficiency_mpg
    }
}

/// Round a dollar amount to whole cents.
///
/// Midpoints round to even, matching decimal quantisation.
#[must_use]
pub fn round_to_cent(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// Convert a dollar amount to integer cents, saturating at the `i64` range.
#[must_use]
pub fn to_cents(amount: Decimal) -> i64 {
    use rust_decimal::prelude::ToPrimitive;

    let cents = (amount * CENTS_PER_DOLLAR)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    cents.to_i64().unwrap_or(if cents.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// Company-wide defaults used when a plan or crew does not override them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompanyCostDefaults {
    /// Default fuel price in dollars per gallon.
    pub gas_price_per_gallon: Decimal,
    /// Default labor cost in dollars per hour.
    pub labor_cost_per_hour: Decimal,
}

/// Cost characteristics of the vehicle driving the routes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleCosts {
    /// Fuel efficiency in miles per gallon.
    #[cfg_attr(feature = "serde", serde(default))]
    pub fuel_efficiency_mpg: Option<Decimal>,
    /// Maintenance cost in dollars per mile.
    #[cfg_attr(feature = "serde", serde(default))]
    pub maintenance_cost_per_mile: Decimal,
    /// Depreciation cost in dollars per mile.
    #[cfg_attr(feature = "serde", serde(default))]
    pub depreciation_cost_per_mile: Option<Decimal>,
}

/// Layered cost settings resolved into a [`CostModel`].
///
/// Fallback order:
///
/// 1. gas price: `gas_price_override`, then `company.gas_price_per_gallon`;
/// 2. labor rate: `labor_rate_override`, then `company.labor_cost_per_hour`;
/// 3. efficiency: `vehicle.fuel_efficiency_mpg` when positive, otherwise
///    [`DEFAULT_FUEL_EFFICIENCY_MPG`];
/// 4. depreciation: `vehicle.depreciation_cost_per_mile`, otherwise zero;
/// 5. speed: `average_speed_mph`, otherwise [`DEFAULT_AVERAGE_SPEED_MPH`].
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use yardline_core::{CompanyCostDefaults, CostInputs, VehicleCosts};
///
/// # fn main() -> Result<(), yardline_core::CostModelError> {
/// let inputs = CostInputs {
///     company: CompanyCostDefaults {
///         gas_price_per_gallon: Decimal::new(300, 2),
///         labor_cost_per_hour: Decimal::from(18),
///     },
///     vehicle: VehicleCosts {
///         fuel_efficiency_mpg: Some(Decimal::from(15)),
///         ..VehicleCosts::default()
///     },
///     gas_price_override: Some(Decimal::new(450, 2)),
///     ..CostInputs::default()
/// };
/// let model = inputs.resolve()?;
/// assert_eq!(model.cost_per_mile(), Decimal::new(3, 1));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CostInputs {
    /// Company defaults.
    #[cfg_attr(feature = "serde", serde(default))]
    pub company: CompanyCostDefaults,
    /// Vehicle specification.
    #[cfg_attr(feature = "serde", serde(default))]
    pub vehicle: VehicleCosts,
    /// Plan-level fuel price, preferred over the company default.
    #[cfg_attr(feature = "serde", serde(default))]
    pub gas_price_override: Option<Decimal>,
    /// Crew labor rate, preferred over the company default.
    #[cfg_attr(feature = "serde", serde(default))]
    pub labor_rate_override: Option<Decimal>,
    /// Average speed override for geometric estimates.
    #[cfg_attr(feature = "serde", serde(default))]
    pub average_speed_mph: Option<Decimal>,
}

impl CostInputs {
    /// Apply the fallback order and validate the result.
    ///
    /// A missing or non-positive efficiency never fails: it is replaced by
    /// [`DEFAULT_FUEL_EFFICIENCY_MPG`] and a warning is logged.
    ///
    /// # Errors
    ///
    /// Returns [`CostModelError`] when a resolved rate is negative or the
    /// speed is not positive.
    pub fn resolve(&self) -> Result<CostModel, CostModelError> {
        let fuel_efficiency_mpg = match self.vehicle.fuel_efficiency_mpg {
            Some(mpg) if mpg > Decimal::ZERO => mpg,
            other => {
                log::warn!(
                    "vehicle fuel efficiency {other:?} is unusable; assuming {DEFAULT_FUEL_EFFICIENCY_MPG} mpg"
                );
                DEFAULT_FUEL_EFFICIENCY_MPG
            }
        };

        CostModel::new(CostModelParams {
            gas_price_per_gallon: self
                .gas_price_override
                .unwrap_or(self.company.gas_price_per_gallon),
            fuel_efficiency_mpg,
            maintenance_cost_per_mile: self.vehicle.maintenance_cost_per_mile,
            depreciation_cost_per_mile: self
                .vehicle
                .depreciation_cost_per_mile
                .unwrap_or(Decimal::ZERO),
            labor_cost_per_hour: self
                .labor_rate_override
                .unwrap_or(self.company.labor_cost_per_hour),
            average_speed_mph: self.average_speed_mph.unwrap_or(DEFAULT_AVERAGE_SPEED_MPH),
        })
    }
}
