//! Fixed-point travel distances.
//!
//! Distances are stored as whole thousandths of a mile so arc costs handed
//! to an integer solver are reproducible. Conversion back to miles is exact
//! decimal scaling.

use std::iter::Sum;
use std::ops::Add;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Meters in one statute mile.
pub const METERS_PER_MILE: f64 = 1609.344;

const MILLI_MILES_PER_MILE: f64 = 1000.0;
const MILES_SCALE: u32 = 3;

/// A non-negative distance in thousandths of a mile.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use yardline_core::Distance;
///
/// let d = Distance::from_miles(12.3456);
/// assert_eq!(d.milli_miles(), 12_345);
/// assert_eq!(d.as_miles(), Decimal::new(12_345, 3));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Distance(u64);

impl Distance {
    /// Zero distance.
    pub const ZERO: Self = Self(0);

    /// Wrap a raw count of thousandths of a mile.
    #[must_use]
    pub const fn from_milli_miles(milli_miles: u64) -> Self {
        Self(milli_miles)
    }

    /// Convert floating miles, truncating below a thousandth.
    ///
    /// Negative or non-finite inputs yield [`Distance::ZERO`].
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "fixed-point conversion truncates by definition"
    )]
    pub fn from_miles(miles: f64) -> Self {
        if !miles.is_finite() || miles <= 0.0 {
            return Self::ZERO;
        }
        Self((miles * MILLI_MILES_PER_MILE).trunc() as u64)
    }

    /// Convert meters, truncating below a thousandth of a mile.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "unit conversion from provider meters"
    )]
    pub fn from_meters(meters: f64) -> Self {
        Self::from_miles(meters / METERS_PER_MILE)
    }

    /// Raw thousandths of a mile.
    #[must_use]
    pub const fn milli_miles(self) -> u64 {
        self.0
    }

    /// Exact distance in miles.
    #[must_use]
    pub fn as_miles(self) -> Decimal {
        Decimal::from(self.0) / Decimal::from(10_u64.pow(MILES_SCALE))
    }

    /// Drive time at `speed_mph`, rounded up to whole minutes.
    ///
    /// A zero distance takes zero minutes; a non-positive speed yields
    /// `None`.
    #[must_use]
    pub fn drive_minutes_at(self, speed_mph: Decimal) -> Option<u32> {
        if speed_mph <= Decimal::ZERO {
            return None;
        }
        let minutes = self.as_miles() / speed_mph * Decimal::from(60);
        Some(minutes.ceil().to_u32().unwrap_or(u32::MAX))
    }
}

impl Add for Distance {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Distance {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// Convert provider seconds to whole minutes, rounding up.
///
/// Negative or non-finite inputs yield `None`.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "provider durations arrive as floating seconds"
)]
pub fn seconds_to_minutes(seconds: f64) -> Option<u32> {
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    let minutes = (seconds / 60.0).ceil();
    if minutes > f64::from(u32::MAX) {
        return Some(u32::MAX);
    }
    Some(minutes as u32)
}
