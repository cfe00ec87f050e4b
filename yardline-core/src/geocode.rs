//! Address lookup.
//!
//! The routing pipeline consumes coordinates only. Callers holding street
//! addresses resolve them through a [`Geocoder`] first.

use geo::Coord;
use thiserror::Error;

/// Errors returned by [`Geocoder::geocode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    /// The address was blank.
    #[error("address must not be empty")]
    EmptyAddress,
    /// The service found no match.
    #[error("no location found for address {address:?}")]
    NotFound {
        /// The address that was looked up.
        address: String,
    },
    /// The lookup failed in transit or the service rejected it.
    #[error("geocoding request failed: {message}")]
    Service {
        /// Error text from the client or service.
        message: String,
    },
}

/// Resolve a free-form address to a coordinate.
///
/// The returned [`Coord`] stores longitude in `x` and latitude in `y`.
pub trait Geocoder {
    /// Look up `address`.
    ///
    /// Implementations must return [`GeocodeError::NotFound`] when the
    /// service answers without a match.
    fn geocode(&self, address: &str) -> Result<Coord<f64>, GeocodeError>;
}

impl<T: Geocoder + ?Sized> Geocoder for &T {
    fn geocode(&self, address: &str) -> Result<Coord<f64>, GeocodeError> {
        (**self).geocode(address)
    }
}

impl<T: Geocoder + ?Sized> Geocoder for Box<T> {
    fn geocode(&self, address: &str) -> Result<Coord<f64>, GeocodeError> {
        (**self).geocode(address)
    }
}
