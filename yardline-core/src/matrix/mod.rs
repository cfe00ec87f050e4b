//! Pairwise travel legs between the depot and its stops.
//!
//! The [`TravelMatrixProvider`] trait abstracts where legs come from. Callers
//! pass the depot followed by every stop and receive a square
//! [`TravelMatrix`] of optional [`Leg`] values, where `None` marks a pair the
//! provider could not route.
//!
//! [`HaversineProvider`] is the offline estimator. Road-network providers
//! live in `yardline-data`.

mod error;
mod haversine;
mod provider;

pub use error::MatrixError;
pub use haversine::HaversineProvider;
pub use provider::{Leg, TravelMatrix, TravelMatrixProvider};
