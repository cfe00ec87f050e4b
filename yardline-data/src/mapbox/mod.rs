//! Mapbox clients: road-network travel matrices and geocoding.
//!
//! [`MapboxMatrixProvider`] implements [`yardline_core::TravelMatrixProvider`]
//! on top of the Directions Matrix API. The API accepts a bounded number of
//! coordinates per request, so larger matrices are fetched block by block
//! ([`BlockRequest`]) through the [`MatrixService`] seam and stitched by node
//! index. [`MapboxGeocoder`] implements [`yardline_core::Geocoder`].
//!
//! # Example
//!
//! ```no_run
//! use yardline_data::mapbox::{MapboxConfig, MapboxGeocoder};
//! use yardline_core::Geocoder;
//!
//! let config = MapboxConfig::from_env().with_max_concurrent_requests(2);
//! let geocoder = MapboxGeocoder::new(&config)?;
//! let depot = geocoder.geocode("301 Congress Ave, Austin TX")?;
//! println!("{}, {}", depot.y, depot.x);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod chunk;
mod config;
mod error;
mod geocoder;
mod http;
mod provider;
mod response;
mod service;

#[doc(hidden)]
pub mod test_support;

pub use chunk::{BlockMatrix, BlockRequest, block_ranges, plan_blocks};
pub use config::{
    ACCESS_TOKEN_VAR, BASE_URL_VAR, DEFAULT_BASE_URL, DEFAULT_MAX_CONCURRENT_REQUESTS,
    DEFAULT_MAX_COORDINATES_PER_REQUEST, DEFAULT_PROFILE, DEFAULT_RATE_LIMIT_RETRIES,
    DEFAULT_USER_AGENT, MapboxConfig, PROFILE_VAR,
};
pub use error::ProviderBuildError;
pub use geocoder::MapboxGeocoder;
pub use provider::MapboxMatrixProvider;
pub use service::{HttpMatrixService, MatrixService};
