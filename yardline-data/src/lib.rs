//! External data adapters for the Yardline routing engine.
//!
//! Responsibilities:
//! - Fetch road-network travel matrices from Mapbox, chunked to respect the
//!   per-request coordinate limit.
//! - Resolve addresses to coordinates through Mapbox geocoding.
//!
//! Boundaries:
//! - Do not encode domain rules (live in `yardline-core`).
//! - Keep blocking I/O off async executors; prefer async-capable clients.
//!
//! Invariants:
//! - Credentials are checked before any request and never appear in errors
//!   or logs.
//! - No global mutable state.

pub mod mapbox;

pub use mapbox::{
    HttpMatrixService, MapboxConfig, MapboxGeocoder, MapboxMatrixProvider, MatrixService,
    ProviderBuildError,
};
