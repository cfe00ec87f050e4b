//! `TravelMatrixProvider` over the Mapbox Directions Matrix API.
//!
//! # Architecture
//!
//! [`TravelMatrixProvider`] is synchronous so the core pipeline stays
//! embeddable in synchronous callers. The provider does its work in the
//! async [`MapboxMatrixProvider::fetch_matrix`] and bridges to the sync
//! trait by blocking on a Tokio runtime.

use futures_util::stream::{self, StreamExt};
use geo::Coord;
use tokio::runtime::Runtime;
use yardline_core::{MatrixError, TravelMatrix, TravelMatrixProvider, is_valid_coordinate};

use super::chunk::{BlockRequest, plan_blocks, stitch};
use super::config::MapboxConfig;
use super::error::ProviderBuildError;
use super::http::{block_on, build_runtime};
use super::service::{HttpMatrixService, MatrixService};

/// Road-network travel matrix assembled from block requests.
///
/// Points are cut into blocks of [`MapboxConfig::block_size`] and every
/// (origin block, destination block) pair is fetched separately, at most
/// [`MapboxConfig::concurrency`] at a time. A block that fails or comes
/// back malformed leaves only its own cells absent; the failure is logged
/// and the rest of the matrix is still returned.
///
/// # Runtime behaviour
///
/// When called from outside any Tokio runtime, the provider uses its own
/// current-thread runtime. When called from within a multi-threaded Tokio
/// runtime it reuses that runtime through [`tokio::task::block_in_place`].
/// Inside a `current_thread` runtime it drives its own runtime on a helper
/// thread; the caller's runtime is blocked for the duration of the fetch.
///
/// # Example
///
/// ```no_run
/// use geo::Coord;
/// use yardline_core::TravelMatrixProvider;
/// use yardline_data::mapbox::{MapboxConfig, MapboxMatrixProvider};
///
/// let provider = MapboxMatrixProvider::new(MapboxConfig::from_env())?;
/// let matrix = provider.travel_matrix(&[
///     Coord { x: -97.74, y: 30.27 },
///     Coord { x: -97.70, y: 30.30 },
/// ])?;
/// println!("{:?}", matrix.leg(0, 1));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct MapboxMatrixProvider<S = HttpMatrixService> {
    service: S,
    config: MapboxConfig,
    runtime: Runtime,
}

impl<S: std::fmt::Debug> std::fmt::Debug for MapboxMatrixProvider<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapboxMatrixProvider")
            .field("service", &self.service)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl MapboxMatrixProvider {
    /// Create a provider talking to Mapbox over HTTP.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderBuildError::MissingCredentials`] when `config` has
    /// no access token, and an error if the HTTP client or Tokio runtime
    /// fails to build.
    pub fn new(config: MapboxConfig) -> Result<Self, ProviderBuildError> {
        let service = HttpMatrixService::new(config.clone())?;
        Self::with_service(service, config)
    }
}

impl<S: MatrixService> MapboxMatrixProvider<S> {
    /// Create a provider issuing block requests through `service`.
    ///
    /// Only the chunking and concurrency settings of `config` are used.
    ///
    /// # Errors
    ///
    /// Returns an error if the Tokio runtime fails to build.
    pub fn with_service(service: S, config: MapboxConfig) -> Result<Self, ProviderBuildError> {
        Ok(Self {
            service,
            config,
            runtime: build_runtime()?,
        })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &MapboxConfig {
        &self.config
    }

    /// Underlying block service.
    #[must_use]
    pub const fn service(&self) -> &S {
        &self.service
    }

    /// Fetch the full matrix for `points`.
    ///
    /// Waits for every block before returning. Dropping the future abandons
    /// requests still in flight.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::EmptyInput`] or
    /// [`MatrixError::InvalidCoordinate`] for bad input, and
    /// [`MatrixError::RequestTooLarge`] when the coordinate limit is below
    /// two. Block failures are not errors.
    pub async fn fetch_matrix(&self, points: &[Coord<f64>]) -> Result<TravelMatrix, MatrixError> {
        if points.is_empty() {
            return Err(MatrixError::EmptyInput);
        }
        if let Some(index) = points.iter().position(|p| !is_valid_coordinate(*p)) {
            return Err(MatrixError::InvalidCoordinate { index });
        }
        let block_size = self.config.block_size();
        let limit = self.config.max_coordinates_per_request;
        if block_size * 2 > limit {
            return Err(MatrixError::RequestTooLarge {
                coordinates: block_size * 2,
                limit,
            });
        }

        let requests = plan_blocks(points, block_size);
        let total = requests.len();
        log::debug!(
            "fetching {n}x{n} matrix in {total} blocks of up to {block_size} nodes",
            n = points.len()
        );
        let outcomes: Vec<_> = stream::iter(requests)
            .map(|request| async move {
                let outcome = self.service.fetch_block(&request).await;
                (request, outcome)
            })
            .buffer_unordered(self.config.concurrency())
            .collect()
            .await;

        let mut matrix = TravelMatrix::empty(points.len());
        let mut failed = 0_usize;
        for (request, outcome) in outcomes {
            if let Err(err) = outcome.and_then(|block| stitch(&mut matrix, &request, &block)) {
                failed += 1;
                log_block_failure(&request, &err);
            }
        }
        if failed > 0 {
            log::warn!("{failed} of {total} matrix blocks failed; their cells are absent");
        }
        Ok(matrix)
    }
}

fn log_block_failure(request: &BlockRequest, err: &MatrixError) {
    log::warn!(
        "matrix block origins {:?} destinations {:?} failed: {err}",
        request.origins,
        request.destinations
    );
}

impl<S: MatrixService> TravelMatrixProvider for MapboxMatrixProvider<S> {
    /// Fetch the matrix, blocking the calling thread.
    ///
    /// # Runtime requirements
    ///
    /// Safe to call from any thread. Inside a `current_thread` runtime the
    /// fetch runs on a helper thread and no other task on that runtime
    /// makes progress until it returns.
    fn travel_matrix(&self, points: &[Coord<f64>]) -> Result<TravelMatrix, MatrixError> {
        block_on(&self.runtime, self.fetch_matrix(points))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapbox::test_support::{FailingBlocks, GridService};
    use rstest::{fixture, rstest};

    fn line(n: usize) -> Vec<Coord<f64>> {
        (0..n)
            .map(|i| Coord {
                x: -97.0 + i as f64 * 0.01,
                y: 30.0,
            })
            .collect()
    }

    #[fixture]
    fn config() -> MapboxConfig {
        MapboxConfig::new("pk.test")
            .with_max_coordinates_per_request(4)
            .with_max_concurrent_requests(2)
    }

    #[rstest]
    fn stitched_matrix_matches_single_request(config: MapboxConfig) {
        let points = line(5);
        let chunked = MapboxMatrixProvider::with_service(GridService::new(&points), config)
            .expect("provider should build");
        let whole = MapboxMatrixProvider::with_service(
            GridService::new(&points),
            MapboxConfig::new("pk.test"),
        )
        .expect("provider should build");

        let chunked_matrix = chunked.travel_matrix(&points).expect("matrix");
        let whole_matrix = whole.travel_matrix(&points).expect("matrix");

        assert_eq!(chunked_matrix, whole_matrix);
        assert_eq!(chunked_matrix.missing_cells(), 0);
        assert_eq!(chunked.service().calls(), 9);
        assert_eq!(whole.service().calls(), 1);
    }

    #[rstest]
    fn concurrency_is_bounded(config: MapboxConfig) {
        let points = line(9);
        let provider = MapboxMatrixProvider::with_service(GridService::new(&points), config)
            .expect("provider should build");

        provider.travel_matrix(&points).expect("matrix");

        assert_eq!(provider.service().calls(), 25);
        assert!(provider.service().peak_in_flight() <= 2);
    }

    #[rstest]
    fn failed_block_leaves_only_its_cells_absent(config: MapboxConfig) {
        let points = line(5);
        let service = FailingBlocks::erroring(GridService::new(&points), [(0..2, 2..4)]);
        let provider =
            MapboxMatrixProvider::with_service(service, config).expect("provider should build");

        let matrix = provider.travel_matrix(&points).expect("matrix");

        assert_eq!(matrix.missing_cells(), 4);
        for from in 0..2 {
            for to in 2..4 {
                assert_eq!(matrix.leg(from, to), None);
            }
        }
        assert!(matrix.leg(2, 0).is_some());
        assert!(matrix.leg(0, 4).is_some());
    }

    #[rstest]
    #[case(Vec::new(), MatrixError::EmptyInput)]
    #[case(vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 91.0 }], MatrixError::InvalidCoordinate { index: 1 })]
    fn bad_input_is_rejected(
        config: MapboxConfig,
        #[case] points: Vec<Coord<f64>>,
        #[case] expected: MatrixError,
    ) {
        let provider = MapboxMatrixProvider::with_service(GridService::new(&points), config)
            .expect("provider should build");

        assert_eq!(provider.travel_matrix(&points), Err(expected));
        assert_eq!(provider.service().calls(), 0);
    }

    #[rstest]
    fn coordinate_limit_below_two_is_rejected() {
        let points = line(2);
        let provider = MapboxMatrixProvider::with_service(
            GridService::new(&points),
            MapboxConfig::new("pk.test").with_max_coordinates_per_request(1),
        )
        .expect("provider should build");

        assert_eq!(
            provider.travel_matrix(&points),
            Err(MatrixError::RequestTooLarge {
                coordinates: 2,
                limit: 1
            })
        );
    }

    #[rstest]
    fn missing_token_fails_before_any_request() {
        let err = MapboxMatrixProvider::new(MapboxConfig::default()).expect_err("no token");
        assert!(matches!(err, ProviderBuildError::MissingCredentials { .. }));
    }

    #[rstest]
    fn works_inside_a_multi_threaded_runtime(config: MapboxConfig) {
        let points = line(3);
        let provider = MapboxMatrixProvider::with_service(GridService::new(&points), config)
            .expect("provider should build");
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .expect("runtime");

        let matrix = runtime.block_on(async { provider.travel_matrix(&points) });

        assert_eq!(matrix.expect("matrix").missing_cells(), 0);
    }

    #[rstest]
    fn works_inside_a_current_thread_runtime(config: MapboxConfig) {
        let points = line(3);
        let provider = MapboxMatrixProvider::with_service(GridService::new(&points), config)
            .expect("provider should build");
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");

        let matrix = runtime.block_on(async { provider.travel_matrix(&points) });

        assert_eq!(matrix.expect("matrix").missing_cells(), 0);
    }

    #[rstest]
    fn input_errors_surface_inside_a_current_thread_runtime(config: MapboxConfig) {
        let provider = MapboxMatrixProvider::with_service(GridService::new(&[]), config)
            .expect("provider should build");
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");

        let matrix = runtime.block_on(async { provider.travel_matrix(&[]) });

        assert_eq!(matrix, Err(MatrixError::EmptyInput));
    }
}
