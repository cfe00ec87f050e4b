//! In-memory [`MatrixService`] doubles for exercising chunked fetches
//! without a network.

use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use geo::{Coord, Distance as _, Haversine, Point};
use yardline_core::{Distance, Leg, MatrixError, TravelMatrix, seconds_to_minutes};

use super::chunk::{BlockMatrix, BlockRequest};
use super::service::MatrixService;

const METERS_PER_SECOND: f64 = 15.0;

/// Service answering from great-circle distances between the coordinates
/// it is sent, so any partition of the same points yields the same cells.
///
/// Requests whose coordinate list does not match the registered points
/// for their node ranges are rejected, which catches indexing mistakes in
/// the caller.
#[derive(Debug)]
pub struct GridService {
    points: Vec<Coord<f64>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl GridService {
    /// Serve the given node coordinates.
    #[must_use]
    pub fn new(points: &[Coord<f64>]) -> Self {
        Self {
            points: points.to_vec(),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Block requests received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Largest number of requests observed in flight at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// The matrix an unchunked fetch of every point should produce.
    #[must_use]
    pub fn ground_truth(&self) -> TravelMatrix {
        let mut matrix = TravelMatrix::empty(self.points.len());
        for (from, a) in self.points.iter().enumerate() {
            for (to, b) in self.points.iter().enumerate() {
                let (seconds, meters) = cell(*a, *b);
                let leg = seconds_to_minutes(seconds)
                    .map(|minutes| Leg::new(Distance::from_meters(meters), minutes));
                matrix.set(from, to, leg);
            }
        }
        matrix
    }

    fn check_coordinates(&self, request: &BlockRequest) -> Result<(), MatrixError> {
        let expected: Vec<Coord<f64>> = self
            .points
            .get(request.origins.clone())
            .into_iter()
            .chain(self.points.get(request.destinations.clone()))
            .flatten()
            .copied()
            .collect();
        if expected == request.coordinates {
            Ok(())
        } else {
            Err(MatrixError::ServiceError {
                code: "InvalidInput".to_owned(),
                message: format!(
                    "coordinates do not match nodes {:?} and {:?}",
                    request.origins, request.destinations
                ),
            })
        }
    }
}

fn cell(a: Coord<f64>, b: Coord<f64>) -> (f64, f64) {
    let meters = Haversine.distance(Point::from(a), Point::from(b));
    (meters / METERS_PER_SECOND, meters)
}

#[async_trait]
impl MatrixService for GridService {
    async fn fetch_block(&self, request: &BlockRequest) -> Result<BlockMatrix, MatrixError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.check_coordinates(request)?;
        let sources = request
            .source_positions()
            .filter_map(|i| request.coordinates.get(i).copied());
        let mut block = BlockMatrix::default();
        for origin in sources {
            let (durations, distances) = request
                .destination_positions()
                .filter_map(|j| request.coordinates.get(j).copied())
                .map(|destination| {
                    let (seconds, meters) = cell(origin, destination);
                    (Some(seconds), Some(meters))
                })
                .unzip();
            block.durations.push(durations);
            block.distances.push(distances);
        }
        Ok(block)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    Error,
    Malformed,
}

/// Wraps a service and sabotages selected blocks.
#[derive(Debug)]
pub struct FailingBlocks<S> {
    inner: S,
    blocks: Vec<(Range<usize>, Range<usize>)>,
    failure: Failure,
}

impl<S> FailingBlocks<S> {
    /// Answer the listed (origins, destinations) blocks with an HTTP 500.
    pub fn erroring(
        inner: S,
        blocks: impl IntoIterator<Item = (Range<usize>, Range<usize>)>,
    ) -> Self {
        Self {
            inner,
            blocks: blocks.into_iter().collect(),
            failure: Failure::Error,
        }
    }

    /// Answer the listed blocks with a body missing its last row.
    pub fn malformed(
        inner: S,
        blocks: impl IntoIterator<Item = (Range<usize>, Range<usize>)>,
    ) -> Self {
        Self {
            inner,
            blocks: blocks.into_iter().collect(),
            failure: Failure::Malformed,
        }
    }

    /// The wrapped service.
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    fn targets(&self, request: &BlockRequest) -> bool {
        self.blocks
            .iter()
            .any(|(o, d)| *o == request.origins && *d == request.destinations)
    }
}

#[async_trait]
impl<S: MatrixService> MatrixService for FailingBlocks<S> {
    async fn fetch_block(&self, request: &BlockRequest) -> Result<BlockMatrix, MatrixError> {
        if !self.targets(request) {
            return self.inner.fetch_block(request).await;
        }
        match self.failure {
            Failure::Error => Err(MatrixError::HttpError {
                url: "memory://directions-matrix".to_owned(),
                status: 500,
                message: "Internal Server Error".to_owned(),
            }),
            Failure::Malformed => {
                let mut block = self.inner.fetch_block(request).await?;
                block.durations.pop();
                Ok(block)
            }
        }
    }
}
