//! Splitting a square matrix into block requests and stitching the answers.
//!
//! Nodes are cut into consecutive blocks of at most `block_size`. Every
//! (origin block, destination block) pair becomes one [`BlockRequest`]
//! whose coordinate list is the origin block followed by the destination
//! block, so a request never carries more than `2 * block_size` points.
//! Blocks are disjoint, so each cell of the stitched matrix is written by
//! exactly one request.

use std::ops::Range;

use geo::Coord;
use yardline_core::{Distance, Leg, MatrixError, TravelMatrix, seconds_to_minutes};

/// One sub-matrix request.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockRequest {
    /// Node indices of the rows.
    pub origins: Range<usize>,
    /// Node indices of the columns.
    pub destinations: Range<usize>,
    /// Origin coordinates followed by destination coordinates.
    pub coordinates: Vec<Coord<f64>>,
}

impl BlockRequest {
    /// Positions of the origins within [`BlockRequest::coordinates`].
    #[must_use]
    pub fn source_positions(&self) -> Range<usize> {
        0..self.origins.len()
    }

    /// Positions of the destinations within [`BlockRequest::coordinates`].
    #[must_use]
    pub fn destination_positions(&self) -> Range<usize> {
        let start = self.origins.len();
        start..start + self.destinations.len()
    }
}

/// Raw answer to a [`BlockRequest`]: one row per origin, one column per
/// destination.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockMatrix {
    /// Durations in seconds.
    pub durations: Vec<Vec<Option<f64>>>,
    /// Distances in meters.
    pub distances: Vec<Vec<Option<f64>>>,
}

/// Consecutive index ranges of at most `block_size` covering `0..len`.
#[must_use]
pub fn block_ranges(len: usize, block_size: usize) -> Vec<Range<usize>> {
    let step = block_size.max(1);
    (0..len)
        .step_by(step)
        .map(|start| start..(start + step).min(len))
        .collect()
}

/// Every block request needed to cover the `points.len()` square matrix.
#[must_use]
pub fn plan_blocks(points: &[Coord<f64>], block_size: usize) -> Vec<BlockRequest> {
    let ranges = block_ranges(points.len(), block_size);
    ranges
        .iter()
        .flat_map(|origins| {
            ranges.iter().map(move |destinations| BlockRequest {
                origins: origins.clone(),
                destinations: destinations.clone(),
                coordinates: points
                    .get(origins.clone())
                    .into_iter()
                    .chain(points.get(destinations.clone()))
                    .flatten()
                    .copied()
                    .collect(),
            })
        })
        .collect()
}

/// Copy a block answer into `matrix`.
///
/// The answer's shape is checked before anything is written, so a malformed
/// block leaves the matrix untouched. A cell becomes a [`Leg`] only when
/// both its duration and distance are present and valid.
///
/// # Errors
///
/// Returns [`MatrixError::ParseError`] when the answer does not have one
/// row per origin and one column per destination.
pub fn stitch(
    matrix: &mut TravelMatrix,
    request: &BlockRequest,
    block: &BlockMatrix,
) -> Result<(), MatrixError> {
    check_shape("durations", &block.durations, request)?;
    check_shape("distances", &block.distances, request)?;

    let rows = block.durations.iter().zip(&block.distances);
    for (from, (durations, distances)) in request.origins.clone().zip(rows) {
        let cells = durations.iter().zip(distances);
        for (to, (seconds, meters)) in request.destinations.clone().zip(cells) {
            matrix.set(from, to, leg_from(*seconds, *meters));
        }
    }
    Ok(())
}

fn check_shape(
    name: &str,
    rows: &[Vec<Option<f64>>],
    request: &BlockRequest,
) -> Result<(), MatrixError> {
    if rows.len() != request.origins.len() {
        return Err(MatrixError::ParseError {
            message: format!(
                "{name} has {} rows, expected {}",
                rows.len(),
                request.origins.len()
            ),
        });
    }
    match rows
        .iter()
        .position(|row| row.len() != request.destinations.len())
    {
        Some(row) => Err(MatrixError::ParseError {
            message: format!(
                "{name} row {row} has the wrong length, expected {}",
                request.destinations.len()
            ),
        }),
        None => Ok(()),
    }
}

fn leg_from(seconds: Option<f64>, meters: Option<f64>) -> Option<Leg> {
    let minutes = seconds_to_minutes(seconds?)?;
    let meters = meters.filter(|m| m.is_finite() && *m >= 0.0)?;
    Some(Leg::new(Distance::from_meters(meters), minutes))
}
