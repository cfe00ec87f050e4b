//! Travel matrix type and the provider trait that produces it.

use geo::Coord;

use crate::distance::Distance;

use super::error::MatrixError;

/// Travel distance and drive time between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Leg {
    /// Road or great-circle distance.
    pub distance: Distance,
    /// Drive time in whole minutes.
    pub minutes: u32,
}

impl Leg {
    /// A leg of zero length and zero time.
    pub const ZERO: Self = Self {
        distance: Distance::ZERO,
        minutes: 0,
    };

    /// Construct a leg.
    #[must_use]
    pub const fn new(distance: Distance, minutes: u32) -> Self {
        Self { distance, minutes }
    }
}

/// Square matrix of optional legs indexed by node.
///
/// Node 0 is the depot; nodes `1..=n` are the stops in input order. A cell
/// is `None` when no route is known between the two nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TravelMatrix {
    cells: Vec<Vec<Option<Leg>>>,
}

impl TravelMatrix {
    /// Build a matrix from rows, checking that it is square.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::NotSquare`] when any row length differs from the
    /// number of rows.
    pub fn from_rows(cells: Vec<Vec<Option<Leg>>>) -> Result<Self, MatrixError> {
        let expected = cells.len();
        if let Some((row, actual)) = cells
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|(_, len)| *len != expected)
        {
            return Err(MatrixError::NotSquare {
                expected,
                row,
                actual,
            });
        }
        Ok(Self { cells })
    }

    /// A `size × size` matrix with every cell absent.
    #[must_use]
    pub fn empty(size: usize) -> Self {
        Self {
            cells: vec![vec![None; size]; size],
        }
    }

    /// Number of nodes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// Leg from `from` to `to`, or `None` if absent or out of range.
    #[must_use]
    pub fn leg(&self, from: usize, to: usize) -> Option<Leg> {
        self.cells.get(from).and_then(|row| row.get(to)).copied().flatten()
    }

    /// Overwrite a single cell. Out-of-range indices are ignored and reported
    /// as `false`.
    pub fn set(&mut self, from: usize, to: usize, leg: Option<Leg>) -> bool {
        match self.cells.get_mut(from).and_then(|row| row.get_mut(to)) {
            Some(cell) => {
                *cell = leg;
                true
            }
            None => false,
        }
    }

    /// Iterate rows of cells.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<Leg>]> {
        self.cells.iter().map(Vec::as_slice)
    }

    /// Number of absent cells off the diagonal.
    #[must_use]
    pub fn missing_cells(&self) -> usize {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .filter(|(j, cell)| *j != i && cell.is_none())
                    .count()
            })
            .sum()
    }

    /// Fraction of off-diagonal cells that are absent, in `[0, 1]`.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "ratio is only compared against a logging threshold"
    )]
    pub fn missing_fraction(&self) -> f64 {
        let n = self.size();
        let off_diagonal = n.saturating_mul(n.saturating_sub(1));
        if off_diagonal == 0 {
            return 0.0;
        }
        self.missing_cells() as f64 / off_diagonal as f64
    }
}

/// Produce pairwise travel legs for a depot and its stops.
///
/// Implementers must return a square matrix whose size equals
/// `points.len()`, with `points[0]` as the depot.
///
/// # Examples
///
/// ```rust
/// use geo::Coord;
/// use yardline_core::{Distance, Leg, MatrixError, TravelMatrix, TravelMatrixProvider};
///
/// struct OneMileProvider;
///
/// impl TravelMatrixProvider for OneMileProvider {
///     fn travel_matrix(&self, points: &[Coord<f64>]) -> Result<TravelMatrix, MatrixError> {
///         if points.is_empty() {
///             return Err(MatrixError::EmptyInput);
///         }
///         let n = points.len();
///         let one_mile = Leg::new(Distance::from_milli_miles(1_000), 2);
///         TravelMatrix::from_rows(
///             (0..n)
///                 .map(|i| (0..n).map(|j| Some(if i == j { Leg::ZERO } else { one_mile })).collect())
///                 .collect(),
///         )
///     }
/// }
///
/// let matrix = OneMileProvider.travel_matrix(&[Coord { x: 0.0, y: 0.0 }])?;
/// assert_eq!(matrix.size(), 1);
/// # Ok::<(), MatrixError>(())
/// ```
pub trait TravelMatrixProvider {
    /// Return the travel matrix for `points`.
    ///
    /// Implementations must return `Err(MatrixError::EmptyInput)` when
    /// `points` is empty.
    fn travel_matrix(&self, points: &[Coord<f64>]) -> Result<TravelMatrix, MatrixError>;
}

impl<T: TravelMatrixProvider + ?Sized> TravelMatrixProvider for &T {
    fn travel_matrix(&self, points: &[Coord<f64>]) -> Result<TravelMatrix, MatrixError> {
        (**self).travel_matrix(points)
    }
}

impl<T: TravelMatrixProvider + ?Sized> TravelMatrixProvider for Box<T> {
    fn travel_matrix(&self, points: &[Coord<f64>]) -> Result<TravelMatrix, MatrixError> {
        (**self).travel_matrix(points)
    }
}
