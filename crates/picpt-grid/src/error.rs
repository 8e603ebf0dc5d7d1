//! Grid-specific error types.

use std::error::Error;
use std::fmt;

/// Errors from constructing or addressing a [`Grid2D`](crate::Grid2D).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridError {
    /// A grid with zero rows or zero columns was requested.
    EmptyGrid {
        /// Requested row count.
        rows: usize,
        /// Requested column count.
        cols: usize,
    },
    /// An initializer buffer does not hold exactly `rows * cols` elements.
    ShapeMismatch {
        /// `rows * cols`.
        expected: usize,
        /// Length of the buffer supplied.
        found: usize,
    },
    /// A `(row, col)` pair outside the grid.
    OutOfBounds {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
        /// Row count of the grid.
        rows: usize,
        /// Column count of the grid.
        cols: usize,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid { rows, cols } => {
                write!(f, "grid dimensions must be non-zero, got {rows}x{cols}")
            }
            Self::ShapeMismatch { expected, found } => {
                write!(
                    f,
                    "initializer has {found} elements, grid needs {expected}"
                )
            }
            Self::OutOfBounds {
                row,
                col,
                rows,
                cols,
            } => write!(f, "index ({row}, {col}) out of bounds for {rows}x{cols} grid"),
        }
    }
}

impl Error for GridError {}
