//! Row-indexed views over a locked grid buffer.

use std::ops::{Index, IndexMut};
use std::sync::{RwLockReadGuard, RwLockWriteGuard};

/// Shared read access to a grid, indexed as `view[row][col]`.
///
/// Row indexing is bounds-checked and panics on a bad row, like slice
/// indexing. Use [`get`](Self::get) for a fallible lookup, or
/// `get_unchecked` when the caller has already validated the indices.
pub struct GridRead<'a, T> {
    pub(crate) guard: RwLockReadGuard<'a, Vec<T>>,
    pub(crate) rows: usize,
    pub(crate) cols: usize,
}

impl<'a, T> GridRead<'a, T> {
    pub(crate) fn new(guard: RwLockReadGuard<'a, Vec<T>>, rows: usize, cols: usize) -> Self {
        Self { guard, rows, cols }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Checked element lookup.
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row < self.rows && col < self.cols {
            self.guard.get(row * self.cols + col)
        } else {
            None
        }
    }

    /// The whole buffer, row-major.
    pub fn as_slice(&self) -> &[T] {
        &self.guard
    }
}

impl<T> Index<usize> for GridRead<'_, T> {
    type Output = [T];

    fn index(&self, row: usize) -> &[T] {
        assert!(row < self.rows, "row {row} out of range for {} rows", self.rows);
        &self.guard[row * self.cols..(row + 1) * self.cols]
    }
}

/// Exclusive write access to a grid, indexed as `view[row][col]`.
pub struct GridWrite<'a, T> {
    guard: RwLockWriteGuard<'a, Vec<T>>,
    rows: usize,
    cols: usize,
}

impl<'a, T> GridWrite<'a, T> {
    pub(crate) fn new(guard: RwLockWriteGuard<'a, Vec<T>>, rows: usize, cols: usize) -> Self {
        Self { guard, rows, cols }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Checked mutable element lookup.
    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut T> {
        if row < self.rows && col < self.cols {
            self.guard.get_mut(row * self.cols + col)
        } else {
            None
        }
    }

    /// The whole buffer, row-major.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.guard
    }
}

impl<T: Clone> GridWrite<'_, T> {
    /// Set every element to `value`.
    pub fn fill(&mut self, value: T) {
        self.guard.fill(value);
    }
}

impl<T> Index<usize> for GridWrite<'_, T> {
    type Output = [T];

    fn index(&self, row: usize) -> &[T] {
        assert!(row < self.rows, "row {row} out of range for {} rows", self.rows);
        &self.guard[row * self.cols..(row + 1) * self.cols]
    }
}

impl<T> IndexMut<usize> for GridWrite<'_, T> {
    fn index_mut(&mut self, row: usize) -> &mut [T] {
        assert!(row < self.rows, "row {row} out of range for {} rows", self.rows);
        let cols = self.cols;
        &mut self.guard[row * cols..(row + 1) * cols]
    }
}
