//! The shared grid handle.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, Weak};

use crate::error::GridError;
use crate::view::{GridRead, GridWrite};

/// A handle to a shared `rows × cols` buffer, row-major.
///
/// `Clone` shares the buffer and bumps the handle count; it never copies
/// elements. Use [`deep_clone`](Self::deep_clone) for an independent copy.
/// The buffer lives as long as any handle does, so a reader holding its own
/// handle is unaffected when another handle is re-pointed with
/// [`assign`](Self::assign).
pub struct Grid2D<T> {
    buf: Arc<RwLock<Vec<T>>>,
    rows: usize,
    cols: usize,
}

impl<T: Clone + Default> Grid2D<T> {
    /// Create a grid filled with `T::default()`.
    pub fn new(rows: usize, cols: usize) -> Result<Self, GridError> {
        let len = checked_len(rows, cols)?;
        Ok(Self::from_vec_unchecked(rows, cols, vec![T::default(); len]))
    }

    /// Create a grid by copying `rows * cols` elements from `src`.
    pub fn from_slice(rows: usize, cols: usize, src: &[T]) -> Result<Self, GridError> {
        let len = checked_len(rows, cols)?;
        if src.len() != len {
            return Err(GridError::ShapeMismatch {
                expected: len,
                found: src.len(),
            });
        }
        Ok(Self::from_vec_unchecked(rows, cols, src.to_vec()))
    }

    /// Allocate an independent buffer holding a copy of the current contents.
    pub fn deep_clone(&self) -> Self {
        let data = self.read().as_slice().to_vec();
        Self::from_vec_unchecked(self.rows, self.cols, data)
    }

    /// Copy the current contents out into a `Vec`.
    pub fn to_vec(&self) -> Vec<T> {
        self.read().as_slice().to_vec()
    }
}

impl<T: Copy> Grid2D<T> {
    /// Checked element read.
    pub fn get(&self, row: usize, col: usize) -> Result<T, GridError> {
        self.read()
            .get(row, col)
            .copied()
            .ok_or_else(|| self.out_of_bounds(row, col))
    }

    /// Checked element write, visible through every handle sharing the buffer.
    pub fn set(&self, row: usize, col: usize, value: T) -> Result<(), GridError> {
        let mut view = self.write();
        match view.get_mut(row, col) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(self.out_of_bounds(row, col)),
        }
    }
}

impl<T> Grid2D<T> {
    fn from_vec_unchecked(rows: usize, cols: usize, data: Vec<T>) -> Self {
        Self {
            buf: Arc::new(RwLock::new(data)),
            rows,
            cols,
        }
    }

    /// Take ownership of a row-major `Vec` without copying.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Result<Self, GridError> {
        let len = checked_len(rows, cols)?;
        if data.len() != len {
            return Err(GridError::ShapeMismatch {
                expected: len,
                found: data.len(),
            });
        }
        Ok(Self::from_vec_unchecked(rows, cols, data))
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Total element count.
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// Always `false`: empty grids cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of live handles sharing this buffer.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.buf)
    }

    /// Whether `other` refers to the same buffer.
    pub fn shares_buffer_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.buf, &other.buf)
    }

    /// Re-point this handle at `other`'s buffer.
    ///
    /// The previously referenced buffer is released if this was its last
    /// handle. Assigning a handle to itself is a no-op.
    pub fn assign(&mut self, other: &Self) {
        if !self.shares_buffer_with(other) {
            *self = other.clone();
        }
    }

    /// A non-owning handle that does not keep the buffer alive.
    pub fn downgrade(&self) -> WeakGrid<T> {
        WeakGrid {
            buf: Arc::downgrade(&self.buf),
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Shared read view.
    ///
    /// A poisoned lock still yields the data: the buffer holds plain
    /// samples with no invariants a panicking writer could break.
    pub fn read(&self) -> GridRead<'_, T> {
        let guard = self.buf.read().unwrap_or_else(PoisonError::into_inner);
        GridRead::new(guard, self.rows, self.cols)
    }

    /// Exclusive write view.
    pub fn write(&self) -> GridWrite<'_, T> {
        let guard = self.buf.write().unwrap_or_else(PoisonError::into_inner);
        GridWrite::new(guard, self.rows, self.cols)
    }

    fn out_of_bounds(&self, row: usize, col: usize) -> GridError {
        GridError::OutOfBounds {
            row,
            col,
            rows: self.rows,
            cols: self.cols,
        }
    }
}

impl<T> Clone for Grid2D<T> {
    fn clone(&self) -> Self {
        Self {
            buf: Arc::clone(&self.buf),
            rows: self.rows,
            cols: self.cols,
        }
    }
}

impl<T> fmt::Debug for Grid2D<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid2D")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("ref_count", &self.ref_count())
            .finish()
    }
}

/// A weak reference to a grid buffer.
///
/// Upgrading fails once every [`Grid2D`] handle to the buffer is gone,
/// so released storage can never be reached through it.
pub struct WeakGrid<T> {
    buf: Weak<RwLock<Vec<T>>>,
    rows: usize,
    cols: usize,
}

impl<T> WeakGrid<T> {
    /// Recover a strong handle if the buffer is still alive.
    pub fn upgrade(&self) -> Option<Grid2D<T>> {
        self.buf.upgrade().map(|buf| Grid2D {
            buf,
            rows: self.rows,
            cols: self.cols,
        })
    }

    /// Number of strong handles still alive.
    pub fn strong_count(&self) -> usize {
        self.buf.strong_count()
    }
}

fn checked_len(rows: usize, cols: usize) -> Result<usize, GridError> {
    match rows.checked_mul(cols) {
        Some(len) if len > 0 => Ok(len),
        _ => Err(GridError::EmptyGrid { rows, cols }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_is_default_filled() {
        let g: Grid2D<f32> = Grid2D::new(3, 4).unwrap();
        assert_eq!(g.shape(), (3, 4));
        assert_eq!(g.len(), 12);
        assert!(g.to_vec().iter().all(|&v| v == 0.0));
        assert_eq!(g.ref_count(), 1);
    }

    #[test]
    fn zero_dimension_rejected() {
        match Grid2D::<f32>::new(0, 4) {
            Err(GridError::EmptyGrid { rows: 0, cols: 4 }) => {}
            other => panic!("expected EmptyGrid, got {other:?}"),
        }
    }

    #[test]
    fn from_slice_rejects_wrong_length() {
        match Grid2D::from_slice(2, 2, &[1.0f32, 2.0, 3.0]) {
            Err(GridError::ShapeMismatch {
                expected: 4,
                found: 3,
            }) => {}
            other => panic!("expected ShapeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn clone_shares_and_counts() {
        let a: Grid2D<f32> = Grid2D::new(2, 2).unwrap();
        let b = a.clone();
        assert_eq!(a.ref_count(), 2);
        assert!(a.shares_buffer_with(&b));

        b.set(1, 0, 7.5).unwrap();
        assert_eq!(a.get(1, 0).unwrap(), 7.5);

        drop(b);
        assert_eq!(a.ref_count(), 1);
    }

    #[test]
    fn assign_releases_previous_buffer() {
        let a = Grid2D::from_slice(1, 2, &[1.0f32, 2.0]).unwrap();
        let mut b = Grid2D::from_slice(1, 2, &[3.0f32, 4.0]).unwrap();
        let old = b.downgrade();

        b.assign(&a);
        assert!(old.upgrade().is_none());
        assert_eq!(a.ref_count(), 2);
        assert_eq!(b.to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn self_assign_keeps_count() {
        let mut a: Grid2D<f32> = Grid2D::new(1, 1).unwrap();
        let alias = a.clone();
        a.assign(&alias);
        assert_eq!(a.ref_count(), 2);
    }

    #[test]
    fn deep_clone_is_independent() {
        let a = Grid2D::from_slice(2, 1, &[1.0f32, 2.0]).unwrap();
        let c = a.deep_clone();
        assert_eq!(c.ref_count(), 1);
        assert!(!a.shares_buffer_with(&c));

        c.set(0, 0, -1.0).unwrap();
        a.set(1, 0, -2.0).unwrap();
        assert_eq!(a.to_vec(), vec![1.0, -2.0]);
        assert_eq!(c.to_vec(), vec![-1.0, 2.0]);
    }

    #[test]
    fn weak_handle_dies_with_last_strong() {
        let a: Grid2D<f32> = Grid2D::new(2, 2).unwrap();
        let b = a.clone();
        let weak = a.downgrade();
        drop(a);
        assert_eq!(weak.strong_count(), 1);
        assert!(weak.upgrade().is_some());
        drop(b);
        assert_eq!(weak.strong_count(), 0);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn checked_access_reports_bounds() {
        let g: Grid2D<f32> = Grid2D::new(2, 3).unwrap();
        match g.get(2, 0) {
            Err(GridError::OutOfBounds {
                row: 2,
                col: 0,
                rows: 2,
                cols: 3,
            }) => {}
            other => panic!("expected OutOfBounds, got {other:?}"),
        }
        assert!(g.set(0, 3, 1.0).is_err());
    }

    #[test]
    fn reader_keeps_old_buffer_across_reassign() {
        let mut owner = Grid2D::from_slice(1, 2, &[1.0f32, 2.0]).unwrap();
        let reader = owner.clone();
        let replacement = Grid2D::from_slice(1, 2, &[9.0f32, 9.0]).unwrap();

        let handle = std::thread::spawn(move || reader.to_vec());
        owner.assign(&replacement);
        assert_eq!(handle.join().unwrap(), vec![1.0, 2.0]);
        assert_eq!(owner.to_vec(), vec![9.0, 9.0]);
    }

    proptest! {
        #[test]
        fn from_slice_reads_back_exactly(
            rows in 1usize..12,
            cols in 1usize..12,
            seed in prop::collection::vec(-1e6f32..1e6, 144),
        ) {
            let src = &seed[..rows * cols];
            let g = Grid2D::from_slice(rows, cols, src).unwrap();
            for r in 0..rows {
                for c in 0..cols {
                    prop_assert_eq!(g.get(r, c).unwrap(), src[r * cols + c]);
                }
            }
        }

        #[test]
        fn ref_count_tracks_live_handles(extra in 0usize..8) {
            let g: Grid2D<f64> = Grid2D::new(2, 2).unwrap();
            let handles: Vec<_> = (0..extra).map(|_| g.clone()).collect();
            prop_assert_eq!(g.ref_count(), extra + 1);
            drop(handles);
            prop_assert_eq!(g.ref_count(), 1);
        }
    }
}
