//! Unchecked element access for validated hot loops.
//!
//! Every `unsafe` block carries a `// SAFETY:` comment.

#![allow(unsafe_code)]

use crate::view::GridRead;

impl<T> GridRead<'_, T> {
    /// Element at `(row, col)` without bounds checking.
    ///
    /// # Safety
    ///
    /// The caller must guarantee `row < self.rows()` and `col < self.cols()`.
    #[inline]
    pub unsafe fn get_unchecked(&self, row: usize, col: usize) -> &T {
        debug_assert!(row < self.rows && col < self.cols);
        // SAFETY: the buffer holds exactly `rows * cols` elements (enforced at
        // construction), and the caller guarantees row < rows and col < cols,
        // so `row * cols + col < rows * cols`.
        unsafe { self.guard.get_unchecked(row * self.cols + col) }
    }
}
