//! Staggered bilinear interpolation.
//!
//! A query position is first resolved to a [`Stencil`]: the lower-left
//! interior node `(iz, ix)` and the four bilinear weights. Each component
//! then forms node values from its staggered samples (see
//! [`Stagger`](picpt_core::Stagger)) at the four corners
//! `(iz, ix) (iz, ix+1) (iz+1, ix) (iz+1, ix+1)` and blends them.
//!
//! Node values reach one cell back in x and z for staggered components and
//! one cell forward for the `+1` corners, so the valid interior is
//! `ix ∈ [1, nx-2]`, `iz ∈ [1, nz-2]`.

#![allow(unsafe_code)]

use picpt_core::{FieldComponent, FieldError, FieldSample, Stagger};
use picpt_grid::GridRead;

use crate::geometry::GridGeometry;
use crate::snapshot::FieldSnapshot;

/// Interior node and bilinear weights for one query position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stencil {
    ix: usize,
    iz: usize,
    /// `[wmm, wpm, wmp, wpp]`.
    weights: [f64; 4],
    rows: usize,
    cols: usize,
}

impl Stencil {
    /// Resolve a physical `(x, z)` position.
    ///
    /// Fails with [`FieldError::OutOfDomain`] if the position falls outside
    /// the interior or is not finite.
    pub fn locate(geometry: &GridGeometry, x: f64, z: f64) -> Result<Self, FieldError> {
        let (fx, fz) = geometry.to_grid(x, z);
        Self::at_grid(geometry, fx, fz)
    }

    /// Resolve a fractional grid coordinate.
    pub fn at_grid(geometry: &GridGeometry, fx: f64, fz: f64) -> Result<Self, FieldError> {
        let (rows, cols) = geometry.shape();
        let ixf = fx.floor();
        let izf = fz.floor();
        let inside = |i: f64, n: usize| i.is_finite() && i >= 1.0 && i <= n.saturating_sub(2) as f64;
        if !inside(ixf, cols) || !inside(izf, rows) {
            return Err(FieldError::OutOfDomain { fx, fz });
        }
        let dx = fx - ixf;
        let dz = fz - izf;
        Ok(Self {
            ix: ixf as usize,
            iz: izf as usize,
            weights: [
                (1.0 - dx) * (1.0 - dz),
                dx * (1.0 - dz),
                (1.0 - dx) * dz,
                dx * dz,
            ],
            rows,
            cols,
        })
    }

    /// Lower-left interior node `(iz, ix)`.
    pub fn node(&self) -> (usize, usize) {
        (self.iz, self.ix)
    }

    /// Bilinear weights `[wmm, wpm, wmp, wpp]`.
    pub fn weights(&self) -> [f64; 4] {
        self.weights
    }

    /// Interpolate one component grid.
    ///
    /// # Panics
    ///
    /// If `view` does not have the shape this stencil was located for.
    pub fn sample(&self, view: &GridRead<'_, f32>, stagger: Stagger) -> f64 {
        assert_eq!(
            (view.rows(), view.cols()),
            (self.rows, self.cols),
            "grid shape does not match stencil"
        );
        let (iz, ix) = (self.iz, self.ix);
        let [wmm, wpm, wmp, wpp] = self.weights;
        wmm * node_value(view, stagger, iz, ix)
            + wpm * node_value(view, stagger, iz, ix + 1)
            + wmp * node_value(view, stagger, iz + 1, ix)
            + wpp * node_value(view, stagger, iz + 1, ix + 1)
    }

    /// Interpolate all six components of a snapshot.
    pub fn sample_snapshot(&self, snapshot: &FieldSnapshot) -> FieldSample {
        let mut out = FieldSample::ZERO;
        for c in FieldComponent::ALL {
            let view = snapshot.component(c).read();
            out.0[c.index()] = self.sample(&view, c.stagger());
        }
        out
    }
}

/// Value of a staggered component at node `(r, c)`.
///
/// A component averaged in x spans columns `c-1 ..= c`, one averaged in z
/// spans rows `r-1 ..= r`; the node value is the mean over that block.
/// Requires `1 <= r < rows` and `1 <= c < cols`, which holds for every
/// corner of a located [`Stencil`] on a grid of matching shape.
#[inline]
fn node_value(view: &GridRead<'_, f32>, stagger: Stagger, r: usize, c: usize) -> f64 {
    debug_assert!(r >= 1 && r < view.rows() && c >= 1 && c < view.cols());
    let c0 = if stagger.averages_x() { c - 1 } else { c };
    let r0 = if stagger.averages_z() { r - 1 } else { r };
    let mut sum = 0.0;
    for cc in c0..=c {
        for rr in r0..=r {
            // SAFETY: callers pass corners of a Stencil whose shape equals the
            // view's (asserted in `Stencil::sample`). Stencil::at_grid
            // guarantees 1 <= iz <= rows-2 and 1 <= ix <= cols-2, so every
            // index lies in [iz-1, iz+1] x [ix-1, ix+1] ⊆ [0, rows) x [0, cols).
            sum += f64::from(unsafe { *view.get_unchecked(rr, cc) });
        }
    }
    sum / ((c - c0 + 1) * (r - r0 + 1)) as f64
}
