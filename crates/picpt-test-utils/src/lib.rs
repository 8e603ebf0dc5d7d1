//! Test utilities for picpt development.
//!
//! Provides an in-memory [`AnalyticSource`] that synthesises snapshots from
//! a closure, plus file [`fixtures`] that write LANL and NASA snapshot
//! directories into a self-cleaning [`ScratchDir`](fixtures::ScratchDir).

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use picpt_core::{FieldComponent, FieldError, SnapshotIndex};
use picpt_field::{FieldSnapshot, FieldStore, GridGeometry, SnapshotSource};

pub use fixtures::ScratchDir;

/// Sample generator: `(index, component, row, col) -> value`.
pub type SampleFn = dyn Fn(SnapshotIndex, FieldComponent, usize, usize) -> f32 + Send;

/// Snapshot source computing every sample from a closure.
///
/// Indices outside `[first, last]` fail with
/// [`FieldError::SnapshotUnavailable`], which lets tests exercise the end of
/// the recorded range.
pub struct AnalyticSource {
    sample: Box<SampleFn>,
    first: i64,
    last: i64,
    loads: Arc<AtomicUsize>,
}

impl AnalyticSource {
    pub fn new(
        first: i64,
        last: i64,
        sample: impl Fn(SnapshotIndex, FieldComponent, usize, usize) -> f32 + Send + 'static,
    ) -> Self {
        Self {
            sample: Box::new(sample),
            first,
            last,
            loads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Time-independent uniform field.
    pub fn uniform(first: i64, last: i64, b: [f32; 3], e: [f32; 3]) -> Self {
        Self::new(first, last, move |_, c, _, _| match c {
            FieldComponent::Bx => b[0],
            FieldComponent::By => b[1],
            FieldComponent::Bz => b[2],
            FieldComponent::Ex => e[0],
            FieldComponent::Ey => e[1],
            FieldComponent::Ez => e[2],
        })
    }

    /// Handle to the number of snapshots loaded so far.
    ///
    /// Stays valid after the source is boxed into a store.
    pub fn load_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.loads)
    }
}

impl SnapshotSource for AnalyticSource {
    fn load(
        &mut self,
        index: SnapshotIndex,
        geometry: &GridGeometry,
    ) -> Result<FieldSnapshot, FieldError> {
        if index.0 < self.first || index.0 > self.last {
            return Err(FieldError::SnapshotUnavailable { index });
        }
        let snapshot = FieldSnapshot::zeroed(index, geometry)?;
        for c in FieldComponent::ALL {
            let mut view = snapshot.component(c).write();
            for r in 0..view.rows() {
                for col in 0..view.cols() {
                    view[r][col] = (self.sample)(index, c, r, col);
                }
            }
        }
        self.loads.fetch_add(1, Ordering::Relaxed);
        Ok(snapshot)
    }

    fn describe(&self) -> String {
        format!("analytic snapshots [{}, {}]", self.first, self.last)
    }
}

/// Geometry with unit cells: `Lx = nx - 1`, `Lz = nz - 1`.
///
/// With the default origin, `x ∈ [0, nx - 2)` and
/// `z ∈ [1 - nz/2, nz - 1 - nz/2)` lie inside the interpolation interior.
pub fn unit_geometry(nx: usize, nz: usize) -> GridGeometry {
    GridGeometry::new(nx, nz, (nx - 1) as f64, (nz - 1) as f64)
}

/// Field store over an [`AnalyticSource`] with unit charge-to-mass.
pub fn analytic_store(geometry: GridGeometry, source: AnalyticSource) -> FieldStore {
    FieldStore::new(geometry, 1.0, Box::new(source))
}
