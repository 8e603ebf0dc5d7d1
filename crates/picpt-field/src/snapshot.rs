//! Six component grids recorded at one time index.

use picpt_core::{FieldComponent, FieldError, SnapshotIndex};
use picpt_grid::{Grid2D, GridError};

use crate::geometry::GridGeometry;

/// The field at one discrete time index.
///
/// Cloning a snapshot shares all six grid buffers.
#[derive(Clone, Debug)]
pub struct FieldSnapshot {
    index: SnapshotIndex,
    grids: [Grid2D<f32>; FieldComponent::COUNT],
}

impl FieldSnapshot {
    /// A snapshot with six freshly allocated zero grids shaped for `geometry`.
    pub fn zeroed(index: SnapshotIndex, geometry: &GridGeometry) -> Result<Self, FieldError> {
        let (rows, cols) = geometry.shape();
        let proto = Grid2D::new(rows, cols).map_err(|e: GridError| FieldError::InvalidGeometry {
            reason: e.to_string(),
        })?;
        Ok(Self {
            index,
            grids: std::array::from_fn(|_| proto.deep_clone()),
        })
    }

    /// Assemble a snapshot from grids in storage order (`Bx` .. `Ez`).
    ///
    /// All six grids must have the shape `geometry` prescribes.
    pub fn from_grids(
        index: SnapshotIndex,
        grids: [Grid2D<f32>; FieldComponent::COUNT],
        geometry: &GridGeometry,
    ) -> Result<Self, FieldError> {
        let snapshot = Self { index, grids };
        snapshot.check_shape(geometry)?;
        Ok(snapshot)
    }

    /// Verify every component grid has the shape `geometry` prescribes.
    pub fn check_shape(&self, geometry: &GridGeometry) -> Result<(), FieldError> {
        let expected = geometry.shape();
        for c in FieldComponent::ALL {
            let found = self.grids[c.index()].shape();
            if found != expected {
                return Err(FieldError::ShapeMismatch {
                    component: c,
                    expected,
                    found,
                });
            }
        }
        Ok(())
    }

    /// The time index this snapshot was recorded at.
    pub fn index(&self) -> SnapshotIndex {
        self.index
    }

    /// The grid of one component.
    pub fn component(&self, c: FieldComponent) -> &Grid2D<f32> {
        &self.grids[c.index()]
    }

    /// All six grids in storage order.
    pub fn grids(&self) -> &[Grid2D<f32>; FieldComponent::COUNT] {
        &self.grids
    }

    /// `(rows, cols)` of the component grids.
    pub fn shape(&self) -> (usize, usize) {
        self.grids[0].shape()
    }

    /// Whether every component grid shares its buffer with `other`'s.
    pub fn shares_buffers_with(&self, other: &Self) -> bool {
        self.grids
            .iter()
            .zip(other.grids.iter())
            .all(|(a, b)| a.shares_buffer_with(b))
    }
}
