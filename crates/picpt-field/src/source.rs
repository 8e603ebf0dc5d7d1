//! The snapshot-source seam.

use picpt_core::{FieldError, SnapshotIndex};

use crate::geometry::GridGeometry;
use crate::snapshot::FieldSnapshot;

/// Something that can produce the field at a discrete time index.
///
/// Implementations must return grids in freshly allocated buffers: the
/// store may still be sharing previously returned snapshots.
///
/// [`DiskSource`](crate::DiskSource) reads the on-disk layouts; tests
/// supply in-memory sources.
pub trait SnapshotSource: Send {
    /// Load the six component grids for `index`.
    fn load(
        &mut self,
        index: SnapshotIndex,
        geometry: &GridGeometry,
    ) -> Result<FieldSnapshot, FieldError>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}
