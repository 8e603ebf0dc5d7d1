//! Strongly-typed identifiers.

use std::fmt;

/// Discrete time index of a recorded field snapshot.
///
/// Snapshot indices live on the same axis as the simulated time `t`
/// (one unit of `t` per unit of index), so a bracket `(a, b)` covers the
/// closed time interval between `a` and `b`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SnapshotIndex(pub i64);

impl SnapshotIndex {
    /// The index as a point on the simulated time axis.
    pub fn as_time(self) -> f64 {
        self.0 as f64
    }

    /// The index `steps` cadence intervals away (negative moves backward).
    pub fn offset(self, steps: i64) -> Self {
        Self(self.0 + steps)
    }
}

impl fmt::Display for SnapshotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for SnapshotIndex {
    fn from(v: i64) -> Self {
        Self(v)
    }
}
