//! Per-run performance counters.

/// Counters collected over one [`Tracer::run`](crate::Tracer::run).
///
/// Durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunMetrics {
    /// Brackets installed in the field store.
    pub brackets: u64,
    /// Snapshots read from the source.
    pub snapshots_loaded: u64,
    /// Snapshots shared from the previous bracket instead of read.
    pub snapshots_reused: u64,
    /// Time steps taken (pushes of the whole particle set).
    pub steps: u64,
    /// Time spent loading snapshots.
    pub load_us: u64,
    /// Time spent sampling fields and pushing particles.
    pub push_us: u64,
}
