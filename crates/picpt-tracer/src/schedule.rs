//! Snapshot bracket sequence for a run.

use std::fmt;

use picpt_core::{ParameterError, SnapshotIndex};
use picpt_field::SnapshotRange;

/// Pair of snapshot indices loaded together.
///
/// `a` is where the run enters the bracket and `b` where it leaves it, so
/// backward brackets have `b < a`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bracket {
    /// Entry snapshot.
    pub a: SnapshotIndex,
    /// Exit snapshot.
    pub b: SnapshotIndex,
}

impl Bracket {
    /// Whether simulated time `t` lies between `a` and `b` (inclusive).
    pub fn covers(&self, t: f64) -> bool {
        let (lo, hi) = if self.a <= self.b {
            (self.a, self.b)
        } else {
            (self.b, self.a)
        };
        t >= lo.as_time() && t <= hi.as_time()
    }
}

impl fmt::Display for Bracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.a, self.b)
    }
}

/// Iterator over the brackets a run passes through.
///
/// Forward runs start at `a = first + ⌊(t − first)/step⌋·step` and move up
/// by `step`; backward runs start at `a = first + ⌈(t − first)/step⌉·step`
/// and move down. Iteration ends once the far end of a bracket leaves the
/// recorded range.
#[derive(Clone, Debug)]
pub struct BracketSchedule {
    first: SnapshotIndex,
    last: SnapshotIndex,
    delta: i64,
    next_a: SnapshotIndex,
    done: bool,
}

impl BracketSchedule {
    /// Build the schedule for a run starting at `t_begin` with step `dt`.
    pub fn new(range: SnapshotRange, t_begin: f64, dt: f64) -> Result<Self, ParameterError> {
        range.validate()?;
        if !t_begin.is_finite() {
            return Err(ParameterError::new(
                "run.time",
                format!("start time must be finite, got {t_begin}"),
            ));
        }
        if dt == 0.0 || !dt.is_finite() {
            return Err(ParameterError::new(
                "run.dt",
                format!("must be finite and non-zero, got {dt}"),
            ));
        }
        let cells = (t_begin - range.first as f64) / range.step as f64;
        let (offset, delta) = if dt > 0.0 {
            (cells.floor(), range.step)
        } else {
            (cells.ceil(), -range.step)
        };
        let first = SnapshotIndex(range.first);
        Ok(Self {
            first,
            last: range.last_recorded(),
            delta,
            next_a: first.offset(offset as i64 * range.step),
            done: false,
        })
    }

    /// Whether the schedule moves backward in time.
    pub fn is_backward(&self) -> bool {
        self.delta < 0
    }

    fn recorded(&self, index: SnapshotIndex) -> bool {
        index >= self.first && index <= self.last
    }
}

impl Iterator for BracketSchedule {
    type Item = Bracket;

    fn next(&mut self) -> Option<Bracket> {
        if self.done {
            return None;
        }
        let a = self.next_a;
        let b = a.offset(self.delta);
        if !self.recorded(a) || !self.recorded(b) {
            self.done = true;
            return None;
        }
        self.next_a = b;
        Some(Bracket { a, b })
    }
}
