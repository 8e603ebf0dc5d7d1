//! Trajectory and output scaling types.

use serde::{Deserialize, Serialize};

use picpt_core::ParticleState;

use crate::error::TrajectoryError;

/// Divisors applied to stored positions and velocities.
///
/// Internal simulation units are converted back to the units of the field
/// data by dividing on write (and multiplying on read).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputScale {
    /// Divisor for `x, y, z`.
    #[serde(default = "unit")]
    pub length: f64,
    /// Divisor for `vx, vy, vz`.
    #[serde(default = "unit")]
    pub velocity: f64,
}

fn unit() -> f64 {
    1.0
}

impl OutputScale {
    /// No rescaling.
    pub const UNIT: Self = Self {
        length: 1.0,
        velocity: 1.0,
    };

    /// Divisor for component `k` (0..6) of a particle row.
    pub fn divisor(&self, k: usize) -> f64 {
        if k < 3 {
            self.length
        } else {
            self.velocity
        }
    }
}

impl Default for OutputScale {
    fn default() -> Self {
        Self::UNIT
    }
}

/// Append-only sequence of frames, starting with the initial condition.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    frames: Vec<ParticleState>,
}

impl Trajectory {
    /// Start a trajectory from its initial condition.
    pub fn new(initial: ParticleState) -> Self {
        Self {
            frames: vec![initial],
        }
    }

    /// Append a frame with the same particle count as the initial one.
    pub fn push(&mut self, frame: ParticleState) -> Result<(), TrajectoryError> {
        let expected = self.particle_count();
        if frame.len() != expected {
            return Err(TrajectoryError::ParticleCountMismatch {
                expected,
                found: frame.len(),
            });
        }
        self.frames.push(frame);
        Ok(())
    }

    /// Number of frames, initial condition included.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always `false`: a trajectory holds at least its initial frame.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Particles per frame.
    pub fn particle_count(&self) -> usize {
        self.frames[0].len()
    }

    /// The initial condition.
    pub fn initial(&self) -> &ParticleState {
        &self.frames[0]
    }

    /// The most recent frame.
    pub fn last(&self) -> &ParticleState {
        &self.frames[self.frames.len() - 1]
    }

    /// All frames in time order.
    pub fn frames(&self) -> &[ParticleState] {
        &self.frames
    }
}
