//! Bounding box a particle must stay inside.

use serde::{Deserialize, Serialize};

use picpt_core::{ParameterError, Particle};

/// Closed `x` and `z` ranges. `y` is the invariant direction and is never
/// bounded.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EscapeBounds {
    /// `[x_min, x_max]`.
    pub x: [f64; 2],
    /// `[z_min, z_max]`.
    pub z: [f64; 2],
}

impl EscapeBounds {
    /// Whether `particle` is inside the box.
    pub fn contains(&self, particle: &Particle) -> bool {
        let [x, _, z] = particle.position;
        x >= self.x[0] && x <= self.x[1] && z >= self.z[0] && z <= self.z[1]
    }

    /// Check both ranges are finite and ordered.
    pub fn validate(&self) -> Result<(), ParameterError> {
        for (name, [lo, hi]) in [("run.escape.x", self.x), ("run.escape.z", self.z)] {
            if !lo.is_finite() || !hi.is_finite() || lo >= hi {
                return Err(ParameterError::new(
                    name,
                    format!("expected finite min < max, got [{lo}, {hi}]"),
                ));
            }
        }
        Ok(())
    }
}
