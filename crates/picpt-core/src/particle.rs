//! Particle state frames.
//!
//! A [`ParticleState`] is one frame of a trajectory: `N` particles stored
//! as a flat `N × 6` buffer of `(x, y, z, vx, vy, vz)`. Frames are
//! immutable once built; each time step produces a new frame.

use crate::error::ParameterError;

/// Number of `f64` values per particle in a flat state buffer.
pub const STATE_WIDTH: usize = 6;

/// Position and velocity of a single particle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Particle {
    /// Position `(x, y, z)`.
    pub position: [f64; 3],
    /// Velocity `(vx, vy, vz)`.
    pub velocity: [f64; 3],
}

impl Particle {
    /// Create a particle.
    pub fn new(position: [f64; 3], velocity: [f64; 3]) -> Self {
        Self { position, velocity }
    }

    /// Magnitude of the velocity.
    pub fn speed(&self) -> f64 {
        self.velocity.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    fn from_row(row: &[f64]) -> Self {
        Self {
            position: [row[0], row[1], row[2]],
            velocity: [row[3], row[4], row[5]],
        }
    }
}

/// One immutable frame of `N` particles.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleState {
    data: Box<[f64]>,
}

impl ParticleState {
    /// Build a frame from individual particles.
    pub fn from_particles(particles: &[Particle]) -> Self {
        particles.iter().copied().collect()
    }

    /// Build a frame from a flat `N × 6` buffer.
    ///
    /// Fails if the buffer length is not a multiple of [`STATE_WIDTH`].
    pub fn from_flat(data: Vec<f64>) -> Result<Self, ParameterError> {
        if data.len() % STATE_WIDTH != 0 {
            return Err(ParameterError::new(
                "particles",
                format!(
                    "flat state length {} is not a multiple of {STATE_WIDTH}",
                    data.len()
                ),
            ));
        }
        Ok(Self {
            data: data.into_boxed_slice(),
        })
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.data.len() / STATE_WIDTH
    }

    /// Whether the frame holds no particles.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The `i`-th particle, or `None` if out of range.
    pub fn get(&self, i: usize) -> Option<Particle> {
        let start = i.checked_mul(STATE_WIDTH)?;
        self.data
            .get(start..start + STATE_WIDTH)
            .map(Particle::from_row)
    }

    /// Iterate over the particles in order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Particle> + '_ {
        self.data.chunks_exact(STATE_WIDTH).map(Particle::from_row)
    }

    /// The flat `N × 6` buffer.
    pub fn as_flat(&self) -> &[f64] {
        &self.data
    }
}

impl FromIterator<Particle> for ParticleState {
    fn from_iter<I: IntoIterator<Item = Particle>>(iter: I) -> Self {
        let data: Vec<f64> = iter
            .into_iter()
            .flat_map(|p| p.position.into_iter().chain(p.velocity))
            .collect();
        Self {
            data: data.into_boxed_slice(),
        }
    }
}
