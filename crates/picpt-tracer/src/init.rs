//! Initial particle distributions.
//!
//! All distributions share one starting position; they differ in how the
//! velocities are laid out:
//!
//! - [`ParticleInit::Single`]: one particle.
//! - [`ParticleInit::Lattice`]: a regular grid in velocity space.
//! - [`ParticleInit::Random`]: a uniform cloud drawn from a seeded
//!   ChaCha8 stream, so runs are reproducible.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use picpt_core::{ParameterError, Particle, ParticleState};

/// Multipliers turning configured values into simulation units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputUnits {
    /// Multiplier for positions.
    #[serde(default = "unit")]
    pub length: f64,
    /// Multiplier for velocities.
    #[serde(default = "unit")]
    pub velocity: f64,
}

fn unit() -> f64 {
    1.0
}

impl Default for InputUnits {
    fn default() -> Self {
        Self {
            length: 1.0,
            velocity: 1.0,
        }
    }
}

/// Evenly spaced values `min ..= max` (`count` of them).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// First value.
    pub min: f64,
    /// Last value (ignored when `count == 1`).
    pub max: f64,
    /// Number of values.
    pub count: usize,
}

impl Span {
    /// A single value.
    pub fn fixed(v: f64) -> Self {
        Self {
            min: v,
            max: v,
            count: 1,
        }
    }

    /// The `i`-th value.
    pub fn value(&self, i: usize) -> f64 {
        if self.count <= 1 {
            return self.min;
        }
        self.min + (self.max - self.min) * i as f64 / (self.count - 1) as f64
    }

    fn validate(&self, name: &str) -> Result<(), ParameterError> {
        if self.count == 0 {
            return Err(ParameterError::new(name, "count must be at least 1"));
        }
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(ParameterError::new(
                name,
                format!("bounds must be finite, got [{}, {}]", self.min, self.max),
            ));
        }
        Ok(())
    }
}

/// How the initial particles are laid out.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ParticleInit {
    /// One particle.
    Single {
        /// Starting position.
        position: [f64; 3],
        /// Starting velocity.
        velocity: [f64; 3],
    },
    /// Every combination of `vx × vy × vz`, `vz` varying fastest.
    Lattice {
        /// Shared starting position.
        position: [f64; 3],
        /// `vx` values.
        vx: Span,
        /// `vy` values.
        vy: Span,
        /// `vz` values.
        vz: Span,
    },
    /// `count` velocities drawn uniformly from the given `[min, max]` ranges.
    Random {
        /// Shared starting position.
        position: [f64; 3],
        /// `vx` range.
        vx: [f64; 2],
        /// `vy` range.
        vy: [f64; 2],
        /// `vz` range.
        vz: [f64; 2],
        /// Number of particles.
        count: usize,
        /// Seed for the ChaCha8 stream.
        seed: u64,
    },
}

impl ParticleInit {
    /// Name of the distribution, as written in configuration.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Single { .. } => "single",
            Self::Lattice { .. } => "lattice",
            Self::Random { .. } => "random",
        }
    }

    /// Number of particles the distribution produces.
    pub fn count(&self) -> usize {
        match self {
            Self::Single { .. } => 1,
            Self::Lattice { vx, vy, vz, .. } => vx.count * vy.count * vz.count,
            Self::Random { count, .. } => *count,
        }
    }

    /// Check the distribution produces at least one finite particle.
    pub fn validate(&self) -> Result<(), ParameterError> {
        let finite = |name: &str, v: &[f64]| {
            if v.iter().all(|x| x.is_finite()) {
                Ok(())
            } else {
                Err(ParameterError::new(name, format!("must be finite, got {v:?}")))
            }
        };
        match self {
            Self::Single { position, velocity } => {
                finite("particles.distribution.position", position)?;
                finite("particles.distribution.velocity", velocity)?;
            }
            Self::Lattice {
                position,
                vx,
                vy,
                vz,
            } => {
                finite("particles.distribution.position", position)?;
                vx.validate("particles.distribution.vx")?;
                vy.validate("particles.distribution.vy")?;
                vz.validate("particles.distribution.vz")?;
            }
            Self::Random {
                position,
                vx,
                vy,
                vz,
                count,
                ..
            } => {
                finite("particles.distribution.position", position)?;
                for (name, [lo, hi]) in [
                    ("particles.distribution.vx", vx),
                    ("particles.distribution.vy", vy),
                    ("particles.distribution.vz", vz),
                ] {
                    finite(name, &[*lo, *hi])?;
                    if lo > hi {
                        return Err(ParameterError::new(
                            name,
                            format!("min {lo} exceeds max {hi}"),
                        ));
                    }
                }
                if *count == 0 {
                    return Err(ParameterError::new(
                        "particles.distribution.count",
                        "must be at least 1",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Build the initial frame, applying `units`.
    pub fn build(&self, units: &InputUnits) -> Result<ParticleState, ParameterError> {
        self.validate()?;
        let place = |p: [f64; 3]| p.map(|v| v * units.length);
        let speed = |v: [f64; 3]| v.map(|c| c * units.velocity);
        let state = match self {
            Self::Single { position, velocity } => {
                ParticleState::from_particles(&[Particle::new(place(*position), speed(*velocity))])
            }
            Self::Lattice {
                position,
                vx,
                vy,
                vz,
            } => {
                let origin = place(*position);
                let mut particles = Vec::with_capacity(self.count());
                for i in 0..vx.count {
                    for j in 0..vy.count {
                        for k in 0..vz.count {
                            let v = [vx.value(i), vy.value(j), vz.value(k)];
                            particles.push(Particle::new(origin, speed(v)));
                        }
                    }
                }
                ParticleState::from_particles(&particles)
            }
            Self::Random {
                position,
                vx,
                vy,
                vz,
                count,
                seed,
            } => {
                let origin = place(*position);
                let mut rng = ChaCha8Rng::seed_from_u64(*seed);
                (0..*count)
                    .map(|_| {
                        let v = [
                            rng.random_range(vx[0]..=vx[1]),
                            rng.random_range(vy[0]..=vy[1]),
                            rng.random_range(vz[0]..=vz[1]),
                        ];
                        Particle::new(origin, speed(v))
                    })
                    .collect()
            }
        };
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_applies_units() {
        let init = ParticleInit::Single {
            position: [32.0, 0.0, -0.32],
            velocity: [0.0, -3.5, 0.0],
        };
        let units = InputUnits {
            length: 5.0,
            velocity: 0.1,
        };
        let s = init.build(&units).unwrap();
        assert_eq!(s.len(), 1);
        let p = s.get(0).unwrap();
        assert_eq!(p.position[0], 160.0);
        assert!((p.position[2] + 1.6).abs() < 1e-12);
        assert!((p.velocity[1] + 0.35).abs() < 1e-12);
    }

    #[test]
    fn lattice_is_full_product_vz_fastest() {
        let init = ParticleInit::Lattice {
            position: [1.0, 2.0, 3.0],
            vx: Span {
                min: -1.0,
                max: 1.0,
                count: 3,
            },
            vy: Span::fixed(0.5),
            vz: Span {
                min: 0.0,
                max: 1.0,
                count: 2,
            },
        };
        assert_eq!(init.count(), 6);
        let s = init.build(&InputUnits::default()).unwrap();
        let v: Vec<[f64; 3]> = s.iter().map(|p| p.velocity).collect();
        assert_eq!(
            v,
            vec![
                [-1.0, 0.5, 0.0],
                [-1.0, 0.5, 1.0],
                [0.0, 0.5, 0.0],
                [0.0, 0.5, 1.0],
                [1.0, 0.5, 0.0],
                [1.0, 0.5, 1.0],
            ]
        );
        assert!(s.iter().all(|p| p.position == [1.0, 2.0, 3.0]));
    }

    #[test]
    fn random_is_seeded_and_bounded() {
        let init = ParticleInit::Random {
            position: [0.0; 3],
            vx: [-1.0, 1.0],
            vy: [2.0, 2.0],
            vz: [0.0, 0.5],
            count: 50,
            seed: 7,
        };
        let a = init.build(&InputUnits::default()).unwrap();
        let b = init.build(&InputUnits::default()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 50);
        for p in a.iter() {
            assert!((-1.0..=1.0).contains(&p.velocity[0]));
            assert_eq!(p.velocity[1], 2.0);
            assert!((0.0..=0.5).contains(&p.velocity[2]));
        }

        let other = ParticleInit::Random {
            position: [0.0; 3],
            vx: [-1.0, 1.0],
            vy: [2.0, 2.0],
            vz: [0.0, 0.5],
            count: 50,
            seed: 8,
        };
        assert_ne!(other.build(&InputUnits::default()).unwrap(), a);
    }

    #[test]
    fn empty_distributions_rejected() {
        let lattice = ParticleInit::Lattice {
            position: [0.0; 3],
            vx: Span::fixed(0.0),
            vy: Span {
                min: 0.0,
                max: 1.0,
                count: 0,
            },
            vz: Span::fixed(0.0),
        };
        match lattice.build(&InputUnits::default()) {
            Err(e) => assert_eq!(e.parameter, "particles.distribution.vy"),
            Ok(s) => panic!("expected error, got {s:?}"),
        }

        let random = ParticleInit::Random {
            position: [0.0; 3],
            vx: [0.0, 1.0],
            vy: [0.0, 1.0],
            vz: [1.0, 0.0],
            count: 3,
            seed: 0,
        };
        match random.validate() {
            Err(e) => assert_eq!(e.parameter, "particles.distribution.vz"),
            Ok(()) => panic!("expected error for inverted vz"),
        }
    }

    #[test]
    fn deserializes_tagged() {
        let init: ParticleInit = serde_json::from_str(
            r#"{"kind": "single", "position": [1, 2, 3], "velocity": [0, 0, 1]}"#,
        )
        .unwrap();
        assert_eq!(init.kind(), "single");
        assert_eq!(init.count(), 1);
    }
}
