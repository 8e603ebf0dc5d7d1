//! The run loop: brackets, Boris pushes, escape detection.

use std::time::Instant;

use smallvec::SmallVec;

use picpt_core::{FieldSample, Particle, ParticleState};
use picpt_field::{FieldStore, LoadStats, SnapshotRange};
use picpt_trajectory::Trajectory;

use crate::boris::boris_push;
use crate::config::{RunConfig, TracerConfig};
use crate::error::RunError;
use crate::metrics::RunMetrics;
use crate::schedule::{Bracket, BracketSchedule};

/// Indices of the particles that left the domain on one step.
pub type EscapedParticles = SmallVec<[usize; 4]>;

/// Why a run ended. Every variant is a normal outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The requested time interval was fully integrated.
    TimeRangeExhausted,
    /// No recorded bracket covers the next step.
    BracketsExhausted,
    /// One or more particles left the escape box or the interpolation
    /// interior. The frame of that step was not recorded.
    Escaped {
        /// 1-based step on which the escape happened.
        step: u64,
        /// Particles that escaped, in index order.
        particles: EscapedParticles,
    },
}

/// Outcome of [`Tracer::run`].
#[derive(Debug)]
pub struct RunReport {
    /// Recorded frames, starting with the initial condition.
    pub trajectory: Trajectory,
    /// Why the run ended.
    pub stop: StopReason,
    /// Counters for the run.
    pub metrics: RunMetrics,
}

enum StepOutcome {
    Recorded,
    Escaped(EscapedParticles),
}

/// Integrates a set of particles through a time-dependent field.
///
/// The tracer owns its [`FieldStore`] and walks the [`BracketSchedule`]
/// implied by the run configuration: each bracket is installed once, then
/// every step inside it blends the two snapshots at the current time,
/// samples the field at each particle and applies [`boris_push`].
pub struct Tracer {
    store: FieldStore,
    snapshots: SnapshotRange,
    run: RunConfig,
    trajectory: Trajectory,
    current: ParticleState,
    scratch: Vec<FieldSample>,
}

impl Tracer {
    /// Build a tracer from its parts.
    ///
    /// `run` is validated against `snapshots`; `initial` must hold at least
    /// one particle.
    pub fn new(
        store: FieldStore,
        snapshots: SnapshotRange,
        run: RunConfig,
        initial: ParticleState,
    ) -> Result<Self, RunError> {
        snapshots.validate()?;
        run.validate(&snapshots)?;
        if initial.is_empty() {
            return Err(picpt_core::ParameterError::new(
                "particles",
                "initial state holds no particles",
            )
            .into());
        }
        Ok(Self {
            store,
            snapshots,
            run,
            trajectory: Trajectory::new(initial.clone()),
            scratch: Vec::with_capacity(initial.len()),
            current: initial,
        })
    }

    /// Validate `config`, open its field store and build the initial
    /// particles.
    ///
    /// Configuration errors are reported before any file is opened.
    pub fn from_config(config: &TracerConfig) -> Result<Self, RunError> {
        config.validate()?;
        let initial = config
            .particles
            .distribution
            .build(&config.particles.units)?;
        let store = FieldStore::from_config(&config.field)?;
        log::info!(
            "tracing {} particle(s) from t = {} to t = {} with dt = {}",
            initial.len(),
            config.run.t_begin(),
            config.run.t_end(),
            config.run.dt
        );
        Self::new(store, config.field.snapshots, config.run.clone(), initial)
    }

    /// The field store.
    pub fn store(&self) -> &FieldStore {
        &self.store
    }

    /// Mutable access to the field store.
    pub fn store_mut(&mut self) -> &mut FieldStore {
        &mut self.store
    }

    /// The run parameters.
    pub fn run_config(&self) -> &RunConfig {
        &self.run
    }

    /// The first bracket the run will install, if any.
    pub fn first_bracket(&self) -> Result<Option<Bracket>, RunError> {
        Ok(self.schedule()?.next())
    }

    fn schedule(&self) -> Result<BracketSchedule, RunError> {
        Ok(BracketSchedule::new(
            self.snapshots,
            self.run.t_begin(),
            self.run.dt,
        )?)
    }

    /// Integrate until the time interval, the recorded brackets or the
    /// domain run out.
    ///
    /// A field error other than leaving the interpolation interior (for
    /// example a missing snapshot file) aborts the run.
    pub fn run(mut self) -> Result<RunReport, RunError> {
        let stats_before = self.store.stats().clone();
        let max_steps = self.run.max_steps();
        let mut steps: u64 = 0;
        let mut push_us: u64 = 0;

        let stop = 'brackets: {
            for bracket in self.schedule()? {
                if steps == max_steps {
                    break 'brackets StopReason::TimeRangeExhausted;
                }
                if !bracket.covers(self.run.time_at(steps)) {
                    continue;
                }
                self.store.update(bracket.a, bracket.b)?;
                let entered = steps;

                while steps < max_steps {
                    let t = self.run.time_at(steps);
                    if !bracket.covers(t) {
                        break;
                    }
                    let start = Instant::now();
                    let outcome = self.step(t)?;
                    push_us += start.elapsed().as_micros() as u64;
                    steps += 1;
                    if let StepOutcome::Escaped(particles) = outcome {
                        log::info!(
                            "particle(s) {particles:?} escaped on step {steps} at t = {t}"
                        );
                        break 'brackets StopReason::Escaped {
                            step: steps,
                            particles,
                        };
                    }
                }
                log::debug!("bracket {bracket}: {} step(s)", steps - entered);
            }
            if steps == max_steps {
                StopReason::TimeRangeExhausted
            } else {
                StopReason::BracketsExhausted
            }
        };

        let metrics = self.metrics(&stats_before, steps, push_us);
        log::info!(
            "run finished: {stop:?} after {} step(s), {} frame(s), {} snapshot(s) loaded",
            metrics.steps,
            self.trajectory.len(),
            metrics.snapshots_loaded
        );
        Ok(RunReport {
            trajectory: self.trajectory,
            stop,
            metrics,
        })
    }

    /// One push of every particle from time `t`.
    ///
    /// The new frame is recorded only if no particle escaped.
    fn step(&mut self, t: f64) -> Result<StepOutcome, RunError> {
        self.store.set_time(t)?;

        let mut escaped = EscapedParticles::new();
        self.scratch.clear();
        for (i, p) in self.current.iter().enumerate() {
            match self.store.query_at(p.position) {
                Ok(field) => self.scratch.push(field),
                Err(e) if e.is_out_of_domain() => {
                    escaped.push(i);
                    self.scratch.push(FieldSample::ZERO);
                }
                Err(e) => return Err(e.into()),
            }
        }
        if !escaped.is_empty() {
            return Ok(StepOutcome::Escaped(escaped));
        }

        let dt = self.run.dt;
        let next: ParticleState = self
            .current
            .iter()
            .zip(&self.scratch)
            .map(|(p, field)| boris_push(p, field, dt))
            .collect();

        if let Some(bounds) = &self.run.escape {
            escaped.extend(
                next.iter()
                    .enumerate()
                    .filter(|(_, p): &(usize, Particle)| !bounds.contains(p))
                    .map(|(i, _)| i),
            );
            if !escaped.is_empty() {
                return Ok(StepOutcome::Escaped(escaped));
            }
        }

        self.trajectory.push(next.clone())?;
        self.current = next;
        Ok(StepOutcome::Recorded)
    }

    fn metrics(&self, before: &LoadStats, steps: u64, push_us: u64) -> RunMetrics {
        let after = self.store.stats();
        RunMetrics {
            brackets: after.brackets - before.brackets,
            snapshots_loaded: after.snapshots_loaded - before.snapshots_loaded,
            snapshots_reused: after.snapshots_reused - before.snapshots_reused,
            steps,
            load_us: after.load_us - before.load_us,
            push_us,
        }
    }
}

impl std::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracer")
            .field("store", &self.store)
            .field("snapshots", &self.snapshots)
            .field("run", &self.run)
            .field("particles", &self.current.len())
            .field("frames", &self.trajectory.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use picpt_core::{FieldComponent, Particle};
    use picpt_test_utils::{analytic_store, unit_geometry, AnalyticSource};

    fn range(first: i64, last: i64, step: i64) -> SnapshotRange {
        SnapshotRange { first, last, step }
    }

    fn single(position: [f64; 3], velocity: [f64; 3]) -> ParticleState {
        ParticleState::from_particles(&[Particle::new(position, velocity)])
    }

    fn run_config(time: [f64; 2], dt: f64) -> RunConfig {
        RunConfig {
            time,
            dt,
            escape: None,
        }
    }

    #[test]
    fn free_drift_records_every_step() {
        let store = analytic_store(
            unit_geometry(32, 16),
            AnalyticSource::uniform(0, 10, [0.0; 3], [0.0; 3]),
        );
        let tracer = Tracer::new(
            store,
            range(0, 10, 5),
            run_config([0.0, 4.0], 0.5),
            single([1.0, 0.0, 0.0], [1.0, 0.0, 0.0]),
        )
        .unwrap();
        let report = tracer.run().unwrap();
        assert_eq!(report.stop, StopReason::TimeRangeExhausted);
        assert_eq!(report.metrics.steps, 8);
        assert_eq!(report.trajectory.len(), 9);
        assert!((report.trajectory.last().get(0).unwrap().position[0] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn empty_initial_state_rejected() {
        let store = analytic_store(
            unit_geometry(8, 8),
            AnalyticSource::uniform(0, 10, [0.0; 3], [0.0; 3]),
        );
        match Tracer::new(
            store,
            range(0, 10, 5),
            run_config([0.0, 4.0], 0.5),
            ParticleState::from_particles(&[]),
        ) {
            Err(RunError::Parameter(e)) => assert_eq!(e.parameter, "particles"),
            other => panic!("expected Parameter, got {other:?}"),
        }
    }

    #[test]
    fn bracket_boundary_steps_use_both_snapshots() {
        // Ey equals the snapshot index, so the sampled field tracks time.
        // y is unbounded, so the particle never leaves the interior.
        let source = AnalyticSource::new(0, 20, |t, c, _, _| {
            if c == FieldComponent::Ey {
                t.0 as f32
            } else {
                0.0
            }
        });
        let tracer = Tracer::new(
            analytic_store(unit_geometry(64, 16), source),
            range(0, 20, 10),
            run_config([0.0, 20.0], 1.0),
            single([1.0, 0.0, 0.0], [0.0; 3]),
        )
        .unwrap();
        let report = tracer.run().unwrap();
        assert_eq!(report.stop, StopReason::TimeRangeExhausted);
        assert_eq!(report.metrics.brackets, 2);
        assert_eq!(report.metrics.snapshots_loaded, 3);
        assert_eq!(report.metrics.snapshots_reused, 1);
        // v = sum of E(t) * dt over t = 0..19 with E(t) = t.
        let vy = report.trajectory.last().get(0).unwrap().velocity[1];
        assert!((vy - 190.0).abs() < 1e-9, "vy = {vy}");
    }
}
