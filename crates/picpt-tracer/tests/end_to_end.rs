//! Full runs over synthetic and on-disk fields.

use picpt_core::{FieldComponent, FieldError, Particle, ParticleState, SnapshotIndex};
use picpt_field::{DiskSource, FieldStore, SnapshotRange, SourceLayout};
use picpt_test_utils::fixtures::write_nasa;
use picpt_test_utils::{analytic_store, unit_geometry, AnalyticSource, ScratchDir};
use picpt_tracer::{EscapeBounds, RunConfig, RunError, StopReason, Tracer, TracerConfig};
use picpt_trajectory::{save_trajectory, OutputScale, OverwritePolicy, TrajectoryReader};

// ── Helpers ─────────────────────────────────────────────────────

fn range(first: i64, last: i64, step: i64) -> SnapshotRange {
    SnapshotRange { first, last, step }
}

fn at_rest(x: f64) -> ParticleState {
    ParticleState::from_particles(&[Particle::new([x, 0.0, 0.0], [0.0; 3])])
}

fn run(time: [f64; 2], dt: f64, escape: Option<EscapeBounds>) -> RunConfig {
    RunConfig { time, dt, escape }
}

// ── Physics ─────────────────────────────────────────────────────

#[test]
fn uniform_electric_field_accelerates_linearly() {
    let n = 100;
    let dt = 0.1;
    let store = analytic_store(
        unit_geometry(128, 16),
        AnalyticSource::uniform(0, 20, [0.0; 3], [1.0, 0.0, 0.0]),
    );
    let tracer = Tracer::new(store, range(0, 20, 5), run([0.0, 10.0], dt, None), at_rest(1.0))
        .unwrap();
    let report = tracer.run().unwrap();

    assert_eq!(report.stop, StopReason::TimeRangeExhausted);
    assert_eq!(report.metrics.steps, n);
    assert_eq!(report.trajectory.len(), n as usize + 1);
    let last = report.trajectory.last().get(0).unwrap();
    assert!((last.velocity[0] - n as f64 * dt).abs() < 1e-9);
    assert_eq!(last.velocity[1], 0.0);
    assert_eq!(last.velocity[2], 0.0);
    // x advances by v_k * dt with v_k = k * dt.
    let expect_x = 1.0 + dt * dt * (n * (n + 1) / 2) as f64;
    assert!((last.position[0] - expect_x).abs() < 1e-9);
}

#[test]
fn charge_to_mass_sign_flips_acceleration() {
    let store = FieldStore::new(
        unit_geometry(64, 16),
        -1.0,
        Box::new(AnalyticSource::uniform(0, 10, [0.0; 3], [1.0, 0.0, 0.0])),
    );
    let tracer =
        Tracer::new(store, range(0, 10, 5), run([0.0, 4.0], 0.5, None), at_rest(40.0)).unwrap();
    let report = tracer.run().unwrap();
    let last = report.trajectory.last().get(0).unwrap();
    assert!((last.velocity[0] + 4.0).abs() < 1e-12);
}

#[test]
fn backward_run_steps_down_through_brackets() {
    let store = analytic_store(
        unit_geometry(80, 16),
        AnalyticSource::uniform(0, 20, [0.0; 3], [1.0, 0.0, 0.0]),
    );
    let tracer =
        Tracer::new(store, range(0, 20, 5), run([20.0, 10.0], -0.5, None), at_rest(60.0)).unwrap();
    assert_eq!(
        tracer.first_bracket().unwrap().map(|b| (b.a, b.b)),
        Some((SnapshotIndex(20), SnapshotIndex(15)))
    );
    let report = tracer.run().unwrap();
    assert_eq!(report.stop, StopReason::TimeRangeExhausted);
    assert_eq!(report.metrics.steps, 20);
    assert_eq!(report.metrics.brackets, 2);
    assert_eq!(report.metrics.snapshots_loaded, 3);
    assert_eq!(report.metrics.snapshots_reused, 1);
    let last = report.trajectory.last().get(0).unwrap();
    assert!((last.velocity[0] + 10.0).abs() < 1e-9);
}

// ── Termination ─────────────────────────────────────────────────

#[test]
fn escape_on_step_k_records_k_frames() {
    let store = analytic_store(
        unit_geometry(32, 16),
        AnalyticSource::uniform(0, 40, [0.0; 3], [0.0; 3]),
    );
    let initial = ParticleState::from_particles(&[
        Particle::new([0.5, 0.0, 0.0], [1.0, 0.0, 0.0]),
        Particle::new([0.5, 0.0, 1.0], [0.0, 0.0, 0.0]),
    ]);
    let bounds = EscapeBounds {
        x: [0.0, 10.0],
        z: [-5.0, 5.0],
    };
    let tracer = Tracer::new(store, range(0, 40, 10), run([0.0, 40.0], 1.0, Some(bounds)), initial)
        .unwrap();
    let report = tracer.run().unwrap();

    match &report.stop {
        StopReason::Escaped { step, particles } => {
            assert_eq!(*step, 10);
            assert_eq!(particles.as_slice(), &[0]);
        }
        other => panic!("expected Escaped, got {other:?}"),
    }
    assert_eq!(report.trajectory.len(), 10);
    let last = report.trajectory.last().get(0).unwrap();
    assert!((last.position[0] - 9.5).abs() < 1e-12);
}

#[test]
fn leaving_interpolation_interior_is_an_escape() {
    let store = analytic_store(
        unit_geometry(8, 8),
        AnalyticSource::uniform(0, 40, [0.0; 3], [0.0; 3]),
    );
    // Interior in x is [0, 6): positions 0.5, 2.5, 4.5 are fine, 6.5 is not.
    let initial = ParticleState::from_particles(&[Particle::new([0.5, 0.0, 0.0], [2.0, 0.0, 0.0])]);
    let tracer = Tracer::new(store, range(0, 40, 10), run([0.0, 40.0], 1.0, None), initial).unwrap();
    let report = tracer.run().unwrap();
    match &report.stop {
        StopReason::Escaped { step, particles } => {
            assert_eq!(*step, 4);
            assert_eq!(particles.as_slice(), &[0]);
        }
        other => panic!("expected Escaped, got {other:?}"),
    }
    assert_eq!(report.trajectory.len(), 4);
}

#[test]
fn running_past_recorded_snapshots_exhausts_brackets() {
    let store = analytic_store(
        unit_geometry(32, 16),
        AnalyticSource::uniform(0, 10, [0.0; 3], [0.0; 3]),
    );
    let tracer =
        Tracer::new(store, range(0, 10, 5), run([0.0, 100.0], 1.0, None), at_rest(1.0)).unwrap();
    let report = tracer.run().unwrap();
    assert_eq!(report.stop, StopReason::BracketsExhausted);
    assert_eq!(report.metrics.steps, 11);
    assert_eq!(report.trajectory.len(), 12);
}

// ── Failures ────────────────────────────────────────────────────

#[test]
fn missing_snapshot_file_aborts_the_run() {
    let dir = ScratchDir::new("tracer-missing").unwrap();
    let geometry = unit_geometry(16, 16);
    for t in [0, 5] {
        write_nasa(dir.path(), &geometry, 4, SnapshotIndex(t), |_, _, _, _| 0.0).unwrap();
    }
    let store = FieldStore::new(
        geometry.clone(),
        1.0,
        Box::new(DiskSource::new(dir.path(), SourceLayout::nasa(), &geometry)),
    );
    let tracer =
        Tracer::new(store, range(0, 10, 5), run([0.0, 10.0], 1.0, None), at_rest(1.0)).unwrap();
    match tracer.run() {
        Err(RunError::Field(FieldError::FileNotFound { path })) => {
            assert_eq!(path, dir.join("fields-00010.dat"));
        }
        other => panic!("expected FileNotFound, got {other:?}"),
    }
}

fn config_json(dir: &std::path::Path, dt: f64, out: &std::path::Path) -> String {
    format!(
        r#"{{
            "field": {{
                "path": {dir:?},
                "layout": {{ "kind": "nasa" }},
                "geometry": {{ "nx": 24, "nz": 12, "Lx": 23.0, "Lz": 11.0 }},
                "charge_to_mass": 1.0,
                "snapshots": {{ "first": 0, "last": 10, "step": 5 }}
            }},
            "run": {{ "time": [0.0, 10.0], "dt": {dt} }},
            "particles": {{
                "distribution": {{
                    "kind": "lattice",
                    "position": [1.0, 0.0, 0.0],
                    "vx": {{ "min": 0.0, "max": 0.5, "count": 2 }},
                    "vy": {{ "min": 0.0, "max": 0.0, "count": 1 }},
                    "vz": {{ "min": -0.25, "max": 0.25, "count": 3 }}
                }}
            }},
            "output": {{ "path": {out:?}, "scale": {{ "length": 2.0, "velocity": 1.0 }} }}
        }}"#
    )
}

#[test]
fn invalid_config_rejected_before_any_io() {
    // The field directory does not exist; a parameter error must win.
    let json = config_json(
        std::path::Path::new("/nonexistent/picpt-field"),
        -1.0,
        std::path::Path::new("out.dat"),
    );
    let config = TracerConfig::from_json_str(&json).unwrap();
    match Tracer::from_config(&config) {
        Err(RunError::Parameter(e)) => assert_eq!(e.parameter, "run.dt"),
        other => panic!("expected Parameter, got {other:?}"),
    }
}

#[test]
fn configured_run_writes_readable_trajectory() {
    let dir = ScratchDir::new("tracer-config").unwrap();
    let config_json = config_json(dir.path(), 0.5, &dir.join("orbit.dat"));
    let config = TracerConfig::from_json_str(&config_json).unwrap();
    let geometry = config.field.geometry.clone();
    for t in [0, 5, 10] {
        write_nasa(dir.path(), &geometry, 4, SnapshotIndex(t), |_, c, _, _| {
            if c == FieldComponent::Ey {
                0.5
            } else {
                0.0
            }
        })
        .unwrap();
    }

    let report = Tracer::from_config(&config).unwrap().run().unwrap();
    assert_eq!(report.stop, StopReason::TimeRangeExhausted);
    assert_eq!(report.trajectory.particle_count(), 6);
    assert_eq!(report.trajectory.len(), 21);
    assert_eq!(report.metrics.snapshots_loaded, 3);

    save_trajectory(
        &config.output.path,
        &report.trajectory,
        &config.output.scale,
        &mut OverwritePolicy::Never,
    )
    .unwrap();
    let file = std::fs::File::open(&config.output.path).unwrap();
    let mut reader = TrajectoryReader::open(std::io::BufReader::new(file)).unwrap();
    assert_eq!(reader.particles(), 6);
    assert_eq!(reader.frames_declared(), 21);
    let first = reader.next_frame().unwrap().unwrap();
    // x stored in half units.
    assert_eq!(first[0], 0.5);
    let back = reader.frames().count();
    assert_eq!(back, 20);

    let restored = TrajectoryReader::open(std::fs::File::open(&config.output.path).unwrap())
        .unwrap()
        .read_trajectory(&config.output.scale)
        .unwrap();
    let vy = restored.last().get(5).unwrap().velocity[1];
    assert!((vy - 5.0).abs() < 1e-5, "vy = {vy}");
    assert_eq!(config.output.scale, OutputScale { length: 2.0, velocity: 1.0 });
}
