//! Benchmark profiles for the picpt particle tracer.
//!
//! - [`reference_store`]: a 322x130 grid (the size of a typical 2D
//!   reconnection run) over a smooth analytic field
//! - [`particle_cloud`]: a seeded random velocity cloud around the X-line
//! - [`reference_run`]: a run configuration over the reference snapshots

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use picpt_core::{FieldComponent, ParticleState, SnapshotIndex};
use picpt_field::{FieldStore, GridGeometry, SnapshotRange};
use picpt_test_utils::AnalyticSource;
use picpt_tracer::{EscapeBounds, InputUnits, ParticleInit, RunConfig};

/// Columns of the reference grid.
pub const REFERENCE_NX: usize = 322;
/// Rows of the reference grid.
pub const REFERENCE_NZ: usize = 130;

/// Snapshots `0, 25, ..., 500` of the reference field.
pub fn reference_snapshots() -> SnapshotRange {
    SnapshotRange {
        first: 0,
        last: 500,
        step: 25,
    }
}

/// Harris-sheet-like analytic field: `Bx` reverses across `z = 0`, a weak
/// guide field in `By`, and a slowly growing reconnection `Ey`.
pub fn reference_store() -> FieldStore {
    let geometry = GridGeometry::new(REFERENCE_NX, REFERENCE_NZ, 320.0, 128.0);
    let mid = (REFERENCE_NZ / 2) as f32;
    let source = AnalyticSource::new(0, 500, move |t: SnapshotIndex, c, r, col| {
        let z = (r as f32 - mid) / 8.0;
        let x = col as f32 / REFERENCE_NX as f32;
        match c {
            FieldComponent::Bx => z.tanh(),
            FieldComponent::By => 0.1,
            FieldComponent::Bz => 0.05 * (std::f32::consts::TAU * x).sin(),
            FieldComponent::Ey => 0.001 * t.0 as f32 / 500.0,
            FieldComponent::Ex | FieldComponent::Ez => 0.0,
        }
    });
    FieldStore::new(geometry, -1.0, Box::new(source))
}

/// `count` particles near the X-line with velocities drawn from `seed`.
pub fn particle_cloud(count: usize, seed: u64) -> ParticleState {
    let init = ParticleInit::Random {
        position: [160.0, 0.0, 0.0],
        vx: [-0.5, 0.5],
        vy: [-0.5, 0.5],
        vz: [-0.5, 0.5],
        count,
        seed,
    };
    init.build(&InputUnits::default()).unwrap()
}

/// Forward run over `[t_begin, t_begin + steps * dt]` inside the reference box.
pub fn reference_run(t_begin: f64, steps: u64, dt: f64) -> RunConfig {
    RunConfig {
        time: [t_begin, t_begin + steps as f64 * dt],
        dt,
        escape: Some(EscapeBounds {
            x: [0.0, 320.0],
            z: [-64.0, 64.0],
        }),
    }
}
