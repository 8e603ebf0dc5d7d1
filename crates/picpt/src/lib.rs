//! picpt: charged test-particle tracing through particle-in-cell fields.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all picpt sub-crates, plus the pieces of the `picpt` command-line tool.
//!
//! # Quick start
//!
//! ```rust
//! use picpt::prelude::*;
//! use picpt_test_utils::{analytic_store, unit_geometry, AnalyticSource};
//!
//! // Uniform Ex = 1 over snapshots 0..=10; unit charge-to-mass.
//! let source = AnalyticSource::uniform(0, 10, [0.0; 3], [1.0, 0.0, 0.0]);
//! let store = analytic_store(unit_geometry(32, 16), source);
//! let run = RunConfig { time: [0.0, 2.0], dt: 0.5, escape: None };
//! let initial = ParticleState::from_particles(&[Particle::new([1.0, 0.0, 0.0], [0.0; 3])]);
//! let snapshots = SnapshotRange { first: 0, last: 10, step: 5 };
//!
//! let report = Tracer::new(store, snapshots, run, initial).unwrap().run().unwrap();
//! assert_eq!(report.stop, StopReason::TimeRangeExhausted);
//! assert_eq!(report.trajectory.len(), 5);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `picpt-core` | field components, particles, snapshot indices, shared errors |
//! | [`grid`] | `picpt-grid` | shared 2D grid handles |
//! | [`field`] | `picpt-field` | snapshot loading, interpolation, the field store |
//! | [`trajectory`] | `picpt-trajectory` | trajectory frames and the output format |
//! | [`tracer`] | `picpt-tracer` | Boris push, bracket stepping, run configuration |
//! | [`cli`] | this crate | argument parsing and field summaries for the binary |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cli;

/// Core types and shared errors (`picpt-core`).
pub use picpt_core as types;

/// Reference-counted 2D grids (`picpt-grid`).
///
/// [`grid::Grid2D`] handles share one buffer; use
/// [`grid::Grid2D::deep_clone`] for an independent copy.
pub use picpt_grid as grid;

/// Field snapshots and spatio-temporal interpolation (`picpt-field`).
///
/// [`field::FieldStore`] is the entry point; snapshots come from any
/// [`field::SnapshotSource`], usually a [`field::DiskSource`].
pub use picpt_field as field;

/// Trajectories and their on-disk format (`picpt-trajectory`).
pub use picpt_trajectory as trajectory;

/// The particle pusher and run loop (`picpt-tracer`).
pub use picpt_tracer as tracer;

/// Common imports for typical picpt usage.
///
/// ```rust
/// use picpt::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use picpt_core::{
        FieldComponent, FieldSample, FieldSelector, Particle, ParticleState, SnapshotIndex,
    };

    // Errors
    pub use picpt_core::{FieldError, ParameterError};
    pub use picpt_trajectory::TrajectoryError;
    pub use picpt_tracer::RunError;

    // Grid
    pub use picpt_grid::Grid2D;

    // Field
    pub use picpt_field::{
        DiskSource, FieldConfig, FieldStore, GridGeometry, SnapshotRange, SnapshotSource,
        SourceLayout,
    };

    // Trajectory
    pub use picpt_trajectory::{
        save_trajectory, OutputScale, OverwritePolicy, Trajectory, TrajectoryReader,
    };

    // Tracer
    pub use picpt_tracer::{
        EscapeBounds, RunConfig, RunMetrics, RunReport, StopReason, Tracer, TracerConfig,
    };
}
