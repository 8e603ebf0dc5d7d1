//! Particle tracing through time-dependent PIC fields.
//!
//! A [`Tracer`] owns a [`FieldStore`](picpt_field::FieldStore) and a set of
//! particles. It walks the snapshot brackets implied by the run's time
//! interval ([`BracketSchedule`]), installs each bracket once, and advances
//! every particle with the Boris method ([`boris_push`]) at each step.
//!
//! A run ends normally when the time interval or the recorded snapshots are
//! used up, or when a particle leaves the [`EscapeBounds`] box or the
//! interpolation interior. The trajectory recorded so far is returned in
//! every case; see [`StopReason`].
//!
//! Runs are usually described by a JSON [`TracerConfig`]:
//!
//! ```no_run
//! use std::path::Path;
//! use picpt_tracer::{Tracer, TracerConfig};
//!
//! let config = TracerConfig::from_path(Path::new("run.json")).unwrap();
//! let report = Tracer::from_config(&config).unwrap().run().unwrap();
//! println!("{:?} after {} frames", report.stop, report.trajectory.len());
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod boris;
pub mod config;
pub mod error;
pub mod escape;
pub mod init;
pub mod metrics;
pub mod schedule;
pub mod tracer;

pub use boris::boris_push;
pub use config::{OutputConfig, ParticlesConfig, RunConfig, TracerConfig};
pub use error::RunError;
pub use escape::EscapeBounds;
pub use init::{InputUnits, ParticleInit, Span};
pub use metrics::RunMetrics;
pub use schedule::{Bracket, BracketSchedule};
pub use tracer::{EscapedParticles, RunReport, StopReason, Tracer};
