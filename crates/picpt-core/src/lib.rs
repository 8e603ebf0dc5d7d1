//! Core types for the picpt particle tracer.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! vocabulary shared by the grid, field, trajectory and tracer crates:
//! field components and their staggering, sampled field vectors, particle
//! state frames, snapshot indices, and the cross-crate error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod field;
pub mod id;
pub mod particle;

pub use error::{FieldError, ParameterError};
pub use field::{FieldComponent, FieldSample, FieldSelector, Stagger};
pub use id::SnapshotIndex;
pub use particle::{Particle, ParticleState, STATE_WIDTH};
