//! Particle trajectories and their on-disk format.
//!
//! A [`Trajectory`] is the append-only list of [`ParticleState`] frames a
//! run produces, starting with the initial condition. At the end of a run
//! it is written with [`save_trajectory`] (or a [`TrajectoryWriter`] on any
//! `Write` sink) and can be read back with [`TrajectoryReader`].
//!
//! # Format
//!
//! ```text
//! "<Np> <numFrames>\n"                      ASCII header
//! [frame 0] [frame 1] ... [frame numFrames-1]
//! frame = Np × (x y z vx vy vz)             little-endian f32
//! ```
//!
//! Stored values are divided by an [`OutputScale`] on write.
//!
//! [`ParticleState`]: picpt_core::ParticleState

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod reader;
pub mod save;
pub mod types;
pub mod writer;

pub use error::TrajectoryError;
pub use reader::{FrameIter, TrajectoryReader};
pub use save::{encode_trajectory, save_trajectory, ConfirmOverwrite, OverwritePolicy};
pub use types::{OutputScale, Trajectory};
pub use writer::TrajectoryWriter;

/// Longest header line accepted by the reader, newline included.
pub const MAX_HEADER_LEN: usize = 64;
