//! Field snapshots and the interpolating field store.
//!
//! A [`FieldStore`] holds two [`FieldSnapshot`]s bracketing the current
//! simulated time. It loads them through a [`SnapshotSource`] (normally a
//! [`DiskSource`] reading one of the two supported [`SourceLayout`]s),
//! blends them linearly in time, and samples them at arbitrary positions
//! with staggered bilinear interpolation.
//!
//! ```text
//! FieldConfig ──▶ DiskSource ──load──▶ FieldSnapshot "a" ┐
//!                                     FieldSnapshot "b" ┤─▶ FieldStore::query_at
//!                           set_time(t) ─▶ (wa, wb) ─────┘
//! ```
//!
//! This crate is one of two that may contain `unsafe` code (along with
//! `picpt-grid`). It is confined to the `interp` module, which reads grid
//! samples unchecked after the stencil has passed the interior check.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod config;
pub mod geometry;
pub mod info;
pub mod interp;
pub mod layout;
pub mod snapshot;
pub mod source;
pub mod store;

pub use config::{FieldConfig, SnapshotRange};
pub use geometry::GridGeometry;
pub use info::{check_lanl_info, read_lanl_info, LanlInfo};
pub use interp::Stencil;
pub use layout::{ComponentFiles, DiskSource, SourceLayout};
pub use snapshot::FieldSnapshot;
pub use source::SnapshotSource;
pub use store::{FieldStore, LoadStats};
