//! Shared two-dimensional sample grids.
//!
//! [`Grid2D`] is a handle to a rectangular `rows × cols` buffer stored in
//! one contiguous allocation. Cloning a handle shares the buffer instead
//! of copying it; the buffer is released when the last handle goes away.
//! [`Grid2D::deep_clone`] is the explicit way to get an independent copy.
//!
//! ```text
//! Grid2D ──clone──▶ Grid2D        (same buffer, ref_count 2)
//!    │
//!    └──deep_clone──▶ Grid2D      (new buffer, ref_count 1)
//! ```
//!
//! Element access goes through a [`GridRead`] / [`GridWrite`] view, which
//! indexes rows as `view[row][col]`. Views offer checked accessors and,
//! for hot loops that have already validated their indices, an explicitly
//! `unsafe` unchecked accessor.
//!
//! This crate is one of two that may contain `unsafe` code (along with
//! `picpt-field`, which calls the unchecked accessor from its
//! interpolation kernel). Here it is confined to `raw.rs`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod error;
pub mod grid;
mod raw;
pub mod view;

pub use error::GridError;
pub use grid::{Grid2D, WeakGrid};
pub use view::{GridRead, GridWrite};
