//! Error types shared across the picpt workspace.
//!
//! [`FieldError`] covers snapshot loading and field queries; it is raised by
//! the field crate and carried through the tracer. [`ParameterError`] is the
//! single "invalid parameter" condition used by every configuration
//! validator.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::field::FieldComponent;
use crate::id::SnapshotIndex;

/// Errors from loading field snapshots or sampling the field.
#[derive(Debug)]
pub enum FieldError {
    /// A snapshot file could not be opened because it does not exist.
    FileNotFound {
        /// The path that was looked up.
        path: PathBuf,
    },
    /// An I/O error other than a missing file.
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// A snapshot file ended before the requested slice was fully read.
    ShortRead {
        /// The file being read.
        path: PathBuf,
        /// Byte offset at which the slice starts.
        offset: u64,
        /// Number of `f32` values the slice should contain.
        expected: usize,
    },
    /// A query position resolved outside the interpolation interior.
    ///
    /// This is a normal domain-escape signal for the caller, not a failure
    /// of the store itself.
    OutOfDomain {
        /// Fractional grid coordinate along x.
        fx: f64,
        /// Fractional grid coordinate along z.
        fz: f64,
    },
    /// The LANL `info` file disagrees with the configured grid geometry.
    InfoMismatch {
        /// Name of the disagreeing parameter (`nx`, `Lz`, ...).
        parameter: &'static str,
        /// Configured value.
        configured: String,
        /// Value recorded in the info file.
        recorded: String,
    },
    /// A snapshot source produced a component grid of the wrong shape.
    ShapeMismatch {
        /// The component with the bad shape.
        component: FieldComponent,
        /// Expected `(rows, cols)`.
        expected: (usize, usize),
        /// Provided `(rows, cols)`.
        found: (usize, usize),
    },
    /// The source has no snapshot recorded at this index.
    SnapshotUnavailable {
        /// The requested index.
        index: SnapshotIndex,
    },
    /// A query or time update was issued before any bracket was loaded.
    NoBracket,
    /// A bracket was requested with identical endpoints.
    DegenerateBracket {
        /// The repeated index.
        index: SnapshotIndex,
    },
    /// The grid geometry cannot back a snapshot.
    InvalidGeometry {
        /// What is wrong with it.
        reason: String,
    },
    /// A flat site index past the end of the grid.
    SiteOutOfRange {
        /// The requested site.
        site: usize,
        /// Number of sites in the grid.
        cells: usize,
    },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileNotFound { path } => write!(f, "file {} not found", path.display()),
            Self::Io { path, source } => write!(f, "I/O error on {}: {source}", path.display()),
            Self::ShortRead {
                path,
                offset,
                expected,
            } => write!(
                f,
                "short read on {}: expected {expected} values at byte {offset}",
                path.display()
            ),
            Self::OutOfDomain { fx, fz } => {
                write!(f, "position out of domain at grid coordinate ({fx}, {fz})")
            }
            Self::InfoMismatch {
                parameter,
                configured,
                recorded,
            } => write!(
                f,
                "info file mismatch for {parameter}: configured {configured}, recorded {recorded}"
            ),
            Self::ShapeMismatch {
                component,
                expected,
                found,
            } => write!(
                f,
                "{component} grid has shape {}x{}, expected {}x{}",
                found.0, found.1, expected.0, expected.1
            ),
            Self::SnapshotUnavailable { index } => {
                write!(f, "no snapshot recorded at index {index}")
            }
            Self::NoBracket => write!(f, "no snapshot bracket loaded"),
            Self::DegenerateBracket { index } => {
                write!(f, "bracket endpoints are both {index}")
            }
            Self::InvalidGeometry { reason } => write!(f, "invalid grid geometry: {reason}"),
            Self::SiteOutOfRange { site, cells } => {
                write!(f, "site {site} out of range for {cells} grid cells")
            }
        }
    }
}

impl Error for FieldError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl FieldError {
    /// Wrap an I/O error, mapping `NotFound` to [`FieldError::FileNotFound`].
    pub fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Self::FileNotFound { path }
        } else {
            Self::Io { path, source }
        }
    }

    /// Whether this error is the domain-escape signal rather than a failure.
    pub fn is_out_of_domain(&self) -> bool {
        matches!(self, Self::OutOfDomain { .. })
    }
}

/// A malformed numeric range or value in run configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterError {
    /// Dotted name of the offending parameter (`run.dt`, `field.nx`, ...).
    pub parameter: String,
    /// What is wrong with it.
    pub reason: String,
}

impl ParameterError {
    /// Build an error for `parameter`.
    pub fn new(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid parameter {}: {}", self.parameter, self.reason)
    }
}

impl Error for ParameterError {}
