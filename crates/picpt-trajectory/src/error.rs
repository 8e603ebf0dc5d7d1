//! Error types for trajectory recording and output.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors from building, writing or reading a trajectory.
#[derive(Debug)]
pub enum TrajectoryError {
    /// An I/O error occurred during read or write.
    Io(io::Error),
    /// The `"<Np> <numFrames>"` header line could not be parsed.
    MalformedHeader {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// A frame could not be decoded (truncated data).
    MalformedFrame {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// A frame's particle count differs from the trajectory's.
    ParticleCountMismatch {
        /// Particles per frame in the trajectory.
        expected: usize,
        /// Particles in the offending frame.
        found: usize,
    },
    /// The number of frames written differs from the header's declaration.
    FrameCountMismatch {
        /// Frames declared in the header.
        declared: usize,
        /// Frames actually written.
        written: usize,
    },
    /// The output file exists and overwriting was declined.
    NotSaved {
        /// The output path.
        path: PathBuf,
    },
}

impl fmt::Display for TrajectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::MalformedHeader { detail } => write!(f, "malformed header: {detail}"),
            Self::MalformedFrame { detail } => write!(f, "malformed frame: {detail}"),
            Self::ParticleCountMismatch { expected, found } => {
                write!(f, "frame holds {found} particles, trajectory has {expected}")
            }
            Self::FrameCountMismatch { declared, written } => {
                write!(f, "header declares {declared} frames but {written} were written")
            }
            Self::NotSaved { path } => {
                write!(f, "{} exists and was not overwritten: data not saved", path.display())
            }
        }
    }
}

impl std::error::Error for TrajectoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TrajectoryError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
