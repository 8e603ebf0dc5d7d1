//! Top-level error type for configuring and running a trace.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

use picpt_core::{FieldError, ParameterError};
use picpt_trajectory::TrajectoryError;

/// Anything that stops a run from producing a trajectory.
#[derive(Debug)]
pub enum RunError {
    /// A configuration value is out of range.
    Parameter(ParameterError),
    /// Loading or sampling the field failed.
    Field(FieldError),
    /// Recording or writing the trajectory failed.
    Output(TrajectoryError),
    /// The configuration file is not valid JSON for a run.
    ConfigParse {
        /// Parser message, including line and column.
        detail: String,
    },
    /// The configuration file could not be read.
    Io {
        /// The file being read.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parameter(e) => write!(f, "{e}"),
            Self::Field(e) => write!(f, "field: {e}"),
            Self::Output(e) => write!(f, "output: {e}"),
            Self::ConfigParse { detail } => write!(f, "config parse error: {detail}"),
            Self::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parameter(e) => Some(e),
            Self::Field(e) => Some(e),
            Self::Output(e) => Some(e),
            Self::ConfigParse { .. } => None,
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<ParameterError> for RunError {
    fn from(e: ParameterError) -> Self {
        Self::Parameter(e)
    }
}

impl From<FieldError> for RunError {
    fn from(e: FieldError) -> Self {
        Self::Field(e)
    }
}

impl From<TrajectoryError> for RunError {
    fn from(e: TrajectoryError) -> Self {
        Self::Output(e)
    }
}
