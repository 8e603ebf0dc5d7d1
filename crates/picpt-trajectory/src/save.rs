//! Writing a finished trajectory to a file.

use std::io::{self, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::TrajectoryError;
use crate::types::{OutputScale, Trajectory};
use crate::writer::TrajectoryWriter;

/// Decides whether an existing output file may be replaced.
pub trait ConfirmOverwrite {
    /// Return `true` to overwrite `path`.
    fn confirm(&mut self, path: &Path) -> bool;
}

/// Fixed answer to the overwrite question.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverwritePolicy {
    /// Replace existing files without asking.
    Always,
    /// Never replace an existing file.
    Never,
}

impl ConfirmOverwrite for OverwritePolicy {
    fn confirm(&mut self, _path: &Path) -> bool {
        matches!(self, Self::Always)
    }
}

impl<F: FnMut(&Path) -> bool> ConfirmOverwrite for F {
    fn confirm(&mut self, path: &Path) -> bool {
        self(path)
    }
}

/// Encode a whole trajectory (header plus every frame) into `w`.
pub fn encode_trajectory<W: Write>(
    w: W,
    trajectory: &Trajectory,
    scale: &OutputScale,
) -> Result<W, TrajectoryError> {
    let mut writer = TrajectoryWriter::new(w, trajectory.particle_count(), trajectory.len(), *scale)?;
    for frame in trajectory.frames() {
        writer.write_frame(frame)?;
    }
    writer.finish()
}

/// Write `trajectory` to `path`.
///
/// If `path` already exists, `confirm` is asked first; declining leaves
/// the file untouched and returns [`TrajectoryError::NotSaved`].
///
/// The data is written to a temporary file next to `path` and renamed
/// over it once complete, so a failed write never leaves a partial file.
/// A file that appears at `path` while writing is not replaced without
/// asking `confirm`.
pub fn save_trajectory(
    path: &Path,
    trajectory: &Trajectory,
    scale: &OutputScale,
    confirm: &mut dyn ConfirmOverwrite,
) -> Result<(), TrajectoryError> {
    let existed = path.exists();
    if existed && !confirm.confirm(path) {
        return Err(not_saved(path));
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let staged = NamedTempFile::new_in(dir)?;
    let staged = encode_trajectory(BufWriter::new(staged), trajectory, scale)?
        .into_inner()
        .map_err(|e| e.into_error())?;
    if existed {
        let permissions = std::fs::metadata(path)?.permissions();
        staged.as_file().set_permissions(permissions)?;
    }
    staged.as_file().sync_all()?;

    if existed {
        staged.persist(path).map_err(|e| e.error)?;
    } else if let Err(e) = staged.persist_noclobber(path) {
        if e.error.kind() != io::ErrorKind::AlreadyExists {
            return Err(e.error.into());
        }
        if !confirm.confirm(path) {
            return Err(not_saved(path));
        }
        e.file.persist(path).map_err(|e| e.error)?;
    }

    log::info!(
        "wrote {} frames of {} particles to {}",
        trajectory.len(),
        trajectory.particle_count(),
        path.display()
    );
    Ok(())
}

fn not_saved(path: &Path) -> TrajectoryError {
    log::warn!("{} exists, not overwriting", path.display());
    TrajectoryError::NotSaved {
        path: path.to_path_buf(),
    }
}
