//! LANL `info` file consistency check.
//!
//! The LANL output directory carries an `info` file written as two Fortran
//! unformatted records: `(nx, ny, nz)` as `i32` and `(Lx, Ly, Lz)` as
//! `f32`, each record framed by a 4-byte length marker on both sides.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use picpt_core::FieldError;

use crate::geometry::GridGeometry;

/// Tolerance when comparing recorded domain lengths.
const LENGTH_TOLERANCE: f64 = 1e-3;

/// Grid shape and domain lengths recorded by the simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LanlInfo {
    /// `(nx, ny, nz)`.
    pub cells: [i32; 3],
    /// `(Lx, Ly, Lz)`.
    pub lengths: [f32; 3],
}

fn read_i32(r: &mut dyn Read) -> io::Result<i32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn read_f32(r: &mut dyn Read) -> io::Result<f32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}

fn decode_info(r: &mut dyn Read) -> io::Result<LanlInfo> {
    let _marker = read_i32(r)?;
    let cells = [read_i32(r)?, read_i32(r)?, read_i32(r)?];
    let _marker = read_i32(r)?;
    let _marker = read_i32(r)?;
    let lengths = [read_f32(r)?, read_f32(r)?, read_f32(r)?];
    Ok(LanlInfo { cells, lengths })
}

/// Read `dir/info`.
pub fn read_lanl_info(dir: &Path) -> Result<LanlInfo, FieldError> {
    let path = dir.join("info");
    let mut file = File::open(&path).map_err(|e| FieldError::from_io(&path, e))?;
    decode_info(&mut file).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => FieldError::ShortRead {
            path: path.clone(),
            offset: 0,
            expected: 10,
        },
        _ => FieldError::from_io(&path, e),
    })
}

/// Compare `dir/info` against the configured geometry.
///
/// Returns `Ok(None)` (after logging a warning) when the file is absent.
/// Returns [`FieldError::InfoMismatch`] on the first disagreeing value.
pub fn check_lanl_info(
    dir: &Path,
    geometry: &GridGeometry,
) -> Result<Option<LanlInfo>, FieldError> {
    let info = match read_lanl_info(dir) {
        Ok(info) => info,
        Err(FieldError::FileNotFound { path }) => {
            log::warn!("{} not found, skipping grid consistency check", path.display());
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    let configured_cells = [geometry.nx, geometry.ny, geometry.nz];
    for (name, (configured, recorded)) in ["nx", "ny", "nz"]
        .into_iter()
        .zip(configured_cells.into_iter().zip(info.cells))
    {
        if i64::try_from(configured).ok() != Some(i64::from(recorded)) {
            return Err(FieldError::InfoMismatch {
                parameter: name,
                configured: configured.to_string(),
                recorded: recorded.to_string(),
            });
        }
    }

    let configured_lengths = [geometry.lx, geometry.ly, geometry.lz];
    for (name, (configured, recorded)) in ["Lx", "Ly", "Lz"]
        .into_iter()
        .zip(configured_lengths.into_iter().zip(info.lengths))
    {
        if (configured - f64::from(recorded)).abs() > LENGTH_TOLERANCE {
            return Err(FieldError::InfoMismatch {
                parameter: name,
                configured: configured.to_string(),
                recorded: recorded.to_string(),
            });
        }
    }

    log::info!(
        "info file matches grid {}x{}x{}",
        geometry.nx,
        geometry.ny,
        geometry.nz
    );
    Ok(Some(info))
}
