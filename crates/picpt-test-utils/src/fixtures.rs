//! On-disk snapshot fixtures.
//!
//! - [`ScratchDir`]: a uniquely named temporary directory removed on drop.
//! - [`write_lanl`]: per-component LANL files with padded time slices.
//! - [`write_nasa`]: one NASA `fields-%05d.dat` file with its header.
//! - [`write_lanl_info`]: the Fortran-framed LANL `info` file.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use picpt_core::{FieldComponent, SnapshotIndex};
use picpt_field::layout::nasa_file_name;
use picpt_field::{ComponentFiles, GridGeometry};

/// Temporary directory deleted (recursively) when dropped.
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Create a fresh directory whose name starts with `picpt-{label}-`.
    pub fn new(label: &str) -> io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(&format!("picpt-{label}-"))
            .tempdir()?;
        Ok(Self { dir })
    }

    /// The directory path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// `name` inside the directory.
    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Remove the directory now, reporting any failure.
    pub fn close(self) -> io::Result<()> {
        self.dir.close()
    }
}

fn write_block(
    w: &mut dyn Write,
    geometry: &GridGeometry,
    mut sample: impl FnMut(usize, usize) -> f32,
) -> io::Result<()> {
    for r in 0..geometry.nz {
        for c in 0..geometry.nx {
            w.write_all(&sample(r, c).to_le_bytes())?;
        }
    }
    Ok(())
}

/// Write LANL component files holding slices `index_base ..= last`.
///
/// Each slice is followed by two zero padding values.
pub fn write_lanl(
    dir: &Path,
    geometry: &GridGeometry,
    files: &ComponentFiles,
    index_base: i64,
    last: i64,
    sample: impl Fn(SnapshotIndex, FieldComponent, usize, usize) -> f32,
) -> io::Result<()> {
    for c in FieldComponent::ALL {
        let mut w = BufWriter::new(File::create(dir.join(files.name(c)))?);
        for t in index_base..=last {
            write_block(&mut w, geometry, |r, col| sample(SnapshotIndex(t), c, r, col))?;
            w.write_all(&0f32.to_le_bytes())?;
            w.write_all(&0f32.to_le_bytes())?;
        }
        w.flush()?;
    }
    Ok(())
}

/// Write the NASA file for `index`.
///
/// The header (8 words plus `3 * species` moment blocks) is filled with a
/// sentinel so a wrong offset shows up as garbage in the loaded field.
pub fn write_nasa(
    dir: &Path,
    geometry: &GridGeometry,
    species: u64,
    index: SnapshotIndex,
    sample: impl Fn(SnapshotIndex, FieldComponent, usize, usize) -> f32,
) -> io::Result<()> {
    let mut w = BufWriter::new(File::create(dir.join(nasa_file_name(index)))?);
    let header_words = 8 + geometry.cells() as u64 * species * 3;
    for _ in 0..header_words {
        w.write_all(&(-999.0f32).to_le_bytes())?;
    }
    for c in FieldComponent::ALL {
        write_block(&mut w, geometry, |r, col| sample(index, c, r, col))?;
    }
    w.flush()
}

/// Write `dir/info` recording `cells = (nx, ny, nz)` and `lengths = (Lx, Ly, Lz)`.
pub fn write_lanl_info(dir: &Path, cells: [i32; 3], lengths: [f32; 3]) -> io::Result<()> {
    let mut w = BufWriter::new(File::create(dir.join("info"))?);
    w.write_all(&12i32.to_le_bytes())?;
    for n in cells {
        w.write_all(&n.to_le_bytes())?;
    }
    w.write_all(&12i32.to_le_bytes())?;
    w.write_all(&12i32.to_le_bytes())?;
    for l in lengths {
        w.write_all(&l.to_le_bytes())?;
    }
    w.write_all(&12i32.to_le_bytes())?;
    w.flush()
}

/// `info` contents matching `geometry` exactly.
pub fn matching_info(geometry: &GridGeometry) -> ([i32; 3], [f32; 3]) {
    (
        [geometry.nx as i32, geometry.ny as i32, geometry.nz as i32],
        [geometry.lx as f32, geometry.ly as f32, geometry.lz as f32],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_dir_is_removed_on_close() {
        let dir = ScratchDir::new("fixtures").unwrap();
        let path = dir.path().to_path_buf();
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("picpt-fixtures-"));
        std::fs::write(dir.join("sample.bin"), [1u8, 2, 3]).unwrap();
        assert!(dir.join("sample.bin").exists());
        dir.close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn scratch_dirs_are_distinct() {
        let a = ScratchDir::new("same").unwrap();
        let b = ScratchDir::new("same").unwrap();
        assert_ne!(a.path(), b.path());
    }
}
