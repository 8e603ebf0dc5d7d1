//! On-disk snapshot layouts and the file-backed source.
//!
//! Two layouts are supported:
//!
//! - **LANL**: one file per component. Every time slice holds `cells`
//!   little-endian `f32` values followed by a two-value padding record, so
//!   slice `t` starts at byte `(cells + 2) * 4 * (t - index_base)`.
//! - **NASA**: one file per time index, `fields-%05d.dat`. A fixed header
//!   of 8 words plus three per-species velocity moments precedes the six
//!   component blocks, stored in order `Bx By Bz Ex Ey Ez`.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use picpt_core::{FieldComponent, FieldError, SnapshotIndex};

use crate::geometry::GridGeometry;
use crate::snapshot::FieldSnapshot;
use crate::source::SnapshotSource;

/// Bytes per stored sample.
const SAMPLE_BYTES: u64 = 4;
/// Padding values after every LANL time slice.
const LANL_SLICE_PADDING: u64 = 2;
/// Fixed header words at the start of a NASA file.
const NASA_HEADER_WORDS: u64 = 8;
/// Velocity moments stored per species ahead of the fields in a NASA file.
const NASA_MOMENTS_PER_SPECIES: u64 = 3;

/// Per-component file names for the LANL layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentFiles {
    /// File holding `Bx`.
    #[serde(rename = "Bx")]
    pub bx: String,
    /// File holding `By`.
    #[serde(rename = "By")]
    pub by: String,
    /// File holding `Bz`.
    #[serde(rename = "Bz")]
    pub bz: String,
    /// File holding `Ex`.
    #[serde(rename = "Ex")]
    pub ex: String,
    /// File holding `Ey`.
    #[serde(rename = "Ey")]
    pub ey: String,
    /// File holding `Ez`.
    #[serde(rename = "Ez")]
    pub ez: String,
}

impl ComponentFiles {
    /// File name for component `c`.
    pub fn name(&self, c: FieldComponent) -> &str {
        match c {
            FieldComponent::Bx => &self.bx,
            FieldComponent::By => &self.by,
            FieldComponent::Bz => &self.bz,
            FieldComponent::Ex => &self.ex,
            FieldComponent::Ey => &self.ey,
            FieldComponent::Ez => &self.ez,
        }
    }
}

impl Default for ComponentFiles {
    fn default() -> Self {
        Self {
            bx: "Bx".into(),
            by: "By".into(),
            bz: "Bz".into(),
            ex: "Ex".into(),
            ey: "Ey".into(),
            ez: "Ez".into(),
        }
    }
}

/// Which on-disk scheme snapshots are stored in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceLayout {
    /// One file per component, slices appended in time order.
    Lanl {
        /// Component file names inside the field directory.
        #[serde(default)]
        files: ComponentFiles,
        /// Time index of the first slice in each file.
        #[serde(default = "default_index_base")]
        index_base: i64,
    },
    /// One file per time index holding all six components.
    Nasa {
        /// Number of particle species whose moments precede the fields.
        #[serde(default = "default_species")]
        species: u64,
    },
}

fn default_index_base() -> i64 {
    1
}

fn default_species() -> u64 {
    4
}

impl SourceLayout {
    /// LANL layout with default file names and index base 1.
    pub fn lanl() -> Self {
        Self::Lanl {
            files: ComponentFiles::default(),
            index_base: default_index_base(),
        }
    }

    /// NASA layout with the default species count.
    pub fn nasa() -> Self {
        Self::Nasa {
            species: default_species(),
        }
    }

    /// Short layout name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Lanl { .. } => "lanl",
            Self::Nasa { .. } => "nasa",
        }
    }
}

/// NASA snapshot file name for `index`.
pub fn nasa_file_name(index: SnapshotIndex) -> String {
    format!("fields-{:05}.dat", index.0)
}

/// Reads snapshots from a directory in one of the [`SourceLayout`]s.
#[derive(Debug)]
pub struct DiskSource {
    dir: PathBuf,
    layout: SourceLayout,
    cells: u64,
    /// Byte length of the NASA header, fixed by grid size and species count.
    nasa_header_bytes: u64,
}

impl DiskSource {
    /// Source reading `layout` files under `dir` for grids of `geometry`.
    pub fn new(dir: impl Into<PathBuf>, layout: SourceLayout, geometry: &GridGeometry) -> Self {
        let cells = geometry.cells() as u64;
        let nasa_header_bytes = match &layout {
            SourceLayout::Nasa { species } => {
                (cells * species * NASA_MOMENTS_PER_SPECIES + NASA_HEADER_WORDS) * SAMPLE_BYTES
            }
            SourceLayout::Lanl { .. } => 0,
        };
        Self {
            dir: dir.into(),
            layout,
            cells,
            nasa_header_bytes,
        }
    }

    /// The field directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The configured layout.
    pub fn layout(&self) -> &SourceLayout {
        &self.layout
    }

    /// File and starting byte of component `c` at `index`.
    pub fn locate(
        &self,
        c: FieldComponent,
        index: SnapshotIndex,
    ) -> Result<(PathBuf, u64), FieldError> {
        let block = self.cells * SAMPLE_BYTES;
        match &self.layout {
            SourceLayout::Lanl { files, index_base } => {
                let slot = u64::try_from(index.0 - index_base)
                    .map_err(|_| FieldError::SnapshotUnavailable { index })?;
                let offset = (self.cells + LANL_SLICE_PADDING) * SAMPLE_BYTES * slot;
                Ok((self.dir.join(files.name(c)), offset))
            }
            SourceLayout::Nasa { .. } => {
                if index.0 < 0 {
                    return Err(FieldError::SnapshotUnavailable { index });
                }
                let offset = self.nasa_header_bytes + block * c.index() as u64;
                Ok((self.dir.join(nasa_file_name(index)), offset))
            }
        }
    }

    fn read_slice(
        &self,
        r: &mut dyn Read,
        path: &Path,
        offset: u64,
        out: &mut [f32],
    ) -> Result<(), FieldError> {
        read_f32_into(r, out).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => FieldError::ShortRead {
                path: path.to_path_buf(),
                offset,
                expected: self.cells as usize,
            },
            _ => FieldError::from_io(path, e),
        })
    }
}

fn open_at(path: &Path, offset: u64) -> Result<File, FieldError> {
    let mut file = File::open(path).map_err(|e| FieldError::from_io(path, e))?;
    file.seek(SeekFrom::Start(offset))
        .map_err(|e| FieldError::from_io(path, e))?;
    Ok(file)
}

impl SnapshotSource for DiskSource {
    fn load(
        &mut self,
        index: SnapshotIndex,
        geometry: &GridGeometry,
    ) -> Result<FieldSnapshot, FieldError> {
        let snapshot = FieldSnapshot::zeroed(index, geometry)?;
        match &self.layout {
            SourceLayout::Lanl { .. } => {
                for c in FieldComponent::ALL {
                    let (path, offset) = self.locate(c, index)?;
                    let mut file = open_at(&path, offset)?;
                    let mut view = snapshot.component(c).write();
                    self.read_slice(&mut file, &path, offset, view.as_mut_slice())?;
                }
            }
            SourceLayout::Nasa { .. } => {
                // Components are contiguous after the header.
                let (path, offset) = self.locate(FieldComponent::Bx, index)?;
                let mut file = open_at(&path, offset)?;
                for c in FieldComponent::ALL {
                    let block_offset = offset + self.cells * SAMPLE_BYTES * c.index() as u64;
                    let mut view = snapshot.component(c).write();
                    self.read_slice(&mut file, &path, block_offset, view.as_mut_slice())?;
                }
            }
        }
        Ok(snapshot)
    }

    fn describe(&self) -> String {
        format!("{} files in {}", self.layout.name(), self.dir.display())
    }
}

/// Fill `out` with little-endian `f32` values read from `r`.
pub fn read_f32_into(r: &mut dyn Read, out: &mut [f32]) -> io::Result<()> {
    let mut bytes = vec![0u8; out.len() * SAMPLE_BYTES as usize];
    r.read_exact(&mut bytes)?;
    for (dst, b) in out.iter_mut().zip(bytes.chunks_exact(SAMPLE_BYTES as usize)) {
        *dst = f32::from_le_bytes([b[0], b[1], b[2], b[3]]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> GridGeometry {
        GridGeometry::new(10, 6, 9.0, 5.0)
    }

    #[test]
    fn lanl_offset_skips_padded_slices() {
        let src = DiskSource::new("/data", SourceLayout::lanl(), &geometry());
        let (path, offset) = src.locate(FieldComponent::Ey, SnapshotIndex(1)).unwrap();
        assert_eq!(path, PathBuf::from("/data/Ey"));
        assert_eq!(offset, 0);
        let (_, offset) = src.locate(FieldComponent::Ey, SnapshotIndex(4)).unwrap();
        assert_eq!(offset, (60 + 2) * 4 * 3);
    }

    #[test]
    fn lanl_index_before_base_is_unavailable() {
        let src = DiskSource::new("/data", SourceLayout::lanl(), &geometry());
        match src.locate(FieldComponent::Bx, SnapshotIndex(0)) {
            Err(FieldError::SnapshotUnavailable { index }) => assert_eq!(index, SnapshotIndex(0)),
            other => panic!("expected SnapshotUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn lanl_uses_configured_file_names() {
        let files = ComponentFiles {
            bz: "bz_field.gda".into(),
            ..ComponentFiles::default()
        };
        let layout = SourceLayout::Lanl {
            files,
            index_base: 1,
        };
        let src = DiskSource::new("/d", layout, &geometry());
        let (path, _) = src.locate(FieldComponent::Bz, SnapshotIndex(2)).unwrap();
        assert_eq!(path, PathBuf::from("/d/bz_field.gda"));
    }

    #[test]
    fn nasa_offset_follows_header_and_component_order() {
        let src = DiskSource::new("/n", SourceLayout::nasa(), &geometry());
        let header = (60 * 4 * 3 + 8) * 4;
        let (path, offset) = src.locate(FieldComponent::Bx, SnapshotIndex(1750)).unwrap();
        assert_eq!(path, PathBuf::from("/n/fields-01750.dat"));
        assert_eq!(offset, header);
        let (_, offset) = src.locate(FieldComponent::Ez, SnapshotIndex(1750)).unwrap();
        assert_eq!(offset, header + 5 * 60 * 4);
    }

    #[test]
    fn layout_deserializes_with_defaults() {
        let layout: SourceLayout = serde_json::from_str(r#"{"kind":"nasa"}"#).unwrap();
        assert_eq!(layout, SourceLayout::nasa());
        let layout: SourceLayout =
            serde_json::from_str(r#"{"kind":"lanl","files":{"Bx":"a","By":"b","Bz":"c","Ex":"d","Ey":"e","Ez":"f"}}"#)
                .unwrap();
        match layout {
            SourceLayout::Lanl { files, index_base } => {
                assert_eq!(files.name(FieldComponent::Ex), "d");
                assert_eq!(index_base, 1);
            }
            other => panic!("expected lanl, got {other:?}"),
        }
    }

    #[test]
    fn read_f32_into_is_little_endian() {
        let mut bytes = Vec::new();
        for v in [1.5f32, -2.0, 1e-3] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let mut vals = [0.0f32; 3];
        read_f32_into(&mut bytes.as_slice(), &mut vals).unwrap();
        assert_eq!(vals, [1.5, -2.0, 1e-3]);
        let mut too_many = [0.0f32; 4];
        assert!(read_f32_into(&mut bytes.as_slice(), &mut too_many).is_err());
    }
}
