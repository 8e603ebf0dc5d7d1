//! Field-store configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use picpt_core::{ParameterError, SnapshotIndex};

use crate::geometry::GridGeometry;
use crate::layout::SourceLayout;

/// Recorded snapshot indices: `first, first + step, ...` up to `last`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRange {
    /// Earliest recorded index.
    pub first: i64,
    /// Latest index that may be used (inclusive).
    pub last: i64,
    /// Cadence between recorded snapshots.
    pub step: i64,
}

impl SnapshotRange {
    /// Whether `index` is a recorded snapshot.
    pub fn contains(&self, index: SnapshotIndex) -> bool {
        self.step > 0
            && index.0 >= self.first
            && index.0 <= self.last
            && (index.0 - self.first) % self.step == 0
    }

    /// The last recorded index (`last` rounded down onto the cadence).
    pub fn last_recorded(&self) -> SnapshotIndex {
        if self.step <= 0 {
            return SnapshotIndex(self.first);
        }
        SnapshotIndex(self.first + (self.last - self.first) / self.step * self.step)
    }

    /// Number of recorded snapshots.
    pub fn len(&self) -> usize {
        if self.step <= 0 || self.last < self.first {
            return 0;
        }
        ((self.last - self.first) / self.step + 1) as usize
    }

    /// Whether no snapshot is recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Simulated time interval covered by the recorded snapshots.
    pub fn time_span(&self) -> (f64, f64) {
        (self.first as f64, self.last_recorded().as_time())
    }

    /// Check the range admits at least one bracket.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.step <= 0 {
            return Err(ParameterError::new(
                "field.snapshots.step",
                format!("must be positive, got {}", self.step),
            ));
        }
        if self.last - self.first < self.step {
            return Err(ParameterError::new(
                "field.snapshots",
                format!(
                    "range [{}, {}] holds fewer than two snapshots at step {}",
                    self.first, self.last, self.step
                ),
            ));
        }
        Ok(())
    }
}

/// Where the field comes from and how it is scaled.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Directory holding the snapshot files.
    pub path: PathBuf,
    /// On-disk layout of the snapshot files.
    pub layout: SourceLayout,
    /// Grid shape and physical extent.
    pub geometry: GridGeometry,
    /// Charge-to-mass ratio every sampled field is multiplied by.
    #[serde(default = "default_charge_to_mass")]
    pub charge_to_mass: f64,
    /// Recorded snapshot indices.
    pub snapshots: SnapshotRange,
    /// Cross-check the LANL `info` file against `geometry` before loading.
    /// On by default; ignored for other layouts.
    #[serde(default = "default_check_info")]
    pub check_info: bool,
}

fn default_charge_to_mass() -> f64 {
    -1.0
}

fn default_check_info() -> bool {
    true
}

impl FieldConfig {
    /// Validate the field section.
    ///
    /// Validation order:
    /// 1. Grid geometry.
    /// 2. `charge_to_mass` is finite and non-zero.
    /// 3. Snapshot range admits at least one bracket.
    /// 4. Layout-specific index constraints.
    pub fn validate(&self) -> Result<(), ParameterError> {
        // 1. Geometry.
        self.geometry.validate()?;

        // 2. Scale.
        if !self.charge_to_mass.is_finite() || self.charge_to_mass == 0.0 {
            return Err(ParameterError::new(
                "field.charge_to_mass",
                format!("must be finite and non-zero, got {}", self.charge_to_mass),
            ));
        }

        // 3. Range.
        self.snapshots.validate()?;

        // 4. Layout.
        match &self.layout {
            SourceLayout::Lanl { index_base, .. } => {
                if self.snapshots.first < *index_base {
                    return Err(ParameterError::new(
                        "field.snapshots.first",
                        format!(
                            "{} precedes the LANL index base {index_base}",
                            self.snapshots.first
                        ),
                    ));
                }
            }
            SourceLayout::Nasa { .. } => {
                if self.snapshots.first < 0 {
                    return Err(ParameterError::new(
                        "field.snapshots.first",
                        "NASA snapshot indices must be non-negative",
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> FieldConfig {
        FieldConfig {
            path: PathBuf::from("/data"),
            layout: SourceLayout::nasa(),
            geometry: GridGeometry::new(321, 129, 320.0, 128.0),
            charge_to_mass: -1.0,
            snapshots: SnapshotRange {
                first: 1250,
                last: 1750,
                step: 25,
            },
            check_info: false,
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn zero_charge_to_mass_rejected() {
        let mut cfg = valid();
        cfg.charge_to_mass = 0.0;
        assert_eq!(cfg.validate().unwrap_err().parameter, "field.charge_to_mass");
    }

    #[test]
    fn single_snapshot_range_rejected() {
        let mut cfg = valid();
        cfg.snapshots.last = 1260;
        assert_eq!(cfg.validate().unwrap_err().parameter, "field.snapshots");
    }

    #[test]
    fn lanl_range_must_start_at_or_after_base() {
        let mut cfg = valid();
        cfg.layout = SourceLayout::lanl();
        cfg.snapshots = SnapshotRange {
            first: 0,
            last: 10,
            step: 1,
        };
        assert_eq!(cfg.validate().unwrap_err().parameter, "field.snapshots.first");
    }

    #[test]
    fn range_membership_follows_cadence() {
        let r = valid().snapshots;
        assert!(r.contains(SnapshotIndex(1250)));
        assert!(r.contains(SnapshotIndex(1725)));
        assert!(!r.contains(SnapshotIndex(1260)));
        assert!(!r.contains(SnapshotIndex(1775)));
        assert_eq!(r.len(), 21);
        assert_eq!(r.time_span(), (1250.0, 1750.0));
    }

    #[test]
    fn last_recorded_rounds_down() {
        let r = SnapshotRange {
            first: 0,
            last: 23,
            step: 5,
        };
        assert_eq!(r.last_recorded(), SnapshotIndex(20));
        assert_eq!(r.len(), 5);
    }

    #[test]
    fn defaults_to_electron_and_info_check() {
        let json = r#"{
            "path": "/data",
            "layout": {"kind": "nasa"},
            "geometry": {"nx": 321, "nz": 129, "Lx": 320.0, "Lz": 128.0},
            "snapshots": {"first": 1250, "last": 1750, "step": 25}
        }"#;
        let cfg: FieldConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.charge_to_mass, -1.0);
        assert!(cfg.check_info);
        assert_eq!(cfg.geometry.ny, 1);
    }
}
