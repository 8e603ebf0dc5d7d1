//! Grid shape and the physical-to-grid coordinate map.

use serde::{Deserialize, Serialize};

use picpt_core::ParameterError;

/// Shape and physical extent of the simulation grid.
///
/// Grids are stored `nz` rows by `nx` columns. `ny` and `Ly` describe the
/// invariant third direction; they are only used to cross-check the LANL
/// `info` file.
///
/// Physical coordinates map to fractional grid coordinates as
/// `fx = x / dx + origin_x`, `fz = z / dz + origin_z`, with cell sizes
/// `dx = Lx / (nx - 1)` and `dz = Lz / (nz - 1)`. The default origin puts
/// `x = 0` on column 1 and `z = 0` on the middle row `nz / 2`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    /// Cells along x (columns).
    pub nx: usize,
    /// Cells along the invariant direction.
    #[serde(default = "default_ny")]
    pub ny: usize,
    /// Cells along z (rows).
    pub nz: usize,
    /// Physical length along x.
    #[serde(rename = "Lx")]
    pub lx: f64,
    /// Physical length along the invariant direction.
    #[serde(rename = "Ly", default = "default_ly")]
    pub ly: f64,
    /// Physical length along z.
    #[serde(rename = "Lz")]
    pub lz: f64,
    /// Grid column of `x = 0`. Defaults to 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_x: Option<f64>,
    /// Grid row of `z = 0`. Defaults to `nz / 2` (integer half).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_z: Option<f64>,
}

fn default_ny() -> usize {
    1
}

fn default_ly() -> f64 {
    1.0
}

impl GridGeometry {
    /// Geometry with the default origin.
    pub fn new(nx: usize, nz: usize, lx: f64, lz: f64) -> Self {
        Self {
            nx,
            ny: default_ny(),
            nz,
            lx,
            ly: default_ly(),
            lz,
            origin_x: None,
            origin_z: None,
        }
    }

    /// Samples per component grid (`nx * nz`).
    pub fn cells(&self) -> usize {
        self.nx * self.nz
    }

    /// `(rows, cols)` of every component grid.
    pub fn shape(&self) -> (usize, usize) {
        (self.nz, self.nx)
    }

    /// Physical length of one cell along x.
    pub fn cell_dx(&self) -> f64 {
        self.lx / (self.nx as f64 - 1.0)
    }

    /// Physical length of one cell along z.
    pub fn cell_dz(&self) -> f64 {
        self.lz / (self.nz as f64 - 1.0)
    }

    /// Grid column of `x = 0`.
    pub fn origin_x(&self) -> f64 {
        self.origin_x.unwrap_or(1.0)
    }

    /// Grid row of `z = 0`.
    pub fn origin_z(&self) -> f64 {
        self.origin_z.unwrap_or((self.nz / 2) as f64)
    }

    /// Fractional grid coordinates `(fx, fz)` of a physical position.
    pub fn to_grid(&self, x: f64, z: f64) -> (f64, f64) {
        (
            x / self.cell_dx() + self.origin_x(),
            z / self.cell_dz() + self.origin_z(),
        )
    }

    /// Physical `(x, z)` of a fractional grid coordinate.
    pub fn to_physical(&self, fx: f64, fz: f64) -> (f64, f64) {
        (
            (fx - self.origin_x()) * self.cell_dx(),
            (fz - self.origin_z()) * self.cell_dz(),
        )
    }

    /// Check that the geometry leaves a non-empty interpolation interior.
    ///
    /// Validation order:
    /// 1. `nx` and `nz` are at least 3 (one interior cell plus the halo).
    /// 2. `Lx` and `Lz` are finite and positive.
    /// 3. `ny` is non-zero and `Ly` is finite and positive.
    /// 4. Origin offsets, when given, are finite.
    pub fn validate(&self) -> Result<(), ParameterError> {
        // 1. Interior needs a one-cell halo on each side.
        if self.nx < 3 {
            return Err(ParameterError::new("field.geometry.nx", "must be at least 3"));
        }
        if self.nz < 3 {
            return Err(ParameterError::new("field.geometry.nz", "must be at least 3"));
        }
        // 2. Lengths.
        for (name, len) in [("field.geometry.Lx", self.lx), ("field.geometry.Lz", self.lz)] {
            if !len.is_finite() || len <= 0.0 {
                return Err(ParameterError::new(
                    name,
                    format!("must be finite and positive, got {len}"),
                ));
            }
        }
        // 3. Invariant direction.
        if self.ny == 0 {
            return Err(ParameterError::new("field.geometry.ny", "must be non-zero"));
        }
        if !self.ly.is_finite() || self.ly <= 0.0 {
            return Err(ParameterError::new(
                "field.geometry.Ly",
                format!("must be finite and positive, got {}", self.ly),
            ));
        }
        // 4. Origins.
        for (name, origin) in [
            ("field.geometry.origin_x", self.origin_x),
            ("field.geometry.origin_z", self.origin_z),
        ] {
            if let Some(o) = origin {
                if !o.is_finite() {
                    return Err(ParameterError::new(name, "must be finite"));
                }
            }
        }
        Ok(())
    }
}
