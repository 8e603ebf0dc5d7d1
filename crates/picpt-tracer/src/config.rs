//! Run configuration: the JSON file a trace is described by.
//!
//! ```json
//! {
//!   "field": {
//!     "path": "/data/run3",
//!     "layout": { "kind": "nasa", "species": 4 },
//!     "geometry": { "nx": 322, "nz": 130, "Lx": 320.0, "Lz": 128.0 },
//!     "charge_to_mass": -1.0,
//!     "snapshots": { "first": 1250, "last": 1750, "step": 25 }
//!   },
//!   "run": { "time": [1750.0, 1250.0], "dt": -0.05,
//!            "escape": { "x": [0.0, 320.0], "z": [-64.0, 64.0] } },
//!   "particles": {
//!     "distribution": { "kind": "single", "position": [32.0, 0.0, -0.32],
//!                       "velocity": [0.0, -3.5, 0.0] },
//!     "units": { "length": 5.0, "velocity": 0.1 }
//!   },
//!   "output": { "path": "orbit.dat", "scale": { "length": 5.0, "velocity": 0.1 } }
//! }
//! ```

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use picpt_core::ParameterError;
use picpt_field::{FieldConfig, SnapshotRange, SourceLayout};
use picpt_trajectory::OutputScale;

use crate::error::RunError;
use crate::escape::EscapeBounds;
use crate::init::{InputUnits, ParticleInit};

/// Time stepping for one run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// `[t_begin, t_end]`; `t_end < t_begin` for backward runs.
    pub time: [f64; 2],
    /// Signed time step; its sign must match the direction of `time`.
    pub dt: f64,
    /// Box particles must stay inside. Without one, only the interpolation
    /// interior bounds the run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escape: Option<EscapeBounds>,
}

impl RunConfig {
    /// Simulated start time.
    pub fn t_begin(&self) -> f64 {
        self.time[0]
    }

    /// Simulated end time.
    pub fn t_end(&self) -> f64 {
        self.time[1]
    }

    /// Whether the run integrates backward in time.
    pub fn is_backward(&self) -> bool {
        self.dt < 0.0
    }

    /// Most steps the time interval allows.
    pub fn max_steps(&self) -> u64 {
        let n = (self.t_end() - self.t_begin()) / self.dt;
        // Absorb rounding in intervals that are an exact multiple of dt.
        (n + 1e-9).floor().max(0.0) as u64
    }

    /// Simulated time before step `step` (0-based), computed from the start
    /// so rounding does not accumulate.
    pub fn time_at(&self, step: u64) -> f64 {
        self.t_begin() + step as f64 * self.dt
    }

    /// Validate the run section against the recorded snapshots.
    ///
    /// Validation order:
    /// 1. Both times finite.
    /// 2. `dt` finite and non-zero.
    /// 3. `dt` points from `t_begin` toward `t_end`.
    /// 4. `t_begin` inside the recorded snapshot span.
    /// 5. Escape box, if any, well formed.
    pub fn validate(&self, snapshots: &SnapshotRange) -> Result<(), ParameterError> {
        // 1. Times.
        if !self.t_begin().is_finite() || !self.t_end().is_finite() {
            return Err(ParameterError::new(
                "run.time",
                format!("must be finite, got {:?}", self.time),
            ));
        }

        // 2. Step.
        if !self.dt.is_finite() || self.dt == 0.0 {
            return Err(ParameterError::new(
                "run.dt",
                format!("must be finite and non-zero, got {}", self.dt),
            ));
        }

        // 3. Direction.
        let span = self.t_end() - self.t_begin();
        if span == 0.0 || span.signum() != self.dt.signum() {
            return Err(ParameterError::new(
                "run.dt",
                format!(
                    "step {} does not move from {} toward {}",
                    self.dt,
                    self.t_begin(),
                    self.t_end()
                ),
            ));
        }

        // 4. Start inside the data.
        let (lo, hi) = snapshots.time_span();
        if self.t_begin() < lo || self.t_begin() > hi {
            return Err(ParameterError::new(
                "run.time",
                format!(
                    "start {} lies outside the recorded snapshots [{lo}, {hi}]",
                    self.t_begin()
                ),
            ));
        }

        // 5. Box.
        if let Some(escape) = &self.escape {
            escape.validate()?;
        }
        Ok(())
    }
}

/// Initial particles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticlesConfig {
    /// How particles are laid out.
    pub distribution: ParticleInit,
    /// Multipliers from configured to simulation units.
    #[serde(default)]
    pub units: InputUnits,
}

/// Where and how the trajectory is written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Trajectory file.
    pub path: PathBuf,
    /// Divisors applied to stored values.
    #[serde(default)]
    pub scale: OutputScale,
}

impl OutputConfig {
    fn validate(&self) -> Result<(), ParameterError> {
        if self.path.as_os_str().is_empty() {
            return Err(ParameterError::new("output.path", "must not be empty"));
        }
        for (name, v) in [
            ("output.scale.length", self.scale.length),
            ("output.scale.velocity", self.scale.velocity),
        ] {
            if !v.is_finite() || v == 0.0 {
                return Err(ParameterError::new(
                    name,
                    format!("must be finite and non-zero, got {v}"),
                ));
            }
        }
        Ok(())
    }
}

/// Complete description of a trace.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TracerConfig {
    /// Field data and scaling.
    pub field: FieldConfig,
    /// Time stepping.
    pub run: RunConfig,
    /// Initial particles.
    pub particles: ParticlesConfig,
    /// Trajectory output.
    pub output: OutputConfig,
}

impl TracerConfig {
    /// Parse a configuration from JSON text. Does not validate.
    pub fn from_json_str(text: &str) -> Result<Self, RunError> {
        serde_json::from_str(text).map_err(|e| RunError::ConfigParse {
            detail: e.to_string(),
        })
    }

    /// Read and parse a configuration file. Does not validate.
    pub fn from_path(path: &Path) -> Result<Self, RunError> {
        let text = std::fs::read_to_string(path).map_err(|source| RunError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Validate every section. No file is touched.
    pub fn validate(&self) -> Result<(), ParameterError> {
        self.field.validate()?;
        self.run.validate(&self.field.snapshots)?;
        self.particles.distribution.validate()?;
        for (name, v) in [
            ("particles.units.length", self.particles.units.length),
            ("particles.units.velocity", self.particles.units.velocity),
        ] {
            if !v.is_finite() || v == 0.0 {
                return Err(ParameterError::new(
                    name,
                    format!("must be finite and non-zero, got {v}"),
                ));
            }
        }
        self.output.validate()
    }

    /// Every effective parameter, in declaration order, as display strings.
    pub fn dump(&self) -> IndexMap<String, String> {
        let mut out = IndexMap::new();
        let mut put = |k: &str, v: String| {
            out.insert(k.to_string(), v);
        };
        let f = &self.field;
        let g = &f.geometry;
        put("field.path", f.path.display().to_string());
        put("field.layout", f.layout.name().to_string());
        match &f.layout {
            SourceLayout::Lanl { files, index_base } => {
                put(
                    "field.layout.files",
                    [&files.bx, &files.by, &files.bz, &files.ex, &files.ey, &files.ez]
                        .map(|s| s.as_str())
                        .join(" "),
                );
                put("field.layout.index_base", index_base.to_string());
            }
            SourceLayout::Nasa { species } => {
                put("field.layout.species", species.to_string());
            }
        }
        put("field.geometry.nx", g.nx.to_string());
        put("field.geometry.ny", g.ny.to_string());
        put("field.geometry.nz", g.nz.to_string());
        put("field.geometry.Lx", g.lx.to_string());
        put("field.geometry.Ly", g.ly.to_string());
        put("field.geometry.Lz", g.lz.to_string());
        put("field.geometry.origin_x", g.origin_x().to_string());
        put("field.geometry.origin_z", g.origin_z().to_string());
        put("field.charge_to_mass", f.charge_to_mass.to_string());
        put("field.snapshots.first", f.snapshots.first.to_string());
        put("field.snapshots.last", f.snapshots.last.to_string());
        put("field.snapshots.step", f.snapshots.step.to_string());
        put("field.check_info", f.check_info.to_string());
        put("run.time.begin", self.run.t_begin().to_string());
        put("run.time.end", self.run.t_end().to_string());
        put("run.dt", self.run.dt.to_string());
        match &self.run.escape {
            Some(b) => {
                put("run.escape.x", format!("[{}, {}]", b.x[0], b.x[1]));
                put("run.escape.z", format!("[{}, {}]", b.z[0], b.z[1]));
            }
            None => put("run.escape", "none".to_string()),
        }
        put(
            "particles.distribution",
            self.particles.distribution.kind().to_string(),
        );
        put(
            "particles.count",
            self.particles.distribution.count().to_string(),
        );
        put("particles.units.length", self.particles.units.length.to_string());
        put(
            "particles.units.velocity",
            self.particles.units.velocity.to_string(),
        );
        put("output.path", self.output.path.display().to_string());
        put("output.scale.length", self.output.scale.length.to_string());
        put("output.scale.velocity", self.output.scale.velocity.to_string());
        out
    }
}
