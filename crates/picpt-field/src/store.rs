//! The interpolating field store.

use std::time::Instant;

use picpt_core::{FieldError, FieldSample, FieldSelector, SnapshotIndex};

use crate::config::FieldConfig;
use crate::geometry::GridGeometry;
use crate::info::check_lanl_info;
use crate::interp::Stencil;
use crate::layout::{DiskSource, SourceLayout};
use crate::snapshot::FieldSnapshot;
use crate::source::SnapshotSource;

/// Counters accumulated by a [`FieldStore`] over its lifetime.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Brackets installed by [`FieldStore::update`].
    pub brackets: u64,
    /// Snapshots read from the source.
    pub snapshots_loaded: u64,
    /// Snapshots taken over from the previous bracket without a read.
    pub snapshots_reused: u64,
    /// Wall-clock time spent inside the source, in microseconds.
    pub load_us: u64,
}

/// Two time-bracketing snapshots and the blend between them.
///
/// Usage per bracket: [`update`](Self::update) once, then for each time
/// step [`set_time`](Self::set_time) followed by any number of
/// [`query_at`](Self::query_at) calls.
pub struct FieldStore {
    geometry: GridGeometry,
    charge_to_mass: f64,
    source: Box<dyn SnapshotSource>,
    a: Option<FieldSnapshot>,
    b: Option<FieldSnapshot>,
    wa: f64,
    wb: f64,
    stats: LoadStats,
}

impl FieldStore {
    /// Store over `source`; no bracket is loaded yet.
    pub fn new(
        geometry: GridGeometry,
        charge_to_mass: f64,
        source: Box<dyn SnapshotSource>,
    ) -> Self {
        Self {
            geometry,
            charge_to_mass,
            source,
            a: None,
            b: None,
            wa: 1.0,
            wb: 0.0,
            stats: LoadStats::default(),
        }
    }

    /// Store reading the files described by a validated `config`.
    ///
    /// For LANL sources the `info` check runs first unless `check_info`
    /// is turned off.
    pub fn from_config(config: &FieldConfig) -> Result<Self, FieldError> {
        if config.check_info && matches!(config.layout, SourceLayout::Lanl { .. }) {
            check_lanl_info(&config.path, &config.geometry)?;
        }
        let source = DiskSource::new(&config.path, config.layout.clone(), &config.geometry);
        log::info!("field source: {}", source.describe());
        Ok(Self::new(
            config.geometry.clone(),
            config.charge_to_mass,
            Box::new(source),
        ))
    }

    /// Grid geometry used for position lookup.
    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Factor applied to every sampled field.
    pub fn charge_to_mass(&self) -> f64 {
        self.charge_to_mass
    }

    /// Indices of the loaded bracket `(a, b)`.
    pub fn bracket(&self) -> Option<(SnapshotIndex, SnapshotIndex)> {
        match (&self.a, &self.b) {
            (Some(a), Some(b)) => Some((a.index(), b.index())),
            _ => None,
        }
    }

    /// Current temporal weights `(wa, wb)`.
    pub fn weights(&self) -> (f64, f64) {
        (self.wa, self.wb)
    }

    /// Lifetime load counters.
    pub fn stats(&self) -> &LoadStats {
        &self.stats
    }

    /// Snapshot "a", if loaded.
    pub fn snapshot_a(&self) -> Option<&FieldSnapshot> {
        self.a.as_ref()
    }

    /// Snapshot "b", if loaded.
    pub fn snapshot_b(&self) -> Option<&FieldSnapshot> {
        self.b.as_ref()
    }

    /// Install the bracket `(index_a, index_b)`.
    ///
    /// A requested index that is already loaded (typically the old "b"
    /// becoming the new "a") is shared rather than read again. On error the
    /// previous bracket stays in place.
    pub fn update(
        &mut self,
        index_a: SnapshotIndex,
        index_b: SnapshotIndex,
    ) -> Result<(), FieldError> {
        if index_a == index_b {
            return Err(FieldError::DegenerateBracket { index: index_a });
        }
        let a = self.acquire(index_a)?;
        let b = self.acquire(index_b)?;
        self.a = Some(a);
        self.b = Some(b);
        self.wa = 1.0;
        self.wb = 0.0;
        self.stats.brackets += 1;
        log::debug!("bracket ({index_a}, {index_b}) installed");
        Ok(())
    }

    fn acquire(&mut self, index: SnapshotIndex) -> Result<FieldSnapshot, FieldError> {
        let loaded = [self.a.as_ref(), self.b.as_ref()];
        if let Some(existing) = loaded.into_iter().flatten().find(|s| s.index() == index) {
            self.stats.snapshots_reused += 1;
            log::debug!("reusing snapshot {index}");
            return Ok(existing.clone());
        }

        let start = Instant::now();
        let snapshot = self.source.load(index, &self.geometry)?;
        snapshot.check_shape(&self.geometry)?;
        self.stats.load_us += start.elapsed().as_micros() as u64;
        self.stats.snapshots_loaded += 1;
        log::info!("loaded snapshot {index}");
        Ok(snapshot)
    }

    /// Set the blend weights for simulated time `t`.
    ///
    /// `wa = (tb - t) / (tb - ta)` and `wb = (t - ta) / (tb - ta)`, so
    /// `t = ta` selects "a" exactly and `t = tb` selects "b" exactly. The
    /// same formulas hold for backward brackets with `tb < ta`.
    pub fn set_time(&mut self, t: f64) -> Result<(), FieldError> {
        let (ta, tb) = self.bracket().ok_or(FieldError::NoBracket)?;
        let (ta, tb) = (ta.as_time(), tb.as_time());
        self.wa = (tb - t) / (tb - ta);
        self.wb = (t - ta) / (tb - ta);
        Ok(())
    }

    /// Interpolated field at `position`, scaled by the charge-to-mass ratio.
    ///
    /// Only `x` and `z` select the sample; `y` is the invariant direction.
    /// Fails with [`FieldError::OutOfDomain`] outside the interior.
    pub fn query_at(&self, position: [f64; 3]) -> Result<FieldSample, FieldError> {
        let (a, b) = match (&self.a, &self.b) {
            (Some(a), Some(b)) => (a, b),
            _ => return Err(FieldError::NoBracket),
        };
        let stencil = Stencil::locate(&self.geometry, position[0], position[2])?;
        let fa = stencil.sample_snapshot(a);
        let fb = stencil.sample_snapshot(b);
        let mut blended = FieldSample::ZERO;
        for i in 0..blended.0.len() {
            blended.0[i] = fa.0[i] * self.wa + fb.0[i] * self.wb;
        }
        Ok(blended.scaled(self.charge_to_mass))
    }

    /// Raw value of `selector` at flat (row-major) `site` of snapshot "a".
    pub fn site_value(&self, selector: FieldSelector, site: usize) -> Result<f64, FieldError> {
        let a = self.a.as_ref().ok_or(FieldError::NoBracket)?;
        let cells = self.geometry.cells();
        if site >= cells {
            return Err(FieldError::SiteOutOfRange { site, cells });
        }
        let values: Vec<f64> = selector
            .components()
            .iter()
            .map(|&c| f64::from(a.component(c).read().as_slice()[site]))
            .collect();
        Ok(selector.combine(&values))
    }

    /// `selector` at every site of snapshot "a", row-major.
    pub fn site_values(&self, selector: FieldSelector) -> Result<Vec<f64>, FieldError> {
        let a = self.a.as_ref().ok_or(FieldError::NoBracket)?;
        let views: Vec<_> = selector
            .components()
            .iter()
            .map(|&c| a.component(c).read())
            .collect();
        let mut scratch = Vec::with_capacity(views.len());
        Ok((0..self.geometry.cells())
            .map(|site| {
                scratch.clear();
                scratch.extend(views.iter().map(|v| f64::from(v.as_slice()[site])));
                selector.combine(&scratch)
            })
            .collect())
    }
}

impl std::fmt::Debug for FieldStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldStore")
            .field("geometry", &self.geometry)
            .field("charge_to_mass", &self.charge_to_mass)
            .field("source", &self.source.describe())
            .field("bracket", &self.bracket())
            .field("weights", &(self.wa, self.wb))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use picpt_core::FieldComponent;
    use proptest::prelude::*;

    /// Fills every component of snapshot `i` with the constant `i`.
    struct IndexValued {
        loads: Vec<SnapshotIndex>,
    }

    impl SnapshotSource for IndexValued {
        fn load(
            &mut self,
            index: SnapshotIndex,
            geometry: &GridGeometry,
        ) -> Result<FieldSnapshot, FieldError> {
            self.loads.push(index);
            let snap = FieldSnapshot::zeroed(index, geometry)?;
            for c in FieldComponent::ALL {
                snap.component(c).write().fill(index.0 as f32);
            }
            Ok(snap)
        }

        fn describe(&self) -> String {
            "index-valued".into()
        }
    }

    fn store(charge_to_mass: f64) -> FieldStore {
        FieldStore::new(
            GridGeometry::new(16, 16, 15.0, 15.0),
            charge_to_mass,
            Box::new(IndexValued { loads: Vec::new() }),
        )
    }

    #[test]
    fn query_before_update_is_no_bracket() {
        let s = store(1.0);
        assert!(matches!(s.query_at([1.0, 0.0, 0.0]), Err(FieldError::NoBracket)));
        let mut s = store(1.0);
        assert!(matches!(s.set_time(0.0), Err(FieldError::NoBracket)));
    }

    #[test]
    fn endpoints_select_one_snapshot_exactly() {
        let mut s = store(1.0);
        s.update(SnapshotIndex(10), SnapshotIndex(20)).unwrap();

        s.set_time(10.0).unwrap();
        assert_eq!(s.weights(), (1.0, 0.0));
        assert_eq!(s.query_at([3.0, 0.0, 1.0]).unwrap().0, [10.0; 6]);

        s.set_time(20.0).unwrap();
        assert_eq!(s.weights(), (0.0, 1.0));
        assert_eq!(s.query_at([3.0, 0.0, 1.0]).unwrap().0, [20.0; 6]);

        s.set_time(12.5).unwrap();
        let f = s.query_at([3.3, 0.0, 1.1]).unwrap();
        assert!((f[FieldComponent::Ez] - 12.5).abs() < 1e-12);
    }

    #[test]
    fn backward_bracket_blends_the_same_way() {
        let mut s = store(1.0);
        s.update(SnapshotIndex(1750), SnapshotIndex(1725)).unwrap();
        s.set_time(1750.0).unwrap();
        assert_eq!(s.weights(), (1.0, 0.0));
        s.set_time(1740.0).unwrap();
        let (wa, wb) = s.weights();
        assert!((wa - 0.6).abs() < 1e-12 && (wb - 0.4).abs() < 1e-12);
    }

    #[test]
    fn charge_to_mass_scales_output() {
        let mut s = store(-2.0);
        s.update(SnapshotIndex(3), SnapshotIndex(4)).unwrap();
        s.set_time(3.0).unwrap();
        assert_eq!(s.query_at([0.0, 0.0, 0.0]).unwrap().0, [-6.0; 6]);
    }

    #[test]
    fn consecutive_brackets_share_the_overlap() {
        let mut s = store(1.0);
        s.update(SnapshotIndex(0), SnapshotIndex(5)).unwrap();
        let old_b = s.snapshot_b().unwrap().clone();
        s.update(SnapshotIndex(5), SnapshotIndex(10)).unwrap();

        assert!(s.snapshot_a().unwrap().shares_buffers_with(&old_b));
        assert_eq!(s.stats().snapshots_loaded, 3);
        assert_eq!(s.stats().snapshots_reused, 1);
        assert_eq!(s.stats().brackets, 2);
    }

    #[test]
    fn out_of_domain_query_reports_grid_coordinate() {
        let mut s = store(1.0);
        s.update(SnapshotIndex(0), SnapshotIndex(1)).unwrap();
        match s.query_at([-5.0, 0.0, 0.0]) {
            Err(FieldError::OutOfDomain { fx, .. }) => assert_eq!(fx, -4.0),
            other => panic!("expected OutOfDomain, got {other:?}"),
        }
    }

    #[test]
    fn degenerate_bracket_rejected() {
        let mut s = store(1.0);
        match s.update(SnapshotIndex(7), SnapshotIndex(7)) {
            Err(FieldError::DegenerateBracket { index }) => assert_eq!(index, SnapshotIndex(7)),
            other => panic!("expected DegenerateBracket, got {other:?}"),
        }
    }

    #[test]
    fn site_values_combine_components() {
        let mut s = store(1.0);
        s.update(SnapshotIndex(2), SnapshotIndex(3)).unwrap();
        assert_eq!(s.site_value(FieldSelector::Bx, 0).unwrap(), 2.0);
        let mag = s.site_value(FieldSelector::E, 17).unwrap();
        assert!((mag - (12.0f64).sqrt()).abs() < 1e-12);
        let all = s.site_values(FieldSelector::B).unwrap();
        assert_eq!(all.len(), 256);
        assert!(matches!(
            s.site_value(FieldSelector::Ey, 256),
            Err(FieldError::SiteOutOfRange { site: 256, cells: 256 })
        ));
    }

    proptest! {
        #[test]
        fn weights_sum_to_one(t in 100.0f64..=125.0) {
            let mut s = store(1.0);
            s.update(SnapshotIndex(100), SnapshotIndex(125)).unwrap();
            s.set_time(t).unwrap();
            let (wa, wb) = s.weights();
            prop_assert!((wa + wb - 1.0).abs() < 1e-12);
        }
    }
}
