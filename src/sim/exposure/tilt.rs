use super::propagation::PropagationEngine;
use super::result::{Contribution, SamplePoint};
use super::transmitter::{ResolvedTransmitter, TiltSetting, Transmitter};
use crate::error::{ExposureError, Result};

/// Candidate spacing closer than this to the range end is merged with it [deg].
const TILT_EPS: f64 = 1e-9;

/// Largest tilt grid evaluated per transmitter and point.
pub const MAX_TILT_CANDIDATES: usize = 10_000;

/// Fields within this relative difference are a tie, resolved to the lower tilt.
pub const TIE_RELATIVE_TOL: f64 = 1e-12;

/// Worst-case tilt over an adjustable transmitter's range, by uniform grid search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TiltSearch {
    step_deg: f64,
}

impl TiltSearch {
    pub fn new(step_deg: f64) -> Self {
        Self { step_deg }
    }

    pub fn step_deg(&self) -> f64 {
        self.step_deg
    }

    /// Number of grid steps in `[min_deg, max_deg]`, not capped.
    fn steps(&self, min_deg: f64, max_deg: f64) -> f64 {
        ((max_deg - min_deg) / self.step_deg + TILT_EPS).floor()
    }

    /// Rejects a tilt range whose grid would exceed [`MAX_TILT_CANDIDATES`].
    pub fn validate(&self, tx: &Transmitter) -> Result<()> {
        let TiltSetting::Range { min_deg, max_deg } = tx.tilt else {
            return Ok(());
        };
        // +1 for the closing `max_deg` candidate
        if self.steps(min_deg, max_deg) + 1.0 >= MAX_TILT_CANDIDATES as f64 {
            return Err(ExposureError::TiltGridTooFine {
                id: tx.id,
                span_deg: max_deg - min_deg,
                step_deg: self.step_deg,
                max: MAX_TILT_CANDIDATES,
            });
        }
        Ok(())
    }

    /// Ascending grid `min, min + step, ...` that always ends with `max`.
    ///
    /// The grid is cut after [`MAX_TILT_CANDIDATES`] entries; `max` is still last.
    pub fn candidates(&self, min_deg: f64, max_deg: f64) -> Vec<f64> {
        if max_deg - min_deg <= TILT_EPS {
            return vec![min_deg];
        }
        let n = (self.steps(min_deg, max_deg) as usize).min(MAX_TILT_CANDIDATES - 2);
        let mut tilts: Vec<f64> = (0..=n)
            .map(|i| min_deg + i as f64 * self.step_deg)
            .filter(|&t| t < max_deg - TILT_EPS)
            .collect();
        tilts.push(max_deg);
        tilts
    }

    /// Contribution of `tx` at `point` at its worst-case tilt.
    ///
    /// Fixed-tilt transmitters are evaluated at their tilt. For a range, a
    /// later candidate replaces the current best only if it is larger by more
    /// than [`TIE_RELATIVE_TOL`], so ties go to the lowest tilt.
    pub fn search(
        &self,
        engine: &PropagationEngine,
        tx: &ResolvedTransmitter,
        point: &SamplePoint,
    ) -> Contribution {
        let (min_deg, max_deg) = match tx.transmitter.tilt {
            TiltSetting::Fixed(t) => return engine.field(tx, point, Some(t)),
            TiltSetting::Range { min_deg, max_deg } => (min_deg, max_deg),
        };

        let path = engine.path(tx, point);
        let mut best: Option<Contribution> = None;
        for tilt in self.candidates(min_deg, max_deg) {
            let c = engine.evaluate(tx, point, &path, tilt);
            if best
                .as_ref()
                .is_none_or(|b| c.field_vm > b.field_vm * (1.0 + TIE_RELATIVE_TOL))
            {
                best = Some(c);
            }
        }
        // candidates() is never empty
        best.unwrap_or_else(|| engine.evaluate(tx, point, &path, min_deg))
    }

    /// Tilt and field of the worst case.
    pub fn best_tilt(
        &self,
        engine: &PropagationEngine,
        tx: &ResolvedTransmitter,
        point: &SamplePoint,
    ) -> (f64, f64) {
        let c = self.search(engine, tx, point);
        (c.tilt_deg, c.field_vm)
    }
}

impl Default for TiltSearch {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::Point;
    use crate::sim::exposure::config::ExposureConfig;
    use crate::sim::exposure::transmitter::{PatternSource, Transmitter};
    use crate::sim::occlusion::OcclusionGeometry;
    use crate::sim::pattern::PatternModel;
    use crate::sim::pattern::sector::SectorPattern;

    fn engine() -> PropagationEngine {
        PropagationEngine::new(&ExposureConfig::new(), Arc::new(OcclusionGeometry::empty()))
    }

    fn sector(tilt: TiltSetting) -> ResolvedTransmitter {
        let tx = Transmitter::new(4, Point::new(0., 0., 30.), 0.0, tilt, 1000.0, "3600");
        ResolvedTransmitter::new(
            tx,
            PatternModel::Sector(SectorPattern::LTE_65_7),
            PatternSource::Measured,
        )
    }

    #[test]
    fn test_candidates_include_both_ends() {
        let s = TiltSearch::new(1.0);
        assert_eq!(s.candidates(-3.0, 0.0), vec![-3.0, -2.0, -1.0, 0.0]);
        assert_eq!(s.candidates(-2.5, 0.0), vec![-2.5, -1.5, -0.5, 0.0]);
        assert_eq!(s.candidates(-4.0, -4.0), vec![-4.0]);
        let fine = TiltSearch::new(0.1).candidates(0.0, 1.0);
        assert_eq!(fine.len(), 11);
        assert_eq!(fine.last(), Some(&1.0));
        assert!(fine.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_worst_case_dominates_grid() {
        let engine = engine();
        let search = TiltSearch::new(0.5);
        let tx = sector(TiltSetting::Range {
            min_deg: -12.0,
            max_deg: 2.0,
        });
        // Point 100 m north and 30 m down: about -16.7 deg, beyond the range
        for point in [
            SamplePoint::new(Point::new(0., 100., 0.), "a"),
            SamplePoint::new(Point::new(0., 100., 20.), "b"),
            SamplePoint::new(Point::new(0., 40., 30.), "c"),
        ] {
            let (tilt, field) = search.best_tilt(&engine, &tx, &point);
            assert!((-12.0..=2.0).contains(&tilt));
            let bound = field * (1.0 + TIE_RELATIVE_TOL);
            for t in search.candidates(-12.0, 2.0) {
                assert!(bound >= engine.field(&tx, &point, Some(t)).field_vm);
            }
            assert!(bound >= engine.field(&tx, &point, Some(-12.0)).field_vm);
            assert!(bound >= engine.field(&tx, &point, Some(2.0)).field_vm);
        }
    }

    #[test]
    fn test_tilt_follows_direction() {
        let engine = engine();
        let tx = sector(TiltSetting::Range {
            min_deg: -20.0,
            max_deg: 0.0,
        });
        // Point at exactly -10 deg elevation
        let d = 100.0;
        let dz = d * 10_f64.to_radians().tan();
        let point = SamplePoint::new(Point::new(0., d, 30. - dz), "a");
        let (tilt, _) = TiltSearch::default().best_tilt(&engine, &tx, &point);
        assert!((tilt + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_ties_resolve_to_first_candidate() {
        let engine = engine();
        let tx = ResolvedTransmitter::new(
            sector(TiltSetting::Range {
                min_deg: -5.0,
                max_deg: 5.0,
            })
            .transmitter,
            PatternModel::Sector(SectorPattern::ISOTROPIC),
            PatternSource::Measured,
        );
        let point = SamplePoint::new(Point::new(10., 10., 0.), "a");
        let (tilt, _) = TiltSearch::default().best_tilt(&engine, &tx, &point);
        assert_eq!(tilt, -5.0);
    }

    #[test]
    fn test_halfway_elevation_picks_lower_tilt() {
        let engine = engine();
        let tx = sector(TiltSetting::Range {
            min_deg: -20.0,
            max_deg: 0.0,
        });
        let search = TiltSearch::default();
        for k in 0..19 {
            // Exactly between the grid tilts -k and -(k + 1)
            let elevation = -(k as f64 + 0.5);
            for d in [25.0, 52.0, 130.0, 400.0] {
                let dz = d * elevation.to_radians().tan();
                let point = SamplePoint::new(Point::new(0., d, 30. + dz), "a");
                let (tilt, _) = search.best_tilt(&engine, &tx, &point);
                assert_eq!(tilt, -(k as f64 + 1.0), "elevation {elevation} at {d} m");
            }
        }
    }

    #[test]
    fn test_grid_size_is_bounded() {
        let range = TiltSetting::Range {
            min_deg: -10.0,
            max_deg: 0.0,
        };
        let tx = sector(range).transmitter;
        assert!(TiltSearch::new(1.0).validate(&tx).is_ok());
        assert!(TiltSearch::new(0.01).validate(&tx).is_ok());
        assert!(matches!(
            TiltSearch::new(1e-300).validate(&tx),
            Err(ExposureError::TiltGridTooFine { .. })
        ));
        assert!(TiltSearch::new(1e-3).validate(&tx).is_err());
        // Fixed tilts have no grid
        let fixed = sector(TiltSetting::Fixed(-2.0)).transmitter;
        assert!(TiltSearch::new(1e-300).validate(&fixed).is_ok());
        // Even unchecked, the grid never grows past the cap
        let capped = TiltSearch::new(1e-300).candidates(-10.0, 0.0);
        assert!(capped.len() <= MAX_TILT_CANDIDATES);
        assert_eq!(capped.last(), Some(&0.0));
    }

    #[test]
    fn test_fixed_tilt_is_not_searched() {
        let engine = engine();
        let tx = sector(TiltSetting::Fixed(-3.0));
        let point = SamplePoint::new(Point::new(0., 100., 0.), "a");
        let c = TiltSearch::default().search(&engine, &tx, &point);
        assert_eq!(c.tilt_deg, -3.0);
        assert_eq!(c, engine.field(&tx, &point, None));
    }
}
