//! Antenna radiation patterns.
//!
//! A transmitter is evaluated either against a measured [`RadiationPattern`]
//! (two independent attenuation curves) or, when no measurement exists for its
//! antenna and band, against the closed-form [`SectorPattern`].

pub mod curve;
pub mod registry;
pub mod sector;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use self::curve::{AttenuationCurve, CurveKind};
use self::sector::SectorPattern;
use crate::error::{ExposureError, Result};

/// Pattern attenuation in one direction, relative to boresight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternAttenuation {
    pub horizontal_db: f64,
    pub vertical_db: f64,
}

impl PatternAttenuation {
    pub fn total_db(&self) -> f64 {
        self.horizontal_db + self.vertical_db
    }
}

/// Directional attenuation of an antenna.
pub trait AntennaPattern {
    /// Attenuation for a direction given relative to boresight and tilt [deg].
    fn attenuation(&self, relative_azimuth_deg: f64, relative_elevation_deg: f64) -> PatternAttenuation;
}

/// Measured pattern made of a horizontal and a vertical curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadiationPattern {
    horizontal: AttenuationCurve,
    vertical: AttenuationCurve,
}

impl RadiationPattern {
    pub fn new(horizontal: AttenuationCurve, vertical: AttenuationCurve) -> Result<Self> {
        if horizontal.kind() != CurveKind::Horizontal || vertical.kind() != CurveKind::Vertical {
            return Err(ExposureError::invalid_config(
                "radiation pattern needs one horizontal and one vertical curve",
            ));
        }
        Ok(Self {
            horizontal,
            vertical,
        })
    }

    /// Builds both curves from `(angle_deg, attenuation_db)` samples.
    pub fn from_samples(horizontal: &[(f64, f64)], vertical: &[(f64, f64)]) -> Result<Self> {
        Self::new(
            AttenuationCurve::horizontal(horizontal)?,
            AttenuationCurve::vertical(vertical)?,
        )
    }

    pub fn horizontal(&self) -> &AttenuationCurve {
        &self.horizontal
    }

    pub fn vertical(&self) -> &AttenuationCurve {
        &self.vertical
    }
}

impl AntennaPattern for RadiationPattern {
    fn attenuation(&self, relative_azimuth_deg: f64, relative_elevation_deg: f64) -> PatternAttenuation {
        PatternAttenuation {
            horizontal_db: self.horizontal.attenuation(relative_azimuth_deg),
            vertical_db: self.vertical.attenuation(relative_elevation_deg),
        }
    }
}

/// Pattern actually used for a transmitter.
#[derive(Debug, Clone)]
pub enum PatternModel {
    Measured(Arc<RadiationPattern>),
    Sector(SectorPattern),
}

impl AntennaPattern for PatternModel {
    fn attenuation(&self, relative_azimuth_deg: f64, relative_elevation_deg: f64) -> PatternAttenuation {
        match self {
            Self::Measured(p) => p.attenuation(relative_azimuth_deg, relative_elevation_deg),
            Self::Sector(p) => p.attenuation(relative_azimuth_deg, relative_elevation_deg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern() -> RadiationPattern {
        RadiationPattern::from_samples(
            &[(-180.0, 25.0), (-60.0, 12.0), (0.0, 0.0), (60.0, 12.0)],
            &[(-90.0, 30.0), (-10.0, 15.0), (0.0, 0.0), (10.0, 15.0), (90.0, 30.0)],
        )
        .unwrap()
    }

    #[test]
    fn test_boresight_zero() {
        let p = pattern();
        let a = p.attenuation(p.horizontal().boresight_deg(), p.vertical().boresight_deg());
        assert_eq!(a, PatternAttenuation::default());
    }

    #[test]
    fn test_periodic_for_any_elevation() {
        let p = pattern();
        for e in [-90.0, -45.0, -3.0, 0.0, 7.5, 60.0] {
            assert_eq!(p.attenuation(0.0, e), p.attenuation(360.0, e));
            assert_eq!(p.attenuation(-180.0, e), p.attenuation(180.0, e));
        }
    }

    #[test]
    fn test_curve_kinds_must_match_planes() {
        let h = AttenuationCurve::horizontal(&[(0.0, 0.0), (90.0, 10.0)]).unwrap();
        let v = AttenuationCurve::vertical(&[(0.0, 0.0), (10.0, 10.0)]).unwrap();
        assert!(RadiationPattern::new(v.clone(), h.clone()).is_err());
        assert!(RadiationPattern::new(h, v).is_ok());
    }

    #[test]
    fn test_model_dispatch() {
        let measured = PatternModel::Measured(Arc::new(pattern()));
        assert!((measured.attenuation(30.0, 0.0).horizontal_db - 6.0).abs() < 1e-12);
        let sector = PatternModel::Sector(SectorPattern::ISOTROPIC);
        assert_eq!(sector.attenuation(30.0, 5.0).total_db(), 0.0);
    }
}
